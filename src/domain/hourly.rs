// Hourly aggregation - calendar-hour means in local time
use super::sample::{HourKey, Reading};
use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Which readings take part in an aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    All,
    /// Strictly after the given instant
    After(DateTime<Utc>),
}

impl TimeRange {
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        match self {
            TimeRange::All => true,
            TimeRange::After(start) => time > *start,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourBucket {
    pub hour_start: NaiveDateTime,
    pub values: Vec<f64>,
}

impl HourBucket {
    fn new(key: HourKey) -> Self {
        Self {
            hour_start: key.start(),
            values: Vec::new(),
        }
    }

    pub fn average(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyAverage {
    pub hour_start: NaiveDateTime,
    pub average: f64,
}

impl HourlyAverage {
    pub fn hour_of_day(&self) -> u32 {
        self.hour_start.hour()
    }
}

/// Bucket readings by local calendar hour, keyed by `HourKey` so iteration is chronological
pub fn hour_buckets<Tz: TimeZone>(
    readings: &[Reading],
    tz: &Tz,
    range: TimeRange,
) -> BTreeMap<HourKey, HourBucket> {
    let mut buckets: BTreeMap<HourKey, HourBucket> = BTreeMap::new();

    for reading in readings.iter().filter(|r| range.contains(r.time)) {
        let key = HourKey::of(reading.local_time(tz));
        buckets
            .entry(key)
            .or_insert_with(|| HourBucket::new(key))
            .values
            .push(reading.power);
    }

    buckets
}

/// Hourly means sorted ascending by hour start
pub fn hourly_averages<Tz: TimeZone>(
    readings: &[Reading],
    tz: &Tz,
    range: TimeRange,
) -> Vec<HourlyAverage> {
    let mut averages: Vec<HourlyAverage> = hour_buckets(readings, tz, range)
        .into_values()
        .filter_map(|bucket| {
            Some(HourlyAverage {
                hour_start: bucket.hour_start,
                average: bucket.average()?,
            })
        })
        .collect();

    averages.sort_by_key(|hourly| hourly.hour_start);
    averages
}
