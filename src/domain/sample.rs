// Sample domain model - one row of the boiler power log
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

/// Power reading as it was found in the log
#[derive(Debug, Clone, PartialEq)]
pub enum PowerReading {
    Value(f64),
    Unreadable(String),
}

impl PowerReading {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => PowerReading::Value(value),
            _ => PowerReading::Unreadable(raw.to_string()),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            PowerReading::Value(value) => Some(*value),
            PowerReading::Unreadable(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sample {
    pub raw_time: String,
    pub time: Option<DateTime<Utc>>,
    pub in_operation: bool,
    pub power: PowerReading,
    pub error: Option<String>,
}

impl Sample {
    #[cfg(test)]
    pub fn new(time: DateTime<Utc>, in_operation: bool, power: f64) -> Self {
        Self {
            raw_time: time.to_rfc3339(),
            time: Some(time),
            in_operation,
            power: PowerReading::Value(power),
            error: None,
        }
    }

    /// Build a sample from the four text columns of the log
    pub fn from_fields(time: &str, in_operation: &str, power: &str, error: &str) -> Self {
        let error = error.trim();
        Self {
            raw_time: time.to_string(),
            time: parse_timestamp(time),
            in_operation: parse_flag(in_operation),
            power: PowerReading::parse(power),
            error: (!error.is_empty()).then(|| error.to_string()),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Some(time.with_timezone(&Utc));
    }

    // Writers without an offset are read as UTC
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

/// A sample that can take part in time-based arithmetic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub time: DateTime<Utc>,
    pub power: f64,
}

impl Reading {
    pub fn new(time: DateTime<Utc>, power: f64) -> Self {
        Self { time, power }
    }

    pub fn local_time<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDateTime {
        self.time.with_timezone(tz).naive_local()
    }
}

/// Keep the readings that have both a timestamp and a numeric power, in log order.
///
/// Out-of-range powers stay in unless `exclude_out_of_range` is set.
pub fn readings(samples: &[Sample], exclude_out_of_range: bool) -> Vec<Reading> {
    samples
        .iter()
        .filter_map(|sample| Some(Reading::new(sample.time?, sample.power.value()?)))
        .filter(|reading| !exclude_out_of_range || in_power_range(reading.power))
        .collect()
}

pub const MAX_POWER_KW: f64 = 15.0;

pub fn in_power_range(power: f64) -> bool {
    (0.0..=MAX_POWER_KW).contains(&power)
}

/// Calendar hour in local time, ordered by date then hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HourKey {
    pub date: NaiveDate,
    pub hour: u32,
}

impl HourKey {
    pub fn of(local: NaiveDateTime) -> Self {
        Self {
            date: local.date(),
            hour: local.hour(),
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.date
            .and_hms_opt(self.hour, 0, 0)
            .unwrap_or_else(|| self.date.and_time(chrono::NaiveTime::MIN))
    }
}
