// Daily estimation - energy, fuel and cost per calendar day plus fuel runway
use super::hourly::HourlyAverage;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const HOURS_PER_DAY: f64 = 24.0;

/// Pellet figures supplied by the operator
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct Estimations {
    /// kWh produced per kg of pellets
    pub pellet_kg_power: f64,
    /// EUR per kg
    pub pellet_kg_cost: f64,
    /// kg in the hopper when the log started
    pub last_fuel_level: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayEstimate {
    pub day: NaiveDate,
    pub average_kw: f64,
    /// Not clamped: a negative average from corrupt readings shows up here as-is
    pub consumption_kwh: f64,
    pub is_partial: bool,
}

/// Group hourly means by local day.
///
/// The local day `now` falls on is extrapolated over the real time elapsed
/// since its midnight in the zone of `now`, instead of a full day.
pub fn estimate_days<Tz: TimeZone>(
    hourly: &[HourlyAverage],
    now: &DateTime<Tz>,
) -> Vec<DayEstimate> {
    let mut days: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for hour in hourly {
        days.entry(hour.hour_start.date())
            .or_default()
            .push(hour.average);
    }

    let today = now.naive_local().date();
    days.into_iter()
        .map(|(day, averages)| {
            let average_kw = averages.iter().sum::<f64>() / averages.len() as f64;
            let is_partial = day == today;
            let hours = if is_partial {
                elapsed_hours(day, now)
            } else {
                HOURS_PER_DAY
            };

            DayEstimate {
                day,
                average_kw,
                consumption_kwh: average_kw * hours,
                is_partial,
            }
        })
        .collect()
}

fn elapsed_hours<Tz: TimeZone>(day: NaiveDate, now: &DateTime<Tz>) -> f64 {
    let midnight = day.and_time(NaiveTime::MIN);
    let elapsed = match now.timezone().from_local_datetime(&midnight).earliest() {
        Some(start) => now.clone() - start,
        // midnight skipped by a transition
        None => now.naive_local() - midnight,
    };
    elapsed.num_milliseconds() as f64 / 3_600_000.0
}

/// `None` for infinities and NaN
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Day-over-day change of the average power
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "percent", rename_all = "snake_case")]
pub enum PercentChange {
    /// First day, nothing to compare with
    Baseline,
    Change(f64),
    /// Previous day averaged exactly zero, or either average is not finite
    Undefined,
}

impl PercentChange {
    pub fn between(previous: f64, current: f64) -> Self {
        if previous == 0.0 {
            return PercentChange::Undefined;
        }
        finite(previous)
            .zip(finite(current))
            .and_then(|(previous, current)| finite((current - previous) / previous * 100.0))
            .map_or(PercentChange::Undefined, PercentChange::Change)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayReport {
    #[serde(flatten)]
    pub estimate: DayEstimate,
    pub fuel_kg: f64,
    pub cost_eur: f64,
    pub change: PercentChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuelSummary {
    pub total_consumption_kwh: f64,
    pub total_fuel_kg: f64,
    /// `None` without any day to average over, or when it overflows
    pub average_fuel_per_day_kg: Option<f64>,
    /// `None` when the consumed total is not finite
    pub remaining_fuel_kg: Option<f64>,
    /// `None` when the daily average is missing or zero
    pub remaining_days: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyOverview {
    pub days: Vec<DayReport>,
    pub summary: FuelSummary,
}

impl DailyOverview {
    /// `estimations.pellet_kg_power` must be positive; configuration loading enforces it.
    pub fn new(estimates: &[DayEstimate], estimations: &Estimations) -> Self {
        let days = estimates
            .iter()
            .enumerate()
            .map(|(i, estimate)| {
                let fuel_kg = estimate.consumption_kwh / estimations.pellet_kg_power;
                let change = match i.checked_sub(1) {
                    Some(previous) => {
                        PercentChange::between(estimates[previous].average_kw, estimate.average_kw)
                    }
                    None => PercentChange::Baseline,
                };

                DayReport {
                    estimate: *estimate,
                    fuel_kg,
                    cost_eur: fuel_kg * estimations.pellet_kg_cost,
                    change,
                }
            })
            .collect();

        Self {
            days,
            summary: FuelSummary::new(estimates, estimations),
        }
    }
}

impl FuelSummary {
    pub fn new(estimates: &[DayEstimate], estimations: &Estimations) -> Self {
        let total_consumption_kwh: f64 = estimates.iter().map(|d| d.consumption_kwh).sum();
        let total_fuel_kg = total_consumption_kwh / estimations.pellet_kg_power;
        let average_fuel_per_day_kg = (!estimates.is_empty())
            .then(|| total_fuel_kg / estimates.len() as f64)
            .and_then(finite);
        let remaining_fuel_kg = finite(estimations.last_fuel_level - total_fuel_kg);
        let remaining_days = average_fuel_per_day_kg
            .filter(|average| *average != 0.0)
            .zip(remaining_fuel_kg)
            .and_then(|(average, remaining)| finite(remaining / average));

        Self {
            total_consumption_kwh,
            total_fuel_kg,
            average_fuel_per_day_kg,
            remaining_fuel_kg,
            remaining_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, LocalResult, NaiveDateTime, Utc};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn at(d: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, hour, minute, 0).unwrap()
    }

    fn hourly(d: u32, hour: u32, average: f64) -> HourlyAverage {
        HourlyAverage {
            hour_start: day(d).and_hms_opt(hour, 0, 0).unwrap(),
            average,
        }
    }

    fn estimations() -> Estimations {
        Estimations {
            pellet_kg_power: 2.0,
            pellet_kg_cost: 0.5,
            last_fuel_level: 100.0,
        }
    }

    #[test]
    fn test_full_days_use_24_hours() {
        let mut hours: Vec<HourlyAverage> = (0..24).map(|h| hourly(3, h, 1.0)).collect();
        hours.extend((0..24).map(|h| hourly(4, h, 1.0)));
        let now = at(10, 12, 0);

        let estimates = estimate_days(&hours, &now);
        assert_eq!(estimates.len(), 2);
        assert!(estimates.iter().all(|d| d.consumption_kwh == 24.0 && !d.is_partial));

        let overview = DailyOverview::new(&estimates, &estimations());
        assert_eq!(overview.days[0].fuel_kg, 12.0);
        assert_eq!(overview.days[0].cost_eur, 6.0);
        assert_eq!(overview.summary.total_fuel_kg, 24.0);
        assert_eq!(overview.summary.average_fuel_per_day_kg, Some(12.0));
        assert_eq!(overview.summary.remaining_fuel_kg, Some(76.0));
        assert_eq!(overview.summary.remaining_days, Some(76.0 / 12.0));
    }

    #[test]
    fn test_today_is_partial() {
        let hours = vec![hourly(5, 0, 2.0), hourly(5, 1, 4.0)];
        let now = at(5, 6, 30);

        let estimates = estimate_days(&hours, &now);
        assert_eq!(estimates.len(), 1);
        assert!(estimates[0].is_partial);
        assert_eq!(estimates[0].average_kw, 3.0);
        assert_eq!(estimates[0].consumption_kwh, 3.0 * 6.5);
    }

    #[test]
    fn test_days_sorted_and_averaged_from_hours() {
        let hours = vec![hourly(2, 23, 3.0), hourly(1, 5, 1.0), hourly(2, 1, 1.0)];
        let now = at(9, 0, 0);

        let estimates = estimate_days(&hours, &now);
        assert_eq!(estimates[0].day, day(1));
        assert_eq!(estimates[1].day, day(2));
        assert_eq!(estimates[1].average_kw, 2.0);
    }

    #[test]
    fn test_negative_average_is_not_clamped() {
        let hours = vec![hourly(1, 0, -1.0)];
        let now = at(9, 0, 0);

        assert_eq!(estimate_days(&hours, &now)[0].consumption_kwh, -24.0);
    }

    #[test]
    fn test_percent_change() {
        let hours = vec![hourly(1, 0, 2.0), hourly(2, 0, 3.0), hourly(3, 0, 0.0), hourly(4, 0, 1.0)];
        let now = at(9, 0, 0);
        let overview = DailyOverview::new(&estimate_days(&hours, &now), &estimations());

        let changes: Vec<PercentChange> = overview.days.iter().map(|d| d.change).collect();
        assert_eq!(
            changes,
            vec![
                PercentChange::Baseline,
                PercentChange::Change(50.0),
                PercentChange::Change(-100.0),
                PercentChange::Undefined,
            ]
        );
    }

    #[test]
    fn test_empty_history_has_no_runway() {
        let summary = FuelSummary::new(&[], &estimations());
        assert_eq!(summary.total_fuel_kg, 0.0);
        assert_eq!(summary.average_fuel_per_day_kg, None);
        assert_eq!(summary.remaining_fuel_kg, Some(100.0));
        assert_eq!(summary.remaining_days, None);
    }

    #[test]
    fn test_idle_history_has_no_runway() {
        let hours = vec![hourly(1, 0, 0.0)];
        let now = at(9, 0, 0);
        let summary = FuelSummary::new(&estimate_days(&hours, &now), &estimations());

        assert_eq!(summary.average_fuel_per_day_kg, Some(0.0));
        assert_eq!(summary.remaining_days, None);
    }

    #[test]
    fn test_overflowing_averages_are_not_reported() {
        assert_eq!(PercentChange::between(1.0, f64::INFINITY), PercentChange::Undefined);
        assert_eq!(PercentChange::between(f64::NAN, 1.0), PercentChange::Undefined);
        assert_eq!(PercentChange::between(f64::MIN_POSITIVE, f64::MAX), PercentChange::Undefined);

        let hours = vec![hourly(3, 0, 1.0), hourly(4, 0, f64::INFINITY)];
        let now = at(9, 0, 0);
        let overview = DailyOverview::new(&estimate_days(&hours, &now), &estimations());

        assert_eq!(overview.days[1].change, PercentChange::Undefined);
        assert_eq!(overview.summary.average_fuel_per_day_kg, None);
        assert_eq!(overview.summary.remaining_fuel_kg, None);
        assert_eq!(overview.summary.remaining_days, None);
    }

    /// UTC+2, switching to UTC+3 at 03:00 local on 2024-03-31
    #[derive(Debug, Clone, Copy)]
    struct SpringForward;

    impl SpringForward {
        fn switch() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2024, 3, 31)
                .unwrap()
                .and_hms_opt(1, 0, 0)
                .unwrap()
        }

        fn winter() -> FixedOffset {
            FixedOffset::east_opt(2 * 3600).unwrap()
        }

        fn summer() -> FixedOffset {
            FixedOffset::east_opt(3 * 3600).unwrap()
        }
    }

    impl TimeZone for SpringForward {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            SpringForward
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let as_winter = *local - Duration::hours(2);
            let as_summer = *local - Duration::hours(3);
            match (as_winter < Self::switch(), as_summer >= Self::switch()) {
                (true, _) => LocalResult::Single(Self::winter()),
                (false, true) => LocalResult::Single(Self::summer()),
                // 03:00..04:00 does not exist that day
                (false, false) => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::switch() {
                Self::winter()
            } else {
                Self::summer()
            }
        }
    }

    #[test]
    fn test_partial_day_counts_real_hours_across_offset_change() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let hours = vec![HourlyAverage {
            hour_start: today.and_hms_opt(0, 0, 0).unwrap(),
            average: 1.0,
        }];
        let noon = SpringForward
            .from_local_datetime(&today.and_hms_opt(12, 0, 0).unwrap())
            .single()
            .unwrap();

        let estimates = estimate_days(&hours, &noon);
        assert!(estimates[0].is_partial);
        // wall clock says 12 hours, one of them was skipped
        assert_eq!(estimates[0].consumption_kwh, 11.0);
    }
}
