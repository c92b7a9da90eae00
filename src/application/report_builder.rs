// Report builder - composes the analytics stages into the text report
use crate::application::chart_renderer::ChartRenderer;
use crate::domain::daily::{
    estimate_days, finite, DailyOverview, DayReport, Estimations, PercentChange,
};
use crate::domain::hourly::{hourly_averages, HourlyAverage, TimeRange};
use crate::domain::off_hours::message_for_hour;
use crate::domain::sample::{readings, Sample};
use crate::domain::smoothing::{Direction, Trend};
use crate::domain::validation::{validate, ValidationIssue};
use crate::infrastructure::config::AnalysisConfig;
use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use std::fmt;

pub const NOT_ENOUGH_DATA: &str = "Not enough data to generate stats";

const Y_AXIS: &str = "            ^";
const X_AXIS: &str =
    "       -----+---------------------------------------------------------------------------->";
const TABLE_BORDER: &str =
    "      +------------+-------------------+--------+--------+-------------+----------+";
const TABLE_HEADER: &str =
    "      | Day        | Consumption (kWh) |  Fuel  |  Cost  | H. Average  |  Change  |";
const TIME_FORMAT: &str = "%I:%M %p";

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Lines in output order; chart entries span several lines
    pub lines: Vec<String>,
    pub overview: DailyOverview,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatsOutcome {
    NotEnoughData,
    Report(Report),
}

impl fmt::Display for StatsOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsOutcome::NotEnoughData => f.write_str(NOT_ENOUGH_DATA),
            StatsOutcome::Report(report) => report.fmt(f),
        }
    }
}

/// Diagnostics travel next to the outcome, never in place of it
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub issues: Vec<ValidationIssue>,
    /// Rows whose operation flag was set
    pub in_operation: usize,
    pub outcome: StatsOutcome,
}

pub struct ReportBuilder<'a> {
    renderer: &'a dyn ChartRenderer,
    analysis: &'a AnalysisConfig,
    estimations: &'a Estimations,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(
        renderer: &'a dyn ChartRenderer,
        analysis: &'a AnalysisConfig,
        estimations: &'a Estimations,
    ) -> Self {
        Self {
            renderer,
            analysis,
            estimations,
        }
    }

    pub fn analyze<Tz: TimeZone>(&self, samples: &[Sample], now: &DateTime<Tz>) -> Analysis {
        Analysis {
            issues: validate(samples),
            in_operation: samples.iter().filter(|sample| sample.in_operation).count(),
            outcome: self.build(samples, now),
        }
    }

    /// Calendar grouping and hour-of-day checks use the time zone of `now`
    pub fn build<Tz: TimeZone>(&self, samples: &[Sample], now: &DateTime<Tz>) -> StatsOutcome {
        if samples.len() < self.analysis.min_samples {
            return StatsOutcome::NotEnoughData;
        }

        let tz = now.timezone();
        let now_utc = now.with_timezone(&Utc);
        let readings = readings(samples, self.analysis.exclude_out_of_range);
        let mut lines = Vec::new();

        let window_start = now_utc - Duration::minutes(self.analysis.window_minutes);
        let trend = Trend::since(&readings, window_start, self.analysis.smoothing_radius);
        match trend.filter(|trend| !trend.is_idle()) {
            Some(trend) => self.push_trend(&mut lines, &trend, &tz),
            None => lines.push(message_for_hour(now.hour()).to_string()),
        }

        let history_start = now_utc - Duration::hours(self.analysis.history_hours);
        let last_hours = hourly_averages(&readings, &tz, TimeRange::After(history_start));
        self.push_hourly(&mut lines, &last_hours);

        let all_hours = hourly_averages(&readings, &tz, TimeRange::All);
        let overview = DailyOverview::new(&estimate_days(&all_hours, now), self.estimations);
        push_daily(&mut lines, &overview);

        StatsOutcome::Report(Report { lines, overview })
    }

    fn push_trend<Tz: TimeZone>(&self, lines: &mut Vec<String>, trend: &Trend, tz: &Tz) {
        let local = |time: DateTime<Utc>| time.with_timezone(tz).naive_local().format(TIME_FORMAT);

        lines.push(format!(
            "Heating Power (kW)                    Pellet Boiler Heating Power Variation in the Last {} Minutes",
            self.analysis.window_minutes
        ));
        lines.push(Y_AXIS.to_string());
        lines.push(self.renderer.plot(&trend.smoothed, self.analysis.chart_height));
        lines.push(X_AXIS.to_string());
        lines.push(format!(
            "    Time:  {} - {} | {}",
            local(trend.first_at),
            local(trend.last_at),
            power_now(trend)
        ));
        lines.push(String::new());
    }

    fn push_hourly(&self, lines: &mut Vec<String>, hours: &[HourlyAverage]) {
        let widened: Vec<f64> = hours
            .iter()
            .flat_map(|hour| std::iter::repeat_n(hour.average, self.analysis.hourly_repeat))
            .collect();
        let axis: Vec<String> = hours
            .iter()
            .map(|hour| format!("{:>2}", hour.hour_of_day()))
            .collect();

        lines.push(String::new());
        lines.push(format!(
            "Heating Power (kW)                                                             Last {} Hours",
            self.analysis.history_hours
        ));
        lines.push(Y_AXIS.to_string());
        lines.push(self.renderer.plot(&widened, self.analysis.chart_height));
        lines.push(X_AXIS.to_string());
        lines.push(format!("Hour:       {}", axis.join(" ")));
        lines.push(format!("Average Power: {}", average_power(hours)));
        lines.push(String::new());
    }
}

fn power_now(trend: &Trend) -> String {
    let now = format!("Power now: {} kW", or_na(trend.last_value, |v| format!("{v:.1}")));
    match (trend.direction(), trend.delta.and_then(finite)) {
        (Direction::Up, Some(delta)) => format!("{now} (↑{delta:.1})"),
        (Direction::Down, Some(delta)) => format!("{now} (↓{:.1})", delta.abs()),
        _ => now,
    }
}

fn average_power(hours: &[HourlyAverage]) -> String {
    if hours.is_empty() {
        return "n/a".to_string();
    }
    let average = hours.iter().map(|h| h.average).sum::<f64>() / hours.len() as f64;
    or_na(average, |average| format!("{average:.2}kW"))
}

fn or_na(value: f64, render: impl Fn(f64) -> String) -> String {
    finite(value).map_or_else(|| "n/a".to_string(), render)
}

fn push_daily(lines: &mut Vec<String>, overview: &DailyOverview) {
    lines.push(String::new());
    lines.push("      Daily Reports".to_string());
    lines.push(TABLE_BORDER.to_string());
    lines.push(TABLE_HEADER.to_string());
    lines.push(TABLE_BORDER.to_string());
    lines.extend(overview.days.iter().map(table_row));
    lines.push(TABLE_BORDER.to_string());

    let summary = &overview.summary;
    let fuel = summary
        .remaining_fuel_kg
        .map_or_else(|| "n/a".to_string(), |kg| format!("{kg:.1}kg"));
    let days = summary
        .remaining_days
        .map_or_else(|| "n/a".to_string(), |days| format!("{days:.1}"));
    lines.push(format!("      Remaining Fuel: {fuel} for {days} days"));
    lines.push(String::new());
}

fn table_row(day: &DayReport) -> String {
    format!(
        "      | {} |       {:>6}      | {:>6} | {:>6} |  {:>10} |{:>10}|",
        day.estimate.day.format("%Y-%m-%d"),
        or_na(day.estimate.consumption_kwh, |kwh| format!("{kwh:.2}")),
        or_na(day.fuel_kg, |kg| format!("{kg:.1}kg")),
        or_na(day.cost_eur, |eur| format!("€{eur:.2}")),
        or_na(day.estimate.average_kw, |kw| format!("{kw:.4} kWh")),
        change_cell(day.change),
    )
}

fn change_cell(change: PercentChange) -> String {
    match change {
        PercentChange::Change(percent) if percent > 0.0 => format!(" ↑  {percent:.1}% "),
        PercentChange::Change(percent) if percent < 0.0 => format!(" ↓ {percent:.1}% "),
        PercentChange::Undefined => " n/a ".to_string(),
        PercentChange::Change(_) | PercentChange::Baseline => String::new(),
    }
}
