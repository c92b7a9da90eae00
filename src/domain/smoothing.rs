// Short-window trend - centered moving average over the most recent readings
use super::sample::Reading;
use chrono::{DateTime, Utc};

/// Centered moving average.
///
/// Each output point averages the input at the same position with up to
/// `radius` neighbors on each side; edges use only the neighbors that exist.
/// Results are rounded to 3 decimals and the output has the input's length.
pub fn smooth(values: &[f64], radius: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let from = i.saturating_sub(radius);
            let to = (i + radius + 1).min(values.len());
            let window = &values[from..to];
            round_to(window.iter().sum::<f64>() / window.len() as f64, 3)
        })
        .collect()
}

pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn of(delta: Option<f64>) -> Self {
        match delta {
            Some(d) if d > 0.0 => Direction::Up,
            Some(d) if d < 0.0 => Direction::Down,
            _ => Direction::Flat,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trend {
    pub smoothed: Vec<f64>,
    pub last_value: f64,
    /// Change against the previous reading, absent with a single reading
    pub delta: Option<f64>,
    pub first_at: DateTime<Utc>,
    pub last_at: DateTime<Utc>,
    /// Mean of the smoothed series
    pub average: f64,
}

impl Trend {
    /// Readings strictly after `since`, in log order. `None` when the window is empty.
    pub fn since(readings: &[Reading], since: DateTime<Utc>, radius: usize) -> Option<Self> {
        let window: Vec<&Reading> = readings.iter().filter(|r| r.time > since).collect();
        let (first, last) = (window.first()?, window.last()?);

        let values: Vec<f64> = window.iter().map(|r| r.power).collect();
        let smoothed = smooth(&values, radius);
        let average = smoothed.iter().sum::<f64>() / values.len() as f64;
        let delta = match values.as_slice() {
            [.., previous, current] => Some(current - previous),
            _ => None,
        };

        Some(Self {
            smoothed,
            last_value: last.power,
            delta,
            first_at: first.time,
            last_at: last.time,
            average,
        })
    }

    pub fn direction(&self) -> Direction {
        Direction::of(self.delta)
    }

    pub fn is_idle(&self) -> bool {
        self.average == 0.0
    }
}
