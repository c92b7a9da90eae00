// Record validation - flags suspicious log rows without removing them
use super::sample::{in_power_range, PowerReading, Sample};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    OutOfRange,
    NotANumber,
    InvalidTimestamp,
    /// The sampler already wrote an error into the row
    RecordedError,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IssueKind::OutOfRange => "power value out of range",
            IssueKind::NotANumber => "power value is not a number",
            IssueKind::InvalidTimestamp => "invalid time value",
            IssueKind::RecordedError => "error recorded by sampler",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// 1-based row number in the log
    pub index: usize,
    pub kind: IssueKind,
    pub value: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {} ({:?})", self.index, self.kind, self.value)
    }
}

pub fn validate(samples: &[Sample]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (position, sample) in samples.iter().enumerate() {
        let index = position + 1;

        match &sample.power {
            PowerReading::Value(power) if !in_power_range(*power) => {
                issues.push(ValidationIssue {
                    index,
                    kind: IssueKind::OutOfRange,
                    value: power.to_string(),
                });
            }
            PowerReading::Unreadable(raw) => {
                issues.push(ValidationIssue {
                    index,
                    kind: IssueKind::NotANumber,
                    value: raw.clone(),
                });
            }
            PowerReading::Value(_) => {}
        }

        if sample.time.is_none() {
            issues.push(ValidationIssue {
                index,
                kind: IssueKind::InvalidTimestamp,
                value: sample.raw_time.clone(),
            });
        }

        if let Some(error) = &sample.error {
            issues.push(ValidationIssue {
                index,
                kind: IssueKind::RecordedError,
                value: error.clone(),
            });
        }
    }

    issues
}
