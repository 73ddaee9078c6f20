use serde::Serialize;
use serde_json::Value;

use super::domain::{CandidateRecord, CandidateSubmission};

const MIN_AVERAGE: f64 = 0.0;
const MAX_AVERAGE: f64 = 10.0;

/// A single field-level problem found while admitting a submission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("email '{value}' is not a valid address")]
    InvalidEmail { value: String },
    #[error("average must be a number")]
    NonNumericAverage,
    #[error("average {value} is outside the range 0 to 10")]
    AverageOutOfRange { value: f64 },
}

impl IntakeViolation {
    pub fn field(&self) -> &'static str {
        match self {
            IntakeViolation::Missing { field } | IntakeViolation::Empty { field } => *field,
            IntakeViolation::InvalidEmail { .. } => "email",
            IntakeViolation::NonNumericAverage | IntakeViolation::AverageOutOfRange { .. } => {
                "average"
            }
        }
    }

    pub fn view(&self) -> IntakeViolationView {
        IntakeViolationView {
            field: self.field(),
            message: self.to_string(),
        }
    }
}

/// Serializable form of a violation for HTTP responses.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeViolationView {
    pub field: &'static str,
    pub message: String,
}

/// All violations collected for one rejected submission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("candidate rejected: {}", summarize(.violations))]
pub struct IntakeRejection {
    pub violations: Vec<IntakeViolation>,
}

impl IntakeRejection {
    pub fn views(&self) -> Vec<IntakeViolationView> {
        self.violations.iter().map(IntakeViolation::view).collect()
    }
}

fn summarize(violations: &[IntakeViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validates raw submissions before they reach the record store.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    /// Convert a submission into a storable record, or report every violation found.
    pub fn admit(
        &self,
        submission: CandidateSubmission,
    ) -> Result<CandidateRecord, IntakeRejection> {
        let mut violations = Vec::new();

        let name = required_text("name", submission.name, &mut violations);
        let email = required_text("email", submission.email, &mut violations);
        if let Some(value) = &email {
            if !is_valid_email(value) {
                violations.push(IntakeViolation::InvalidEmail {
                    value: value.clone(),
                });
            }
        }
        let institution = required_text("institution", submission.institution, &mut violations);
        let program = required_text("program", submission.program, &mut violations);
        let average = match submission.average {
            None | Some(Value::Null) => {
                violations.push(IntakeViolation::Missing { field: "average" });
                None
            }
            Some(raw) => match parse_average(&raw) {
                Some(value) if (MIN_AVERAGE..=MAX_AVERAGE).contains(&value) => Some(value),
                Some(value) => {
                    violations.push(IntakeViolation::AverageOutOfRange { value });
                    None
                }
                None => {
                    violations.push(IntakeViolation::NonNumericAverage);
                    None
                }
            },
        };

        let skills = submission.skills.and_then(|skills| {
            let cleaned: Vec<String> = skills
                .into_iter()
                .map(|skill| skill.trim().to_string())
                .filter(|skill| !skill.is_empty())
                .collect();
            (!cleaned.is_empty()).then_some(cleaned)
        });

        match (name, email, institution, program, average) {
            (Some(name), Some(email), Some(institution), Some(program), Some(average))
                if violations.is_empty() =>
            {
                Ok(CandidateRecord {
                    name,
                    email,
                    institution,
                    program,
                    average,
                    skills,
                })
            }
            _ => Err(IntakeRejection { violations }),
        }
    }
}

fn required_text(
    field: &'static str,
    value: Option<String>,
    violations: &mut Vec<IntakeViolation>,
) -> Option<String> {
    match value {
        None => {
            violations.push(IntakeViolation::Missing { field });
            None
        }
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                violations.push(IntakeViolation::Empty { field });
                None
            } else {
                Some(trimmed.to_string())
            }
        }
    }
}

fn parse_average(raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

pub(crate) fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    }) && labels
        .last()
        .map(|tld| tld.chars().count() >= 2)
        .unwrap_or(false)
}
