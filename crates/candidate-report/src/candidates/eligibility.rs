use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::CandidateRecord;

pub const DEFAULT_MINIMUM_AVERAGE: f64 = 7.5;
pub const DEFAULT_ALLOWED_INSTITUTIONS: [&str; 2] = ["Universidad A", "Universidad B"];

/// Shortlisting rule: an allow-listed institution and an average strictly above the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    pub allowed_institutions: BTreeSet<String>,
    pub minimum_average: f64,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_INSTITUTIONS, DEFAULT_MINIMUM_AVERAGE)
    }
}

impl EligibilityPolicy {
    pub fn new<I, S>(allowed_institutions: I, minimum_average: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_institutions: allowed_institutions.into_iter().map(Into::into).collect(),
            minimum_average,
        }
    }

    pub fn is_eligible(&self, record: &CandidateRecord) -> bool {
        meets_policy(record, &self.allowed_institutions, self.minimum_average)
    }

    pub fn select(&self, records: &[CandidateRecord]) -> Vec<CandidateRecord> {
        select_eligible(records, &self.allowed_institutions, self.minimum_average)
    }
}

/// Keep the records that satisfy the policy, preserving input order.
///
/// Institution matching is exact and case-sensitive.
pub fn select_eligible(
    records: &[CandidateRecord],
    allowed_institutions: &BTreeSet<String>,
    minimum_average: f64,
) -> Vec<CandidateRecord> {
    records
        .iter()
        .filter(|record| meets_policy(record, allowed_institutions, minimum_average))
        .cloned()
        .collect()
}

fn meets_policy(
    record: &CandidateRecord,
    allowed_institutions: &BTreeSet<String>,
    minimum_average: f64,
) -> bool {
    record.average > minimum_average && allowed_institutions.contains(&record.institution)
}
