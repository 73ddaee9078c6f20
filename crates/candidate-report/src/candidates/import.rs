use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{CandidateRecord, CandidateSubmission};
use super::intake::{IntakeGuard, IntakeRejection};

const SKILL_DELIMITER: char = ';';

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read candidate import: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid candidate CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {rejection}")]
    Rejected { row: usize, rejection: IntakeRejection },
}

/// Read candidate rows from a CSV file and run each through the intake guard.
pub fn records_from_path(path: impl AsRef<Path>) -> Result<Vec<CandidateRecord>, ImportError> {
    let file = File::open(path)?;
    records_from_reader(file)
}

/// Parse and admit every row; the first rejected row aborts the import. Row numbers are
/// 1-based and do not count the header line.
pub fn records_from_reader<R: Read>(reader: R) -> Result<Vec<CandidateRecord>, ImportError> {
    let guard = IntakeGuard;
    parse_submissions(reader)?
        .into_iter()
        .enumerate()
        .map(|(index, submission)| {
            guard
                .admit(submission)
                .map_err(|rejection| ImportError::Rejected {
                    row: index + 1,
                    rejection,
                })
        })
        .collect()
}

pub fn parse_submissions<R: Read>(reader: R) -> Result<Vec<CandidateSubmission>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut submissions = Vec::new();

    for row in csv_reader.deserialize::<CandidateRow>() {
        submissions.push(row?.into_submission());
    }

    Ok(submissions)
}

#[derive(Debug, Deserialize)]
struct CandidateRow {
    #[serde(alias = "nombre", default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(alias = "correo", default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
    #[serde(alias = "institucion", default, deserialize_with = "empty_string_as_none")]
    institution: Option<String>,
    #[serde(alias = "carrera", default, deserialize_with = "empty_string_as_none")]
    program: Option<String>,
    #[serde(alias = "promedio", default, deserialize_with = "empty_string_as_none")]
    average: Option<String>,
    #[serde(alias = "habilidades", default, deserialize_with = "empty_string_as_none")]
    skills: Option<String>,
}

impl CandidateRow {
    fn into_submission(self) -> CandidateSubmission {
        CandidateSubmission {
            name: self.name,
            email: self.email,
            institution: self.institution,
            program: self.program,
            average: self.average.map(serde_json::Value::String),
            skills: self.skills.map(|raw| {
                raw.split(SKILL_DELIMITER)
                    .map(|skill| skill.trim().to_string())
                    .collect()
            }),
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|raw| !raw.trim().is_empty()))
}
