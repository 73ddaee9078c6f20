use serde::Serialize;

use super::super::domain::CandidateRecord;

pub const SEPARATOR: &str = "---";

/// Problems raised while turning candidates into a report.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderError {
    #[error("candidate '{name}' at position {position} has a non-finite average")]
    NonFiniteAverage { name: String, position: usize },
    #[error("unable to encode report document: {message}")]
    Encoding { message: String },
}

/// Text lines describing one candidate, separator included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateBlock {
    pub candidate: String,
    pub lines: Vec<String>,
}

/// Report body before it is laid out on pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportDocument {
    pub blocks: Vec<CandidateBlock>,
    /// Records left out of the report because their data could not be rendered.
    pub flagged: Vec<RenderError>,
}

impl ReportDocument {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .flat_map(|block| block.lines.iter().map(String::as_str))
    }
}

/// Build one block per record, in input order. Records with a non-finite average are skipped
/// and listed in [`ReportDocument::flagged`] instead of failing the whole report.
pub fn render(records: &[CandidateRecord]) -> ReportDocument {
    let mut document = ReportDocument::default();

    for (position, record) in records.iter().enumerate() {
        match candidate_block(position, record) {
            Ok(block) => document.blocks.push(block),
            Err(flag) => document.flagged.push(flag),
        }
    }

    document
}

fn candidate_block(
    position: usize,
    record: &CandidateRecord,
) -> Result<CandidateBlock, RenderError> {
    if !record.average.is_finite() {
        return Err(RenderError::NonFiniteAverage {
            name: record.name.clone(),
            position,
        });
    }

    let mut lines = vec![
        format!("Name: {}", record.name),
        format!("Email: {}", record.email),
        format!("Institution: {}", record.institution),
        format!("Program: {}", record.program),
        format!("Average: {}", record.average),
    ];
    if let Some(skills) = &record.skills {
        lines.push(format!("Skills: {}", skills.join(", ")));
    }
    lines.push(SEPARATOR.to_string());

    Ok(CandidateBlock {
        candidate: record.name.clone(),
        lines,
    })
}
