mod document;
pub(crate) mod pdf;

pub use document::{render, CandidateBlock, RenderError, ReportDocument, SEPARATOR};
pub use pdf::PageLayout;

use super::domain::CandidateRecord;

/// Encoded report ready to be published.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub candidate_count: usize,
    pub page_count: usize,
    pub flagged: Vec<RenderError>,
}

/// Renders candidate blocks into a paginated PDF.
#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    layout: PageLayout,
}

impl ReportRenderer {
    pub fn new(layout: PageLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn render(&self, records: &[CandidateRecord]) -> Result<RenderedReport, RenderError> {
        self.encode(render(records))
    }

    pub fn encode(&self, document: ReportDocument) -> Result<RenderedReport, RenderError> {
        let pages = pdf::paginate(document.lines(), &self.layout);
        let bytes = pdf::encode_pdf(&pages, &self.layout)?;

        Ok(RenderedReport {
            bytes,
            candidate_count: document.blocks.len(),
            page_count: pages.len(),
            flagged: document.flagged,
        })
    }
}
