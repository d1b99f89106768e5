//! Questionnaire rendering: text metrics, paginated layout, PDF encoding.

pub mod layout;
pub mod metrics;
pub mod pdf;

pub use layout::{
    GeneratedDocument, LayoutCursor, LayoutGeometry, NO_ANSWER, Page, TextBlock, answer_text,
    render,
};
pub use metrics::FontWeight;
pub use pdf::encode;

use crate::error::LayoutError;
use crate::form::AnswerSet;

/// Lay out `answers` on A4 pages and serialize them to PDF bytes.
pub fn render_pdf(answers: &AnswerSet) -> Result<Vec<u8>, LayoutError> {
    encode(&render(answers, &LayoutGeometry::A4))
}
