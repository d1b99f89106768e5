//! The fixed pre-adoption questionnaire shared by the submitting client and
//! the server that lays it out.

pub mod answers;
pub mod questions;
pub mod validation;

pub use answers::AnswerSet;
pub use questions::{FILE_MARKER_ID, FULL_NAME_ID, QUESTIONS, Question, QuestionKind, Section};
pub use validation::{FieldError, ValidationReport, validate};
