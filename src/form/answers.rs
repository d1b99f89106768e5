use super::questions::{self, FILE_MARKER_ID, FULL_NAME_ID, QUESTIONS, Question};

/// Marker value the client puts under the file question while photos are staged.
pub const FILES_ATTACHED_MARKER: &str = "Archivos adjuntos";

/// One answer per catalog question, in catalog order.
///
/// Unknown ids are dropped on the way in. The file question never holds file
/// bytes, only the derived attachment count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSet {
    values: Vec<String>,
    attached_files: usize,
}

impl Default for AnswerSet {
    fn default() -> Self {
        Self::new()
    }
}

impl AnswerSet {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: vec![String::new(); QUESTIONS.len()],
            attached_files: 0,
        }
    }

    /// Build from raw `(id, value)` pairs. Later duplicates win.
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut answers = Self::new();
        for (id, value) in fields {
            answers.set(id.as_ref(), value);
        }
        answers
    }

    /// Store `value` under `id`. Returns `false` (and stores nothing) for ids
    /// outside the catalog.
    pub fn set(&mut self, id: &str, value: impl Into<String>) -> bool {
        match questions::position(id) {
            Some(index) => {
                self.values[index] = value.into();
                true
            }
            None => false,
        }
    }

    /// The answer for `id`, empty when unanswered or unknown.
    #[must_use]
    pub fn get(&self, id: &str) -> &str {
        questions::position(id).map_or("", |index| self.values[index].as_str())
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        self.get(FULL_NAME_ID)
    }

    #[must_use]
    pub fn attached_files(&self) -> usize {
        self.attached_files
    }

    /// Record how many photos accompany the answers and keep the file
    /// question's marker value in step with it.
    pub fn set_attached_files(&mut self, count: usize) {
        self.attached_files = count;
        let marker = if count > 0 { FILES_ATTACHED_MARKER } else { "" };
        self.set(FILE_MARKER_ID, marker);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static Question, &str)> {
        QUESTIONS
            .iter()
            .zip(self.values.iter().map(String::as_str))
    }

    /// Total characters across all answers.
    #[must_use]
    pub fn text_len(&self) -> usize {
        self.values.iter().map(|v| v.chars().count()).sum()
    }
}
