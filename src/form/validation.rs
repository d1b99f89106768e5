use super::answers::AnswerSet;
use super::questions::QuestionKind;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Literal pattern, cannot fail to compile.
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\S+@\S+\.\S+").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Field-level problems in catalog order; the first entry is the field the
/// form should focus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn first_invalid_field(&self) -> Option<&'static str> {
        self.errors.first().map(|e| e.field)
    }

    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }
}

fn required_message(id: &str) -> &'static str {
    match id {
        "fullName" => "El nombre es requerido.",
        "dni" => "El DNI es requerido.",
        "address" => "El domicilio es requerido.",
        "city" => "La ciudad es requerida.",
        "phone" => "El teléfono es requerido.",
        "email" => "El email es requerido.",
        _ => "Respuesta requerida.",
    }
}

pub fn validate(answers: &AnswerSet) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (question, value) in answers.iter() {
        let value = value.trim();

        if value.is_empty() {
            if question.required {
                report.push(question.id, required_message(question.id));
            }
            continue;
        }

        if question.id == "email" && !EMAIL_RE.is_match(value) {
            report.push(question.id, "El formato del email es inválido.");
            continue;
        }

        if let QuestionKind::SingleChoice(options) = question.kind
            && !options.contains(&value)
        {
            report.push(question.id, "Opción no válida.");
        }
    }

    report
}
