//! The notification email sent to the shelter for every submission.

use super::assembler::Attachment;
use crate::error::MailError;
use crate::form::AnswerSet;
use chrono::{DateTime, Local, TimeZone};
use tera::{Context, Tera};

const BODY_TEMPLATE_NAME: &str = "submission.html";

const BODY_TEMPLATE: &str = r"<h2>Nuevo Formulario de Preadopción</h2>
<p><strong>Nombre:</strong> {{ full_name }}</p>
<p><strong>Email:</strong> {{ email }}</p>
<p><strong>Teléfono:</strong> {{ phone }}</p>
<p><strong>Ciudad:</strong> {{ city }}</p>
<p><strong>Fecha:</strong> {{ date | safe }}</p>
<br>
<p>Se adjunta el formulario completo en formato PDF.</p>
{%- if photo_count > 0 %}
<p>Se adjuntan {{ photo_count }} foto(s) del lugar donde vivirá el perro.</p>
{%- endif %}
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<Attachment>,
}

/// Tera templates for the notification body. Values are HTML-escaped.
pub struct MailTemplates {
    tera: Tera,
}

impl MailTemplates {
    pub fn new() -> Result<Self, MailError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.add_raw_template(BODY_TEMPLATE_NAME, BODY_TEMPLATE)
            .map_err(|e| MailError::Compose(e.to_string()))?;
        Ok(Self { tera })
    }

    /// Render the body for `answers` dated `now`. `photo_count` is the
    /// number of photos received with the submission.
    pub fn render_body<Tz: TimeZone>(
        &self,
        answers: &AnswerSet,
        photo_count: usize,
        now: &DateTime<Tz>,
    ) -> Result<String, MailError>
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut context = Context::new();
        context.insert("full_name", answers.full_name());
        context.insert("email", answers.get("email"));
        context.insert("phone", answers.get("phone"));
        context.insert("city", answers.get("city"));
        context.insert("date", &short_date(now));
        context.insert("photo_count", &photo_count);

        self.tera
            .render(BODY_TEMPLATE_NAME, &context)
            .map_err(|e| MailError::Compose(e.to_string()))
    }
}

/// Day/month/year without zero padding, as Spanish locales print dates.
#[must_use]
pub fn short_date<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%-d/%-m/%Y").to_string()
}

#[must_use]
pub fn subject_for(full_name: &str) -> String {
    format!("Nuevo Formulario de Preadopción - {full_name}")
}

/// Build the message for one submission. `photo_count` counts the photos
/// received, including any that were later skipped.
pub fn compose(
    templates: &MailTemplates,
    sender: &str,
    recipient: &str,
    answers: &AnswerSet,
    photo_count: usize,
    attachments: Vec<Attachment>,
) -> Result<OutgoingMessage, MailError> {
    let html_body = templates.render_body(answers, photo_count, &Local::now())?;
    Ok(OutgoingMessage {
        from: sender.to_string(),
        to: recipient.to_string(),
        subject: subject_for(answers.full_name()),
        html_body,
        attachments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn answers() -> AnswerSet {
        AnswerSet::from_fields([
            ("fullName", "Juana Pérez"),
            ("email", "juana@example.com"),
            ("phone", "351 555 0101"),
            ("city", "Córdoba"),
        ])
    }

    fn fixed_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
    }

    #[test]
    fn subject_names_the_applicant() {
        assert_eq!(
            subject_for("Juana Pérez"),
            "Nuevo Formulario de Preadopción - Juana Pérez"
        );
    }

    #[test]
    fn date_is_day_month_year() {
        assert_eq!(short_date(&fixed_date()), "5/3/2024");
    }

    #[test]
    fn body_summarizes_key_fields() {
        let templates = MailTemplates::new().unwrap();
        let body = templates.render_body(&answers(), 2, &fixed_date()).unwrap();

        assert!(body.contains("<p><strong>Nombre:</strong> Juana Pérez</p>"));
        assert!(body.contains("<p><strong>Ciudad:</strong> Córdoba</p>"));
        assert!(body.contains("<p><strong>Fecha:</strong> 5/3/2024</p>"));
        assert!(body.contains("Se adjuntan 2 foto(s) del lugar donde vivirá el perro."));
    }

    #[test]
    fn photo_line_is_omitted_without_photos() {
        let templates = MailTemplates::new().unwrap();
        let body = templates.render_body(&answers(), 0, &fixed_date()).unwrap();
        assert!(body.contains("Se adjunta el formulario completo en formato PDF."));
        assert!(!body.contains("foto(s)"));
    }

    #[test]
    fn answers_are_html_escaped() {
        let templates = MailTemplates::new().unwrap();
        let answers = AnswerSet::from_fields([("fullName", "<script>alert(1)</script>")]);
        let body = templates.render_body(&answers, 0, &fixed_date()).unwrap();
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;"));
    }

    #[test]
    fn compose_fills_envelope() {
        let templates = MailTemplates::new().unwrap();
        let message = compose(
            &templates,
            "refugio@gmail.com",
            "adopciones@refugio.com",
            &answers(),
            0,
            Vec::new(),
        )
        .unwrap();
        assert_eq!(message.from, "refugio@gmail.com");
        assert_eq!(message.to, "adopciones@refugio.com");
        assert_eq!(message.subject, "Nuevo Formulario de Preadopción - Juana Pérez");
    }
}
