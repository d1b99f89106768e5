//! SMTP delivery through lettre's async transport.

use super::dispatcher::MailTransport;
use super::message::OutgoingMessage;
use crate::config::SmtpSettings;
use crate::error::MailError;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MimeAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::PoolConfig;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::future::Future;
use std::pin::Pin;

/// Port on which the server expects TLS from the first byte.
const IMPLICIT_TLS_PORT: u16 = 465;

pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Build a pooled transport holding at most one connection.
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let tls_parameters = TlsParameters::builder(settings.host.clone())
            .dangerous_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(|e| MailError::Unavailable(e.to_string()))?;
        let tls = if settings.port == IMPLICIT_TLS_PORT {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Required(tls_parameters)
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
            .port(settings.port)
            .tls(tls)
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.pass.clone(),
            ))
            .pool_config(PoolConfig::new().max_size(1))
            .build();

        Ok(Self { transport })
    }
}

/// Convert to a lettre MIME message: HTML body first, then each attachment
/// as its own part.
pub fn to_mime(message: &OutgoingMessage) -> Result<Message, MailError> {
    let from: Mailbox = message
        .from
        .parse()
        .map_err(|e| MailError::Compose(format!("invalid sender {}: {e}", message.from)))?;
    let to: Mailbox = message
        .to
        .parse()
        .map_err(|e| MailError::Compose(format!("invalid recipient {}: {e}", message.to)))?;

    let mut body = MultiPart::mixed().singlepart(SinglePart::html(message.html_body.clone()));
    for attachment in &message.attachments {
        let content_type = ContentType::parse(&attachment.content_type)
            .or_else(|_| ContentType::parse("application/octet-stream"))
            .map_err(|e| MailError::Compose(e.to_string()))?;
        body = body.singlepart(
            MimeAttachment::new(attachment.filename.clone())
                .body(attachment.content.clone(), content_type),
        );
    }

    Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone())
        .multipart(body)
        .map_err(|e| MailError::Compose(e.to_string()))
}

impl MailTransport for SmtpTransport {
    fn name(&self) -> &str {
        "smtp"
    }

    fn verify<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<(), MailError>> + Send + 'a>> {
        Box::pin(async move {
            match self.transport.test_connection().await {
                Ok(true) => Ok(()),
                Ok(false) => Err(MailError::Unavailable(
                    "server did not accept the connection".into(),
                )),
                Err(e) => Err(MailError::Unavailable(e.to_string())),
            }
        })
    }

    fn send<'a>(
        &'a self,
        message: &'a OutgoingMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), MailError>> + Send + 'a>> {
        Box::pin(async move {
            let mime = to_mime(message)?;
            self.transport
                .send(mime)
                .await
                .map(|_| ())
                .map_err(|e| MailError::Send(e.to_string()))
        })
    }
}
