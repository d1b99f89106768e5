//! Outbound delivery of a finished submission.

pub mod assembler;
pub mod dispatcher;
pub mod message;
pub mod smtp;

pub use assembler::{AssembledAttachments, Attachment, TransferEncoding, assemble};
pub use dispatcher::{MailDispatcher, MailTransport};
pub use message::{MailTemplates, OutgoingMessage, compose};
pub use smtp::SmtpTransport;
