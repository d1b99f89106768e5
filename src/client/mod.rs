//! Submitting side: photo staging, the scoped picker and the multipart
//! transport, tied together per form in [`FormSession`].

pub mod acquirer;
pub mod picker;
pub mod session;
pub mod transport;

pub use acquirer::{AcquisitionSource, AttachmentAcquirer, BatchReport};
pub use picker::{PathPicker, PickerOutcome, PickerSession, PickerSurface, pick_once};
pub use session::FormSession;
pub use transport::{SubmissionState, SubmissionTransport, SubmitOutcome};
