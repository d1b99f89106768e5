pub mod compression;
pub mod detection;
pub mod types;

pub use compression::ImageCompressor;
pub use types::{FileBody, FileReadError, MediaType, UploadedFile};
