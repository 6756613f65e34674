//! The upload gate: allow-list filtering, size ceiling, unique naming, and
//! translation of upload failures into client responses.

pub mod error;
pub mod filter;
pub mod gate;
pub mod naming;

pub use error::{translate_upload_error, UploadError, UploadRejection};
pub use filter::{check_file_type, ALLOWED_TYPES};
pub use gate::{StoredFile, Upload, UploadGate};
pub use naming::{extension_of, unique_filename};
