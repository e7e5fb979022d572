//! Dioxus UI components for upcat.
//!
//! Provides the multi-file picker, the thumbnail strip, and the
//! size-error modal.

mod size_error;
mod thumbnails;
mod upload;

pub use size_error::SizeErrorModal;
pub use thumbnails::Thumbnails;
pub use upload::FileUpload;
