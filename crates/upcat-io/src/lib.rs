//! upcat-io: Browser I/O and Dioxus component library.
//!
//! Mints object URLs for uploaded images, triggers Blob downloads,
//! reads picked files into candidates, measures real time for the
//! session timers, and provides the reusable UI components of the
//! upcat web application.

pub mod clock;
pub mod components;
pub mod display;
pub mod download;
pub mod notice;
pub mod scroll;

pub use clock::WebClock;
pub use components::{FileUpload, SizeErrorModal, Thumbnails};
pub use display::BlobUrls;
