//! User-facing text for session notices.

use upcat_session::Notice;

/// Title and description shown for a notice.
#[must_use]
pub fn notice_text(notice: Notice) -> (&'static str, String) {
    match notice {
        Notice::CapacityExceeded { dropped } => (
            "Limit exceeded",
            format!("Only the first images fit; {dropped} were not uploaded."),
        ),
        Notice::UnsupportedType { count } => (
            "Invalid files",
            format!("Only .jpg, .jpeg or .png files are allowed. {count} files ignored."),
        ),
        Notice::OversizedImage { count } => (
            "Image too large",
            format!("{count} images exceed 1920x1080 and were not uploaded."),
        ),
        Notice::LimitReached { limit } => (
            "Limit reached",
            format!("You can upload up to {limit} images."),
        ),
        Notice::ReplaceUnsupportedType => (
            "Invalid file",
            "Only .jpg, .jpeg or .png files are allowed.".to_owned(),
        ),
    }
}
