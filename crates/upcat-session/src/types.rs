//! Shared types for the upcat upload session.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Maximum number of images a session can hold.
pub const MAX_ENTRIES: usize = 20;

/// Fallback download name when the source file had none.
pub const FALLBACK_FILE_NAME: &str = "upcat-image.jpg";

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create a new dimensions value.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether both axes fit inside `limit` (inclusive).
    #[must_use]
    pub const fn fits_within(self, limit: Self) -> bool {
        self.width <= limit.width && self.height <= limit.height
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Media types accepted by the session.
///
/// JPEG can be declared either as `image/jpeg` or `image/jpg`; both
/// map to [`MediaType::Jpeg`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    /// `image/jpeg` or `image/jpg`.
    Jpeg,
    /// `image/png`.
    Png,
}

impl MediaType {
    /// Every declared type string the session accepts.
    pub const ACCEPTED: [&'static str; 3] = ["image/jpeg", "image/jpg", "image/png"];

    /// Parse a declared type string. Matching is exact: no trimming,
    /// no case folding, no parameters.
    #[must_use]
    pub fn parse(declared: &str) -> Option<Self> {
        match declared {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Canonical MIME string.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Declared type a browser would report for a file name, derived from
    /// its extension.
    ///
    /// Unknown or missing extensions yield `application/octet-stream`,
    /// which the validator rejects.
    #[must_use]
    pub fn declared_for_name(name: &str) -> &'static str {
        let Some((_, ext)) = name.rsplit_once('.') else {
            return "application/octet-stream";
        };
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            "svg" => "image/svg+xml",
            _ => "application/octet-stream",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// A raw, not-yet-validated file submitted by the user.
///
/// The bytes are reference-counted so candidates can be handed to an
/// asynchronous probe and then stored as an entry source without copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Original file name (may be empty).
    pub name: String,
    /// Media type as declared by the file picker.
    pub declared_type: String,
    /// Raw file content.
    pub bytes: Arc<[u8]>,
}

impl Candidate {
    /// Create a candidate with an explicit declared type.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Create a candidate whose declared type is derived from the file
    /// name, the way browsers fill in `File.type`.
    #[must_use]
    pub fn from_file_name(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let declared_type = MediaType::declared_for_name(&name);
        Self::new(name, declared_type, bytes)
    }

    /// Create a candidate with the type the file picker reported,
    /// falling back to the file name when the picker reported none.
    #[must_use]
    pub fn from_reported_type(
        name: impl Into<String>,
        reported: Option<&str>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        match reported.filter(|t| !t.is_empty()) {
            Some(declared_type) => Self::new(name, declared_type, bytes),
            None => Self::from_file_name(name, bytes),
        }
    }
}

/// Opaque, session-unique entry identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "img-{}", self.0)
    }
}

/// Per-entry processing state.
///
/// Moves `Processing → Ready`; replacing the source resets it to
/// `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntryStatus {
    /// Simulated enhancement still running.
    #[default]
    Processing,
    /// Enhancement finished.
    Ready,
}

impl EntryStatus {
    /// Whether processing has finished.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// A resolvable rendering reference for an entry (e.g. an object URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayRef(String);

impl DisplayRef {
    /// Wrap a reference string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The reference as a string slice (usable as `<img src>`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The validated content behind an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    /// Original file name (may be empty).
    pub name: String,
    /// Declared type string as submitted.
    pub declared_type: String,
    /// Parsed media type.
    pub media_type: MediaType,
    /// Pixel dimensions read from the image header.
    pub dimensions: Dimensions,
    /// Raw file content.
    #[serde(skip)]
    pub bytes: Arc<[u8]>,
}

impl Source {
    /// Build a source from an accepted candidate.
    #[must_use]
    pub fn from_candidate(candidate: Candidate, media_type: MediaType, dimensions: Dimensions) -> Self {
        Self {
            name: candidate.name,
            declared_type: candidate.declared_type,
            media_type,
            dimensions,
            bytes: candidate.bytes,
        }
    }

    /// File name to offer when downloading, falling back to
    /// [`FALLBACK_FILE_NAME`].
    #[must_use]
    pub fn download_name(&self) -> &str {
        if self.name.is_empty() {
            FALLBACK_FILE_NAME
        } else {
            &self.name
        }
    }
}

/// One uploaded image tracked by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageEntry {
    /// Stable identifier.
    pub id: EntryId,
    /// Current content.
    pub source: Source,
    /// Rendering reference for `source`.
    pub display_ref: DisplayRef,
    /// Processing state.
    pub status: EntryStatus,
    /// Bumped on every source replacement. Deferred completions carry
    /// the revision they were scheduled for and are ignored when stale.
    pub revision: u32,
}

/// Errors returned by session mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No entry with this id exists.
    #[error("no image with id {0}")]
    UnknownEntry(EntryId),

    /// Appending would exceed the capacity.
    #[error("the session is limited to {limit} images")]
    CapacityReached {
        /// The capacity that would be exceeded.
        limit: usize,
    },

    /// An entry with this id already exists.
    #[error("image id {0} is already in use")]
    DuplicateId(EntryId),

    /// No batch with this id is waiting for validation.
    #[error("no pending batch {0}")]
    UnknownBatch(u64),

    /// The batch has no candidate at this index.
    #[error("batch {batch} has no candidate {index}")]
    UnknownCandidate {
        /// Batch the verdict was addressed to.
        batch: u64,
        /// Candidate index within the batch.
        index: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_exactly_three_declared_types() {
        assert_eq!(MediaType::parse("image/jpeg"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::parse("image/jpg"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::parse("image/png"), Some(MediaType::Png));
        for declared in ["image/gif", "image/webp", "IMAGE/PNG", " image/png", "image/png; q=1", ""] {
            assert_eq!(MediaType::parse(declared), None, "{declared:?} must be rejected");
        }
    }

    #[test]
    fn declared_type_follows_extension() {
        assert_eq!(MediaType::declared_for_name("cat.JPG"), "image/jpeg");
        assert_eq!(MediaType::declared_for_name("cat.jpeg"), "image/jpeg");
        assert_eq!(MediaType::declared_for_name("cat.png"), "image/png");
        assert_eq!(MediaType::declared_for_name("cat.gif"), "image/gif");
        assert_eq!(MediaType::declared_for_name("README"), "application/octet-stream");
    }

    #[test]
    fn reported_type_wins_over_extension() {
        let renamed = Candidate::from_reported_type("cat.png", Some("image/webp"), Vec::new());
        assert_eq!(renamed.declared_type, "image/webp");

        let unreported = Candidate::from_reported_type("cat.png", None, Vec::new());
        assert_eq!(unreported.declared_type, "image/png");

        let blank = Candidate::from_reported_type("cat.jpg", Some(""), Vec::new());
        assert_eq!(blank.declared_type, "image/jpeg");
    }

    #[test]
    fn dimension_ceiling_is_inclusive() {
        let limit = Dimensions::new(1920, 1080);
        assert!(Dimensions::new(1920, 1080).fits_within(limit));
        assert!(!Dimensions::new(1921, 1080).fits_within(limit));
        assert!(!Dimensions::new(1920, 1081).fits_within(limit));
    }

    #[test]
    fn entry_id_renders_with_prefix() {
        assert_eq!(EntryId::from_raw(7).to_string(), "img-7");
    }

    #[test]
    fn download_name_falls_back_when_empty() {
        let candidate = Candidate::new("", "image/png", Vec::new());
        let source = Source::from_candidate(candidate, MediaType::Png, Dimensions::new(1, 1));
        assert_eq!(source.download_name(), FALLBACK_FILE_NAME);
    }
}
