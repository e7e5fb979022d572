//! Candidate validation: declared media type plus a header-only
//! dimension probe.
//!
//! The probe never decodes pixel data. It guesses the container format
//! from the leading bytes and reads just enough of the header to learn
//! the width and height, then drops the reader.

use std::io::Cursor;

use serde::Serialize;

use crate::types::{Candidate, Dimensions, MediaType};

/// Largest accepted image, inclusive on both axes.
pub const MAX_DIMENSIONS: Dimensions = Dimensions::new(1920, 1080);

/// A candidate that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Accepted {
    /// Parsed declared type.
    pub media_type: MediaType,
    /// Dimensions read from the header.
    pub dimensions: Dimensions,
}

/// Why a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum Rejection {
    /// The declared media type is not JPEG or PNG.
    #[error("unsupported file type {declared:?}; only .jpg, .jpeg and .png are allowed")]
    UnsupportedType {
        /// The declared type as submitted.
        declared: String,
    },

    /// The content could not be read as an image.
    #[error("could not read image header: {reason}")]
    Undecodable {
        /// Decoder message.
        reason: String,
    },

    /// The image exceeds [`MAX_DIMENSIONS`].
    #[error("image is {0}, larger than the 1920x1080 limit")]
    Oversized(Dimensions),
}

/// Coarse rejection categories surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RejectionKind {
    /// Wrong or unreadable file type.
    UnsupportedType,
    /// Too many pixels on at least one axis.
    OversizedImage,
}

impl Rejection {
    /// The user-facing category. Unreadable content counts as an
    /// unsupported type.
    #[must_use]
    pub const fn kind(&self) -> RejectionKind {
        match self {
            Self::UnsupportedType { .. } | Self::Undecodable { .. } => RejectionKind::UnsupportedType,
            Self::Oversized(_) => RejectionKind::OversizedImage,
        }
    }
}

/// Outcome of validating one candidate.
pub type Verdict = Result<Accepted, Rejection>;

/// Validate a candidate's declared type and dimensions.
///
/// The type check runs first; a candidate with an unsupported declared
/// type is rejected without looking at its bytes.
///
/// # Errors
///
/// Returns [`Rejection::UnsupportedType`] for declared types outside
/// `image/jpeg`, `image/jpg`, `image/png`, [`Rejection::Undecodable`]
/// when the header cannot be read, and [`Rejection::Oversized`] when
/// either axis exceeds [`MAX_DIMENSIONS`].
pub fn validate(candidate: &Candidate) -> Verdict {
    let Some(media_type) = MediaType::parse(&candidate.declared_type) else {
        return Err(Rejection::UnsupportedType {
            declared: candidate.declared_type.clone(),
        });
    };
    let dimensions = probe_dimensions(&candidate.bytes)?;
    if !dimensions.fits_within(MAX_DIMENSIONS) {
        return Err(Rejection::Oversized(dimensions));
    }
    Ok(Accepted {
        media_type,
        dimensions,
    })
}

/// Read the pixel dimensions from an image header.
///
/// # Errors
///
/// Returns [`Rejection::Undecodable`] if `bytes` is empty, the format
/// cannot be recognized, or the header is truncated or corrupt.
pub fn probe_dimensions(bytes: &[u8]) -> Result<Dimensions, Rejection> {
    if bytes.is_empty() {
        return Err(Rejection::Undecodable {
            reason: "file is empty".into(),
        });
    }
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Rejection::Undecodable {
            reason: e.to_string(),
        })?;
    let (width, height) = reader.into_dimensions().map_err(|e| Rejection::Undecodable {
        reason: e.to_string(),
    })?;
    Ok(Dimensions { width, height })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
        buf
    }

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 100, 50]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn accepts_png_within_limits() {
        let candidate = Candidate::new("a.png", "image/png", png(64, 32));
        let accepted = validate(&candidate).unwrap();
        assert_eq!(accepted.media_type, MediaType::Png);
        assert_eq!(accepted.dimensions, Dimensions::new(64, 32));
    }

    #[test]
    fn accepts_both_jpeg_spellings() {
        for declared in ["image/jpeg", "image/jpg"] {
            let candidate = Candidate::new("a.jpg", declared, jpeg(40, 30));
            let accepted = validate(&candidate).unwrap();
            assert_eq!(accepted.media_type, MediaType::Jpeg);
            assert_eq!(accepted.dimensions, Dimensions::new(40, 30));
        }
    }

    #[test]
    fn exact_limit_is_accepted() {
        let candidate = Candidate::new("full-hd.png", "image/png", png(1920, 1080));
        assert!(validate(&candidate).is_ok());
    }

    #[test]
    fn one_pixel_over_on_either_axis_is_oversized() {
        for (w, h) in [(1921, 1080), (1920, 1081)] {
            let candidate = Candidate::new("big.png", "image/png", png(w, h));
            let err = validate(&candidate).unwrap_err();
            assert_eq!(err, Rejection::Oversized(Dimensions::new(w, h)));
            assert_eq!(err.kind(), RejectionKind::OversizedImage);
        }
    }

    #[test]
    fn unsupported_type_is_rejected_before_probing() {
        // Valid small PNG bytes, but a GIF declaration.
        let candidate = Candidate::new("a.gif", "image/gif", png(4, 4));
        let err = validate(&candidate).unwrap_err();
        assert!(matches!(err, Rejection::UnsupportedType { ref declared } if declared == "image/gif"));
        assert_eq!(err.kind(), RejectionKind::UnsupportedType);
    }

    #[test]
    fn unsupported_type_wins_over_oversize() {
        let candidate = Candidate::new("huge.webp", "image/webp", png(2000, 1200));
        assert_eq!(validate(&candidate).unwrap_err().kind(), RejectionKind::UnsupportedType);
    }

    #[test]
    fn corrupt_bytes_are_undecodable() {
        let candidate = Candidate::new("x.png", "image/png", vec![0xFF, 0xFE, 0x00, 0x01]);
        let err = validate(&candidate).unwrap_err();
        assert!(matches!(err, Rejection::Undecodable { .. }));
        assert_eq!(err.kind(), RejectionKind::UnsupportedType);
    }

    #[test]
    fn empty_file_is_undecodable() {
        assert!(matches!(
            probe_dimensions(&[]),
            Err(Rejection::Undecodable { .. })
        ));
    }

    #[test]
    fn probe_trusts_content_over_declaration() {
        // A JPEG declared as PNG still probes fine; only the declared
        // type string is checked against the allow-list.
        let candidate = Candidate::new("mislabelled.png", "image/png", jpeg(16, 8));
        assert_eq!(
            validate(&candidate).unwrap().dimensions,
            Dimensions::new(16, 8)
        );
    }
}
