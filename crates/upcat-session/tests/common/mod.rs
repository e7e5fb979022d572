//! Fixture images shared by the integration tests.

#![allow(clippy::unwrap_used, dead_code)]

use upcat_session::Candidate;

/// Encode a solid-color PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 60, 90]));
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

/// Encode a solid-color JPEG.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([90, 60, 30]));
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

/// A small valid PNG candidate.
pub fn png(name: &str) -> Candidate {
    Candidate::new(name, "image/png", png_bytes(16, 12))
}

/// A small valid JPEG candidate.
pub fn jpeg(name: &str) -> Candidate {
    Candidate::new(name, "image/jpeg", jpeg_bytes(16, 12))
}

/// A PNG candidate larger than the dimension ceiling.
pub fn oversized_png(name: &str) -> Candidate {
    Candidate::new(name, "image/png", png_bytes(2000, 1200))
}

/// `n` distinct small PNG candidates named `prefix-<i>.png`.
pub fn pngs(prefix: &str, n: usize) -> Vec<Candidate> {
    // Share one encoding; names keep the candidates distinct.
    let bytes: std::sync::Arc<[u8]> = png_bytes(8, 8).into();
    (0..n)
        .map(|i| Candidate::new(format!("{prefix}-{i}.png"), "image/png", bytes.clone()))
        .collect()
}
