//! Object-URL display references.
//!
//! Each entry source is wrapped in a `Blob` and exposed through
//! `URL.createObjectURL`, so `<img src>` can render it without copying
//! the bytes into the DOM. URLs are revoked when the session releases
//! them (on replacement).
//!
//! Minting requires a browser environment (`wasm32-unknown-unknown`
//! target).

use upcat_session::{DisplayRef, DisplayRefs, EntryId, Source};
use wasm_bindgen::JsValue;
use web_sys::BlobPropertyBag;

/// Errors that can occur when creating an object URL.
#[derive(Debug, thiserror::Error)]
pub enum DisplayRefError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for DisplayRefError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Create an object URL for raw image bytes.
///
/// The returned URL must be revoked via [`revoke_object_url`] when no
/// longer needed to avoid memory leaks.
///
/// # Errors
///
/// Returns [`DisplayRefError::JsError`] if Blob or URL creation fails.
pub fn bytes_to_object_url(bytes: &[u8], mime_type: &str) -> Result<String, DisplayRefError> {
    let uint8_array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::new();
    parts.push(&uint8_array);

    let opts = BlobPropertyBag::new();
    opts.set_type(mime_type);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)?;

    Ok(web_sys::Url::create_object_url_with_blob(&blob)?)
}

/// Revoke an object URL created by [`bytes_to_object_url`].
///
/// Silently ignores errors (the URL may already be revoked).
pub fn revoke_object_url(url: &str) {
    if url.is_empty() {
        return;
    }
    let _ = web_sys::Url::revoke_object_url(url);
}

/// [`DisplayRefs`] implementation minting browser object URLs.
///
/// A failed mint yields an empty reference (the thumbnail renders
/// blank) and logs a console warning; the entry itself is still valid.
#[derive(Debug, Default)]
pub struct BlobUrls;

impl DisplayRefs for BlobUrls {
    fn mint(&mut self, id: EntryId, source: &Source) -> DisplayRef {
        match bytes_to_object_url(&source.bytes, source.media_type.mime()) {
            Ok(url) => DisplayRef::new(url),
            Err(e) => {
                let message = format!("failed to create object URL for {id}: {e}");
                tracing::warn!("{message}");
                web_sys::console::warn_1(&JsValue::from_str(&message));
                DisplayRef::new(String::new())
            }
        }
    }

    fn release(&mut self, display_ref: &DisplayRef) {
        revoke_object_url(display_ref.as_str());
    }
}
