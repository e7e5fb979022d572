//! Display references: renderable handles minted for entry sources.
//!
//! In the browser a display reference is an object URL that must be
//! revoked when its source goes away; the session treats it as opaque
//! and only guarantees that every minted reference is released exactly
//! once when replaced.

use std::collections::HashSet;

use crate::types::{DisplayRef, EntryId, Source};

/// Mints and releases display references for entry sources.
pub trait DisplayRefs {
    /// Create a reference that renders `source`.
    fn mint(&mut self, id: EntryId, source: &Source) -> DisplayRef;

    /// Release a reference previously returned by [`mint`](Self::mint).
    fn release(&mut self, display_ref: &DisplayRef);
}

/// In-memory display references (`mem://img-<n>/<serial>`), tracking
/// which ones are still live.
#[derive(Debug, Default)]
pub struct MemoryRefs {
    serial: u64,
    live: HashSet<DisplayRef>,
}

impl MemoryRefs {
    /// Create an empty minter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of minted references not yet released.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Whether `display_ref` was minted here and not yet released.
    #[must_use]
    pub fn is_live(&self, display_ref: &DisplayRef) -> bool {
        self.live.contains(display_ref)
    }
}

impl DisplayRefs for MemoryRefs {
    fn mint(&mut self, id: EntryId, _source: &Source) -> DisplayRef {
        let display_ref = DisplayRef::new(format!("mem://{id}/{}", self.serial));
        self.serial += 1;
        self.live.insert(display_ref.clone());
        display_ref
    }

    fn release(&mut self, display_ref: &DisplayRef) {
        if !self.live.remove(display_ref) {
            tracing::warn!(%display_ref, "released a display reference that was not live");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::types::{Dimensions, MediaType};

    fn source() -> Source {
        Source {
            name: "a.png".into(),
            declared_type: "image/png".into(),
            media_type: MediaType::Png,
            dimensions: Dimensions::new(1, 1),
            bytes: Arc::from(&[0u8][..]),
        }
    }

    #[test]
    fn minted_refs_are_distinct_and_tracked() {
        let mut refs = MemoryRefs::new();
        let id = EntryId::from_raw(1);
        let a = refs.mint(id, &source());
        let b = refs.mint(id, &source());
        assert_ne!(a, b);
        assert_eq!(refs.live_count(), 2);

        refs.release(&a);
        assert!(!refs.is_live(&a));
        assert!(refs.is_live(&b));
    }
}
