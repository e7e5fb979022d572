//! The image session store: an ordered, bounded list of entries plus
//! the active selection.
//!
//! Every mutation checks its preconditions before touching any state,
//! so a failed call leaves the session exactly as it was. The session
//! is `Clone` so the owning [`Studio`](crate::Studio) can hold it behind
//! an `Arc` and apply copy-on-write updates while readers keep older
//! snapshots.

use serde::Serialize;

use crate::types::{DisplayRef, EntryId, EntryStatus, ImageEntry, MAX_ENTRIES, SessionError, Source};

/// Ordered collection of uploaded images and the active pointer.
///
/// Invariants upheld by every method:
/// - `entries.len() <= MAX_ENTRIES`
/// - entry ids are unique
/// - `active`, when set, names an entry in `entries`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    entries: Vec<ImageEntry>,
    active: Option<EntryId>,
}

impl Session {
    /// Create an empty session.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            active: None,
        }
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the session holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slots left before reaching [`MAX_ENTRIES`].
    #[must_use]
    pub const fn remaining_capacity(&self) -> usize {
        MAX_ENTRIES.saturating_sub(self.entries.len())
    }

    /// Id of the active entry, if any.
    #[must_use]
    pub const fn active_id(&self) -> Option<EntryId> {
        self.active
    }

    /// The active entry, if any.
    #[must_use]
    pub fn active(&self) -> Option<&ImageEntry> {
        self.active.and_then(|id| self.get(id))
    }

    /// Look up an entry by id.
    #[must_use]
    pub fn get(&self, id: EntryId) -> Option<&ImageEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Index of an entry in insertion order.
    #[must_use]
    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Number of entries still processing.
    #[must_use]
    pub fn processing_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == EntryStatus::Processing)
            .count()
    }

    /// Append new entries in order.
    ///
    /// When nothing is active, the first appended entry becomes active.
    /// The whole batch is applied or none of it is.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CapacityReached`] if the batch does not fit,
    /// or [`SessionError::DuplicateId`] if any id is already present or
    /// repeated within the batch.
    pub fn append(&mut self, batch: Vec<ImageEntry>) -> Result<(), SessionError> {
        if self.entries.len() + batch.len() > MAX_ENTRIES {
            return Err(SessionError::CapacityReached { limit: MAX_ENTRIES });
        }
        for (i, entry) in batch.iter().enumerate() {
            if self.get(entry.id).is_some() || batch[..i].iter().any(|e| e.id == entry.id) {
                return Err(SessionError::DuplicateId(entry.id));
            }
        }

        if self.active.is_none() {
            self.active = batch.first().map(|e| e.id);
        }
        self.entries.extend(batch);
        Ok(())
    }

    /// Make `id` the active entry.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownEntry`] (leaving the selection
    /// unchanged) if no entry has this id.
    pub fn select(&mut self, id: EntryId) -> Result<(), SessionError> {
        if self.get(id).is_none() {
            return Err(SessionError::UnknownEntry(id));
        }
        self.active = Some(id);
        Ok(())
    }

    /// Move the selection `offset` steps through the entries, clamped to
    /// the first and last entry. Returns the newly active id.
    pub fn select_offset(&mut self, offset: isize) -> Option<EntryId> {
        let current = self.active.and_then(|id| self.position(id))?;
        let last = self.entries.len().checked_sub(1)?;
        let target = current.saturating_add_signed(offset).min(last);
        let id = self.entries.get(target)?.id;
        self.active = Some(id);
        Some(id)
    }

    /// Swap the source of an entry and restart its processing.
    ///
    /// The entry keeps its id and position. Its status becomes
    /// [`EntryStatus::Processing`] and its revision is bumped. Returns the
    /// new revision and the display reference that was replaced, which
    /// the caller must release.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownEntry`] if no entry has this id.
    pub fn replace_source(
        &mut self,
        id: EntryId,
        source: Source,
        display_ref: DisplayRef,
    ) -> Result<(u32, DisplayRef), SessionError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(SessionError::UnknownEntry(id))?;
        entry.source = source;
        entry.status = EntryStatus::Processing;
        entry.revision = entry.revision.wrapping_add(1);
        let previous = std::mem::replace(&mut entry.display_ref, display_ref);
        Ok((entry.revision, previous))
    }

    /// Mark entries ready, matching each by id *and* revision.
    ///
    /// Stamps for entries that were replaced since they were scheduled
    /// are ignored. Returns how many entries changed.
    pub fn mark_ready(&mut self, stamps: &[(EntryId, u32)]) -> usize {
        let mut changed = 0;
        for entry in &mut self.entries {
            let matches = stamps
                .iter()
                .any(|&(id, revision)| entry.id == id && entry.revision == revision);
            if matches && entry.status == EntryStatus::Processing {
                entry.status = EntryStatus::Ready;
                changed += 1;
            }
        }
        changed
    }
}
