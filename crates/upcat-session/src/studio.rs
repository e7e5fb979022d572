//! The studio: single owner of the session and every pathway that
//! mutates it.
//!
//! ```rust
//! # use std::time::Duration;
//! # use upcat_session::{Candidate, Studio, View};
//! # fn run(png: Vec<u8>) {
//! let mut studio: Studio = Studio::default();
//! studio.submit_batch(vec![Candidate::from_file_name("cat.png", png)]);
//! assert_eq!(studio.view(), View::Uploading);
//!
//! studio.advance_by(Duration::from_secs(4));
//! assert_eq!(studio.view(), View::Workspace);
//! # }
//! ```
//!
//! # Time
//!
//! Every latency is a deferred event on a virtual timeline
//! ([`Timers`]). Nothing happens between calls; [`Studio::advance_to`]
//! and [`Studio::advance_by`] fire whatever came due, and
//! [`Studio::next_deadline`] tells a driver how long it may sleep.
//!
//! # Batch intake
//!
//! A batch reserves its capacity at [`Studio::begin_batch`] and commits
//! once every candidate has a verdict. Verdicts may arrive in any order
//! ([`Studio::complete_validation`]), but batches commit strictly in
//! submission order and each commit appends all of its entries at once.
//! [`Studio::submit_batch`] does all three steps synchronously.
//!
//! # Snapshots
//!
//! The session lives behind an [`Arc`] and is updated with
//! [`Arc::make_mut`]. A reader holding a [`Studio::snapshot`] keeps a
//! consistent view while the studio moves on.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::StudioConfig;
use crate::display::{DisplayRefs, MemoryRefs};
use crate::session::Session;
use crate::timers::Timers;
use crate::types::{Candidate, EntryId, EntryStatus, ImageEntry, MAX_ENTRIES, SessionError, Source};
use crate::validate::{self, RejectionKind, Verdict};

/// User-facing notices raised by the pathways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Notice {
    /// A batch did not fit; `dropped` candidates were cut from its tail.
    CapacityExceeded {
        /// Candidates discarded without validation.
        dropped: usize,
    },
    /// Candidates in a batch had an unsupported or unreadable type.
    UnsupportedType {
        /// How many were rejected.
        count: usize,
    },
    /// Candidates in a batch exceeded the dimension ceiling. The
    /// persistent oversize warning is raised alongside this notice.
    OversizedImage {
        /// How many were rejected.
        count: usize,
    },
    /// The user asked to add images while the session was full.
    LimitReached {
        /// The session capacity.
        limit: usize,
    },
    /// A replacement candidate had an unsupported or unreadable type.
    ReplaceUnsupportedType,
}

/// Global progress phase shown for the session's first batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Phase {
    /// No global phase running.
    #[default]
    Idle,
    /// Full-screen "uploading" progress.
    Uploading,
    /// Full-screen "enhancing" progress.
    Enhancing,
}

/// Which screen the application should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum View {
    /// No images yet: the upload landing page.
    Landing,
    /// First batch, upload phase.
    Uploading,
    /// First batch, enhance phase.
    Enhancing,
    /// Thumbnails, preview, and actions.
    Workspace,
}

/// Handle for a batch waiting on validation verdicts.
#[derive(Debug, Clone)]
pub struct BatchTicket {
    /// Batch identifier for [`Studio::complete_validation`].
    pub id: u64,
    /// Candidates that survived truncation, indexed as verdicts expect.
    pub candidates: Vec<Candidate>,
    /// How many candidates were cut for capacity.
    pub dropped: usize,
}

/// Result of [`Studio::replace_active`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReplaceOutcome {
    /// There was no active entry; nothing changed.
    NoActiveEntry,
    /// The candidate was rejected; nothing changed.
    Rejected(RejectionKind),
    /// The active entry now holds the new source and is processing.
    Replaced {
        /// The (unchanged) entry id.
        id: EntryId,
        /// The entry's new revision.
        revision: u32,
    },
}

/// A download ready to hand to the user's environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Export {
    /// Entry the content came from.
    pub entry: EntryId,
    /// Suggested file name.
    pub file_name: String,
    /// MIME type for the download.
    pub mime_type: String,
    /// File content.
    #[serde(skip)]
    pub bytes: Arc<[u8]>,
}

/// Deferred work on the virtual timeline.
#[derive(Debug)]
enum Deferred {
    UploadElapsed { stamps: Vec<(EntryId, u32)> },
    EnhanceElapsed { stamps: Vec<(EntryId, u32)> },
    Processed { stamps: Vec<(EntryId, u32)> },
    Replaced { id: EntryId, revision: u32 },
    DownloadDue { export: Export },
}

struct PendingBatch {
    id: u64,
    candidates: Vec<Candidate>,
    verdicts: Vec<Option<Verdict>>,
}

impl PendingBatch {
    fn is_complete(&self) -> bool {
        self.verdicts.iter().all(Option::is_some)
    }
}

/// Owner of the session, its flags, and its deferred work.
pub struct Studio<R: DisplayRefs = MemoryRefs> {
    config: StudioConfig,
    refs: R,
    session: Arc<Session>,
    timers: Timers<Deferred>,
    pending: VecDeque<PendingBatch>,
    next_entry: u64,
    next_batch: u64,
    phase: Phase,
    first_upload_complete: bool,
    oversize_warning: bool,
    size_error: bool,
    changing: bool,
    downloading: bool,
    show_upscaled: bool,
    notices: Vec<Notice>,
    exports: Vec<Export>,
}

impl Default for Studio<MemoryRefs> {
    fn default() -> Self {
        Self::new(StudioConfig::default(), MemoryRefs::new())
    }
}

impl<R: DisplayRefs> Studio<R> {
    /// Create a studio with an empty session.
    pub fn new(config: StudioConfig, refs: R) -> Self {
        Self {
            config,
            refs,
            session: Arc::new(Session::new()),
            timers: Timers::new(),
            pending: VecDeque::new(),
            next_entry: 1,
            next_batch: 1,
            phase: Phase::Idle,
            first_upload_complete: false,
            oversize_warning: false,
            size_error: false,
            changing: false,
            downloading: false,
            show_upscaled: false,
            notices: Vec::new(),
            exports: Vec::new(),
        }
    }

    // ───────────────────────── Reading ─────────────────────────────────

    /// The current session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// A shared, immutable snapshot of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Session> {
        Arc::clone(&self.session)
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// The display reference minter.
    #[must_use]
    pub const fn display_refs(&self) -> &R {
        &self.refs
    }

    /// Which screen to show.
    #[must_use]
    pub fn view(&self) -> View {
        match self.phase {
            Phase::Uploading => View::Uploading,
            Phase::Enhancing => View::Enhancing,
            Phase::Idle if self.session.is_empty() => View::Landing,
            Phase::Idle => View::Workspace,
        }
    }

    /// The global first-batch phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the first batch has finished its global phases.
    #[must_use]
    pub const fn first_upload_complete(&self) -> bool {
        self.first_upload_complete
    }

    /// Whether the persistent oversize warning is showing.
    #[must_use]
    pub const fn oversize_warning(&self) -> bool {
        self.oversize_warning
    }

    /// Whether the size-error modal is open.
    #[must_use]
    pub const fn size_error(&self) -> bool {
        self.size_error
    }

    /// Whether a replacement is in progress (picker open or processing).
    #[must_use]
    pub const fn is_changing(&self) -> bool {
        self.changing
    }

    /// Whether a download is pending.
    #[must_use]
    pub const fn is_downloading(&self) -> bool {
        self.downloading
    }

    /// Whether the preview shows the upscaled rendition.
    #[must_use]
    pub const fn show_upscaled(&self) -> bool {
        self.show_upscaled
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Virtual time of the next deferred event.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Whether no batch is awaiting verdicts and nothing is scheduled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.pending.is_empty() && self.timers.is_empty()
    }

    /// Slots not yet taken by committed entries or pending batches.
    #[must_use]
    pub fn free_slots(&self) -> usize {
        MAX_ENTRIES.saturating_sub(self.session.len() + self.reserved_slots())
    }

    /// Drain queued notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Drain downloads that are ready.
    pub fn take_exports(&mut self) -> Vec<Export> {
        std::mem::take(&mut self.exports)
    }

    // ───────────────────────── Batch intake ────────────────────────────

    /// Ask to open the add-images picker.
    ///
    /// Returns `false` and raises [`Notice::LimitReached`] when the
    /// session has no free slots.
    pub fn request_add(&mut self) -> bool {
        if self.free_slots() == 0 {
            self.notices.push(Notice::LimitReached { limit: MAX_ENTRIES });
            return false;
        }
        true
    }

    /// Validate and commit a batch in one step.
    ///
    /// Returns the ids of the entries created. Batches commit in
    /// submission order, so while an earlier [`begin_batch`] is still
    /// waiting on verdicts this batch only reserves its slots: the
    /// result is empty and its entries are appended when the earlier
    /// batch commits.
    ///
    /// [`begin_batch`]: Self::begin_batch
    pub fn submit_batch(&mut self, candidates: Vec<Candidate>) -> Vec<EntryId> {
        let Some(ticket) = self.begin_batch(candidates) else {
            return Vec::new();
        };
        let before = self.next_entry;
        for (index, candidate) in ticket.candidates.iter().enumerate() {
            let verdict = validate::validate(candidate);
            if let Err(e) = self.complete_validation(ticket.id, index, verdict) {
                tracing::warn!(batch = ticket.id, index, error = %e, "verdict not applied");
            }
        }
        (before..self.next_entry)
            .map(EntryId::from_raw)
            .filter(|id| self.session.get(*id).is_some())
            .collect()
    }

    /// Start a batch: truncate it to the free capacity and reserve slots.
    ///
    /// Returns `None` when nothing survives truncation (including an
    /// empty batch). Truncation raises [`Notice::CapacityExceeded`].
    /// A batch of surviving candidates commits once each of them has a
    /// verdict; a batch whose candidates were all dropped never commits.
    pub fn begin_batch(&mut self, mut candidates: Vec<Candidate>) -> Option<BatchTicket> {
        if candidates.is_empty() {
            return None;
        }
        let free = self.free_slots();
        let dropped = candidates.len().saturating_sub(free);
        if dropped > 0 {
            candidates.truncate(free);
            tracing::info!(dropped, free, "batch truncated to capacity");
            self.notices.push(Notice::CapacityExceeded { dropped });
        }
        if candidates.is_empty() {
            return None;
        }

        let id = self.next_batch;
        self.next_batch += 1;
        tracing::debug!(batch = id, candidates = candidates.len(), "batch started");
        self.pending.push_back(PendingBatch {
            id,
            candidates: candidates.clone(),
            verdicts: vec![None; candidates.len()],
        });
        Some(BatchTicket {
            id,
            candidates,
            dropped,
        })
    }

    /// Record the verdict for one candidate of a pending batch.
    ///
    /// Commits every leading batch whose verdicts are all in. A repeated
    /// verdict for the same candidate overwrites the earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownBatch`] if the batch is not pending
    /// and [`SessionError::UnknownCandidate`] if `index` is out of range.
    pub fn complete_validation(
        &mut self,
        batch: u64,
        index: usize,
        verdict: Verdict,
    ) -> Result<(), SessionError> {
        let pending = self
            .pending
            .iter_mut()
            .find(|p| p.id == batch)
            .ok_or(SessionError::UnknownBatch(batch))?;
        let slot = pending
            .verdicts
            .get_mut(index)
            .ok_or(SessionError::UnknownCandidate { batch, index })?;
        *slot = Some(verdict);
        self.commit_ready_batches();
        Ok(())
    }

    /// Dismiss the persistent oversize warning.
    pub const fn dismiss_oversize_warning(&mut self) {
        self.oversize_warning = false;
    }

    fn reserved_slots(&self) -> usize {
        self.pending.iter().map(|p| p.candidates.len()).sum()
    }

    fn commit_ready_batches(&mut self) {
        while self.pending.front().is_some_and(PendingBatch::is_complete) {
            let Some(batch) = self.pending.pop_front() else {
                break;
            };
            self.commit(batch);
        }
    }

    fn commit(&mut self, batch: PendingBatch) {
        let first_batch = self.session.is_empty() && !self.first_upload_complete;
        let mut unsupported = 0;
        let mut oversized = 0;
        let mut created = Vec::new();

        for (candidate, verdict) in batch.candidates.into_iter().zip(batch.verdicts) {
            match verdict {
                Some(Ok(accepted)) => {
                    let id = EntryId::from_raw(self.next_entry);
                    self.next_entry += 1;
                    let source =
                        Source::from_candidate(candidate, accepted.media_type, accepted.dimensions);
                    let display_ref = self.refs.mint(id, &source);
                    created.push(ImageEntry {
                        id,
                        source,
                        display_ref,
                        status: EntryStatus::Processing,
                        revision: 0,
                    });
                }
                Some(Err(rejection)) => {
                    tracing::debug!(batch = batch.id, name = %candidate.name, %rejection, "candidate rejected");
                    match rejection.kind() {
                        RejectionKind::UnsupportedType => unsupported += 1,
                        RejectionKind::OversizedImage => oversized += 1,
                    }
                }
                None => {}
            }
        }

        if unsupported > 0 {
            self.notices.push(Notice::UnsupportedType { count: unsupported });
        }
        if oversized > 0 {
            self.oversize_warning = true;
            self.notices.push(Notice::OversizedImage { count: oversized });
        }
        if created.is_empty() {
            return;
        }

        let stamps: Vec<_> = created.iter().map(|e| (e.id, e.revision)).collect();
        let display_refs: Vec<_> = created.iter().map(|e| e.display_ref.clone()).collect();
        if let Err(e) = Arc::make_mut(&mut self.session).append(created) {
            // Capacity is reserved at begin_batch, so this only fires if
            // that bookkeeping is wrong.
            tracing::error!(batch = batch.id, error = %e, "batch commit failed");
            for display_ref in &display_refs {
                self.refs.release(display_ref);
            }
            return;
        }
        tracing::info!(batch = batch.id, created = stamps.len(), first_batch, "batch committed");

        if first_batch {
            self.phase = Phase::Uploading;
            self.timers
                .schedule_in(self.config.latencies.upload, Deferred::UploadElapsed { stamps });
        } else {
            self.timers
                .schedule_in(self.config.latencies.processing, Deferred::Processed { stamps });
        }
    }

    // ───────────────────────── Replace ─────────────────────────────────

    /// The replace picker was opened.
    pub const fn begin_replace(&mut self) {
        self.changing = true;
    }

    /// The replace picker was closed without choosing a file.
    pub const fn cancel_replace(&mut self) {
        self.changing = false;
    }

    /// Validate `candidate` and, if accepted, swap it into the active
    /// entry.
    pub fn replace_active(&mut self, candidate: Candidate) -> ReplaceOutcome {
        if self.session.active_id().is_none() {
            self.changing = false;
            return ReplaceOutcome::NoActiveEntry;
        }
        let verdict = validate::validate(&candidate);
        self.replace_active_with_verdict(candidate, verdict)
    }

    /// Swap `candidate` into the active entry using a verdict computed
    /// elsewhere.
    ///
    /// Unsupported types raise [`Notice::ReplaceUnsupportedType`];
    /// oversize images open the size-error modal. Either way the entry
    /// is untouched.
    pub fn replace_active_with_verdict(
        &mut self,
        candidate: Candidate,
        verdict: Verdict,
    ) -> ReplaceOutcome {
        let Some(id) = self.session.active_id() else {
            self.changing = false;
            return ReplaceOutcome::NoActiveEntry;
        };

        let accepted = match verdict {
            Ok(accepted) => accepted,
            Err(rejection) => {
                tracing::debug!(%id, %rejection, "replacement rejected");
                self.changing = false;
                let kind = rejection.kind();
                match kind {
                    RejectionKind::UnsupportedType => {
                        self.notices.push(Notice::ReplaceUnsupportedType);
                    }
                    RejectionKind::OversizedImage => self.size_error = true,
                }
                return ReplaceOutcome::Rejected(kind);
            }
        };

        let source = Source::from_candidate(candidate, accepted.media_type, accepted.dimensions);
        let display_ref = self.refs.mint(id, &source);
        match Arc::make_mut(&mut self.session).replace_source(id, source, display_ref.clone()) {
            Ok((revision, previous)) => {
                self.refs.release(&previous);
                self.changing = true;
                self.timers
                    .schedule_in(self.config.latencies.replace, Deferred::Replaced { id, revision });
                tracing::info!(%id, revision, "active image replaced");
                ReplaceOutcome::Replaced { id, revision }
            }
            Err(e) => {
                // The active id always names an entry; treat a miss as a
                // no-op rather than corrupting the session.
                tracing::error!(%id, error = %e, "active entry missing during replace");
                self.refs.release(&display_ref);
                self.changing = false;
                ReplaceOutcome::NoActiveEntry
            }
        }
    }

    /// Close the size-error modal.
    pub const fn dismiss_size_error(&mut self) {
        self.size_error = false;
    }

    /// Close the size-error modal and reopen the replace picker.
    ///
    /// Returns `false` (doing nothing) if the modal was not open.
    pub const fn retry_from_size_error(&mut self) -> bool {
        if !self.size_error {
            return false;
        }
        self.size_error = false;
        self.changing = true;
        true
    }

    // ───────────────────────── Selection ───────────────────────────────

    /// Make `id` the active entry.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownEntry`] if no entry has this id;
    /// the selection is unchanged. Interactive callers may ignore it.
    pub fn select_active(&mut self, id: EntryId) -> Result<(), SessionError> {
        if self.session.get(id).is_none() {
            return Err(SessionError::UnknownEntry(id));
        }
        Arc::make_mut(&mut self.session).select(id)
    }

    /// Select the entry after the active one (clamped).
    pub fn select_next(&mut self) -> Option<EntryId> {
        self.select_offset(1)
    }

    /// Select the entry before the active one (clamped).
    pub fn select_previous(&mut self) -> Option<EntryId> {
        self.select_offset(-1)
    }

    fn select_offset(&mut self, offset: isize) -> Option<EntryId> {
        self.session.active_id()?;
        Arc::make_mut(&mut self.session).select_offset(offset)
    }

    /// Toggle the before/after preview.
    pub const fn set_show_upscaled(&mut self, show: bool) {
        self.show_upscaled = show;
    }

    // ───────────────────────── Download ────────────────────────────────

    /// Ask to download the active entry.
    ///
    /// The entry's content is captured now: replacing the entry while
    /// the download latency elapses does not change what is exported.
    ///
    /// Returns the entry that will be exported once the latency elapses,
    /// or `None` when nothing is active or a download is already pending.
    pub fn request_download(&mut self) -> Option<EntryId> {
        if self.downloading {
            return None;
        }
        let entry = self.session.active()?;
        let export = Export {
            entry: entry.id,
            file_name: entry.source.download_name().to_owned(),
            mime_type: entry.source.declared_type.clone(),
            bytes: Arc::clone(&entry.source.bytes),
        };
        let id = export.entry;
        self.downloading = true;
        self.timers
            .schedule_in(self.config.latencies.download, Deferred::DownloadDue { export });
        Some(id)
    }

    // ───────────────────────── Time ────────────────────────────────────

    /// Advance the virtual timeline by `by`, firing due events.
    pub fn advance_by(&mut self, by: Duration) {
        self.advance_to(self.timers.now().saturating_add(by));
    }

    /// Advance the virtual timeline to `to`, firing due events in
    /// deadline order. Moving backwards is a no-op.
    pub fn advance_to(&mut self, to: Duration) {
        while let Some(event) = self.timers.pop_due(to) {
            self.fire(event);
        }
        self.timers.settle_at(to);
    }

    /// Fire events until nothing is scheduled. Returns the final time.
    pub fn run_until_idle(&mut self) -> Duration {
        while let Some(deadline) = self.timers.next_deadline() {
            self.advance_to(deadline);
        }
        self.timers.now()
    }

    fn fire(&mut self, event: Deferred) {
        tracing::trace!(?event, now = ?self.timers.now(), "deferred event");
        match event {
            Deferred::UploadElapsed { stamps } => {
                self.phase = Phase::Enhancing;
                self.timers
                    .schedule_in(self.config.latencies.enhance, Deferred::EnhanceElapsed { stamps });
            }
            Deferred::EnhanceElapsed { stamps } => {
                self.phase = Phase::Idle;
                self.first_upload_complete = true;
                self.mark_ready(&stamps);
            }
            Deferred::Processed { stamps } => self.mark_ready(&stamps),
            Deferred::Replaced { id, revision } => {
                let current = self.session.get(id).is_some_and(|e| e.revision == revision);
                if current {
                    self.mark_ready(&[(id, revision)]);
                    self.changing = false;
                }
            }
            Deferred::DownloadDue { export } => {
                self.downloading = false;
                self.exports.push(export);
            }
        }
    }

    fn mark_ready(&mut self, stamps: &[(EntryId, u32)]) {
        let pending = stamps.iter().any(|&(id, revision)| {
            self.session
                .get(id)
                .is_some_and(|e| e.revision == revision && e.status == EntryStatus::Processing)
        });
        // Skip the copy-on-write clone when every stamp is stale.
        if pending {
            let changed = Arc::make_mut(&mut self.session).mark_ready(stamps);
            tracing::debug!(changed, "entries ready");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::validate::{Accepted, Rejection};
    use crate::types::{Dimensions, MediaType};

    const TWO: Duration = Duration::from_secs(2);

    fn accepted() -> Verdict {
        Ok(Accepted {
            media_type: MediaType::Png,
            dimensions: Dimensions::new(8, 8),
        })
    }

    fn candidate(name: &str) -> Candidate {
        Candidate::new(name, "image/png", name.as_bytes().to_vec())
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let mut studio: Studio = Studio::default();
        assert!(studio.begin_batch(Vec::new()).is_none());
        assert!(studio.take_notices().is_empty());
        assert!(studio.is_settled());
    }

    #[test]
    fn verdicts_out_of_order_commit_in_submission_order() {
        let mut studio: Studio = Studio::default();
        let ticket = studio
            .begin_batch(vec![candidate("a"), candidate("b"), candidate("c")])
            .unwrap();

        studio.complete_validation(ticket.id, 2, accepted()).unwrap();
        studio.complete_validation(ticket.id, 0, accepted()).unwrap();
        assert!(studio.session().is_empty(), "batch must wait for every verdict");

        studio.complete_validation(ticket.id, 1, accepted()).unwrap();
        let names: Vec<_> = studio
            .session()
            .entries()
            .iter()
            .map(|e| e.source.name.as_str())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn later_batch_waits_for_earlier_batch() {
        let mut studio: Studio = Studio::default();
        let first = studio.begin_batch(vec![candidate("first")]).unwrap();
        let second = studio.begin_batch(vec![candidate("second")]).unwrap();

        studio.complete_validation(second.id, 0, accepted()).unwrap();
        assert!(studio.session().is_empty());

        studio.complete_validation(first.id, 0, accepted()).unwrap();
        let names: Vec<_> = studio
            .session()
            .entries()
            .iter()
            .map(|e| e.source.name.as_str())
            .collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn pending_batches_reserve_capacity() {
        let mut studio: Studio = Studio::default();
        let many: Vec<_> = (0..15).map(|i| candidate(&i.to_string())).collect();
        let _held = studio.begin_batch(many).unwrap();

        let ticket = studio
            .begin_batch((0..8).map(|i| candidate(&format!("x{i}"))).collect())
            .unwrap();
        assert_eq!(ticket.candidates.len(), 5);
        assert_eq!(ticket.dropped, 3);
        assert_eq!(studio.take_notices(), [Notice::CapacityExceeded { dropped: 3 }]);
        assert_eq!(studio.free_slots(), 0);
    }

    #[test]
    fn unknown_batch_and_index_are_errors() {
        let mut studio: Studio = Studio::default();
        assert_eq!(
            studio.complete_validation(9, 0, accepted()),
            Err(SessionError::UnknownBatch(9))
        );
        let ticket = studio.begin_batch(vec![candidate("a")]).unwrap();
        assert_eq!(
            studio.complete_validation(ticket.id, 1, accepted()),
            Err(SessionError::UnknownCandidate {
                batch: ticket.id,
                index: 1
            })
        );
    }

    #[test]
    fn all_rejected_first_batch_stays_on_landing() {
        let mut studio: Studio = Studio::default();
        let ticket = studio.begin_batch(vec![candidate("a")]).unwrap();
        studio
            .complete_validation(
                ticket.id,
                0,
                Err(Rejection::Oversized(Dimensions::new(4000, 3000))),
            )
            .unwrap();
        assert_eq!(studio.view(), View::Landing);
        assert!(studio.oversize_warning());
        assert!(!studio.first_upload_complete());
        assert_eq!(studio.take_notices(), [Notice::OversizedImage { count: 1 }]);
    }

    #[test]
    fn global_phases_run_back_to_back() {
        let mut studio: Studio = Studio::default();
        let ticket = studio.begin_batch(vec![candidate("a")]).unwrap();
        studio.complete_validation(ticket.id, 0, accepted()).unwrap();

        assert_eq!(studio.view(), View::Uploading);
        studio.advance_by(TWO);
        assert_eq!(studio.view(), View::Enhancing);
        assert!(!studio.session().entries()[0].status.is_ready());
        studio.advance_by(TWO);
        assert_eq!(studio.view(), View::Workspace);
        assert!(studio.session().entries()[0].status.is_ready());
        assert!(studio.first_upload_complete());
    }

    #[test]
    fn snapshot_is_not_affected_by_later_mutation() {
        let mut studio: Studio = Studio::default();
        let ticket = studio.begin_batch(vec![candidate("a")]).unwrap();
        studio.complete_validation(ticket.id, 0, accepted()).unwrap();
        let before = studio.snapshot();

        studio.run_until_idle();
        assert_eq!(before.entries()[0].status, EntryStatus::Processing);
        assert_eq!(studio.session().entries()[0].status, EntryStatus::Ready);
    }

    #[test]
    fn replace_with_external_verdict() {
        let mut studio: Studio = Studio::default();
        let ticket = studio.begin_batch(vec![candidate("a")]).unwrap();
        studio.complete_validation(ticket.id, 0, accepted()).unwrap();
        studio.run_until_idle();

        let outcome = studio.replace_active_with_verdict(candidate("b"), accepted());
        let id = studio.session().active_id().unwrap();
        assert_eq!(outcome, ReplaceOutcome::Replaced { id, revision: 1 });
        assert!(studio.is_changing());
        studio.advance_by(TWO);
        assert!(!studio.is_changing());
        assert!(studio.session().entries()[0].status.is_ready());
    }

    #[test]
    fn retry_from_size_error_reopens_replace() {
        let mut studio: Studio = Studio::default();
        assert!(!studio.retry_from_size_error());

        let ticket = studio.begin_batch(vec![candidate("a")]).unwrap();
        studio.complete_validation(ticket.id, 0, accepted()).unwrap();
        studio.begin_replace();
        let outcome = studio.replace_active_with_verdict(
            candidate("big"),
            Err(Rejection::Oversized(Dimensions::new(2000, 1200))),
        );
        assert_eq!(outcome, ReplaceOutcome::Rejected(RejectionKind::OversizedImage));
        assert!(studio.size_error());
        assert!(!studio.is_changing());

        assert!(studio.retry_from_size_error());
        assert!(!studio.size_error());
        assert!(studio.is_changing());
    }
}
