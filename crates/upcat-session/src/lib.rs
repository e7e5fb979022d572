//! upcat-session: Upload session state machine (sans-IO).
//!
//! Tracks a bounded, ordered collection of uploaded images, the active
//! selection, and each image's simulated processing state:
//! validate -> append -> process -> ready, plus in-place replacement of
//! the active image and delayed download hand-off.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and a virtual timeline. All browser interaction
//! (object URLs, file pickers, timers) lives in `upcat-io`.

pub mod config;
pub mod display;
pub mod session;
pub mod studio;
pub mod timers;
pub mod types;
pub mod validate;

pub use config::{Latencies, StudioConfig};
pub use display::{DisplayRefs, MemoryRefs};
pub use session::Session;
pub use studio::{BatchTicket, Export, Notice, Phase, ReplaceOutcome, Studio, View};
pub use timers::{Clock, ManualClock, Stopwatch};
pub use types::{
    Candidate, Dimensions, DisplayRef, EntryId, EntryStatus, FALLBACK_FILE_NAME, ImageEntry,
    MAX_ENTRIES, MediaType, SessionError, Source,
};
pub use validate::{Accepted, MAX_DIMENSIONS, Rejection, RejectionKind, Verdict, validate};
