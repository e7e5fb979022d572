//! Real-time driver around the session studio.
//!
//! The studio runs on a virtual timeline. [`LiveStudio`] pins that
//! timeline to wall-clock time: every interaction first catches the
//! studio up to the stopwatch, then acts, then hands back whatever the
//! studio queued for the user (notices and finished downloads).

use std::time::Duration;

use upcat_io::{BlobUrls, WebClock};
use upcat_session::{Export, Notice, Stopwatch, Studio, StudioConfig};

/// Upper bound on how long the timer pump sleeps between checks.
pub const MAX_POLL: Duration = Duration::from_millis(250);

/// Output collected from the studio after an interaction.
#[derive(Debug, Default)]
pub struct Outbox {
    pub notices: Vec<Notice>,
    pub exports: Vec<Export>,
}

/// Studio plus the wall clock it is synchronised with.
pub struct LiveStudio {
    studio: Studio<BlobUrls>,
    watch: Stopwatch<WebClock>,
}

impl LiveStudio {
    pub fn new(config: StudioConfig) -> Self {
        Self {
            studio: Studio::new(config, BlobUrls),
            watch: Stopwatch::start(WebClock),
        }
    }

    pub const fn studio(&self) -> &Studio<BlobUrls> {
        &self.studio
    }

    /// Catch up with real time, run `action`, and collect the outbox.
    pub fn act<T>(&mut self, action: impl FnOnce(&mut Studio<BlobUrls>) -> T) -> (T, Outbox) {
        self.studio.advance_to(self.watch.elapsed());
        let value = action(&mut self.studio);
        let outbox = Outbox {
            notices: self.studio.take_notices(),
            exports: self.studio.take_exports(),
        };
        (value, outbox)
    }

    /// Whether a deferred event has come due.
    pub fn is_due(&self) -> bool {
        self.studio
            .next_deadline()
            .is_some_and(|deadline| deadline <= self.watch.elapsed())
    }

    /// How long the pump may sleep before the next event can come due.
    pub fn sleep_hint(&self) -> Duration {
        self.studio.next_deadline().map_or(MAX_POLL, |deadline| {
            deadline.saturating_sub(self.watch.elapsed()).min(MAX_POLL)
        })
    }
}
