//! Scripted session replay on a manual clock.
//!
//! A [`Script`] lists what a user does; [`replay`] performs it against a
//! [`Studio`] whose timeline is driven by a [`ManualClock`] stepped in
//! fixed increments, and records every observable change.

use std::fmt::Write;
use std::time::Duration;

use serde::Serialize;
use upcat_session::{
    Candidate, EntryId, Export, ManualClock, Notice, ReplaceOutcome, Session, Stopwatch,
    Studio, StudioConfig, View,
};

/// Safety bound on simulated time per step of the script.
const MAX_SETTLE: Duration = Duration::from_secs(600);

/// What the simulated user does, in order.
#[derive(Debug, Default)]
pub struct Script {
    /// First batch.
    pub upload: Vec<Candidate>,
    /// Further batches, each submitted once the previous one settled.
    pub add: Vec<Vec<Candidate>>,
    /// 1-based position to select after uploading.
    pub select: Option<usize>,
    /// Replacement for the active entry.
    pub replace: Option<Candidate>,
    /// Request a download of the active entry at the end.
    pub download: bool,
}

/// One observed change of the studio state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Simulated seconds since start.
    pub at: f64,
    /// What happened.
    pub what: String,
}

/// Everything a replay observed.
#[derive(Debug, Serialize)]
pub struct Report {
    pub timeline: Vec<Event>,
    pub notices: Vec<Notice>,
    pub exports: Vec<Export>,
    pub session: Session,
    pub view: View,
}

impl Report {
    /// Human-readable rendering.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Timeline\n{}", "=".repeat(60));
        for event in &self.timeline {
            let _ = writeln!(out, "{:>8.3}s  {}", event.at, event.what);
        }

        let _ = writeln!(out, "\nEntries\n{}", "=".repeat(60));
        for entry in self.session.entries() {
            let marker = if self.session.active_id() == Some(entry.id) {
                "*"
            } else {
                " "
            };
            let status = if entry.status.is_ready() {
                "ready"
            } else {
                "processing"
            };
            let _ = writeln!(
                out,
                "{marker} {:<8} {:<32} {:>10}  {status}  rev {}",
                entry.id,
                entry.source.download_name(),
                entry.source.dimensions.to_string(),
                entry.revision,
            );
        }

        if !self.exports.is_empty() {
            let _ = writeln!(out, "\nDownloads\n{}", "=".repeat(60));
            for export in &self.exports {
                let _ = writeln!(
                    out,
                    "{:<8} {} ({}, {} bytes)",
                    export.entry,
                    export.file_name,
                    export.mime_type,
                    export.bytes.len(),
                );
            }
        }
        out
    }
}

/// Drives a studio from a manual clock and records changes.
struct Driver<'c> {
    studio: Studio,
    watch: Stopwatch<&'c ManualClock>,
    clock: &'c ManualClock,
    step: Duration,
    last: (View, usize, Option<EntryId>),
    report_timeline: Vec<Event>,
    notices: Vec<Notice>,
    exports: Vec<Export>,
}

impl<'c> Driver<'c> {
    fn new(config: StudioConfig, clock: &'c ManualClock, step: Duration) -> Self {
        let studio: Studio = Studio::new(config, upcat_session::MemoryRefs::new());
        let last = (studio.view(), 0, None);
        Self {
            studio,
            watch: Stopwatch::start(clock),
            clock,
            step,
            last,
            report_timeline: Vec::new(),
            notices: Vec::new(),
            exports: Vec::new(),
        }
    }

    fn log(&mut self, what: impl Into<String>) {
        let at = self.watch.elapsed().as_secs_f64();
        let what = what.into();
        tracing::debug!(at, %what, "event");
        self.report_timeline.push(Event { at, what });
    }

    /// Record view, readiness and selection changes plus any outbox items.
    fn observe(&mut self) {
        let session = self.studio.session();
        let now = (
            self.studio.view(),
            session.processing_count(),
            session.active_id(),
        );
        if now != self.last {
            let (view, processing, active) = now;
            let active = active.map_or_else(|| "none".to_owned(), |id| id.to_string());
            self.log(format!(
                "view={view:?} entries={} processing={processing} active={active}",
                session.len()
            ));
            self.last = now;
        }
        for notice in self.studio.take_notices() {
            self.log(format!("notice {notice:?}"));
            self.notices.push(notice);
        }
        for export in self.studio.take_exports() {
            self.log(format!("download {} ready", export.file_name));
            self.exports.push(export);
        }
    }

    /// Step the clock until nothing is scheduled.
    fn settle(&mut self) {
        let limit = self.watch.elapsed().saturating_add(MAX_SETTLE);
        while !self.studio.is_settled() && self.watch.elapsed() < limit {
            self.clock.advance(self.step);
            self.studio.advance_to(self.watch.elapsed());
            self.observe();
        }
        if !self.studio.is_settled() {
            tracing::warn!("studio still busy after {MAX_SETTLE:?}");
        }
    }

    fn into_report(self) -> Report {
        Report {
            timeline: self.report_timeline,
            notices: self.notices,
            exports: self.exports,
            view: self.studio.view(),
            session: self.studio.snapshot().as_ref().clone(),
        }
    }
}

/// Replay `script` with the given latencies, sampling every `step`.
#[must_use]
pub fn replay(script: Script, config: StudioConfig, step: Duration) -> Report {
    let clock = ManualClock::new();
    let step = if step.is_zero() {
        Duration::from_millis(1)
    } else {
        step
    };
    let mut driver = Driver::new(config, &clock, step);

    let batches = std::iter::once(script.upload).chain(script.add);
    for batch in batches.filter(|b| !b.is_empty()) {
        let count = batch.len();
        if !driver.studio.request_add() {
            driver.observe();
            continue;
        }
        let created = driver.studio.submit_batch(batch);
        driver.log(format!("submitted {count} file(s), {} accepted", created.len()));
        driver.observe();
        driver.settle();
    }

    if let Some(position) = script.select {
        let id = driver
            .studio
            .session()
            .entries()
            .get(position.saturating_sub(1))
            .map(|entry| entry.id);
        match id {
            Some(id) => {
                let _ = driver.studio.select_active(id);
                driver.observe();
            }
            None => driver.log(format!("no entry at position {position}")),
        }
    }

    if let Some(candidate) = script.replace {
        driver.studio.begin_replace();
        let outcome = driver.studio.replace_active(candidate);
        driver.log(match outcome {
            ReplaceOutcome::NoActiveEntry => "replace skipped: no active entry".to_owned(),
            ReplaceOutcome::Rejected(kind) => format!("replace rejected: {kind:?}"),
            ReplaceOutcome::Replaced { id, revision } => {
                format!("replaced {id} (revision {revision})")
            }
        });
        if driver.studio.size_error() {
            driver.log("size error shown");
            driver.studio.dismiss_size_error();
        }
        driver.observe();
        driver.settle();
    }

    if script.download {
        match driver.studio.request_download() {
            Some(id) => driver.log(format!("download of {id} requested")),
            None => driver.log("nothing to download"),
        }
        driver.settle();
    }

    driver.into_report()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, RgbImage};
    use upcat_session::Latencies;

    use super::*;

    fn png(name: &str, width: u32, height: u32) -> Candidate {
        let mut bytes = Vec::new();
        RgbImage::new(width, height)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        Candidate::from_file_name(name, bytes)
    }

    fn fast() -> StudioConfig {
        StudioConfig {
            latencies: Latencies::uniform(Duration::from_millis(100)),
        }
    }

    #[test]
    fn first_batch_goes_through_global_phases() {
        let script = Script {
            upload: vec![png("a.png", 4, 4), png("b.png", 4, 4)],
            ..Script::default()
        };
        let report = replay(script, fast(), Duration::from_millis(10));

        assert_eq!(report.view, View::Workspace);
        assert_eq!(report.session.len(), 2);
        assert!(report.session.entries().iter().all(|e| e.status.is_ready()));
        assert!(report.timeline.iter().any(|e| e.what.contains("Uploading")));
        assert!(report.timeline.iter().any(|e| e.what.contains("Enhancing")));
    }

    #[test]
    fn download_exports_active_entry() {
        let script = Script {
            upload: vec![png("a.png", 4, 4), png("b.png", 4, 4)],
            select: Some(2),
            download: true,
            ..Script::default()
        };
        let report = replay(script, fast(), Duration::from_millis(10));

        assert_eq!(report.exports.len(), 1);
        assert_eq!(report.exports[0].file_name, "b.png");
    }

    #[test]
    fn oversize_replacement_is_reported() {
        let script = Script {
            upload: vec![png("a.png", 4, 4)],
            replace: Some(png("big.png", 1921, 10)),
            ..Script::default()
        };
        let report = replay(script, fast(), Duration::from_millis(10));

        assert!(report.timeline.iter().any(|e| e.what == "size error shown"));
        assert_eq!(report.session.entries()[0].source.name, "a.png");
    }

    #[test]
    fn render_lists_entries() {
        let script = Script {
            upload: vec![png("cat.png", 3, 2)],
            ..Script::default()
        };
        let text = replay(script, fast(), Duration::from_millis(50)).render();
        assert!(text.contains("cat.png"));
        assert!(text.contains("3x2"));
    }
}
