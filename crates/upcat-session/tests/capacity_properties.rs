//! Property tests for the capacity bound, truncation counts, ordering,
//! and active-pointer validity across arbitrary batch sequences.

#![allow(clippy::unwrap_used)]

mod common;

use std::time::Duration;

use proptest::prelude::*;
use upcat_session::{EntryStatus, MAX_ENTRIES, Notice, Studio};

/// One user action in a generated session.
#[derive(Debug, Clone)]
enum Step {
    /// Submit a batch of this many valid candidates.
    Submit(usize),
    /// Advance virtual time by this many milliseconds.
    Wait(u64),
    /// Select the entry at this index (modulo length, or an unknown id).
    Select(usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (1usize..=8).prop_map(Step::Submit),
        (0u64..=3000).prop_map(Step::Wait),
        (0usize..=30).prop_map(Step::Select),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Capacity never exceeds the limit, entries appear in submission
    /// order, each truncation reports exactly the candidates cut, and the
    /// active pointer always resolves.
    #[test]
    fn prop_capacity_order_and_active(steps in prop::collection::vec(step(), 1..40)) {
        let mut studio: Studio = Studio::default();
        let mut expected_names: Vec<String> = Vec::new();
        let mut batch_no = 0;

        for step in steps {
            match step {
                Step::Submit(k) => {
                    let prefix = format!("b{batch_no}");
                    batch_no += 1;
                    let c = studio.session().len();
                    let created = studio.submit_batch(common::pngs(&prefix, k));

                    let room = MAX_ENTRIES.saturating_sub(c);
                    prop_assert_eq!(created.len(), k.min(room));
                    let notices = studio.take_notices();
                    if c + k > MAX_ENTRIES {
                        prop_assert_eq!(
                            notices,
                            vec![Notice::CapacityExceeded { dropped: k - room }]
                        );
                    } else {
                        prop_assert!(notices.is_empty());
                    }
                    expected_names.extend((0..k.min(room)).map(|i| format!("{prefix}-{i}.png")));
                }
                Step::Wait(ms) => studio.advance_by(Duration::from_millis(ms)),
                Step::Select(i) => {
                    let before = studio.session().active_id();
                    let len = studio.session().len();
                    if i < len {
                        let id = studio.session().entries()[i].id;
                        prop_assert!(studio.select_active(id).is_ok());
                        prop_assert_eq!(studio.session().active_id(), Some(id));
                    } else {
                        let bogus = upcat_session::EntryId::from_raw(10_000 + i as u64);
                        prop_assert!(studio.select_active(bogus).is_err());
                        prop_assert_eq!(studio.session().active_id(), before);
                    }
                }
            }

            let session = studio.session();
            prop_assert!(session.len() <= MAX_ENTRIES);
            match session.active_id() {
                None => prop_assert!(session.is_empty()),
                Some(id) => prop_assert!(session.get(id).is_some()),
            }
            let names: Vec<_> = session.entries().iter().map(|e| e.source.name.clone()).collect();
            prop_assert_eq!(&names, &expected_names);
        }

        // Once everything has run, every entry is ready.
        studio.run_until_idle();
        prop_assert!(studio
            .session()
            .entries()
            .iter()
            .all(|e| e.status == EntryStatus::Ready));
    }

    /// Entries of a batch are all processing until the latency elapses,
    /// then all ready together.
    #[test]
    fn prop_batch_completes_together(seed in 1usize..=5, k in 1usize..=10, early_ms in 0u64..2000) {
        let mut studio: Studio = Studio::default();
        studio.submit_batch(common::pngs("seed", seed));
        studio.run_until_idle();

        let ids = studio.submit_batch(common::pngs("batch", k));
        studio.advance_by(Duration::from_millis(early_ms));
        for id in &ids {
            prop_assert_eq!(studio.session().get(*id).unwrap().status, EntryStatus::Processing);
        }
        studio.advance_by(Duration::from_millis(2000 - early_ms));
        for id in &ids {
            prop_assert_eq!(studio.session().get(*id).unwrap().status, EntryStatus::Ready);
        }
    }
}
