//! Studio configuration: the simulated latencies.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Simulated latencies for each deferred phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Latencies {
    /// Global "uploading" screen shown for the session's first batch.
    #[serde(with = "duration_serde")]
    pub upload: Duration,
    /// Global "enhancing" screen following the upload screen.
    #[serde(with = "duration_serde")]
    pub enhance: Duration,
    /// Per-entry processing for batches after the first.
    #[serde(with = "duration_serde")]
    pub processing: Duration,
    /// Processing after replacing the active image.
    #[serde(with = "duration_serde")]
    pub replace: Duration,
    /// Delay before a requested download is handed over.
    #[serde(with = "duration_serde")]
    pub download: Duration,
}

impl Latencies {
    /// Default for every phase.
    pub const DEFAULT_PHASE: Duration = Duration::from_secs(2);

    /// Every phase set to the same duration.
    #[must_use]
    pub const fn uniform(phase: Duration) -> Self {
        Self {
            upload: phase,
            enhance: phase,
            processing: phase,
            replace: phase,
            download: phase,
        }
    }
}

impl Default for Latencies {
    fn default() -> Self {
        Self::uniform(Self::DEFAULT_PHASE)
    }
}

/// Configuration for a [`Studio`](crate::Studio).
///
/// The capacity ([`MAX_ENTRIES`](crate::MAX_ENTRIES)) and dimension
/// ceiling ([`MAX_DIMENSIONS`](crate::validate::MAX_DIMENSIONS)) are
/// fixed and deliberately not part of the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Simulated latencies.
    pub latencies: Latencies,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_two_seconds() {
        let latencies = Latencies::default();
        assert_eq!(latencies, Latencies::uniform(Duration::from_secs(2)));
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: StudioConfig =
            serde_json::from_str(r#"{"latencies": {"download": 0.25}}"#).unwrap();
        assert_eq!(config.latencies.download, Duration::from_millis(250));
        assert_eq!(config.latencies.upload, Latencies::DEFAULT_PHASE);
    }

    #[test]
    fn negative_duration_is_rejected() {
        let result: Result<StudioConfig, _> =
            serde_json::from_str(r#"{"latencies": {"upload": -1.0}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn serializes_as_fractional_seconds() {
        let json = serde_json::to_value(StudioConfig::default()).unwrap();
        assert_eq!(json["latencies"]["processing"], 2.0);
    }
}
