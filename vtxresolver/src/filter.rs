//! Duration validity filter applied to raced candidates
//!
//! Proxy pools sometimes hand back the wrong video: a live version, an
//! extended mix, a ten-hour loop. When both durations are known, a candidate
//! is accepted only if it is close enough to what the caller expects.

use vtxsource::{StreamDescriptor, TrackRequest};

pub const DEFAULT_RATIO: f64 = 0.15;
pub const DEFAULT_CAP_SECONDS: u32 = 30;

/// Maximum allowed gap between candidate and expected durations
///
/// The gap may not exceed `ratio × expected`, nor `cap_seconds`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationTolerance {
    pub ratio: f64,
    pub cap_seconds: u32,
}

impl Default for DurationTolerance {
    fn default() -> Self {
        Self {
            ratio: DEFAULT_RATIO,
            cap_seconds: DEFAULT_CAP_SECONDS,
        }
    }
}

impl DurationTolerance {
    pub fn new(ratio: f64, cap_seconds: u32) -> Self {
        Self {
            ratio: ratio.max(0.0),
            cap_seconds,
        }
    }

    /// Largest accepted gap for a track expected to last `expected` seconds
    pub fn allowed_gap(&self, expected: u32) -> f64 {
        (self.ratio * expected as f64).min(self.cap_seconds as f64)
    }

    /// Accepts when either duration is unknown
    pub fn accepts(&self, candidate: Option<u32>, expected: Option<u32>) -> bool {
        let (Some(candidate), Some(expected)) = (candidate, expected) else {
            return true;
        };
        (candidate as f64 - expected as f64).abs() <= self.allowed_gap(expected)
    }

    /// Compare la durée d'un candidat à celle attendue par la requête
    pub fn accepts_descriptor(
        &self,
        descriptor: &StreamDescriptor,
        request: &TrackRequest,
    ) -> bool {
        self.accepts(descriptor.duration_seconds, request.expected_duration_seconds)
    }
}
