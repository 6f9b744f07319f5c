//! Results reported by takes and animations.

use serde::{Deserialize, Serialize};

/// Inputs of one `Take::apply_tracks` tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplyParams {
    /// Playhead now (seconds).
    pub current_time: f64,
    /// Playhead at the previous tick; events fire in `(last_time, current_time]`.
    pub last_time: f64,
    /// Hold keyframes instead of interpolating.
    pub ignore_interpolation: bool,
    /// 1 writes samples as-is; lower values blend toward the live value.
    pub weight: f32,
}

impl ApplyParams {
    pub fn new(current_time: f64, last_time: f64) -> Self {
        Self {
            current_time,
            last_time,
            ignore_interpolation: false,
            weight: 1.0,
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn ignoring_interpolation(mut self) -> Self {
        self.ignore_interpolation = true;
        self
    }
}

/// What a single `apply_tracks` call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    /// Property writes the resolver accepted.
    pub written: usize,
    /// Events triggered plus methods called.
    pub events_fired: usize,
    /// Tracks skipped (disabled, empty, hooks, unresolved, outside window).
    pub skipped: usize,
}

/// Structural change notifications queued by [`crate::Animation`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AnimationNotification {
    TakeAdded { name: String },
    TakeRenamed { old_name: String, new_name: String },
    TakeRemoved { name: String },
}
