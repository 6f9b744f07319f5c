//! Baking API: resample every numeric track of a take at a fixed frame rate.

use keytake_api_core::Value;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::kind::TrackType;
use crate::take::Take;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BakingConfig {
    /// Target frame rate (Hz) for baked samples.
    pub frame_rate: f32,
    /// Start time (seconds).
    pub start_time: f64,
    /// End time (seconds); if None, uses the take duration.
    pub end_time: Option<f64>,
    /// Frames per track are clamped to this.
    pub max_frames: usize,
}

impl Default for BakingConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            start_time: 0.0,
            end_time: None,
            max_frames: 65_536,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BakedTrack {
    pub property: String,
    pub track_type: TrackType,
    /// One value per frame.
    pub values: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BakedTake {
    pub take: String,
    pub frame_rate: f32,
    pub start_time: f64,
    pub end_time: f64,
    pub tracks: Vec<BakedTrack>,
}

/// Bake `take` over `[start, end]`, endpoints included. Disabled, empty and
/// atomic tracks are left out.
pub fn bake_take(take: &Take, cfg: &BakingConfig) -> BakedTake {
    let fr = if cfg.frame_rate.is_finite() && cfg.frame_rate > 0.0 {
        cfg.frame_rate
    } else {
        60.0
    };
    let start = if cfg.start_time.is_finite() {
        cfg.start_time.max(0.0)
    } else {
        0.0
    };
    let end = cfg
        .end_time
        .filter(|e| e.is_finite())
        .unwrap_or(take.duration)
        .max(start);

    // Clamped in f64 first; the span can overflow usize or be infinite.
    let needed = ((end - start) * f64::from(fr)).ceil() + 1.0;
    let frames = if needed > cfg.max_frames as f64 {
        warn!(
            "baking '{}' needs {needed} frames, clamping to {}",
            take.name, cfg.max_frames
        );
        cfg.max_frames
    } else {
        needed as usize
    };

    let tracks = take
        .tracks()
        .iter()
        .filter(|t| t.enabled && !t.is_empty() && !t.layout().is_atomic())
        .map(|track| BakedTrack {
            property: track.property().to_string(),
            track_type: track.track_type(),
            values: track
                .sampled_data(start, end, frames)
                .iter()
                .filter_map(|k| k.to_value(track.track_type()))
                .collect(),
        })
        .collect();

    BakedTake {
        take: take.name.clone(),
        frame_rate: fr,
        start_time: start,
        end_time: end,
        tracks,
    }
}

/// Export baked data as serde_json::Value.
pub fn export_baked_json(baked: &BakedTake) -> serde_json::Value {
    serde_json::to_value(baked).unwrap_or(serde_json::Value::Null)
}
