//! Interpolation modes and the per-layout blending kernels.

pub mod functions;

use serde::{Deserialize, Serialize};

/// How values between two keyframes are produced.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Hold the earlier keyframe.
    None,
    #[default]
    Linear,
    /// Hermite spline through the neighbouring keyframes.
    Cubic,
}
