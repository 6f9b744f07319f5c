//! Track sampling: one algorithm over [`KeyframeView`], shared by packed and
//! unpacked storage.
//!
//! Model:
//! - time is clamped to [0, last keyframe time]
//! - the bracketing keyframes come from the dichotomic search
//! - the stored value is returned verbatim when interpolation is off, the type
//!   is atomic, the time sits exactly on (or before) a keyframe, or there is
//!   no later keyframe
//! - otherwise the layout kernel from `interp::functions` writes into `out`

use keytake_api_core::Value;

use crate::interp::functions::{cubic_into, linear_into};
use crate::interp::Interpolation;
use crate::keyframe::KeyValue;
use crate::kind::{TrackType, TypeLayout};
use crate::storage::KeyframeView;

/// A sampled value, borrowed from either the track storage or an output buffer.
///
/// Multi-component samples may point into a track-owned scratch buffer; copy
/// (`to_key_value`, `to_value`) before sampling the same track again.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sample<'a> {
    Scalar(f32),
    Components(&'a [f32]),
    Atomic(&'a KeyValue),
}

impl<'a> Sample<'a> {
    /// Numeric components, `None` for atomic samples.
    #[inline]
    pub fn components(&self) -> Option<&[f32]> {
        match self {
            Sample::Scalar(x) => Some(std::slice::from_ref(x)),
            Sample::Components(c) => Some(c),
            Sample::Atomic(v) => v.components(),
        }
    }

    #[inline]
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Sample::Scalar(x) => Some(*x),
            Sample::Atomic(KeyValue::Scalar(x)) => Some(*x),
            _ => None,
        }
    }

    /// Owned copy, detached from any scratch storage.
    pub fn to_key_value(&self) -> KeyValue {
        match self {
            Sample::Scalar(x) => KeyValue::Scalar(*x),
            Sample::Components(c) => KeyValue::from_components(c),
            Sample::Atomic(v) => (*v).clone(),
        }
    }

    /// External representation for a track of `track_type`.
    pub fn to_value(&self, track_type: TrackType) -> Option<Value> {
        match self {
            Sample::Atomic(v) => v.to_value(track_type),
            _ => track_type.components_to_value(self.components()?),
        }
    }
}

/// Sample `view` at `time`. Interpolated results are written into `out`.
pub(crate) fn sample_view<'a>(
    view: KeyframeView<'a>,
    layout: TypeLayout,
    interpolation: Interpolation,
    time: f64,
    interpolate: bool,
    out: &'a mut Vec<f32>,
) -> Option<Sample<'a>> {
    let n = view.len();
    if n == 0 {
        return None;
    }

    let duration = view.time(n - 1);
    let mut time = time;
    if time > duration {
        time = duration;
    }
    if time < 0.0 {
        time = 0.0;
    }

    let index = view.find_time_index(time)?;
    let index_b = index + 1;
    let time_a = view.time(index);

    if !interpolate
        || interpolation == Interpolation::None
        || layout.is_atomic()
        || index_b >= n
        || time <= time_a
    {
        return Some(view.stored(index));
    }

    let (Some(a), Some(b)) = (view.components(index), view.components(index_b)) else {
        return Some(view.stored(index));
    };

    let time_b = view.time(index_b);
    let t = ((time_b - time) / (time_b - time_a)) as f32;

    match interpolation {
        Interpolation::Cubic => {
            let pre_a = if index > 0 {
                view.components(index - 1).unwrap_or(a)
            } else {
                a
            };
            let post_b = if index_b + 1 < n {
                view.components(index_b + 1).unwrap_or(b)
            } else {
                b
            };
            cubic_into(layout, pre_a, a, b, post_b, t, out);
        }
        Interpolation::Linear | Interpolation::None => linear_into(layout, a, b, t, out),
    }

    if layout.value_size == 1 {
        Some(Sample::Scalar(out[0]))
    } else {
        Some(Sample::Components(out.as_slice()))
    }
}
