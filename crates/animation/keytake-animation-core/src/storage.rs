//! Track storage: unpacked keyframe list or packed flat buffer, and a single
//! read-only view over either so that searching and sampling exist once.

use crate::keyframe::{KeyValue, Keyframe};
use crate::sampling::Sample;

/// The two physical layouts of a track's keyframes.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackData {
    /// Editable `(time, value)` pairs sorted by time.
    Unpacked(Vec<Keyframe>),
    /// Flat records `[time, v0..v(n-1)]` with stride `value_size + 1`.
    Packed(Vec<f32>),
}

impl Default for TrackData {
    fn default() -> Self {
        TrackData::Unpacked(Vec::new())
    }
}

impl TrackData {
    #[inline]
    pub fn is_packed(&self) -> bool {
        matches!(self, TrackData::Packed(_))
    }

    #[inline]
    pub(crate) fn view(&self, stride: usize) -> KeyframeView<'_> {
        match self {
            TrackData::Unpacked(keys) => KeyframeView::Unpacked(keys),
            TrackData::Packed(buffer) => KeyframeView::Packed { buffer, stride },
        }
    }
}

/// Uniform read access to keyframes regardless of layout.
#[derive(Clone, Copy, Debug)]
pub(crate) enum KeyframeView<'a> {
    Unpacked(&'a [Keyframe]),
    Packed { buffer: &'a [f32], stride: usize },
}

impl<'a> KeyframeView<'a> {
    #[inline]
    pub fn len(&self) -> usize {
        match *self {
            KeyframeView::Unpacked(keys) => keys.len(),
            KeyframeView::Packed { buffer, stride } => {
                if stride == 0 {
                    0
                } else {
                    buffer.len() / stride
                }
            }
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time of keyframe `i`. Callers keep `i < len()`.
    #[inline]
    pub fn time(&self, i: usize) -> f64 {
        match *self {
            KeyframeView::Unpacked(keys) => keys[i].time,
            KeyframeView::Packed { buffer, stride } => f64::from(buffer[i * stride]),
        }
    }

    /// Numeric components of keyframe `i`, `None` for atomic values.
    #[inline]
    pub fn components(&self, i: usize) -> Option<&'a [f32]> {
        match *self {
            KeyframeView::Unpacked(keys) => keys[i].value.components(),
            KeyframeView::Packed { buffer, stride } => {
                let start = i * stride + 1;
                Some(&buffer[start..start + stride - 1])
            }
        }
    }

    /// The stored value of keyframe `i`, borrowed.
    pub fn stored(&self, i: usize) -> Sample<'a> {
        match *self {
            KeyframeView::Unpacked(keys) => match &keys[i].value {
                KeyValue::Scalar(x) => Sample::Scalar(*x),
                KeyValue::Vector(v) => Sample::Components(v),
                other => Sample::Atomic(other),
            },
            KeyframeView::Packed { buffer, stride } => {
                let start = i * stride + 1;
                if stride == 2 {
                    Sample::Scalar(buffer[start])
                } else {
                    Sample::Components(&buffer[start..start + stride - 1])
                }
            }
        }
    }

    /// Owned copy of keyframe `i`.
    pub fn keyframe(&self, i: usize) -> Keyframe {
        match *self {
            KeyframeView::Unpacked(keys) => keys[i].clone(),
            KeyframeView::Packed { .. } => Keyframe {
                time: self.time(i),
                value: self.stored(i).to_key_value(),
            },
        }
    }

    /// Index of the last keyframe whose time is `<= time` (dichotomic search).
    ///
    /// - no keyframes: `None`
    /// - one keyframe, or `time` before the first keyframe: `Some(0)`
    /// - `time` at or past the last keyframe: the last index
    pub fn find_time_index(&self, time: f64) -> Option<usize> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        if n == 1 || time >= self.time(n - 1) {
            return Some(n - 1);
        }
        // time(imax) > time holds throughout.
        let mut imin = 0;
        let mut imax = n - 1;
        while imax - imin > 1 {
            let imid = (imin + imax) / 2;
            if self.time(imid) <= time {
                imin = imid;
            } else {
                imax = imid;
            }
        }
        Some(imin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(times: &[f64]) -> Vec<Keyframe> {
        times.iter().map(|&t| Keyframe::new(t, t as f32)).collect()
    }

    fn packed(times: &[f64]) -> Vec<f32> {
        times.iter().flat_map(|&t| [t as f32, t as f32]).collect()
    }

    #[test]
    fn edge_rules() {
        let empty: Vec<Keyframe> = Vec::new();
        assert_eq!(KeyframeView::Unpacked(&empty).find_time_index(1.0), None);

        let one = keys(&[2.0]);
        let v = KeyframeView::Unpacked(&one);
        assert_eq!(v.find_time_index(0.0), Some(0));
        assert_eq!(v.find_time_index(5.0), Some(0));

        let many = keys(&[0.5, 1.0, 2.0, 3.0]);
        let v = KeyframeView::Unpacked(&many);
        assert_eq!(v.find_time_index(0.0), Some(0));
        assert_eq!(v.find_time_index(1.0), Some(1));
        assert_eq!(v.find_time_index(1.5), Some(1));
        assert_eq!(v.find_time_index(2.999), Some(2));
        assert_eq!(v.find_time_index(3.0), Some(3));
        assert_eq!(v.find_time_index(99.0), Some(3));
    }

    #[test]
    fn duplicates_resolve_to_last() {
        let many = keys(&[0.0, 1.0, 1.0, 1.0, 2.0]);
        let v = KeyframeView::Unpacked(&many);
        assert_eq!(v.find_time_index(1.0), Some(3));
    }

    #[test]
    fn packed_view_matches_unpacked() {
        let times = [0.0, 0.25, 0.5, 1.0, 4.0];
        let k = keys(&times);
        let p = packed(&times);
        let a = KeyframeView::Unpacked(&k);
        let b = KeyframeView::Packed {
            buffer: &p,
            stride: 2,
        };
        assert_eq!(a.len(), b.len());
        for probe in [-1.0, 0.0, 0.1, 0.25, 0.7, 1.0, 3.9, 4.0, 10.0] {
            assert_eq!(a.find_time_index(probe), b.find_time_index(probe));
        }
        assert_eq!(b.keyframe(2), Keyframe::new(0.5, 0.5f32));
    }
}
