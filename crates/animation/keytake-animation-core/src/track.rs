//! Track: one property's keyframes plus interpolation and storage settings.
//!
//! A track owns a scratch buffer reused by [`Track::sample`]. The returned
//! [`Sample`] borrows the track mutably, so two live samples from the same
//! track cannot coexist; use [`Track::sample_into`] with separate buffers to
//! keep several results at once.

use keytake_api_core::matrix::decompose_trs;
use keytake_api_core::Locator;
use log::{debug, warn};

use crate::error::TrackError;
use crate::interp::Interpolation;
use crate::keyframe::{KeyValue, Keyframe};
use crate::kind::{TrackType, TypeLayout};
use crate::sampling::{sample_view, Sample};
use crate::storage::{KeyframeView, TrackData};

#[derive(Clone, Debug)]
pub struct Track {
    /// Disabled tracks are skipped by `Take::apply_tracks`.
    pub enabled: bool,
    /// Display name; defaults to the locator string.
    pub name: String,
    pub interpolation: Interpolation,
    /// Reserved for wrap-around blending.
    pub looped: bool,
    locator: Locator,
    track_type: TrackType,
    layout: TypeLayout,
    data: TrackData,
    /// Opaque editor payload, carried through serialization untouched.
    pub(crate) data_table: Option<serde_json::Value>,
    duration: f64,
    scratch: Vec<f32>,
}

impl Track {
    /// Create an empty, unpacked, linearly interpolated track.
    pub fn new(property: &str, track_type: TrackType) -> Result<Self, TrackError> {
        let locator =
            Locator::parse(property).map_err(|reason| TrackError::InvalidLocator { reason })?;
        let layout = track_type.layout();
        Ok(Self {
            enabled: true,
            name: property.to_string(),
            interpolation: Interpolation::Linear,
            looped: false,
            locator,
            track_type,
            layout,
            data: TrackData::default(),
            data_table: None,
            duration: 0.0,
            scratch: Vec::with_capacity(layout.value_size),
        })
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    #[inline]
    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    #[inline]
    pub fn property(&self) -> &str {
        self.locator.as_str()
    }

    pub fn set_locator(&mut self, property: &str) -> Result<(), TrackError> {
        self.locator =
            Locator::parse(property).map_err(|reason| TrackError::InvalidLocator { reason })?;
        Ok(())
    }

    #[inline]
    pub fn track_type(&self) -> TrackType {
        self.track_type
    }

    #[inline]
    pub fn layout(&self) -> TypeLayout {
        self.layout
    }

    #[inline]
    pub fn value_size(&self) -> usize {
        self.layout.value_size
    }

    #[inline]
    pub fn is_packed(&self) -> bool {
        self.data.is_packed()
    }

    #[inline]
    pub fn data(&self) -> &TrackData {
        &self.data
    }

    /// Time of the last keyframe as of the latest mutation.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Numeric tracks with interpolation enabled.
    pub fn is_interpolable(&self) -> bool {
        !self.layout.is_atomic() && self.interpolation != Interpolation::None
    }

    #[inline]
    fn view(&self) -> KeyframeView<'_> {
        self.data.view(self.layout.stride())
    }

    pub fn number_of_keyframes(&self) -> usize {
        self.view().len()
    }

    pub fn is_empty(&self) -> bool {
        self.view().is_empty()
    }

    /// Drop every keyframe, keeping the current storage layout.
    pub fn clear(&mut self) {
        self.data = match self.data {
            TrackData::Unpacked(_) => TrackData::Unpacked(Vec::new()),
            TrackData::Packed(_) => TrackData::Packed(Vec::new()),
        };
        self.duration = 0.0;
    }

    /// Replace the data wholesale. Packed buffers must hold whole records and
    /// unpacked keyframes must fit the track type. Out-of-order keyframes are
    /// stably sorted by time.
    pub fn set_data(&mut self, data: TrackData) -> Result<(), TrackError> {
        match &data {
            TrackData::Packed(buffer) => {
                let stride = self.layout.stride();
                if self.layout.is_atomic() || buffer.len() % stride != 0 {
                    return Err(TrackError::MalformedData {
                        locator: self.locator.to_string(),
                        reason: format!(
                            "packed buffer of {} floats does not divide into records of {stride}",
                            buffer.len()
                        ),
                    });
                }
            }
            TrackData::Unpacked(keys) => {
                for key in keys {
                    check_time(key.time)?;
                    key.value.validate_for(self.track_type, self.locator.as_str())?;
                }
            }
        }
        self.data = data;
        if let TrackData::Unpacked(keys) = &mut self.data {
            for key in keys.iter_mut() {
                normalize_scalar(&mut key.value);
            }
        }
        let view = self.view();
        let sorted = (1..view.len()).all(|i| view.time(i - 1) <= view.time(i));
        if sorted {
            self.compute_duration();
        } else {
            debug!("sorting out-of-order keyframes on '{}'", self.locator);
            self.sort_keyframes();
        }
        Ok(())
    }

    /// Switch to the unpacked layout if needed and hand out the keyframes.
    fn keys_mut(&mut self) -> &mut Vec<Keyframe> {
        self.unpack_data();
        match &mut self.data {
            TrackData::Unpacked(keys) => keys,
            TrackData::Packed(_) => unreachable!("unpack_data leaves the track unpacked"),
        }
    }

    /// Insert a keyframe, or overwrite the value of one at exactly `time`
    /// unless `skip_replace` is set. Returns the keyframe's index.
    pub fn add_keyframe(
        &mut self,
        time: f64,
        value: impl Into<KeyValue>,
        skip_replace: bool,
    ) -> Result<usize, TrackError> {
        check_time(time)?;
        let mut value = value.into();
        value.validate_for(self.track_type, self.locator.as_str())?;
        normalize_scalar(&mut value);

        let keys = self.keys_mut();
        let index = keys.partition_point(|k| k.time < time);
        let replace = !skip_replace && keys.get(index).is_some_and(|k| k.time == time);
        if replace {
            keys[index].value = value;
        } else {
            keys.insert(index, Keyframe { time, value });
        }
        self.compute_duration();
        Ok(index)
    }

    /// Owned copy of keyframe `index`.
    pub fn get_keyframe(&self, index: usize) -> Option<Keyframe> {
        let view = self.view();
        if index >= view.len() {
            warn!(
                "keyframe index {index} out of range on '{}' ({} keyframes)",
                self.locator,
                view.len()
            );
            return None;
        }
        Some(view.keyframe(index))
    }

    pub fn keyframe_time(&self, index: usize) -> Option<f64> {
        let view = self.view();
        (index < view.len()).then(|| view.time(index))
    }

    /// The keyframe in effect at `time` (last one at or before it).
    pub fn get_keyframe_by_time(&self, time: f64) -> Option<Keyframe> {
        let view = self.view();
        view.find_time_index(time).map(|i| view.keyframe(i))
    }

    pub fn remove_keyframe(&mut self, index: usize) -> Option<Keyframe> {
        if index >= self.number_of_keyframes() {
            warn!(
                "cannot remove keyframe {index} from '{}' ({} keyframes)",
                self.locator,
                self.number_of_keyframes()
            );
            return None;
        }
        let removed = self.keys_mut().remove(index);
        self.compute_duration();
        Some(removed)
    }

    /// Move keyframe `index` to `new_time`, keeping the order sorted.
    /// Returns its new index.
    pub fn move_keyframe(&mut self, index: usize, new_time: f64) -> Option<usize> {
        if !new_time.is_finite() {
            warn!("ignoring move of keyframe {index} to non-finite time {new_time}");
            return None;
        }
        if index >= self.number_of_keyframes() {
            warn!(
                "cannot move keyframe {index} on '{}' ({} keyframes)",
                self.locator,
                self.number_of_keyframes()
            );
            return None;
        }
        let keys = self.keys_mut();
        let mut key = keys.remove(index);
        key.time = new_time;
        let new_index = keys.partition_point(|k| k.time < new_time);
        keys.insert(new_index, key);
        self.compute_duration();
        Some(new_index)
    }

    /// Stable sort by time, in whichever layout the track currently uses.
    pub fn sort_keyframes(&mut self) {
        let stride = self.layout.stride();
        match &mut self.data {
            TrackData::Unpacked(keys) => keys.sort_by(|a, b| a.time.total_cmp(&b.time)),
            TrackData::Packed(buffer) => {
                let mut records: Vec<&[f32]> = buffer.chunks_exact(stride).collect();
                records.sort_by(|a, b| a[0].total_cmp(&b[0]));
                let sorted = records.concat();
                *buffer = sorted;
            }
        }
        self.compute_duration();
    }

    /// Index of the last keyframe at or before `time`; see [`KeyframeView::find_time_index`].
    pub fn find_time_index(&self, time: f64) -> Option<usize> {
        self.view().find_time_index(time)
    }

    /// Sample into the track's own scratch buffer.
    pub fn sample(&mut self, time: f64, interpolate: bool) -> Option<Sample<'_>> {
        let view = self.data.view(self.layout.stride());
        sample_view(
            view,
            self.layout,
            self.interpolation,
            time,
            interpolate,
            &mut self.scratch,
        )
    }

    /// Sample into a caller-provided buffer; the track itself is not touched.
    pub fn sample_into<'a>(
        &'a self,
        time: f64,
        interpolate: bool,
        result: &'a mut Vec<f32>,
    ) -> Option<Sample<'a>> {
        sample_view(
            self.view(),
            self.layout,
            self.interpolation,
            time,
            interpolate,
            result,
        )
    }

    /// Convert to the flat buffer layout. Atomic tracks stay unpacked.
    /// Returns whether the track is packed afterwards.
    pub fn pack_data(&mut self) -> bool {
        if self.layout.is_atomic() {
            return false;
        }
        let TrackData::Unpacked(keys) = &self.data else {
            return true;
        };
        let mut buffer = Vec::with_capacity(keys.len() * self.layout.stride());
        for key in keys {
            buffer.push(key.time as f32);
            if let Some(c) = key.value.components() {
                buffer.extend_from_slice(c);
            }
        }
        debug!("packed {} keyframes on '{}'", keys.len(), self.locator);
        self.data = TrackData::Packed(buffer);
        true
    }

    /// Convert back to `(time, value)` pairs.
    pub fn unpack_data(&mut self) {
        let TrackData::Packed(_) = &self.data else {
            return;
        };
        let view = self.view();
        let keys: Vec<Keyframe> = (0..view.len()).map(|i| view.keyframe(i)).collect();
        debug!("unpacked {} keyframes on '{}'", keys.len(), self.locator);
        self.data = TrackData::Unpacked(keys);
    }

    /// Recompute and store the duration (time of the last keyframe).
    pub fn compute_duration(&mut self) -> f64 {
        let view = self.view();
        let duration = if view.is_empty() {
            0.0
        } else {
            view.time(view.len() - 1)
        };
        self.duration = duration;
        duration
    }

    /// Resample `n` evenly spaced points over `[start, end]` (both included).
    /// Every entry is an owned copy.
    pub fn sampled_data(&self, start: f64, end: f64, n: usize) -> Vec<KeyValue> {
        let mut buffer = Vec::with_capacity(self.layout.value_size);
        let step = if n > 1 {
            (end - start) / (n - 1) as f64
        } else {
            0.0
        };
        let mut out = Vec::new();
        for i in 0..n {
            let time = start + step * i as f64;
            match self.sample_into(time, true, &mut buffer) {
                Some(sample) => out.push(sample.to_key_value()),
                None => break,
            }
        }
        out
    }

    /// Rewrite a 4x4 matrix track as a ten-float transform track
    /// (translation, rotation quaternion, scale). Keyframe times and the
    /// storage layout are preserved; a trailing `matrix` locator segment
    /// becomes `data`.
    pub fn convert_to_trans10(&mut self) -> Result<(), TrackError> {
        if self.track_type != TrackType::Mat4 {
            return Err(TrackError::NotMatrixTrack {
                locator: self.locator.to_string(),
                track_type: self.track_type,
            });
        }
        let was_packed = self.is_packed();
        let view = self.view();
        let mut keys = Vec::with_capacity(view.len());
        for i in 0..view.len() {
            let Some(Ok(m)) = view.components(i).map(<[f32; 16]>::try_from) else {
                return Err(TrackError::MalformedData {
                    locator: self.locator.to_string(),
                    reason: format!("keyframe {i} is not a 16-float matrix"),
                });
            };
            let (pos, rot, scale) = decompose_trs(&m);
            let mut trs = Vec::with_capacity(10);
            trs.extend_from_slice(&pos);
            trs.extend_from_slice(&rot);
            trs.extend_from_slice(&scale);
            keys.push(Keyframe {
                time: view.time(i),
                value: KeyValue::Vector(trs),
            });
        }

        self.track_type = TrackType::Trans10;
        self.layout = TrackType::Trans10.layout();
        self.data = TrackData::Unpacked(keys);
        if self.locator.last_segment() == Some("matrix") {
            self.locator = self.locator.with_last_segment("data");
        }
        if was_packed {
            self.pack_data();
        }
        debug!("converted '{}' to trans10", self.locator);
        Ok(())
    }
}

fn check_time(time: f64) -> Result<(), TrackError> {
    if time.is_finite() {
        Ok(())
    } else {
        Err(TrackError::InvalidTime { time })
    }
}

/// One-component vectors are stored as scalars so both layouts agree.
fn normalize_scalar(value: &mut KeyValue) {
    if let KeyValue::Vector(v) = value {
        if v.len() == 1 {
            *value = KeyValue::Scalar(v[0]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number_track(keys: &[(f64, f32)]) -> Track {
        let mut track = Track::new("node/x", TrackType::Number).unwrap();
        for &(t, v) in keys {
            track.add_keyframe(t, v, false).unwrap();
        }
        track
    }

    #[test]
    fn add_keeps_order_and_replaces_exact_times() {
        let mut track = number_track(&[(1.0, 1.0), (0.0, 0.0), (2.0, 2.0)]);
        assert_eq!(track.number_of_keyframes(), 3);
        assert_eq!(track.keyframe_time(0), Some(0.0));
        assert_eq!(track.duration(), 2.0);

        assert_eq!(track.add_keyframe(1.0, 5.0, false).unwrap(), 1);
        assert_eq!(track.number_of_keyframes(), 3);
        assert_eq!(track.get_keyframe(1).unwrap().value, KeyValue::Scalar(5.0));

        assert_eq!(track.add_keyframe(1.0, 6.0, true).unwrap(), 1);
        assert_eq!(track.number_of_keyframes(), 4);
        assert_eq!(track.get_keyframe(1).unwrap().value, KeyValue::Scalar(6.0));
        assert_eq!(track.get_keyframe(2).unwrap().value, KeyValue::Scalar(5.0));
    }

    #[test]
    fn add_rejects_wrong_sizes_and_times() {
        let mut track = Track::new("node/pos", TrackType::Vec3).unwrap();
        assert!(matches!(
            track.add_keyframe(0.0, [1.0, 2.0], false),
            Err(TrackError::ValueSizeMismatch { expected: 3, actual: 2, .. })
        ));
        assert!(matches!(
            track.add_keyframe(f64::NAN, [1.0, 2.0, 3.0], false),
            Err(TrackError::InvalidTime { .. })
        ));
        assert!(track.is_empty());
    }

    #[test]
    fn stored_vectors_do_not_alias_caller_data() {
        let mut track = Track::new("node/pos", TrackType::Vec3).unwrap();
        let mut v = vec![1.0, 2.0, 3.0];
        track.add_keyframe(0.0, v.clone(), false).unwrap();
        v[0] = 99.0;
        assert_eq!(
            track.get_keyframe(0).unwrap().value,
            KeyValue::Vector(vec![1.0, 2.0, 3.0])
        );
    }

    #[test]
    fn out_of_range_index_is_soft() {
        let mut track = number_track(&[(0.0, 1.0)]);
        assert!(track.get_keyframe(3).is_none());
        assert!(track.remove_keyframe(3).is_none());
        assert!(track.move_keyframe(3, 1.0).is_none());
        assert_eq!(track.number_of_keyframes(), 1);
    }

    #[test]
    fn move_and_remove() {
        let mut track = number_track(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(track.move_keyframe(0, 1.5), Some(1));
        assert_eq!(track.keyframe_time(1), Some(1.5));
        assert_eq!(track.get_keyframe(1).unwrap().value, KeyValue::Scalar(0.0));
        assert_eq!(track.move_keyframe(2, 5.0), Some(2));
        assert_eq!(track.duration(), 5.0);
        let removed = track.remove_keyframe(2).unwrap();
        assert_eq!(removed.time, 5.0);
        assert_eq!(track.duration(), 1.5);
    }

    #[test]
    fn set_data_sorts_packed_records() {
        let mut track = Track::new("node/x", TrackType::Number).unwrap();
        track
            .set_data(TrackData::Packed(vec![2.0, 20.0, 0.0, 0.0, 1.0, 10.0]))
            .unwrap();
        let sorted = TrackData::Packed(vec![0.0, 0.0, 1.0, 10.0, 2.0, 20.0]);
        assert_eq!(track.data(), &sorted);
        assert_eq!(track.duration(), 2.0);
        assert_eq!(track.find_time_index(1.5), Some(1));

        track.sort_keyframes();
        assert_eq!(track.data(), &sorted);
    }

    #[test]
    fn set_data_sort_is_stable_for_equal_times() {
        let mut track = Track::new("node/x", TrackType::Number).unwrap();
        let keys = [(1.0, 1.0), (0.0, 0.0), (1.0, 2.0)]
            .map(|(time, v)| Keyframe { time, value: KeyValue::Scalar(v) });
        track.set_data(TrackData::Unpacked(keys.to_vec())).unwrap();
        assert_eq!(track.get_keyframe(1).unwrap().value, KeyValue::Scalar(1.0));
        assert_eq!(track.get_keyframe(2).unwrap().value, KeyValue::Scalar(2.0));
    }

    #[test]
    fn editing_packed_track_unpacks_it() {
        let mut track = number_track(&[(0.0, 0.0), (1.0, 1.0)]);
        assert!(track.pack_data());
        assert!(track.is_packed());
        track.add_keyframe(0.5, 7.0, false).unwrap();
        assert!(!track.is_packed());
        assert_eq!(track.number_of_keyframes(), 3);
    }

    #[test]
    fn atomic_tracks_never_pack() {
        let mut track = Track::new("node/visible", TrackType::Boolean).unwrap();
        track.add_keyframe(0.0, true, false).unwrap();
        assert!(!track.pack_data());
        assert!(!track.is_packed());
        assert!(!track.is_interpolable());
    }

    #[test]
    fn set_data_rejects_partial_records() {
        let mut track = Track::new("node/pos", TrackType::Vec2).unwrap();
        assert!(matches!(
            track.set_data(TrackData::Packed(vec![0.0, 1.0])),
            Err(TrackError::MalformedData { .. })
        ));
    }

    #[test]
    fn sampled_data_is_owned_and_evenly_spaced() {
        let track = number_track(&[(0.0, 0.0), (1.0, 10.0)]);
        let samples = track.sampled_data(0.0, 1.0, 5);
        assert_eq!(
            samples,
            vec![
                KeyValue::Scalar(0.0),
                KeyValue::Scalar(2.5),
                KeyValue::Scalar(5.0),
                KeyValue::Scalar(7.5),
                KeyValue::Scalar(10.0),
            ]
        );
        assert!(track.sampled_data(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn sampled_data_does_not_preallocate_the_request() {
        let track = Track::new("node/x", TrackType::Number).unwrap();
        assert!(track.sampled_data(0.0, 1.0, usize::MAX).is_empty());
    }

    #[test]
    fn convert_rejects_non_matrix_tracks() {
        let mut track = number_track(&[(0.0, 0.0)]);
        assert!(matches!(
            track.convert_to_trans10(),
            Err(TrackError::NotMatrixTrack { .. })
        ));
    }
}
