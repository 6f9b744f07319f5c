//! Take: a named, timed bundle of tracks applied together.

use keytake_api_core::blend::blend_values;
use keytake_api_core::Locator;
use log::{debug, trace, warn};

use crate::binding::{ApplyHooks, Dispatcher, PropertyResolver};
use crate::error::TrackError;
use crate::interp::Interpolation;
use crate::keyframe::KeyValue;
use crate::kind::TrackType;
use crate::outputs::{ApplyParams, ApplyReport};
use crate::track::Track;

#[derive(Clone, Debug)]
pub struct Take {
    pub name: String,
    /// Seconds. Callers keep this >= the longest track (see `compute_duration`).
    pub duration: f64,
    tracks: Vec<Track>,
}

impl Take {
    pub fn new(name: impl Into<String>, duration: f64) -> Self {
        Self {
            name: name.into(),
            duration,
            tracks: Vec::new(),
        }
    }

    #[inline]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    #[inline]
    pub fn tracks_mut(&mut self) -> &mut [Track] {
        &mut self.tracks
    }

    #[inline]
    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    pub fn get_track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn get_track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    /// Append a track, returning its index.
    pub fn add_track(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    /// Create and append an empty track.
    pub fn create_track(
        &mut self,
        property: &str,
        track_type: TrackType,
        interpolation: Interpolation,
    ) -> Result<&mut Track, TrackError> {
        let track = Track::new(property, track_type)?.with_interpolation(interpolation);
        let index = self.add_track(track);
        Ok(&mut self.tracks[index])
    }

    /// First track driving `locator`.
    pub fn find_track(&self, locator: &Locator) -> Option<usize> {
        self.tracks
            .iter()
            .position(|t| t.locator().segments() == locator.segments())
    }

    pub fn remove_track(&mut self, index: usize) -> Option<Track> {
        if index >= self.tracks.len() {
            warn!(
                "cannot remove track {index} from take '{}' ({} tracks)",
                self.name,
                self.tracks.len()
            );
            return None;
        }
        Some(self.tracks.remove(index))
    }

    /// Set `duration` to the longest track and return it.
    pub fn compute_duration(&mut self) -> f64 {
        self.duration = self
            .tracks
            .iter_mut()
            .map(Track::compute_duration)
            .fold(0.0, f64::max);
        self.duration
    }

    /// Pack every packable track; returns how many ended up packed.
    pub fn pack_tracks(&mut self) -> usize {
        self.tracks
            .iter_mut()
            .map(Track::pack_data)
            .filter(|&packed| packed)
            .count()
    }

    pub fn unpack_tracks(&mut self) {
        for track in &mut self.tracks {
            track.unpack_data();
        }
    }

    /// Apply every enabled, non-empty track at `params.current_time`.
    ///
    /// Event tracks fire when their keyframe at `current_time` lies in
    /// `(last_time, current_time]`. The window is checked afresh on every
    /// call, so repeating a call with the same window fires again.
    ///
    /// Other tracks are sampled, blended toward the live value when
    /// `weight != 1` (`sample*weight + current*(1-weight)`; step kinds pick the
    /// sample from `weight >= 0.5`), then written through `resolver`.
    pub fn apply_tracks<R, D, H>(
        &mut self,
        params: ApplyParams,
        resolver: &mut R,
        dispatcher: &mut D,
        hooks: &mut H,
    ) -> ApplyReport
    where
        R: PropertyResolver,
        D: Dispatcher<R::Target>,
        H: ApplyHooks,
    {
        let mut report = ApplyReport::default();

        for (index, track) in self.tracks.iter_mut().enumerate() {
            if !track.enabled || track.is_empty() || !hooks.pre_apply(index, track) {
                report.skipped += 1;
                continue;
            }

            if track.track_type() == TrackType::Event {
                if fire_event(track, &params, resolver, dispatcher) {
                    report.events_fired += 1;
                } else {
                    report.skipped += 1;
                }
                continue;
            }

            let track_type = track.track_type();
            let value = track
                .sample(params.current_time, !params.ignore_interpolation)
                .and_then(|sample| sample.to_value(track_type));
            let Some(mut value) = value else {
                warn!("track '{}' produced no writable sample", track.locator());
                report.skipped += 1;
                continue;
            };

            if params.weight != 1.0 {
                let Some(current) = resolver.get(track.locator()) else {
                    trace!("unresolved '{}', skipping blend", track.locator());
                    report.skipped += 1;
                    continue;
                };
                if current.kind() != value.kind() {
                    debug!(
                        "'{}' holds {:?} but the track yields {:?}; step blending",
                        track.locator(),
                        current.kind(),
                        value.kind()
                    );
                }
                value = blend_values(&current, &value, params.weight);
            }

            if !hooks.apply_sample(index, track, &mut value) {
                report.skipped += 1;
                continue;
            }

            if resolver.set(track.locator(), value) {
                report.written += 1;
            } else {
                trace!("unresolved '{}', nothing written", track.locator());
                report.skipped += 1;
            }
        }

        report
    }
}

/// Fire the event keyed at `current_time` if it falls inside the tick window.
fn fire_event<R, D>(track: &Track, params: &ApplyParams, resolver: &mut R, dispatcher: &mut D) -> bool
where
    R: PropertyResolver,
    D: Dispatcher<R::Target>,
{
    let Some(key) = track.get_keyframe_by_time(params.current_time) else {
        return false;
    };
    if key.time <= params.last_time || key.time > params.current_time {
        return false;
    }
    let KeyValue::Event(event) = &key.value else {
        return false;
    };
    let Some(target) = resolver.resolve(track.locator()) else {
        trace!("event target '{}' did not resolve", track.locator());
        return false;
    };
    if event.call {
        dispatcher.call_method(&target, &event.name, &event.param);
    } else {
        dispatcher.trigger_event(&target, &event.name, &event.param);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_duration_takes_longest_track() {
        let mut take = Take::new("walk", 0.0);
        take.create_track("a/x", TrackType::Number, Interpolation::Linear)
            .unwrap()
            .add_keyframe(3.0, 1.0, false)
            .unwrap();
        take.create_track("b/x", TrackType::Number, Interpolation::Linear)
            .unwrap()
            .add_keyframe(7.5, 1.0, false)
            .unwrap();
        assert_eq!(take.compute_duration(), 7.5);
        assert_eq!(take.duration, 7.5);
    }

    #[test]
    fn find_track_compares_segments() {
        let mut take = Take::new("walk", 1.0);
        take.create_track("a/x", TrackType::Number, Interpolation::Linear)
            .unwrap();
        take.create_track("b/y", TrackType::Number, Interpolation::Linear)
            .unwrap();
        let loc = Locator::parse("b/y").unwrap();
        assert_eq!(take.find_track(&loc), Some(1));
        assert_eq!(take.find_track(&Locator::parse("c").unwrap()), None);
        assert!(take.remove_track(9).is_none());
        assert!(take.remove_track(0).is_some());
        assert_eq!(take.find_track(&loc), Some(0));
    }

    #[test]
    fn pack_tracks_skips_atomic() {
        let mut take = Take::new("walk", 1.0);
        take.create_track("a/x", TrackType::Number, Interpolation::Linear)
            .unwrap()
            .add_keyframe(0.0, 1.0, false)
            .unwrap();
        take.create_track("a/on", TrackType::Boolean, Interpolation::None)
            .unwrap()
            .add_keyframe(0.0, true, false)
            .unwrap();
        assert_eq!(take.pack_tracks(), 1);
        take.unpack_tracks();
        assert!(take.tracks().iter().all(|t| !t.is_packed()));
    }
}
