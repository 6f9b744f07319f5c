//! Animation: a named collection of takes plus its serialized forms.

use hashbrown::HashMap;
use log::{debug, warn};

use crate::config::Config;
use crate::container::{Blob, BlobContainer};
use crate::error::AnimationError;
use crate::keyframe::KeyValue;
use crate::kind::TrackType;
use crate::outputs::AnimationNotification;
use crate::storage::TrackData;
use crate::stored::{AnimationJson, TakeJson};
use crate::take::Take;
use crate::track::Track;
use crate::Result;

/// Name of the structural blob written by [`Animation::to_binary`].
pub const JSON_BLOB: &str = "@json";

/// Name of the packed-buffer blob for track `index` of take `take`.
pub fn track_blob_name(take: &str, index: usize) -> String {
    format!("@take_{take}_track_{index}")
}

/// Takes keyed by their own name. Structural changes queue
/// [`AnimationNotification`]s until drained.
#[derive(Clone, Debug, Default)]
pub struct Animation {
    pub name: String,
    takes: HashMap<String, Take>,
    config: Config,
    notifications: Vec<AnimationNotification>,
}

impl Animation {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, Config::default())
    }

    pub fn with_config(name: impl Into<String>, config: Config) -> Self {
        Self {
            name: name.into(),
            takes: HashMap::new(),
            config,
            notifications: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// Create an empty take; `duration` falls back to the configured default.
    pub fn create_take(&mut self, name: &str, duration: Option<f64>) -> Result<&mut Take> {
        if self.takes.contains_key(name) {
            return Err(AnimationError::TakeExists {
                name: name.to_string(),
            });
        }
        let duration = duration.unwrap_or(self.config.default_take_duration);
        Ok(self.insert_take(Take::new(name, duration)))
    }

    /// Insert `take` under its own name, returning any take it replaced.
    pub fn add_take(&mut self, take: Take) -> Option<Take> {
        let previous = self.takes.remove(&take.name);
        self.insert_take(take);
        previous
    }

    fn insert_take(&mut self, take: Take) -> &mut Take {
        let name = take.name.clone();
        debug!("animation '{}': take '{name}' added", self.name);
        self.notifications
            .push(AnimationNotification::TakeAdded { name: name.clone() });
        self.takes.entry(name).insert(take).into_mut()
    }

    pub fn get_take(&self, name: &str) -> Option<&Take> {
        self.takes.get(name)
    }

    pub fn get_take_mut(&mut self, name: &str) -> Option<&mut Take> {
        self.takes.get_mut(name)
    }

    /// Move a take to a new key, keeping the take's own name in sync.
    pub fn rename_take(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        if old_name == new_name {
            if self.takes.contains_key(old_name) {
                return Ok(());
            }
            return Err(AnimationError::TakeNotFound {
                name: old_name.to_string(),
            });
        }
        if self.takes.contains_key(new_name) {
            return Err(AnimationError::TakeExists {
                name: new_name.to_string(),
            });
        }
        let mut take = self
            .takes
            .remove(old_name)
            .ok_or_else(|| AnimationError::TakeNotFound {
                name: old_name.to_string(),
            })?;
        take.name = new_name.to_string();
        self.takes.insert(new_name.to_string(), take);
        debug!(
            "animation '{}': take '{old_name}' renamed to '{new_name}'",
            self.name
        );
        self.notifications.push(AnimationNotification::TakeRenamed {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        });
        Ok(())
    }

    pub fn remove_take(&mut self, name: &str) -> Option<Take> {
        let take = self.takes.remove(name)?;
        debug!("animation '{}': take '{name}' removed", self.name);
        self.notifications.push(AnimationNotification::TakeRemoved {
            name: name.to_string(),
        });
        Some(take)
    }

    pub fn get_num_takes(&self) -> usize {
        self.takes.len()
    }

    /// Takes in arbitrary order.
    pub fn takes(&self) -> impl Iterator<Item = &Take> {
        self.takes.values()
    }

    /// Take names, sorted.
    pub fn take_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.takes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Create a track in `take` using the configured default interpolation.
    pub fn add_track_to_take(
        &mut self,
        take: &str,
        property: &str,
        track_type: TrackType,
    ) -> Result<&mut Track> {
        let interpolation = self.config.default_interpolation;
        let take = self
            .takes
            .get_mut(take)
            .ok_or_else(|| AnimationError::TakeNotFound {
                name: take.to_string(),
            })?;
        Ok(take.create_track(property, track_type, interpolation)?)
    }

    /// Resample one track; `n` is clamped to `Config::sampled_data_limit`.
    pub fn sampled_data(
        &self,
        take: &str,
        index: usize,
        start: f64,
        end: f64,
        n: usize,
    ) -> Result<Vec<KeyValue>> {
        let take_ref = self
            .takes
            .get(take)
            .ok_or_else(|| AnimationError::TakeNotFound {
                name: take.to_string(),
            })?;
        let track = take_ref
            .get_track(index)
            .ok_or_else(|| AnimationError::TrackNotFound {
                take: take.to_string(),
                index,
            })?;
        let limit = self.config.sampled_data_limit;
        if n > limit {
            warn!("clamping sampled_data request of {n} samples to {limit}");
        }
        Ok(track.sampled_data(start, end, n.min(limit)))
    }

    /// Pack every packable track of every take; returns how many are packed.
    pub fn pack_all(&mut self) -> usize {
        self.takes.values_mut().map(Take::pack_tracks).sum()
    }

    /// Take the queued structural notifications.
    pub fn drain_notifications(&mut self) -> Vec<AnimationNotification> {
        std::mem::take(&mut self.notifications)
    }

    /// Replace name and takes from `json`. Map keys win over take names.
    pub fn configure(&mut self, json: &AnimationJson) -> Result<()> {
        let mut takes = HashMap::with_capacity(json.takes.len());
        for (key, take_json) in &json.takes {
            let mut take = Take::from_json(take_json)?;
            take.name = key.clone();
            takes.insert(key.clone(), take);
        }
        self.name = json.name.clone();
        self.takes = takes;
        if self.config.pack_on_load {
            self.pack_all();
        }
        debug!(
            "animation '{}' configured with {} takes",
            self.name,
            self.takes.len()
        );
        Ok(())
    }

    pub fn serialize(&self) -> AnimationJson {
        AnimationJson {
            name: self.name.clone(),
            takes: self
                .takes
                .iter()
                .map(|(name, take)| (name.clone(), take.serialize()))
                .collect(),
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.serialize())?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let json: AnimationJson = serde_json::from_str(s)?;
        let mut animation = Animation::default();
        animation.configure(&json)?;
        Ok(animation)
    }

    /// Write one float blob per non-empty numeric track plus the `@json`
    /// structure with those buffers stripped.
    pub fn to_binary(&self, container: &mut impl BlobContainer) -> Result<()> {
        let mut json = self.serialize();
        for (take_name, take_json) in json.takes.iter_mut() {
            let Some(take) = self.takes.get(take_name) else {
                continue;
            };
            for (index, (track, track_json)) in take
                .tracks()
                .iter()
                .zip(take_json.tracks.iter_mut())
                .enumerate()
            {
                let Some(buffer) = packed_buffer(track) else {
                    continue;
                };
                container.put(&track_blob_name(take_name, index), Blob::Floats(buffer));
                track_json.packed_data = true;
                track_json.data = serde_json::Value::Null;
            }
        }
        container.put(JSON_BLOB, Blob::Json(serde_json::to_string(&json)?));
        Ok(())
    }

    pub fn from_binary(container: &impl BlobContainer) -> Result<Self> {
        let mut animation = Animation::default();
        animation.load_binary(container)?;
        Ok(animation)
    }

    /// Inverse of [`Animation::to_binary`], honouring this animation's config.
    pub fn load_binary(&mut self, container: &impl BlobContainer) -> Result<()> {
        let json_text = container
            .get(JSON_BLOB)
            .ok_or_else(|| AnimationError::MissingBlob {
                name: JSON_BLOB.to_string(),
            })?
            .as_json()
            .ok_or_else(|| AnimationError::SerializationError {
                reason: format!("blob '{JSON_BLOB}' does not hold JSON"),
            })?;
        let json: AnimationJson = serde_json::from_str(json_text)?;

        let mut takes = HashMap::with_capacity(json.takes.len());
        for (take_name, take_json) in &json.takes {
            let take = take_from_blobs(take_name, take_json, container)?;
            takes.insert(take_name.clone(), take);
        }
        self.name = json.name;
        self.takes = takes;
        if self.config.pack_on_load {
            self.pack_all();
        }
        Ok(())
    }
}

/// Packed copy of a track's keyframes, `None` for atomic or empty tracks.
fn packed_buffer(track: &Track) -> Option<Vec<f32>> {
    if track.layout().is_atomic() || track.is_empty() {
        return None;
    }
    match track.data() {
        TrackData::Packed(buffer) => Some(buffer.clone()),
        TrackData::Unpacked(_) => {
            let mut copy = track.clone();
            copy.pack_data();
            match copy.data() {
                TrackData::Packed(buffer) => Some(buffer.clone()),
                TrackData::Unpacked(_) => None,
            }
        }
    }
}

fn take_from_blobs(
    take_name: &str,
    json: &TakeJson,
    container: &impl BlobContainer,
) -> Result<Take> {
    let mut take = Take::new(take_name, json.duration);
    for (index, track_json) in json.tracks.iter().enumerate() {
        let mut track = Track::from_json(track_json)?;
        if track_json.packed_data && track_json.data.is_null() {
            let name = track_blob_name(take_name, index);
            let floats = container
                .get(&name)
                .and_then(Blob::as_floats)
                .ok_or(AnimationError::MissingBlob { name })?;
            track.set_data(TrackData::Packed(floats.to_vec()))?;
        }
        take.add_track(track);
    }
    Ok(take)
}
