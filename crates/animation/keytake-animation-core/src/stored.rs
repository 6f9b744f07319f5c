//! Serialized JSON shape of tracks, takes and animations.
//!
//! Track:
//! `{ enabled, name, property, type, interpolation, looped, value_size,
//!    packed_data, data_table, data }`
//!
//! `data` is `null`, a list of `[time, value]` pairs (unpacked) or a flat
//! number list of `[time, v0..v(n-1)]` records (packed). Event values are
//! `[name, param, call]` triples; a truthy `call` invokes a method.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::error::TrackError;
use crate::interp::Interpolation;
use crate::keyframe::{EventKey, KeyValue, Keyframe};
use crate::kind::TrackType;
use crate::storage::TrackData;
use crate::take::Take;
use crate::track::Track;

fn default_enabled() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackJson {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub name: String,
    pub property: String,
    #[serde(rename = "type")]
    pub track_type: String,
    #[serde(default)]
    pub interpolation: Interpolation,
    #[serde(default)]
    pub looped: bool,
    /// Informational; checked against the type when non-zero.
    #[serde(default)]
    pub value_size: usize,
    #[serde(default)]
    pub packed_data: bool,
    #[serde(default)]
    pub data_table: Option<JsonValue>,
    #[serde(default)]
    pub data: JsonValue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TakeJson {
    pub name: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub tracks: Vec<TrackJson>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationJson {
    #[serde(default)]
    pub name: String,
    /// Keyed by take name.
    #[serde(default)]
    pub takes: BTreeMap<String, TakeJson>,
}

impl Track {
    /// Build a track from its serialized form.
    pub fn from_json(json: &TrackJson) -> Result<Self, TrackError> {
        let track_type: TrackType = json.track_type.parse()?;
        let mut track = Track::new(&json.property, track_type)?;
        track.configure(json)?;
        Ok(track)
    }

    /// Overwrite settings and keyframes from `json`. The type must match.
    pub fn configure(&mut self, json: &TrackJson) -> Result<(), TrackError> {
        let track_type: TrackType = json.track_type.parse()?;
        if track_type != self.track_type() {
            return Err(TrackError::ValueKindMismatch {
                locator: json.property.clone(),
                track_type: self.track_type(),
                actual: track_type.name(),
            });
        }
        if json.value_size != 0 && json.value_size != track_type.value_size() {
            return Err(TrackError::ValueSizeMismatch {
                locator: json.property.clone(),
                expected: track_type.value_size(),
                actual: json.value_size,
            });
        }

        self.set_locator(&json.property)?;
        self.name = if json.name.is_empty() {
            json.property.clone()
        } else {
            json.name.clone()
        };
        self.enabled = json.enabled;
        self.interpolation = json.interpolation;
        self.looped = json.looped;
        self.data_table = json.data_table.clone();

        let data = if json.packed_data {
            TrackData::Packed(packed_from_json(&json.data, &json.property)?)
        } else {
            TrackData::Unpacked(keys_from_json(&json.data, track_type, &json.property)?)
        };
        self.set_data(data)
    }

    pub fn serialize(&self) -> TrackJson {
        let data = match self.data() {
            TrackData::Packed(buffer) => json!(buffer),
            TrackData::Unpacked(keys) => JsonValue::Array(
                keys.iter()
                    .map(|k| json!([k.time, key_value_to_json(&k.value)]))
                    .collect(),
            ),
        };
        TrackJson {
            enabled: self.enabled,
            name: self.name.clone(),
            property: self.property().to_string(),
            track_type: self.track_type().name().to_string(),
            interpolation: self.interpolation,
            looped: self.looped,
            value_size: self.value_size(),
            packed_data: self.is_packed(),
            data_table: self.data_table.clone(),
            data,
        }
    }
}

impl Take {
    pub fn from_json(json: &TakeJson) -> Result<Self, TrackError> {
        let mut take = Take::new(json.name.clone(), json.duration);
        for track in &json.tracks {
            take.add_track(Track::from_json(track)?);
        }
        Ok(take)
    }

    pub fn serialize(&self) -> TakeJson {
        TakeJson {
            name: self.name.clone(),
            duration: self.duration,
            tracks: self.tracks().iter().map(Track::serialize).collect(),
        }
    }
}

/// JSON form of a single keyframe value.
pub fn key_value_to_json(value: &KeyValue) -> JsonValue {
    match value {
        KeyValue::Scalar(x) => json!(x),
        KeyValue::Vector(v) => json!(v),
        KeyValue::Bool(b) => json!(b),
        KeyValue::Text(s) => json!(s),
        KeyValue::Event(e) => json!([e.name, e.param, e.call]),
    }
}

/// Parse one keyframe value for a track of `track_type`.
pub fn key_value_from_json(
    value: &JsonValue,
    track_type: TrackType,
    locator: &str,
) -> Result<KeyValue, TrackError> {
    let malformed = |reason: String| TrackError::MalformedData {
        locator: locator.to_string(),
        reason,
    };
    match track_type {
        TrackType::Boolean => value
            .as_bool()
            .map(KeyValue::Bool)
            .ok_or_else(|| malformed(format!("expected a boolean, got {value}"))),
        TrackType::String | TrackType::Texture => value
            .as_str()
            .map(KeyValue::from)
            .ok_or_else(|| malformed(format!("expected a string, got {value}"))),
        TrackType::Event => event_from_json(value)
            .map(KeyValue::Event)
            .ok_or_else(|| malformed(format!("expected [name, param, call], got {value}"))),
        _ => match value {
            JsonValue::Number(n) => n
                .as_f64()
                .map(|x| KeyValue::Scalar(x as f32))
                .ok_or_else(|| malformed(format!("number out of range: {n}"))),
            JsonValue::Array(items) => items
                .iter()
                .map(|c| c.as_f64().map(|x| x as f32))
                .collect::<Option<Vec<f32>>>()
                .map(KeyValue::Vector)
                .ok_or_else(|| malformed(format!("non-numeric component in {value}"))),
            other => Err(malformed(format!("expected numeric data, got {other}"))),
        },
    }
}

fn event_from_json(value: &JsonValue) -> Option<EventKey> {
    match value {
        JsonValue::String(name) => Some(EventKey::event(name.clone(), JsonValue::Null)),
        JsonValue::Array(items) => {
            let name = items.first()?.as_str()?;
            let param = items.get(1).cloned().unwrap_or(JsonValue::Null);
            let call = items.get(2).is_some_and(is_truthy);
            Some(EventKey {
                name: name.to_string(),
                param,
                call,
            })
        }
        JsonValue::Object(_) => serde_json::from_value(value.clone()).ok(),
        _ => None,
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|x| x != 0.0 && !x.is_nan()),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

fn keys_from_json(
    data: &JsonValue,
    track_type: TrackType,
    locator: &str,
) -> Result<Vec<Keyframe>, TrackError> {
    let malformed = |reason: String| TrackError::MalformedData {
        locator: locator.to_string(),
        reason,
    };
    let items = match data {
        JsonValue::Null => return Ok(Vec::new()),
        JsonValue::Array(items) => items,
        other => return Err(malformed(format!("expected a keyframe list, got {other}"))),
    };
    items
        .iter()
        .enumerate()
        .map(|(i, pair)| {
            let (Some(time), Some(value)) = (pair.get(0).and_then(JsonValue::as_f64), pair.get(1))
            else {
                return Err(malformed(format!("keyframe {i} is not a [time, value] pair")));
            };
            Ok(Keyframe {
                time,
                value: key_value_from_json(value, track_type, locator)?,
            })
        })
        .collect()
}

fn packed_from_json(data: &JsonValue, locator: &str) -> Result<Vec<f32>, TrackError> {
    match data {
        JsonValue::Null => Ok(Vec::new()),
        JsonValue::Array(items) => items
            .iter()
            .map(|c| c.as_f64().map(|x| x as f32))
            .collect::<Option<Vec<f32>>>()
            .ok_or_else(|| TrackError::MalformedData {
                locator: locator.to_string(),
                reason: "packed data must be a flat number list".to_string(),
            }),
        other => Err(TrackError::MalformedData {
            locator: locator.to_string(),
            reason: format!("expected packed numbers, got {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track_json(value: JsonValue) -> TrackJson {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn parses_unpacked_vectors() {
        let json = track_json(json!({
            "property": "cube/position",
            "type": "vec3",
            "data": [[0.0, [0, 0, 0]], [1.0, [1, 2, 3]]]
        }));
        let track = Track::from_json(&json).unwrap();
        assert!(track.enabled);
        assert_eq!(track.name, "cube/position");
        assert_eq!(track.number_of_keyframes(), 2);
        assert_eq!(
            track.get_keyframe(1).unwrap().value,
            KeyValue::Vector(vec![1.0, 2.0, 3.0])
        );
        assert_eq!(track.duration(), 1.0);
    }

    #[test]
    fn parses_packed_buffers() {
        let json = track_json(json!({
            "property": "cube/x",
            "type": "number",
            "packed_data": true,
            "data": [0.0, 1.0, 2.0, 3.0]
        }));
        let track = Track::from_json(&json).unwrap();
        assert!(track.is_packed());
        assert_eq!(track.number_of_keyframes(), 2);
        assert_eq!(track.serialize().data, json!([0.0, 1.0, 2.0, 3.0]));
    }

    #[test]
    fn events_use_triples() {
        let json = track_json(json!({
            "property": "door",
            "type": "event",
            "data": [[1.0, ["open", {"speed": 2}, 1]], [2.0, "close"]]
        }));
        let track = Track::from_json(&json).unwrap();
        let first = track.get_keyframe(0).unwrap();
        assert_eq!(
            first.value,
            KeyValue::Event(EventKey::call("open", json!({"speed": 2})))
        );
        let second = track.get_keyframe(1).unwrap();
        assert_eq!(
            second.value,
            KeyValue::Event(EventKey::event("close", JsonValue::Null))
        );
        assert_eq!(
            track.serialize().data[0],
            json!([1.0, ["open", {"speed": 2}, true]])
        );
    }

    #[test]
    fn rejects_bad_shapes() {
        let wrong_size = track_json(json!({
            "property": "a", "type": "vec2", "value_size": 3, "data": null
        }));
        assert!(matches!(
            Track::from_json(&wrong_size),
            Err(TrackError::ValueSizeMismatch { .. })
        ));

        let unknown = track_json(json!({ "property": "a", "type": "matrix" }));
        assert!(matches!(
            Track::from_json(&unknown),
            Err(TrackError::UnknownType { .. })
        ));

        let short = track_json(json!({
            "property": "a", "type": "vec2", "data": [[0.0, [1.0]]]
        }));
        assert!(matches!(
            Track::from_json(&short),
            Err(TrackError::ValueSizeMismatch { .. })
        ));

        let not_pair = track_json(json!({
            "property": "a", "type": "number", "data": [0.0]
        }));
        assert!(matches!(
            Track::from_json(&not_pair),
            Err(TrackError::MalformedData { .. })
        ));
    }

    #[test]
    fn out_of_order_keys_are_sorted_on_load() {
        let json = track_json(json!({
            "property": "a",
            "type": "number",
            "data": [[1.0, 100.0], [0.0, 0.0], [2.0, 20.0]]
        }));
        let mut track = Track::from_json(&json).unwrap();
        assert_eq!(track.keyframe_time(0), Some(0.0));
        assert_eq!(track.duration(), 2.0);
        assert_eq!(track.find_time_index(0.5), Some(0));
        assert_eq!(track.sample(0.5, true).unwrap().as_scalar(), Some(50.0));
    }

    #[test]
    fn data_table_survives() {
        let json = track_json(json!({
            "property": "a",
            "type": "number",
            "data_table": {"ui": {"collapsed": true}},
            "data": [[0.0, 1.0]]
        }));
        let track = Track::from_json(&json).unwrap();
        let back = track.serialize();
        assert_eq!(back.data_table, json.data_table);
        assert_eq!(back.value_size, 1);
        assert_eq!(Track::from_json(&back).unwrap().serialize(), back);
    }
}
