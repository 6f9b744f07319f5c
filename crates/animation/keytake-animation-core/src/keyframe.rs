//! Keyframe values as stored in unpacked tracks.

use keytake_api_core::Value;
use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::kind::TrackType;

/// Payload of an event keyframe.
///
/// With `call == false` the keyframe triggers a named event carrying `param`;
/// with `call == true` it invokes method `name` on the target with `param`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventKey {
    pub name: String,
    #[serde(default)]
    pub param: serde_json::Value,
    #[serde(default)]
    pub call: bool,
}

impl EventKey {
    pub fn event(name: impl Into<String>, param: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            param,
            call: false,
        }
    }

    pub fn call(method: impl Into<String>, arg: serde_json::Value) -> Self {
        Self {
            name: method.into(),
            param: arg,
            call: true,
        }
    }
}

/// Value held by one keyframe. Numeric values own their components, so a
/// caller can never mutate stored data through an alias.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyValue {
    Scalar(f32),
    Vector(Vec<f32>),
    Bool(bool),
    Text(String),
    Event(EventKey),
}

impl KeyValue {
    /// Numeric view; `None` for atomic values.
    #[inline]
    pub fn components(&self) -> Option<&[f32]> {
        match self {
            KeyValue::Scalar(x) => Some(std::slice::from_ref(x)),
            KeyValue::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            KeyValue::Scalar(_) => "scalar",
            KeyValue::Vector(_) => "vector",
            KeyValue::Bool(_) => "boolean",
            KeyValue::Text(_) => "text",
            KeyValue::Event(_) => "event",
        }
    }

    /// Build from flat components: one component stays a scalar.
    pub fn from_components(c: &[f32]) -> Self {
        if c.len() == 1 {
            KeyValue::Scalar(c[0])
        } else {
            KeyValue::Vector(c.to_vec())
        }
    }

    /// Check that this value can live in a track of `track_type`.
    pub(crate) fn validate_for(&self, track_type: TrackType, locator: &str) -> Result<(), TrackError> {
        let expected = track_type.value_size();
        let kind_mismatch = || TrackError::ValueKindMismatch {
            locator: locator.to_string(),
            track_type,
            actual: self.kind_name(),
        };
        match (track_type, self) {
            (TrackType::Boolean, KeyValue::Bool(_))
            | (TrackType::String | TrackType::Texture, KeyValue::Text(_))
            | (TrackType::Event, KeyValue::Event(_)) => Ok(()),
            (_, KeyValue::Scalar(_) | KeyValue::Vector(_)) if expected > 0 => {
                let actual = self.components().map_or(0, <[f32]>::len);
                if actual == expected {
                    Ok(())
                } else {
                    Err(TrackError::ValueSizeMismatch {
                        locator: locator.to_string(),
                        expected,
                        actual,
                    })
                }
            }
            _ => Err(kind_mismatch()),
        }
    }

    /// External representation for a track of `track_type`.
    pub fn to_value(&self, track_type: TrackType) -> Option<Value> {
        match self {
            KeyValue::Scalar(_) | KeyValue::Vector(_) => {
                track_type.components_to_value(self.components()?)
            }
            KeyValue::Bool(b) => Some(Value::Bool(*b)),
            KeyValue::Text(s) => Some(Value::Text(s.clone())),
            KeyValue::Event(_) => None,
        }
    }
}

impl From<f32> for KeyValue {
    fn from(v: f32) -> Self {
        KeyValue::Scalar(v)
    }
}

impl From<Vec<f32>> for KeyValue {
    fn from(v: Vec<f32>) -> Self {
        KeyValue::Vector(v)
    }
}

impl<const N: usize> From<[f32; N]> for KeyValue {
    fn from(v: [f32; N]) -> Self {
        KeyValue::Vector(v.to_vec())
    }
}

impl From<bool> for KeyValue {
    fn from(v: bool) -> Self {
        KeyValue::Bool(v)
    }
}

impl From<&str> for KeyValue {
    fn from(v: &str) -> Self {
        KeyValue::Text(v.to_string())
    }
}

/// Key the current value of a property.
impl From<&Value> for KeyValue {
    fn from(v: &Value) -> Self {
        match v {
            Value::Bool(b) => KeyValue::Bool(*b),
            Value::Text(s) => KeyValue::Text(s.clone()),
            numeric => {
                let mut c = Vec::new();
                numeric.write_components(&mut c);
                KeyValue::from_components(&c)
            }
        }
    }
}

impl From<Value> for KeyValue {
    fn from(v: Value) -> Self {
        KeyValue::from(&v)
    }
}

impl From<EventKey> for KeyValue {
    fn from(v: EventKey) -> Self {
        KeyValue::Event(v)
    }
}

/// A `(time, value)` anchor point.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe {
    /// Seconds from the start of the take.
    pub time: f64,
    pub value: KeyValue,
}

impl Keyframe {
    pub fn new(time: f64, value: impl Into<KeyValue>) -> Self {
        Self {
            time,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_component_count() {
        let ok = KeyValue::from([1.0, 2.0, 3.0]);
        assert!(ok.validate_for(TrackType::Vec3, "p").is_ok());
        let err = ok.validate_for(TrackType::Quat, "p").unwrap_err();
        assert_eq!(
            err,
            TrackError::ValueSizeMismatch {
                locator: "p".into(),
                expected: 4,
                actual: 3
            }
        );
        // a one-element vector is as good as a scalar
        assert!(KeyValue::Vector(vec![1.0])
            .validate_for(TrackType::Number, "p")
            .is_ok());
    }

    #[test]
    fn validates_atomic_kinds() {
        assert!(KeyValue::Bool(true)
            .validate_for(TrackType::Boolean, "p")
            .is_ok());
        assert!(KeyValue::from("tex.png")
            .validate_for(TrackType::Texture, "p")
            .is_ok());
        assert!(matches!(
            KeyValue::Scalar(1.0).validate_for(TrackType::Event, "p"),
            Err(TrackError::ValueKindMismatch { .. })
        ));
        assert!(matches!(
            KeyValue::Bool(true).validate_for(TrackType::Number, "p"),
            Err(TrackError::ValueKindMismatch { .. })
        ));
    }

    #[test]
    fn values_key_as_components() {
        let t = Value::transform([1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0], [1.0, 1.0, 1.0]);
        let key = KeyValue::from(&t);
        assert!(key.validate_for(TrackType::Trans10, "p").is_ok());
        assert_eq!(key.to_value(TrackType::Trans10), Some(t));
        assert_eq!(KeyValue::from(Value::Float(2.0)), KeyValue::Scalar(2.0));
        assert_eq!(KeyValue::from(Value::Bool(true)), KeyValue::Bool(true));
    }

    #[test]
    fn from_components_keeps_scalars_scalar() {
        assert_eq!(KeyValue::from_components(&[3.0]), KeyValue::Scalar(3.0));
        assert_eq!(
            KeyValue::from_components(&[1.0, 2.0]),
            KeyValue::Vector(vec![1.0, 2.0])
        );
    }
}
