//! Track types and their fixed sampling layouts.
//!
//! The type is resolved once when a track is built; sampling only looks at the
//! [`TypeLayout`], never at the type name.

use std::fmt;
use std::str::FromStr;

use keytake_api_core::Value;
use serde::{Deserialize, Serialize};

use crate::error::TrackError;

/// Semantic tag of the property a track drives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    Number,
    Boolean,
    String,
    Vec2,
    Vec3,
    Vec4,
    /// RGB color
    Color,
    /// RGBA color
    Color4,
    /// Quaternion (x, y, z, w)
    Quat,
    /// translation(3) + rotation quat(4) + scale(3)
    Trans10,
    /// Column-major 4x4 matrix
    Mat4,
    /// Discrete event / method call; never sampled
    Event,
    /// Texture name
    Texture,
}

/// Per-type strategy: component count and where (if anywhere) a quaternion
/// lives inside the components.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TypeLayout {
    /// Scalar components per sample; 0 for atomic types.
    pub value_size: usize,
    /// Start of a 4-float quaternion sub-range that must be slerped.
    pub rotation_offset: Option<usize>,
}

impl TypeLayout {
    const ATOMIC: TypeLayout = TypeLayout::plain(0);

    const fn plain(value_size: usize) -> Self {
        Self {
            value_size,
            rotation_offset: None,
        }
    }

    /// Atomic layouts hold bools, strings and events; they cannot be packed
    /// or interpolated.
    #[inline]
    pub fn is_atomic(&self) -> bool {
        self.value_size == 0
    }

    /// Records in packed storage are `[time, v0..v(n-1)]`.
    #[inline]
    pub fn stride(&self) -> usize {
        self.value_size + 1
    }
}

impl TrackType {
    pub const ALL: [TrackType; 13] = [
        TrackType::Number,
        TrackType::Boolean,
        TrackType::String,
        TrackType::Vec2,
        TrackType::Vec3,
        TrackType::Vec4,
        TrackType::Color,
        TrackType::Color4,
        TrackType::Quat,
        TrackType::Trans10,
        TrackType::Mat4,
        TrackType::Event,
        TrackType::Texture,
    ];

    pub const fn layout(self) -> TypeLayout {
        match self {
            TrackType::Number => TypeLayout::plain(1),
            TrackType::Vec2 => TypeLayout::plain(2),
            TrackType::Vec3 | TrackType::Color => TypeLayout::plain(3),
            TrackType::Vec4 | TrackType::Color4 => TypeLayout::plain(4),
            TrackType::Quat => TypeLayout {
                value_size: 4,
                rotation_offset: Some(0),
            },
            TrackType::Trans10 => TypeLayout {
                value_size: 10,
                rotation_offset: Some(3),
            },
            TrackType::Mat4 => TypeLayout::plain(16),
            TrackType::Boolean | TrackType::String | TrackType::Event | TrackType::Texture => {
                TypeLayout::ATOMIC
            }
        }
    }

    #[inline]
    pub fn value_size(self) -> usize {
        self.layout().value_size
    }

    pub const fn name(self) -> &'static str {
        match self {
            TrackType::Number => "number",
            TrackType::Boolean => "boolean",
            TrackType::String => "string",
            TrackType::Vec2 => "vec2",
            TrackType::Vec3 => "vec3",
            TrackType::Vec4 => "vec4",
            TrackType::Color => "color",
            TrackType::Color4 => "color4",
            TrackType::Quat => "quat",
            TrackType::Trans10 => "trans10",
            TrackType::Mat4 => "mat4",
            TrackType::Event => "event",
            TrackType::Texture => "texture",
        }
    }

    /// Convert flat components into the external value for this type.
    /// Returns `None` when the slice length does not fit the layout.
    pub fn components_to_value(self, c: &[f32]) -> Option<Value> {
        if c.len() != self.value_size() {
            return None;
        }
        let value = match self {
            TrackType::Number => Value::Float(c[0]),
            TrackType::Vec2 => Value::Vec2([c[0], c[1]]),
            TrackType::Vec3 | TrackType::Color => Value::Vec3([c[0], c[1], c[2]]),
            TrackType::Vec4 => Value::Vec4([c[0], c[1], c[2], c[3]]),
            TrackType::Color4 => Value::ColorRgba([c[0], c[1], c[2], c[3]]),
            TrackType::Quat => Value::Quat([c[0], c[1], c[2], c[3]]),
            TrackType::Trans10 => Value::Transform {
                pos: [c[0], c[1], c[2]],
                rot: [c[3], c[4], c[5], c[6]],
                scale: [c[7], c[8], c[9]],
            },
            TrackType::Mat4 => Value::Vector(c.to_vec()),
            TrackType::Boolean | TrackType::String | TrackType::Event | TrackType::Texture => {
                return None
            }
        };
        Some(value)
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TrackType {
    type Err = TrackError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrackType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| TrackError::UnknownType {
                name: s.to_string(),
            })
    }
}
