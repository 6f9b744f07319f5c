//! Value: what a property resolver reads and writes.
//! All numeric types use f32.

use serde::{Deserialize, Serialize};

/// Coarse kind of a [`Value`], used for quick dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Float,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    Quat,
    ColorRgba,
    Transform,
    Vector,
    Text,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    /// Scalar float
    Float(f32),

    /// Boolean (step)
    Bool(bool),

    /// 2D vector
    Vec2([f32; 2]),

    /// 3D vector
    Vec3([f32; 3]),

    /// 4D vector
    Vec4([f32; 4]),

    /// Quaternion (x, y, z, w)
    Quat([f32; 4]),

    /// RGBA color (linear by convention)
    ColorRgba([f32; 4]),

    /// Transform with translation, rotation (quat), scale
    Transform {
        pos: [f32; 3],
        rot: [f32; 4], // quat (x,y,z,w)
        scale: [f32; 3],
    },

    /// Generic, variable-length numeric vector (matrices land here)
    Vector(Vec<f32>),

    /// Text / string; step-only for interpolation
    Text(String),
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Vec4(_) => ValueKind::Vec4,
            Value::Quat(_) => ValueKind::Quat,
            Value::ColorRgba(_) => ValueKind::ColorRgba,
            Value::Transform { .. } => ValueKind::Transform,
            Value::Vector(_) => ValueKind::Vector,
            Value::Text(_) => ValueKind::Text,
        }
    }

    /// Flatten numeric values into `out` (cleared first).
    ///
    /// Transforms flatten as `pos(3) rot(4) scale(3)`, the same order used by
    /// ten-float transform tracks. Returns `false` for step-only kinds.
    pub fn write_components(&self, out: &mut Vec<f32>) -> bool {
        out.clear();
        match self {
            Value::Float(f) => out.push(*f),
            Value::Vec2(a) => out.extend_from_slice(a),
            Value::Vec3(a) => out.extend_from_slice(a),
            Value::Vec4(a) | Value::Quat(a) | Value::ColorRgba(a) => out.extend_from_slice(a),
            Value::Transform { pos, rot, scale } => {
                out.extend_from_slice(pos);
                out.extend_from_slice(rot);
                out.extend_from_slice(scale);
            }
            Value::Vector(v) => out.extend_from_slice(v),
            Value::Bool(_) | Value::Text(_) => return false,
        }
        true
    }

    /// Convenience constructors
    pub fn f(v: f32) -> Self {
        Value::Float(v)
    }

    pub fn vec3(x: f32, y: f32, z: f32) -> Self {
        Value::Vec3([x, y, z])
    }

    pub fn quat(x: f32, y: f32, z: f32, w: f32) -> Self {
        Value::Quat([x, y, z, w])
    }

    pub fn transform(pos: [f32; 3], rot: [f32; 4], scale: [f32; 3]) -> Self {
        Value::Transform { pos, rot, scale }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_flattens_trs_in_order() {
        let v = Value::transform([1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0], [4.0, 5.0, 6.0]);
        let mut out = Vec::new();
        assert!(v.write_components(&mut out));
        assert_eq!(
            out,
            vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 1.0, 4.0, 5.0, 6.0]
        );
    }

    #[test]
    fn step_kinds_have_no_components() {
        let mut out = vec![9.0];
        assert!(!Value::Text("a".into()).write_components(&mut out));
        assert!(out.is_empty());
        assert_eq!(Value::Bool(true).kind(), ValueKind::Bool);
    }

    #[test]
    fn serde_tagged_shape() {
        let json = serde_json::to_string(&Value::Float(1.5)).unwrap();
        assert_eq!(json, r#"{"type":"Float","data":1.5}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::Float(1.5));
    }
}
