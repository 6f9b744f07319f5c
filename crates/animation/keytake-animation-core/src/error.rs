//! Error types for tracks, takes and animations.

use crate::kind::TrackType;

/// Errors raised while building or editing a single track.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum TrackError {
    /// Type name not in the closed set of track types
    #[error("Unknown track type: {name}")]
    UnknownType { name: String },

    /// Keyframe component count differs from the track's value size
    #[error("Value size mismatch on '{locator}': expected {expected}, got {actual}")]
    ValueSizeMismatch {
        locator: String,
        expected: usize,
        actual: usize,
    },

    /// Keyframe value kind cannot be stored in this track type
    #[error("Track '{locator}' of type {track_type} cannot store {actual} values")]
    ValueKindMismatch {
        locator: String,
        track_type: TrackType,
        actual: &'static str,
    },

    /// Invalid time (NaN or infinite)
    #[error("Invalid keyframe time: {time}")]
    InvalidTime { time: f64 },

    /// Locator string rejected
    #[error("Invalid locator: {reason}")]
    InvalidLocator { reason: String },

    /// Serialized `data` did not match the declared layout
    #[error("Malformed track data for '{locator}': {reason}")]
    MalformedData { locator: String, reason: String },

    /// convert_to_trans10 on a track that is not a 4x4 matrix track
    #[error("Track '{locator}' is {track_type}, expected mat4")]
    NotMatrixTrack {
        locator: String,
        track_type: TrackType,
    },
}

/// Errors raised by takes, animations and their serialized forms.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AnimationError {
    /// Take not present in the animation
    #[error("Take not found: {name}")]
    TakeNotFound { name: String },

    /// Take name already taken by another take
    #[error("Take name already in use: {name}")]
    TakeExists { name: String },

    /// Track index out of range inside a take
    #[error("Track {index} not found in take {take}")]
    TrackNotFound { take: String, index: usize },

    /// Track-level failure
    #[error(transparent)]
    Track(#[from] TrackError),

    /// Serialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Blob missing from a binary container
    #[error("Missing blob: {name}")]
    MissingBlob { name: String },
}

impl TrackError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnknownType { .. } | Self::NotMatrixTrack { .. } => "type",
            Self::ValueSizeMismatch { .. }
            | Self::ValueKindMismatch { .. }
            | Self::InvalidTime { .. }
            | Self::InvalidLocator { .. } => "validation",
            Self::MalformedData { .. } => "serialization",
        }
    }
}

impl AnimationError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::TakeNotFound { .. } | Self::TakeExists { .. } | Self::TrackNotFound { .. } => {
                "data"
            }
            Self::Track(inner) => inner.category(),
            Self::SerializationError { .. } | Self::MissingBlob { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for AnimationError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}

impl From<bincode::Error> for AnimationError {
    fn from(err: bincode::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}
