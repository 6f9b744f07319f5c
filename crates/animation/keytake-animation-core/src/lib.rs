//! Keytake Animation Core (engine-agnostic)
//!
//! Keyframe tracks with packed or unpacked storage and one shared sampling
//! path, takes that apply their tracks through a host-provided
//! [`PropertyResolver`], and animations that group takes and serialize them
//! to JSON or a named-blob container.

pub mod animation;
pub mod baking;
pub mod binding;
pub mod config;
pub mod container;
pub mod error;
pub mod interp;
pub mod keyframe;
pub mod kind;
pub mod outputs;
pub mod sampling;
pub mod storage;
pub mod stored;
pub mod take;
pub mod track;

// Re-exports for consumers (adapters)
pub use animation::{track_blob_name, Animation, JSON_BLOB};
pub use baking::{bake_take, BakedTake, BakedTrack, BakingConfig};
pub use binding::{ApplyHooks, Dispatcher, NoDispatch, PropertyResolver};
pub use config::Config;
pub use container::{Blob, BlobArchive, BlobContainer};
pub use error::{AnimationError, TrackError};
pub use interp::Interpolation;
pub use keyframe::{EventKey, KeyValue, Keyframe};
pub use kind::{TrackType, TypeLayout};
pub use outputs::{AnimationNotification, ApplyParams, ApplyReport};
pub use sampling::Sample;
pub use storage::TrackData;
pub use stored::{AnimationJson, TakeJson, TrackJson};
pub use take::Take;
pub use track::Track;
pub use keytake_api_core::{Locator, Value, ValueKind};

/// Result type for take and animation operations.
pub type Result<T> = core::result::Result<T, AnimationError>;
