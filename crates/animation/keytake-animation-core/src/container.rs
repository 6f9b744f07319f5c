//! Named-blob containers used by `Animation::to_binary` / `from_binary`.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::AnimationError;

/// One entry of a blob container.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Blob {
    Json(String),
    Floats(Vec<f32>),
}

impl Blob {
    pub fn as_json(&self) -> Option<&str> {
        match self {
            Blob::Json(s) => Some(s),
            Blob::Floats(_) => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f32]> {
        match self {
            Blob::Floats(f) => Some(f),
            Blob::Json(_) => None,
        }
    }
}

/// Storage for named blobs. Hosts can back this with any archive format.
pub trait BlobContainer {
    fn put(&mut self, name: &str, blob: Blob);
    fn get(&self, name: &str) -> Option<&Blob>;
}

/// In-memory container, encodable with bincode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlobArchive {
    blobs: HashMap<String, Blob>,
}

impl BlobArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blobs.keys().map(String::as_str)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, AnimationError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AnimationError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl BlobContainer for BlobArchive {
    fn put(&mut self, name: &str, blob: Blob) {
        self.blobs.insert(name.to_string(), blob);
    }

    fn get(&self, name: &str) -> Option<&Blob> {
        self.blobs.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_round_trip() {
        let mut archive = BlobArchive::new();
        archive.put("@json", Blob::Json("{}".into()));
        archive.put("@take_a_track_0", Blob::Floats(vec![0.0, 1.5]));
        let bytes = archive.to_bytes().unwrap();
        let back = BlobArchive::from_bytes(&bytes).unwrap();
        assert_eq!(back, archive);
        let mut names: Vec<&str> = back.names().collect();
        names.sort_unstable();
        assert_eq!(names, ["@json", "@take_a_track_0"]);
        assert_eq!(back.get("@take_a_track_0").and_then(Blob::as_floats), Some(&[0.0, 1.5][..]));
        assert!(back.get("@json").and_then(Blob::as_floats).is_none());
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        let err = BlobArchive::from_bytes(&[0xff, 0xff, 0xff]).unwrap_err();
        assert_eq!(err.category(), "serialization");
    }
}
