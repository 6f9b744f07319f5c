//! Core configuration for keytake-animation-core.

use serde::{Deserialize, Serialize};

use crate::interp::Interpolation;

/// Defaults applied by [`crate::Animation`] when creating takes and tracks,
/// plus loading policy.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Duration (seconds) given to takes created without an explicit one.
    pub default_take_duration: f64,
    /// Interpolation assigned to newly created tracks.
    pub default_interpolation: Interpolation,
    /// Pack every packable track after `configure` / `from_binary`.
    pub pack_on_load: bool,
    /// Upper bound on the sample count accepted by resampling helpers.
    pub sampled_data_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_take_duration: 10.0,
            default_interpolation: Interpolation::Linear,
            pack_on_load: false,
            sampled_data_limit: 65_536,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: Config = serde_json::from_str(r#"{ "pack_on_load": true }"#).unwrap();
        assert!(cfg.pack_on_load);
        assert_eq!(cfg.default_take_duration, 10.0);
        assert_eq!(cfg.default_interpolation, Interpolation::Linear);
    }
}
