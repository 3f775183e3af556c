//! Run configuration
//!
//! A typed form of the free-form run-parameter dictionary carried
//! alongside a parameter file: the two flags that gate spectrum
//! rescaling at ingestion, the originating file path, and a flattened
//! map for any further fitter options this core does not interpret.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Run-level configuration for a fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Divide the `spec_norm` parameter by the data-derived scale at
    /// ingestion.
    #[serde(default = "default_true")]
    pub normalize_spectrum: bool,

    /// Log-transform the observed spectrum and the `spec_norm` parameter
    /// at ingestion.
    #[serde(default = "default_true")]
    pub logify_spectrum: bool,

    /// Path of the parameter file this config was read from, injected by
    /// [`read_params`](crate::io::read_params).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_file: Option<PathBuf>,

    /// Uninterpreted fitter options carried through serialization.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            normalize_spectrum: true,
            logify_spectrum: true,
            param_file: None,
            extra: serde_json::Map::new(),
        }
    }
}

fn default_true() -> bool {
    true
}
