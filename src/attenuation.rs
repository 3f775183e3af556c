//! Attenuation (dust) curve registry
//!
//! The `dust_curve` model parameter names an attenuation law rather than
//! carrying a numeric value. This registry maps those names to callables
//! so the serialization bridge can substitute name for function and back,
//! and so the physical model can resolve the curve on demand.

use crate::error::{ModelError, Result};
use ndarray::{Array1, ArrayView1};
use std::collections::HashMap;
use std::sync::Arc;

/// An attenuation curve: rest-frame wavelengths in Angstroms in,
/// opacity relative to 5500 Angstroms out.
pub type CurveFn = dyn Fn(ArrayView1<f64>) -> Array1<f64> + Send + Sync;

/// Name-keyed registry of attenuation curves.
pub struct AttenuationRegistry {
    curves: HashMap<String, Arc<CurveFn>>,
}

impl AttenuationRegistry {
    pub fn new() -> Self {
        Self {
            curves: HashMap::new(),
        }
    }

    /// Create a registry preloaded with the built-in curves
    /// (`powerlaw`, `grey`).
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("powerlaw", Arc::new(powerlaw));
        registry.register("grey", Arc::new(grey));
        registry
    }

    /// Register a curve under the given name, replacing any existing entry.
    pub fn register(&mut self, name: &str, f: Arc<CurveFn>) {
        self.curves.insert(name.to_string(), f);
    }

    /// Look up a curve by name.
    pub fn get(&self, name: &str) -> Option<&Arc<CurveFn>> {
        self.curves.get(name)
    }

    /// Look up a curve by name, failing with `UnknownDustCurve` if absent.
    pub fn resolve(&self, name: &str) -> Result<Arc<CurveFn>> {
        self.curves
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::UnknownDustCurve(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.curves.contains_key(name)
    }
}

impl Default for AttenuationRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

const V_BAND: f64 = 5500.0;

/// Power-law attenuation, `(lambda / 5500 A)^-0.7`.
pub fn powerlaw(wave: ArrayView1<f64>) -> Array1<f64> {
    wave.mapv(|w| (w / V_BAND).powf(-0.7))
}

/// Wavelength-independent (grey) attenuation.
pub fn grey(wave: ArrayView1<f64>) -> Array1<f64> {
    Array1::ones(wave.len())
}
