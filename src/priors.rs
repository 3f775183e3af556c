//! Prior-function registry
//!
//! Prior probability densities are external to the core: a prior is any
//! callable mapping a parameter-value vector and keyword arguments to
//! elementwise log-densities. This module provides the name-keyed
//! registry used to resolve [`Prior::Named`](crate::params::Prior)
//! selections at evaluation time, plus the standard built-in densities.
//!
//! Every model instance owns its own registry; there is no shared global
//! table.

use crate::params::{PriorArg, PriorArgs};
use ndarray::{Array1, ArrayView1};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Arc;

/// A prior log-density function: parameter values in, elementwise log
/// densities out. Arguments are looked up by name from the descriptor's
/// configured `prior_args`.
pub type PriorFn = dyn Fn(ArrayView1<f64>, &PriorArgs) -> Array1<f64> + Send + Sync;

/// Name-keyed registry of prior functions.
///
/// # Examples
///
/// ```
/// use sedfit_params::priors::PriorRegistry;
///
/// let registry = PriorRegistry::with_builtins();
/// assert!(registry.contains("tophat"));
/// assert!(registry.contains("normal"));
/// ```
pub struct PriorRegistry {
    fns: HashMap<String, Arc<PriorFn>>,
}

impl PriorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            fns: HashMap::new(),
        }
    }

    /// Create a registry preloaded with the built-in densities
    /// (`tophat`, `normal`).
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("tophat", Arc::new(tophat));
        registry.register("normal", Arc::new(normal));
        registry
    }

    /// Register a prior function under the given name, replacing any
    /// existing entry.
    pub fn register(&mut self, name: &str, f: Arc<PriorFn>) {
        self.fns.insert(name.to_string(), f);
    }

    /// Look up a prior function by name.
    pub fn get(&self, name: &str) -> Option<&Arc<PriorFn>> {
        self.fns.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fns.contains_key(name)
    }

    /// Registered names, sorted for reproducibility.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fns.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for PriorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn arg_at(args: &PriorArgs, key: &str, i: usize) -> Option<f64> {
    args.get(key).map(|a: &PriorArg| a.value_at(i))
}

/// Uniform log-density on `[low, high]`: 0 inside the support, `-inf`
/// outside. Missing or inverted bounds yield `-inf`.
pub fn tophat(x: ArrayView1<f64>, args: &PriorArgs) -> Array1<f64> {
    Array1::from_iter(x.iter().enumerate().map(|(i, &v)| {
        match (arg_at(args, "low", i), arg_at(args, "high", i)) {
            (Some(low), Some(high)) if low <= high && v >= low && v <= high => 0.0,
            _ => f64::NEG_INFINITY,
        }
    }))
}

/// Gaussian log-density with arguments `mean` and `sigma`. A missing or
/// non-positive `sigma` yields `-inf`.
pub fn normal(x: ArrayView1<f64>, args: &PriorArgs) -> Array1<f64> {
    Array1::from_iter(x.iter().enumerate().map(|(i, &v)| {
        match (arg_at(args, "mean", i), arg_at(args, "sigma", i)) {
            (Some(mean), Some(sigma)) if sigma > 0.0 => {
                let z = (v - mean) / sigma;
                -0.5 * z * z - (sigma * (2.0 * PI).sqrt()).ln()
            }
            _ => f64::NEG_INFINITY,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn args(pairs: &[(&str, f64)]) -> PriorArgs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), PriorArg::Scalar(*v)))
            .collect()
    }

    #[test]
    fn test_tophat() {
        let a = args(&[("low", 1.0), ("high", 4.0)]);
        let lnp = tophat(array![2.0, 0.5, 4.0].view(), &a);
        assert_relative_eq!(lnp[0], 0.0);
        assert!(lnp[1].is_infinite() && lnp[1] < 0.0);
        assert_relative_eq!(lnp[2], 0.0);
    }

    #[test]
    fn test_tophat_vector_bounds() {
        let mut a = PriorArgs::new();
        a.insert("low".to_string(), PriorArg::Vector(vec![0.0, 10.0]));
        a.insert("high".to_string(), PriorArg::Vector(vec![1.0, 20.0]));

        let lnp = tophat(array![0.5, 15.0].view(), &a);
        assert_relative_eq!(lnp[0], 0.0);
        assert_relative_eq!(lnp[1], 0.0);

        let lnp = tophat(array![5.0, 15.0].view(), &a);
        assert!(lnp[0].is_infinite());
        assert_relative_eq!(lnp[1], 0.0);
    }

    #[test]
    fn test_normal() {
        let a = args(&[("mean", 0.0), ("sigma", 1.0)]);
        let lnp = normal(array![0.0].view(), &a);
        // peak of a unit gaussian
        assert_relative_eq!(lnp[0], -0.5 * (2.0 * PI).ln(), epsilon = 1e-12);

        let a = args(&[("mean", 0.0), ("sigma", -1.0)]);
        let lnp = normal(array![0.0].view(), &a);
        assert!(lnp[0].is_infinite());
    }

    #[test]
    fn test_missing_args() {
        let lnp = tophat(array![2.0].view(), &PriorArgs::new());
        assert!(lnp[0].is_infinite() && lnp[0] < 0.0);
    }

    #[test]
    fn test_registry() {
        let mut registry = PriorRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["normal", "tophat"]);
        assert!(registry.get("lognormal").is_none());

        registry.register(
            "lognormal",
            Arc::new(|x: ArrayView1<f64>, args: &PriorArgs| {
                normal(Array1::from_iter(x.iter().map(|v| v.ln())).view(), args)
            }),
        );
        assert!(registry.contains("lognormal"));
    }
}
