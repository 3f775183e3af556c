//! Theta index construction and flat-vector propagation
//!
//! Samplers and optimizers see the model as a single flat vector, theta,
//! holding only the free parameters' values. This module builds the
//! name-to-index-range mapping for that vector and moves values between
//! the flat form and the named parameter state in both directions.

use crate::error::{ModelError, Result};
use crate::params::registry::DescriptorRegistry;
use crate::params::ParamState;
use ndarray::{s, Array1, ArrayView1};
use std::collections::HashMap;
use std::ops::Range;

/// The mapping from free-parameter name to a contiguous half-open index
/// range within the theta vector.
///
/// Ranges are assigned by traversing the registry's free parameters in
/// canonical order, so they are contiguous, non-overlapping, and cover
/// `[0, ndim)` exactly. Rebuilding from an unchanged registry reproduces
/// identical ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct ThetaIndex {
    /// (name, range) pairs in ascending index order.
    ranges: Vec<(String, Range<usize>)>,

    /// Name-keyed view of the same ranges.
    by_name: HashMap<String, Range<usize>>,

    /// Total number of free scalar dimensions.
    ndim: usize,
}

impl ThetaIndex {
    /// Build the theta index for a registry.
    ///
    /// # Examples
    ///
    /// ```
    /// use sedfit_params::params::descriptor::{ParameterDescriptor, Prior};
    /// use sedfit_params::params::registry::DescriptorRegistry;
    /// use sedfit_params::params::theta::ThetaIndex;
    ///
    /// let registry = DescriptorRegistry::from_list(vec![
    ///     ParameterDescriptor::free("mass", 1e10, Prior::Flat),
    ///     ParameterDescriptor::free("amplitudes", 1.0, Prior::Flat).with_length(3),
    ///     ParameterDescriptor::fixed("zred", 0.1),
    /// ]).unwrap();
    ///
    /// let index = ThetaIndex::build(&registry);
    /// assert_eq!(index.ndim(), 4);
    /// assert_eq!(index.range("mass"), Some(0..1));
    /// assert_eq!(index.range("amplitudes"), Some(1..4));
    /// assert_eq!(index.range("zred"), None);
    /// ```
    pub fn build(registry: &DescriptorRegistry) -> Self {
        let mut ranges = Vec::new();
        let mut by_name = HashMap::new();
        let mut count = 0;

        for name in registry.free_names() {
            let length = registry.get(name).map(|d| d.length).unwrap_or(0);
            let range = count..count + length;
            ranges.push((name.to_string(), range.clone()));
            by_name.insert(name.to_string(), range);
            count += length;
        }

        Self {
            ranges,
            by_name,
            ndim: count,
        }
    }

    /// Total number of free scalar dimensions.
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// The index range for a free parameter, or `None` if the name is not
    /// free (or not present).
    pub fn range(&self, name: &str) -> Option<Range<usize>> {
        self.by_name.get(name).cloned()
    }

    /// Iterate over `(name, range)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Range<usize>)> {
        self.ranges.iter().map(|(name, r)| (name.as_str(), r.clone()))
    }

    /// Assemble a theta vector from the named parameter state.
    ///
    /// Pure read: the state is unchanged. Positions belonging to a name
    /// absent from the state are left at zero; the model upholds the
    /// invariant that every free parameter has a state entry.
    pub fn assemble(&self, state: &ParamState) -> Array1<f64> {
        let mut theta = Array1::zeros(self.ndim);
        for (name, range) in &self.ranges {
            if let Some(value) = state.get(name) {
                theta.slice_mut(s![range.start..range.end]).assign(value);
            }
        }
        theta
    }

    /// Scatter a theta vector into the named parameter state.
    ///
    /// Only free parameters are written; fixed parameters are untouched.
    /// Fails with `DimensionMismatch` if `theta` is not `ndim` long, in
    /// which case the state is not modified at all.
    pub fn scatter(&self, theta: ArrayView1<f64>, state: &mut ParamState) -> Result<()> {
        if theta.len() != self.ndim {
            return Err(ModelError::DimensionMismatch {
                expected: self.ndim,
                actual: theta.len(),
            });
        }
        for (name, range) in &self.ranges {
            state.insert(
                name.clone(),
                theta.slice(s![range.start..range.end]).to_owned(),
            );
        }
        Ok(())
    }

    /// One display label per scalar theta position, ordered by index.
    ///
    /// Multi-element parameters get a 1-based element suffix
    /// (`name1`, `name2`, ...); length-1 parameters use the bare name.
    /// `name_overrides` substitutes a display name before suffixing.
    pub fn labels(&self, name_overrides: &HashMap<String, String>) -> Vec<String> {
        // ranges are already in ascending index order by construction
        let mut labels = Vec::with_capacity(self.ndim);
        for (name, range) in &self.ranges {
            let display = name_overrides.get(name).unwrap_or(name);
            if range.len() == 1 {
                labels.push(display.clone());
            } else {
                for i in 0..range.len() {
                    labels.push(format!("{}{}", display, i + 1));
                }
            }
        }
        labels
    }
}
