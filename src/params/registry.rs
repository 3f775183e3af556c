//! Descriptor registry implementation
//!
//! This module provides the DescriptorRegistry, a name-keyed collection of
//! parameter descriptors that also records the canonical declaration
//! order. All ordered operations (theta index construction, labeling,
//! serialization) traverse that explicit order, never incidental map
//! iteration order.

use crate::error::{ModelError, Result};
use crate::params::descriptor::ParameterDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A name-keyed registry of parameter descriptors with a canonical order.
///
/// Convertible losslessly to and from the ordered list-of-descriptors
/// representation: the list form is used for serialization and positional
/// semantics, the map form for name lookup.
///
/// # Examples
///
/// ```
/// use sedfit_params::params::descriptor::{ParameterDescriptor, Prior};
/// use sedfit_params::params::registry::DescriptorRegistry;
///
/// let registry = DescriptorRegistry::from_list(vec![
///     ParameterDescriptor::free("mass", 1e10, Prior::named("tophat", [("low", 1e8), ("high", 1e12)])),
///     ParameterDescriptor::fixed("zred", 0.1),
/// ]).unwrap();
///
/// assert_eq!(registry.len(), 2);
/// assert_eq!(registry.free_names(), vec!["mass"]);
/// assert_eq!(registry.fixed_names(), vec!["zred"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<ParameterDescriptor>",
    into = "Vec<ParameterDescriptor>"
)]
pub struct DescriptorRegistry {
    /// Canonical declaration order of parameter names.
    order: Vec<String>,

    /// Map of parameter names to descriptors.
    by_name: HashMap<String, ParameterDescriptor>,
}

impl DescriptorRegistry {
    /// Build a registry from an ordered descriptor list.
    ///
    /// The list order becomes the canonical order. Fails with
    /// `DuplicateName` if two descriptors share a name, and with
    /// `InvalidDescriptor` if any descriptor is internally inconsistent.
    pub fn from_list(descriptors: Vec<ParameterDescriptor>) -> Result<Self> {
        let mut order = Vec::with_capacity(descriptors.len());
        let mut by_name = HashMap::with_capacity(descriptors.len());

        for desc in descriptors {
            desc.validate()?;
            if by_name.contains_key(&desc.name) {
                return Err(ModelError::DuplicateName(desc.name));
            }
            order.push(desc.name.clone());
            by_name.insert(desc.name.clone(), desc);
        }

        Ok(Self { order, by_name })
    }

    /// The descriptors in canonical order, as borrowed references.
    pub fn to_list(&self) -> Vec<&ParameterDescriptor> {
        self.order.iter().map(|name| &self.by_name[name]).collect()
    }

    /// Consume the registry, returning the descriptors in canonical order.
    pub fn into_list(mut self) -> Vec<ParameterDescriptor> {
        self.order
            .iter()
            .map(|name| self.by_name.remove(name).unwrap())
            .collect()
    }

    /// Get a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.by_name.get(name)
    }

    /// Get a mutable descriptor by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ParameterDescriptor> {
        self.by_name.get_mut(name)
    }

    /// Check whether a parameter with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of parameters in the registry.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All parameter names in canonical order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Names of the free parameters, in canonical order.
    pub fn free_names(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|name| self.by_name[*name].is_free)
            .map(|s| s.as_str())
            .collect()
    }

    /// Names of the fixed parameters, in canonical order.
    pub fn fixed_names(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|name| !self.by_name[*name].is_free)
            .map(|s| s.as_str())
            .collect()
    }

    /// Iterate over descriptors in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.order.iter().map(|name| &self.by_name[name])
    }
}

impl TryFrom<Vec<ParameterDescriptor>> for DescriptorRegistry {
    type Error = ModelError;

    fn try_from(descriptors: Vec<ParameterDescriptor>) -> Result<Self> {
        Self::from_list(descriptors)
    }
}

impl From<DescriptorRegistry> for Vec<ParameterDescriptor> {
    fn from(registry: DescriptorRegistry) -> Self {
        registry.into_list()
    }
}
