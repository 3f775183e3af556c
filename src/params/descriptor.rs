//! Parameter descriptor definition
//!
//! This module provides the ParameterDescriptor struct, the static
//! configuration record for a single named model parameter: its vector
//! length, free/fixed status, initial value, and prior selection.

use crate::error::{ModelError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A numeric argument to a prior function: a scalar, or one value per
/// element of a vector parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriorArg {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl PriorArg {
    /// The value of this argument for element `i` of the parameter.
    ///
    /// Scalars broadcast to every element; vectors index directly, with
    /// out-of-range indices falling back to the last entry.
    pub fn value_at(&self, i: usize) -> f64 {
        match self {
            PriorArg::Scalar(v) => *v,
            PriorArg::Vector(v) => v.get(i).or_else(|| v.last()).copied().unwrap_or(f64::NAN),
        }
    }

    /// Apply `f` to every numeric entry of this argument in place.
    pub fn map_in_place(&mut self, f: &dyn Fn(f64) -> f64) {
        match self {
            PriorArg::Scalar(v) => *v = f(*v),
            PriorArg::Vector(v) => {
                for x in v.iter_mut() {
                    *x = f(*x);
                }
            }
        }
    }
}

impl From<f64> for PriorArg {
    fn from(v: f64) -> Self {
        PriorArg::Scalar(v)
    }
}

/// Keyword arguments passed to a prior function, keyed by argument name.
///
/// A `BTreeMap` keeps serialization order reproducible.
pub type PriorArgs = BTreeMap<String, PriorArg>;

/// The prior selection for a parameter.
///
/// "No prior" is the explicit `Flat` variant (an improper prior
/// contributing 0 to the log-prior), never an absent field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Prior {
    /// Improper flat prior; contributes 0 to the summed log-prior.
    Flat,

    /// A prior function selected by name from a [`PriorRegistry`], with
    /// its keyword arguments.
    ///
    /// [`PriorRegistry`]: crate::priors::PriorRegistry
    Named { id: String, args: PriorArgs },
}

impl Prior {
    /// Create a named prior from an id and an iterator of `(key, arg)` pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use sedfit_params::params::descriptor::Prior;
    ///
    /// let prior = Prior::named("tophat", [("low", 1.0), ("high", 4.0)]);
    /// assert!(!prior.is_flat());
    /// ```
    pub fn named<K, A, I>(id: &str, args: I) -> Self
    where
        K: Into<String>,
        A: Into<PriorArg>,
        I: IntoIterator<Item = (K, A)>,
    {
        Prior::Named {
            id: id.to_string(),
            args: args
                .into_iter()
                .map(|(k, a)| (k.into(), a.into()))
                .collect(),
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Prior::Flat)
    }
}

/// The initial value of a parameter.
///
/// Most parameters carry a numeric init, either a scalar broadcast to the
/// parameter's length or an explicit vector. The `dust_curve` parameter
/// instead names an attenuation curve, resolved through an
/// [`AttenuationRegistry`] when the physical model needs it.
///
/// [`AttenuationRegistry`]: crate::attenuation::AttenuationRegistry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitSpec {
    Scalar(f64),
    Vector(Vec<f64>),
    Curve(String),
}

impl From<f64> for InitSpec {
    fn from(v: f64) -> Self {
        InitSpec::Scalar(v)
    }
}

impl From<Vec<f64>> for InitSpec {
    fn from(v: Vec<f64>) -> Self {
        InitSpec::Vector(v)
    }
}

/// Static configuration for one named model parameter.
///
/// Descriptors are pure data: the live numeric state derived from them is
/// held by [`SedModel`](crate::model::SedModel), and the name-to-index
/// mapping by [`ThetaIndex`](crate::params::theta::ThetaIndex).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Unique parameter name.
    pub name: String,

    /// Vector length of this parameter's value (N >= 1).
    pub length: usize,

    /// Whether this parameter is inferred over (free) or held constant.
    pub is_free: bool,

    /// Initial value, broadcast to `length` when materialized.
    pub init: InitSpec,

    /// Physical units, informational only.
    #[serde(default)]
    pub units: String,

    /// Prior selection; `Flat` for fixed parameters with no prior.
    pub prior: Prior,
}

impl ParameterDescriptor {
    /// Create a free (inferred) parameter with the given initial value
    /// and prior.
    ///
    /// # Examples
    ///
    /// ```
    /// use sedfit_params::params::descriptor::{ParameterDescriptor, Prior};
    ///
    /// let desc = ParameterDescriptor::free(
    ///     "mass",
    ///     1e10,
    ///     Prior::named("tophat", [("low", 1e8), ("high", 1e12)]),
    /// );
    /// assert!(desc.is_free);
    /// assert_eq!(desc.length, 1);
    /// ```
    pub fn free(name: &str, init: impl Into<InitSpec>, prior: Prior) -> Self {
        Self {
            name: name.to_string(),
            length: 1,
            is_free: true,
            init: init.into(),
            units: String::new(),
            prior,
        }
    }

    /// Create a fixed (held-constant) parameter with a flat prior.
    pub fn fixed(name: &str, init: impl Into<InitSpec>) -> Self {
        Self {
            name: name.to_string(),
            length: 1,
            is_free: false,
            init: init.into(),
            units: String::new(),
            prior: Prior::Flat,
        }
    }

    /// Set the vector length (builder style).
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Set the units string (builder style).
    pub fn with_units(mut self, units: &str) -> Self {
        self.units = units.to_string();
        self
    }

    /// Create a fixed parameter whose init names an attenuation curve.
    pub fn with_curve(name: &str, curve: &str) -> Self {
        Self {
            name: name.to_string(),
            length: 1,
            is_free: false,
            init: InitSpec::Curve(curve.to_string()),
            units: String::new(),
            prior: Prior::Flat,
        }
    }

    /// Materialize the initial value as a length-`N` vector.
    ///
    /// Scalars broadcast to `length`; vectors must match `length` exactly.
    /// Curve-valued inits have no numeric materialization and fail with
    /// `InvalidDescriptor`.
    pub fn init_values(&self) -> Result<Array1<f64>> {
        match &self.init {
            InitSpec::Scalar(v) => Ok(Array1::from_elem(self.length, *v)),
            InitSpec::Vector(v) => {
                if v.len() != self.length {
                    return Err(ModelError::InvalidDescriptor {
                        name: self.name.clone(),
                        reason: format!(
                            "init vector has length {}, descriptor length is {}",
                            v.len(),
                            self.length
                        ),
                    });
                }
                Ok(Array1::from_vec(v.clone()))
            }
            InitSpec::Curve(curve) => Err(ModelError::InvalidDescriptor {
                name: self.name.clone(),
                reason: format!("init is the dust curve '{}', not a numeric value", curve),
            }),
        }
    }

    /// Check internal consistency: positive length, numeric init for free
    /// parameters, init vector length matching `length`.
    pub fn validate(&self) -> Result<()> {
        if self.length == 0 {
            return Err(ModelError::InvalidDescriptor {
                name: self.name.clone(),
                reason: "length must be at least 1".to_string(),
            });
        }
        if self.is_free && matches!(self.init, InitSpec::Curve(_)) {
            return Err(ModelError::InvalidDescriptor {
                name: self.name.clone(),
                reason: "free parameters must have a numeric init".to_string(),
            });
        }
        if let InitSpec::Vector(v) = &self.init {
            if v.len() != self.length {
                return Err(ModelError::InvalidDescriptor {
                    name: self.name.clone(),
                    reason: format!(
                        "init vector has length {}, descriptor length is {}",
                        v.len(),
                        self.length
                    ),
                });
            }
        }
        Ok(())
    }

    /// Apply `f` to the numeric init values and to every numeric entry of
    /// the prior arguments.
    ///
    /// This is the rescale transform used by observation ingestion; it is
    /// destructive and one-directional.
    pub fn rescale(&mut self, f: &dyn Fn(f64) -> f64) {
        match &mut self.init {
            InitSpec::Scalar(v) => *v = f(*v),
            InitSpec::Vector(v) => {
                for x in v.iter_mut() {
                    *x = f(*x);
                }
            }
            InitSpec::Curve(_) => {}
        }
        if let Prior::Named { args, .. } = &mut self.prior {
            for arg in args.values_mut() {
                arg.map_in_place(f);
            }
        }
    }
}
