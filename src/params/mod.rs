//! # Parameter System
//!
//! The parameter-configuration and theta-mapping subsystem. A model is a
//! set of named parameters, each free (inferred) or fixed (held
//! constant), each possibly vector-valued, with a prior selection and an
//! initial value. Inference code sees only theta, the flat vector of
//! free-parameter values; this module maintains the bidirectional mapping
//! between that vector and the named state.
//!
//! ## Core Components
//!
//! - [`ParameterDescriptor`]: one parameter's static configuration
//! - [`DescriptorRegistry`]: name-keyed descriptors with a canonical order
//! - [`ThetaIndex`]: name-to-index-range mapping over the theta vector
//!
//! ## Example Usage
//!
//! ```rust
//! use sedfit_params::params::{DescriptorRegistry, ParameterDescriptor, Prior, ThetaIndex};
//!
//! let registry = DescriptorRegistry::from_list(vec![
//!     ParameterDescriptor::free("mass", 1e10, Prior::named("tophat", [("low", 1e8), ("high", 1e12)])),
//!     ParameterDescriptor::fixed("zred", 0.1),
//! ]).unwrap();
//!
//! let index = ThetaIndex::build(&registry);
//! assert_eq!(index.ndim(), 1);
//! assert_eq!(index.range("mass"), Some(0..1));
//! ```

pub mod descriptor;
pub mod registry;
pub mod theta;

use ndarray::Array1;
use std::collections::HashMap;

/// The live mapping from parameter name to its current numeric value,
/// always stored as an at-least-1-dimensional vector.
pub type ParamState = HashMap<String, Array1<f64>>;

// Re-export key types
pub use descriptor::{InitSpec, ParameterDescriptor, Prior, PriorArg, PriorArgs};
pub use registry::DescriptorRegistry;
pub use theta::ThetaIndex;
