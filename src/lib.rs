//! # sedfit-params
//!
//! `sedfit-params` manages the parameter state of a statistical model
//! used to fit observed spectra and photometry against synthetic
//! stellar-population predictions.
//!
//! A model is a set of named parameters, each free (inferred) or fixed
//! (held constant), each possibly vector-valued, carrying a prior
//! selection and an initial value. External samplers and optimizers see
//! only theta, the flat vector of free-parameter values in a
//! deterministic order; this crate maintains the bidirectional mapping
//! between theta and the named state, evaluates the joint log-prior, and
//! handles the rescaling protocol triggered when an observation is
//! ingested.
//!
//! The library provides:
//! - A descriptor registry with an explicit canonical parameter order
//! - The theta index and both directions of value propagation
//! - Prior evaluation against a per-instance prior-function registry
//! - Observation ingestion with spectrum normalization/log rescaling
//! - A JSON parameter-file format with name-for-function substitution
//!
//! ## Basic Usage
//!
//! ```
//! use sedfit_params::config::RunConfig;
//! use sedfit_params::model::SedModel;
//! use sedfit_params::params::{ParameterDescriptor, Prior};
//! use ndarray::array;
//!
//! let mut model = SedModel::new(RunConfig::default(), vec![
//!     ParameterDescriptor::free("mass", 1e10, Prior::named("tophat", [("low", 1e8), ("high", 1e12)])),
//!     ParameterDescriptor::fixed("zred", 0.1),
//! ]).unwrap();
//!
//! // sampler loop: propagate a candidate theta, evaluate its prior
//! let theta = array![3e10];
//! model.set_parameters(theta.view()).unwrap();
//! let lnp = model.log_prior(theta.view()).unwrap();
//! assert_eq!(lnp, 0.0);
//! ```

// Public modules
pub mod error;

// Parameter system
pub mod params;

pub mod attenuation;
pub mod config;
pub mod io;
pub mod model;
pub mod obs;
pub mod priors;

// Re-exports for convenience
pub use config::RunConfig;
pub use error::{ModelError, Result};
pub use model::SedModel;
pub use obs::{Calibration, MedianCalibration, Observation};
pub use params::{DescriptorRegistry, ParameterDescriptor, Prior, ThetaIndex};
pub use priors::PriorRegistry;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
