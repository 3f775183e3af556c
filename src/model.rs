//! Model parameter state and orchestration
//!
//! This module provides [`SedModel`], the live model instance a sampler
//! drives: it owns the descriptor registry, the theta index, the named
//! parameter state, and the ingested observation, and it exposes the
//! per-iteration hot path (theta assembly, theta scattering, prior
//! evaluation).
//!
//! A model instance is single-threaded by contract. Parallel sampler
//! workers must each own an independent instance; `set_parameters`
//! mutates the state in place.

use crate::config::RunConfig;
use crate::error::{ModelError, Result};
use crate::obs::{Calibration, Observation};
use crate::params::{
    DescriptorRegistry, InitSpec, ParamState, ParameterDescriptor, Prior, ThetaIndex,
};
use crate::priors::PriorRegistry;
use ndarray::{s, Array1, ArrayView1};
use std::collections::HashMap;

/// Parameter rescaled when spectrum normalization or logification is
/// requested at ingestion.
pub const SPEC_NORM: &str = "spec_norm";

/// State entry recording the data-derived normalization scale.
pub const NORMALIZATION_GUESS: &str = "normalization_guess";

/// State entry recording the normalization pivot wavelength.
pub const PIVOT_WAVE: &str = "pivot_wave";

/// A stellar-population model's parameter state.
///
/// Construction runs an initial configure pass: the theta index is built
/// from the free parameters in canonical order, the named state is
/// seeded from each descriptor's init, and the implied initial theta
/// vector is snapshotted.
///
/// # Examples
///
/// ```
/// use sedfit_params::model::SedModel;
/// use sedfit_params::config::RunConfig;
/// use sedfit_params::params::{ParameterDescriptor, Prior};
///
/// let model = SedModel::new(RunConfig::default(), vec![
///     ParameterDescriptor::free("mass", 1e10, Prior::named("tophat", [("low", 1e8), ("high", 1e12)])),
///     ParameterDescriptor::fixed("zred", 0.1),
/// ]).unwrap();
///
/// assert_eq!(model.ndim(), 1);
/// assert_eq!(model.free_params(), vec!["mass"]);
/// assert_eq!(model.theta()[0], 1e10);
/// ```
pub struct SedModel {
    run: RunConfig,
    registry: DescriptorRegistry,
    priors: PriorRegistry,
    theta_index: ThetaIndex,
    state: ParamState,
    initial_theta: Array1<f64>,
    obs: Option<Observation>,
    ndof: Option<i64>,
    ingested: bool,
}

/// Build the theta index, seeded state, and initial theta implied by a
/// registry. Pure with respect to the registry; used by configure and by
/// observation ingestion to stage a full replacement before committing.
fn build_state(
    registry: &DescriptorRegistry,
    overrides: &HashMap<String, Vec<f64>>,
) -> Result<(ThetaIndex, ParamState, Array1<f64>)> {
    let index = ThetaIndex::build(registry);

    let mut state = ParamState::with_capacity(registry.len());
    for desc in registry.iter() {
        // curve-valued inits have no numeric state entry
        if matches!(desc.init, InitSpec::Curve(_)) {
            continue;
        }
        state.insert(desc.name.clone(), desc.init_values()?);
    }

    for (name, value) in overrides {
        let desc = registry
            .get(name)
            .ok_or_else(|| ModelError::UnknownParameter(name.clone()))?;
        if value.len() != desc.length {
            return Err(ModelError::DimensionMismatch {
                expected: desc.length,
                actual: value.len(),
            });
        }
        state.insert(name.clone(), Array1::from_vec(value.clone()));
    }

    let initial_theta = index.assemble(&state);
    Ok((index, state, initial_theta))
}

impl SedModel {
    /// Create a model from a run config and an ordered descriptor list,
    /// using the built-in prior registry.
    pub fn new(run: RunConfig, descriptors: Vec<ParameterDescriptor>) -> Result<Self> {
        Self::with_priors(run, descriptors, PriorRegistry::with_builtins())
    }

    /// Create a model with a caller-supplied prior registry.
    pub fn with_priors(
        run: RunConfig,
        descriptors: Vec<ParameterDescriptor>,
        priors: PriorRegistry,
    ) -> Result<Self> {
        let registry = DescriptorRegistry::from_list(descriptors)?;
        let (theta_index, state, initial_theta) = build_state(&registry, &HashMap::new())?;
        Ok(Self {
            run,
            registry,
            priors,
            theta_index,
            state,
            initial_theta,
            obs: None,
            ndof: None,
            ingested: false,
        })
    }

    /// Rebuild the theta index and parameter state from the registry.
    ///
    /// `overrides` replaces initial values for matching names on top of
    /// the descriptors' inits; an override naming an unknown parameter
    /// fails with `UnknownParameter`. The replacement is all-or-nothing:
    /// on failure the previous index and state are left untouched.
    pub fn configure(&mut self, overrides: &HashMap<String, Vec<f64>>) -> Result<()> {
        let (theta_index, state, initial_theta) = build_state(&self.registry, overrides)?;
        self.theta_index = theta_index;
        self.state = state;
        self.initial_theta = initial_theta;
        Ok(())
    }

    /// Number of free scalar dimensions.
    pub fn ndim(&self) -> usize {
        self.theta_index.ndim()
    }

    /// Names of the free parameters, in canonical order.
    pub fn free_params(&self) -> Vec<&str> {
        self.registry.free_names()
    }

    /// Names of the fixed parameters, in canonical order.
    pub fn fixed_params(&self) -> Vec<&str> {
        self.registry.fixed_names()
    }

    /// The current theta vector, assembled from the parameter state.
    pub fn theta(&self) -> Array1<f64> {
        self.theta_index.assemble(&self.state)
    }

    /// The initial theta vector snapshotted by the last configure.
    pub fn initial_theta(&self) -> ArrayView1<f64> {
        self.initial_theta.view()
    }

    /// The current value of a parameter (free or fixed), if present.
    pub fn param(&self, name: &str) -> Option<ArrayView1<f64>> {
        self.state.get(name).map(|v| v.view())
    }

    /// The descriptor registry.
    pub fn registry(&self) -> &DescriptorRegistry {
        &self.registry
    }

    /// The run configuration.
    pub fn run_config(&self) -> &RunConfig {
        &self.run
    }

    /// The ingested observation, if any.
    pub fn obs(&self) -> Option<&Observation> {
        self.obs.as_ref()
    }

    /// Degrees of freedom derived at ingestion: unmasked data points
    /// minus free dimensions. `None` before an observation is ingested.
    pub fn ndof(&self) -> Option<i64> {
        self.ndof
    }

    /// Propagate a theta vector into the parameter state.
    ///
    /// Only free parameters are written; fixed parameters keep their
    /// configured values. This is the sampler hot path together with
    /// [`log_prior`](Self::log_prior).
    pub fn set_parameters(&mut self, theta: ArrayView1<f64>) -> Result<()> {
        self.theta_index.scatter(theta, &mut self.state)
    }

    /// The summed log-prior over all free parameters for a candidate
    /// theta vector.
    ///
    /// Each free parameter's theta segment is passed to its registered
    /// prior function with the configured arguments; `Flat` priors
    /// contribute 0. Fails with `DimensionMismatch` on a wrong-length
    /// theta and `MissingPrior` when a named prior has no registry entry.
    pub fn log_prior(&self, theta: ArrayView1<f64>) -> Result<f64> {
        if theta.len() != self.ndim() {
            return Err(ModelError::DimensionMismatch {
                expected: self.ndim(),
                actual: theta.len(),
            });
        }

        let mut lnp = 0.0;
        for (name, range) in self.theta_index.iter() {
            let desc = self
                .registry
                .get(name)
                .ok_or_else(|| ModelError::UnknownParameter(name.to_string()))?;
            match &desc.prior {
                Prior::Flat => {}
                Prior::Named { id, args } => {
                    let f = self.priors.get(id).ok_or_else(|| ModelError::MissingPrior {
                        name: name.to_string(),
                        id: id.clone(),
                    })?;
                    let segment = theta.slice(s![range.start..range.end]);
                    lnp += f(segment, args).sum();
                }
            }
        }
        Ok(lnp)
    }

    /// One display label per theta position, ordered by index.
    ///
    /// See [`ThetaIndex::labels`].
    pub fn theta_labels(&self, name_overrides: &HashMap<String, String>) -> Vec<String> {
        self.theta_index.labels(name_overrides)
    }

    /// Apply a rescale transform to a parameter's initial value and every
    /// numeric entry of its prior arguments.
    ///
    /// The transform mutates the stored descriptor, not just the live
    /// state; a subsequent configure propagates it.
    pub fn rescale_parameter(&mut self, name: &str, f: &dyn Fn(f64) -> f64) -> Result<()> {
        self.registry
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownParameter(name.to_string()))?
            .rescale(f);
        Ok(())
    }

    /// Ingest an observation: derive degrees of freedom, rescale
    /// `spec_norm` per the run config, and reconfigure.
    ///
    /// Rescaling is destructive and one-directional, so ingestion is
    /// strictly one-shot: a second call fails with `AlreadyIngested`.
    /// When both normalization and logification are enabled they compose
    /// in that order. On any failure the model keeps its previous valid
    /// state.
    ///
    /// Returns the derived degrees of freedom.
    pub fn add_obs<C: Calibration>(&mut self, obs: Observation, calib: &C) -> Result<i64> {
        if self.ingested {
            return Err(ModelError::AlreadyIngested);
        }

        // Stage everything against local copies; commit only at the end.
        let mut obs = obs;
        let mut registry = self.registry.clone();
        let mut ndof = -(self.ndim() as i64);
        let mut norm_guess = None;
        let mut pivot_wave = None;

        if obs.has_spectrum() {
            ndof += obs.spec_pixel_count() as i64;

            if self.run.normalize_spectrum {
                let (scale, pivot) = calib.normalize(&obs);
                rescale_in(&mut registry, SPEC_NORM, &|x| x / scale)?;
                norm_guess = Some(scale);
                pivot_wave = Some(pivot);
            }

            if self.run.logify_spectrum {
                let flux = obs.spectrum.take().unwrap_or_default();
                let unc = obs.unc.take().unwrap_or_else(|| Array1::zeros(flux.len()));
                let mask = obs
                    .mask
                    .take()
                    .unwrap_or_else(|| Array1::from_elem(flux.len(), true));

                let (flux, unc, mask) = calib.logify(&flux, &unc, &mask);
                obs.spectrum = Some(flux);
                obs.unc = Some(unc);
                obs.mask = Some(mask);

                rescale_in(&mut registry, SPEC_NORM, &|x| x.ln())?;
            }
        } else {
            // no spectroscopic uncertainty
            obs.unc = None;
        }

        if obs.has_photometry() {
            ndof += obs.phot_band_count() as i64;
        } else {
            // no photometric uncertainty
            obs.maggies_unc = None;
        }

        let (theta_index, mut state, initial_theta) = build_state(&registry, &HashMap::new())?;
        if let Some(scale) = norm_guess {
            state.insert(NORMALIZATION_GUESS.to_string(), Array1::from_elem(1, scale));
        }
        if let Some(pivot) = pivot_wave {
            state.insert(PIVOT_WAVE.to_string(), Array1::from_elem(1, pivot));
        }

        self.registry = registry;
        self.theta_index = theta_index;
        self.state = state;
        self.initial_theta = initial_theta;
        self.obs = Some(obs);
        self.ndof = Some(ndof);
        self.ingested = true;
        Ok(ndof)
    }
}

fn rescale_in(
    registry: &mut DescriptorRegistry,
    name: &str,
    f: &dyn Fn(f64) -> f64,
) -> Result<()> {
    registry
        .get_mut(name)
        .ok_or_else(|| ModelError::UnknownParameter(name.to_string()))?
        .rescale(f);
    Ok(())
}
