//! Black-box tests for observation ingestion and parameter rescaling

use approx::assert_relative_eq;
use ndarray::array;
use sedfit_params::config::RunConfig;
use sedfit_params::model::{SedModel, NORMALIZATION_GUESS, PIVOT_WAVE};
use sedfit_params::obs::{MedianCalibration, Observation};
use sedfit_params::params::{InitSpec, ParameterDescriptor, Prior, PriorArg};
use sedfit_params::ModelError;

fn descriptors() -> Vec<ParameterDescriptor> {
    vec![
        ParameterDescriptor::free(
            "spec_norm",
            2.0,
            Prior::named("tophat", [("low", 1.0), ("high", 4.0)]),
        ),
        ParameterDescriptor::fixed("zred", 0.1),
    ]
}

/// An observation whose unmasked mean flux is exactly 2, so the stock
/// calibration derives a normalization scale of 2.
fn obs() -> Observation {
    Observation {
        wavelength: Some(array![4000.0, 5000.0, 6000.0]),
        spectrum: Some(array![1.0, 2.0, 3.0]),
        unc: Some(array![0.1, 0.1, 0.1]),
        mask: Some(array![true, true, true]),
        ..Default::default()
    }
}

fn run(normalize: bool, logify: bool) -> RunConfig {
    RunConfig {
        normalize_spectrum: normalize,
        logify_spectrum: logify,
        ..Default::default()
    }
}

#[test]
fn normalize_then_logify_composes() {
    let mut model = SedModel::new(run(true, true), descriptors()).unwrap();
    model.add_obs(obs(), &MedianCalibration).unwrap();

    let desc = model.registry().get("spec_norm").unwrap();

    // init 2.0 -> /2 -> 1.0 -> ln -> 0.0
    assert_eq!(desc.init, InitSpec::Scalar(0.0));

    match &desc.prior {
        Prior::Named { args, .. } => {
            match (&args["low"], &args["high"]) {
                (PriorArg::Scalar(low), PriorArg::Scalar(high)) => {
                    assert_relative_eq!(*low, 0.5f64.ln(), epsilon = 1e-12);
                    assert_relative_eq!(*high, 2.0f64.ln(), epsilon = 1e-12);
                }
                other => panic!("expected scalar bounds, got {:?}", other),
            }
        }
        other => panic!("expected named prior, got {:?}", other),
    }

    // the rescaled init propagated into a fresh initial theta
    assert_relative_eq!(model.initial_theta()[0], 0.0);
}

#[test]
fn normalize_records_scale_and_pivot() {
    let mut model = SedModel::new(run(true, false), descriptors()).unwrap();
    model.add_obs(obs(), &MedianCalibration).unwrap();

    assert_relative_eq!(model.param(NORMALIZATION_GUESS).unwrap()[0], 2.0);
    assert_relative_eq!(model.param(PIVOT_WAVE).unwrap()[0], 5000.0);
    assert_relative_eq!(model.initial_theta()[0], 1.0);
}

#[test]
fn logify_transforms_observation_in_place() {
    let mut model = SedModel::new(run(false, true), descriptors()).unwrap();
    model.add_obs(obs(), &MedianCalibration).unwrap();

    let stored = model.obs().unwrap();
    let spectrum = stored.spectrum.as_ref().unwrap();
    assert_relative_eq!(spectrum[0], 0.0); // ln(1)
    assert_relative_eq!(spectrum[2], 3.0f64.ln());

    // fractional uncertainty
    let unc = stored.unc.as_ref().unwrap();
    assert_relative_eq!(unc[2], 0.1 / 3.0);
}

#[test]
fn second_ingestion_fails() {
    let mut model = SedModel::new(run(true, true), descriptors()).unwrap();
    model.add_obs(obs(), &MedianCalibration).unwrap();

    match model.add_obs(obs(), &MedianCalibration) {
        Err(ModelError::AlreadyIngested) => {}
        other => panic!("expected AlreadyIngested, got {:?}", other),
    }

    // the guard prevented a second (double) rescale
    let desc = model.registry().get("spec_norm").unwrap();
    assert_eq!(desc.init, InitSpec::Scalar(0.0));
}

#[test]
fn failed_ingestion_leaves_model_untouched() {
    // no spec_norm parameter: the rescale target is missing
    let mut model = SedModel::new(
        run(true, false),
        vec![ParameterDescriptor::free(
            "mass",
            1e10,
            Prior::named("tophat", [("low", 1e8), ("high", 1e12)]),
        )],
    )
    .unwrap();
    let theta_before = model.theta();

    match model.add_obs(obs(), &MedianCalibration) {
        Err(ModelError::UnknownParameter(name)) => assert_eq!(name, "spec_norm"),
        other => panic!("expected UnknownParameter, got {:?}", other),
    }

    assert!(model.obs().is_none());
    assert_eq!(model.ndof(), None);
    assert_eq!(model.theta(), theta_before);

    // a later, well-formed ingestion still works
    let mut obs = obs();
    obs.spectrum = None;
    obs.mask = None;
    obs.wavelength = None;
    model.add_obs(obs, &MedianCalibration).unwrap();
}

#[test]
fn dof_counts_unmasked_data() {
    let mut model = SedModel::new(run(false, false), descriptors()).unwrap();

    let obs = Observation {
        spectrum: Some(array![1.0, 2.0, 3.0, 4.0, 5.0]),
        unc: Some(array![0.1, 0.1, 0.1, 0.1, 0.1]),
        mask: Some(array![true, true, false, true, false]),
        maggies: Some(array![0.1, 0.2, 0.3]),
        maggies_unc: Some(array![0.01, 0.01, 0.01]),
        phot_mask: Some(array![true, false, true]),
        ..Default::default()
    };

    // 3 unmasked pixels + 2 unmasked bands - 1 free dim
    let ndof = model.add_obs(obs, &MedianCalibration).unwrap();
    assert_eq!(ndof, 4);
}

#[test]
fn photometry_only_clears_spectral_uncertainty() {
    let mut model = SedModel::new(run(true, true), descriptors()).unwrap();

    let obs = Observation {
        unc: Some(array![0.1, 0.1]),
        maggies: Some(array![0.1, 0.2]),
        maggies_unc: Some(array![0.01, 0.01]),
        ..Default::default()
    };

    let ndof = model.add_obs(obs, &MedianCalibration).unwrap();
    assert_eq!(ndof, 2 - 1);

    let stored = model.obs().unwrap();
    assert!(stored.unc.is_none());
    assert!(stored.maggies_unc.is_some());

    // no spectrum means no rescale, even with both flags enabled
    let desc = model.registry().get("spec_norm").unwrap();
    assert_eq!(desc.init, InitSpec::Scalar(2.0));
}
