//! Parameter-file serialization bridge
//!
//! Persists a model configuration as a two-element JSON document
//! `[run_config, descriptor_list]`, with the descriptor list in canonical
//! order. Functions are substituted by identifiers on write and restored
//! by registry lookup after read: a named prior serializes as
//! `prior_function_name` + `prior_args`, and a `dust_curve` descriptor's
//! curve-valued init serializes as `dust_curve_name` with `init` removed.
//!
//! The file naming convention is `<basename>.bpars.json`; reading injects
//! the path into the returned run config as `param_file`.

use crate::config::RunConfig;
use crate::error::{ModelError, Result};
use crate::params::{DescriptorRegistry, InitSpec, ParameterDescriptor, Prior, PriorArgs};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// File extension appended to the basename on write.
pub const PARAM_FILE_EXT: &str = "bpars.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum NumericInit {
    Scalar(f64),
    Vector(Vec<f64>),
}

/// On-disk form of a parameter descriptor, with functions replaced by
/// identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredDescriptor {
    name: String,

    #[serde(rename = "N")]
    length: usize,

    isfree: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    init: Option<NumericInit>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    units: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    prior_function_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    prior_args: Option<PriorArgs>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    dust_curve_name: Option<String>,
}

impl From<&ParameterDescriptor> for StoredDescriptor {
    fn from(desc: &ParameterDescriptor) -> Self {
        let (init, dust_curve_name) = match &desc.init {
            InitSpec::Scalar(v) => (Some(NumericInit::Scalar(*v)), None),
            InitSpec::Vector(v) => (Some(NumericInit::Vector(v.clone())), None),
            InitSpec::Curve(name) => (None, Some(name.clone())),
        };
        let (prior_function_name, prior_args) = match &desc.prior {
            Prior::Flat => (None, None),
            Prior::Named { id, args } => (Some(id.clone()), Some(args.clone())),
        };
        Self {
            name: desc.name.clone(),
            length: desc.length,
            isfree: desc.is_free,
            init,
            units: desc.units.clone(),
            prior_function_name,
            prior_args,
            dust_curve_name,
        }
    }
}

impl TryFrom<StoredDescriptor> for ParameterDescriptor {
    type Error = ModelError;

    fn try_from(stored: StoredDescriptor) -> Result<Self> {
        let init = match (stored.dust_curve_name, stored.init) {
            (Some(curve), _) => InitSpec::Curve(curve),
            (None, Some(NumericInit::Scalar(v))) => InitSpec::Scalar(v),
            (None, Some(NumericInit::Vector(v))) => InitSpec::Vector(v),
            (None, None) => {
                return Err(ModelError::InvalidDescriptor {
                    name: stored.name,
                    reason: "neither init nor dust_curve_name is present".to_string(),
                })
            }
        };
        let prior = match (stored.prior_function_name, stored.prior_args) {
            (Some(id), Some(args)) => Prior::Named { id, args },
            (None, None) => Prior::Flat,
            (Some(_), None) | (None, Some(_)) => {
                return Err(ModelError::InvalidDescriptor {
                    name: stored.name,
                    reason: "prior_function_name and prior_args must appear together"
                        .to_string(),
                })
            }
        };
        Ok(Self {
            name: stored.name,
            length: stored.length,
            is_free: stored.isfree,
            init,
            units: stored.units,
            prior,
        })
    }
}

fn to_document(run: &RunConfig, registry: &DescriptorRegistry) -> (RunConfig, Vec<StoredDescriptor>) {
    let stored = registry.iter().map(StoredDescriptor::from).collect();
    (run.clone(), stored)
}

fn from_document(run: RunConfig, stored: Vec<StoredDescriptor>) -> Result<(RunConfig, DescriptorRegistry)> {
    let descriptors = stored
        .into_iter()
        .map(ParameterDescriptor::try_from)
        .collect::<Result<Vec<_>>>()?;
    Ok((run, DescriptorRegistry::from_list(descriptors)?))
}

/// Serialize a run config and descriptor registry to a JSON string.
pub fn params_to_json(run: &RunConfig, registry: &DescriptorRegistry) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_document(run, registry))?)
}

/// Deserialize a run config and descriptor registry from a JSON string.
pub fn params_from_json(json: &str) -> Result<(RunConfig, DescriptorRegistry)> {
    let (run, stored): (RunConfig, Vec<StoredDescriptor>) = serde_json::from_str(json)?;
    from_document(run, stored)
}

/// Write a parameter file named `<basename>.bpars.json`.
///
/// The written run config records the full output path as `param_file`.
/// Returns that path.
///
/// # Examples
///
/// ```no_run
/// use sedfit_params::config::RunConfig;
/// use sedfit_params::io::write_params;
/// use sedfit_params::params::{DescriptorRegistry, ParameterDescriptor};
///
/// let registry = DescriptorRegistry::from_list(vec![
///     ParameterDescriptor::fixed("zred", 0.1),
/// ]).unwrap();
/// let path = write_params("demo_run", &RunConfig::default(), &registry).unwrap();
/// assert!(path.ends_with("demo_run.bpars.json"));
/// ```
pub fn write_params<P: AsRef<Path>>(
    basename: P,
    run: &RunConfig,
    registry: &DescriptorRegistry,
) -> Result<PathBuf> {
    let mut path = basename.as_ref().as_os_str().to_owned();
    path.push(".");
    path.push(PARAM_FILE_EXT);
    let path = PathBuf::from(path);

    let mut run = run.clone();
    run.param_file = Some(path.clone());

    let file = File::create(&path)?;
    serde_json::to_writer_pretty(file, &to_document(&run, registry))?;
    Ok(path)
}

/// Read a parameter file written by [`write_params`].
///
/// The returned run config has `param_file` set to the path read from.
pub fn read_params<P: AsRef<Path>>(path: P) -> Result<(RunConfig, DescriptorRegistry)> {
    let mut file = File::open(path.as_ref())?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let (mut run, registry) = params_from_json(&contents)?;
    run.param_file = Some(path.as_ref().to_path_buf());
    Ok((run, registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PriorArg;

    fn registry() -> DescriptorRegistry {
        DescriptorRegistry::from_list(vec![
            ParameterDescriptor::free(
                "mass",
                1e10,
                Prior::named("tophat", [("low", 1e8), ("high", 1e12)]),
            ),
            ParameterDescriptor::fixed("zred", 0.1),
            ParameterDescriptor::with_curve("dust_curve", "powerlaw"),
        ])
        .unwrap()
    }

    #[test]
    fn test_json_round_trip() {
        let json = params_to_json(&RunConfig::default(), &registry()).unwrap();
        let (_, reread) = params_from_json(&json).unwrap();

        assert_eq!(reread.names(), registry().names());

        // prior identity is preserved by registry key
        match &reread.get("mass").unwrap().prior {
            Prior::Named { id, args } => {
                assert_eq!(id, "tophat");
                assert_eq!(args["low"], PriorArg::Scalar(1e8));
            }
            other => panic!("expected named prior, got {:?}", other),
        }
        assert!(reread.get("zred").unwrap().prior.is_flat());
    }

    #[test]
    fn test_dust_curve_substitution() {
        let json = params_to_json(&RunConfig::default(), &registry()).unwrap();

        // init is removed in favor of dust_curve_name on disk
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let plist = value.as_array().unwrap()[1].as_array().unwrap();
        let dust = plist
            .iter()
            .find(|p| p["name"] == "dust_curve")
            .unwrap();
        assert_eq!(dust["dust_curve_name"], "powerlaw");
        assert!(dust.get("init").is_none());

        let (_, reread) = params_from_json(&json).unwrap();
        assert_eq!(
            reread.get("dust_curve").unwrap().init,
            InitSpec::Curve("powerlaw".to_string())
        );
    }

    #[test]
    fn test_mismatched_prior_fields_rejected() {
        let json = r#"[{}, [{"name": "mass", "N": 1, "isfree": true, "init": 1.0,
                            "prior_function_name": "tophat"}]]"#;
        match params_from_json(json) {
            Err(ModelError::InvalidDescriptor { name, .. }) => assert_eq!(name, "mass"),
            Err(other) => panic!("expected InvalidDescriptor, got {:?}", other),
            Ok(_) => panic!("expected InvalidDescriptor, got Ok"),
        }
    }
}
