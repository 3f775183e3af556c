use thiserror::Error;

/// Error types for the sedfit-params library.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Two parameter descriptors share the same name.
    #[error("Duplicate parameter name: '{0}'")]
    DuplicateName(String),

    /// A named parameter does not exist in the registry.
    #[error("Unknown parameter: '{0}'")]
    UnknownParameter(String),

    /// A theta vector's length does not match the model dimension.
    #[error("Theta dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A free parameter's named prior has no entry in the prior registry.
    #[error("No prior function registered for '{id}' (parameter '{name}')")]
    MissingPrior { name: String, id: String },

    /// An observation was ingested into a model that already holds one.
    #[error("Observation already ingested; rescaling may be applied at most once per model")]
    AlreadyIngested,

    /// A parameter descriptor is internally inconsistent.
    #[error("Invalid descriptor '{name}': {reason}")]
    InvalidDescriptor { name: String, reason: String },

    /// A dust-curve name has no entry in the attenuation registry.
    #[error("Unknown dust curve: '{0}'")]
    UnknownDustCurve(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for sedfit-params operations.
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::DuplicateName("mass".to_string());
        assert!(format!("{}", err).contains("mass"));

        let err = ModelError::DimensionMismatch {
            expected: 4,
            actual: 3,
        };
        assert!(format!("{}", err).contains("expected 4, got 3"));

        let err = ModelError::MissingPrior {
            name: "zmet".to_string(),
            id: "tophat".to_string(),
        };
        assert!(format!("{}", err).contains("zmet"));
        assert!(format!("{}", err).contains("tophat"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ModelError = io_err.into();

        match err {
            ModelError::Io(_) => (),
            _ => panic!("Expected Io variant"),
        }
    }
}
