use super::config::ConfigError;
use super::simulation::SimulationError;
use crate::core::io::toml_model::TomlModelError;
use crate::core::io::trajectory::TrajectoryError;
use crate::core::models::document::SchemaError;
use crate::core::models::model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No element with identifier '{id}' in model '{model}'")]
    NotFound { id: String, model: String },

    #[error("Species '{name}' expected in model '{model}' was not found")]
    SpeciesNotFound { name: String, model: String },

    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("Old and new identifiers are identical ('{0}')")]
    IdenticalIds(String),

    #[error("Identifier '{0}' is already declared in the model")]
    IdentifierInUse(String),

    #[error("Schema conversion failed: {0}")]
    SchemaConversion(#[from] SchemaError),

    #[error("Model integrity violation: {0}")]
    Model(#[from] ModelError),

    #[error("Failed to load model document: {0}")]
    ModelFile(#[from] TomlModelError),

    #[error("Simulation failed: {0}")]
    Simulation(#[from] SimulationError),

    #[error("Failed to load trajectory: {0}")]
    Trajectory(#[from] TrajectoryError),

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Errors that leave the model untouched and can be reported without
    /// aborting the surrounding operation.
    pub fn is_benign(&self) -> bool {
        matches!(self, EngineError::IdenticalIds(_))
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::InvalidArgument(err.to_string())
    }
}
