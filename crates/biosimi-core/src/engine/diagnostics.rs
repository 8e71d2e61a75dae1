use thiserror::Error;
use tracing::warn;

/// A recoverable structural problem found while composing or editing models.
///
/// Warnings never abort an operation; a documented default is used instead and
/// the warning is handed back to the caller next to the result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralWarning {
    #[error("Model '{model}' declares no compartment; assuming a size of {assumed}")]
    NoCompartment { model: String, assumed: f64 },

    #[error("Model '{model}' declares {count} compartments; using the size of '{used}'")]
    MultipleCompartments {
        model: String,
        count: usize,
        used: String,
    },

    #[error("Compartment '{compartment}' in model '{model}' has no size; assuming {assumed}")]
    MissingCompartmentSize {
        model: String,
        compartment: String,
        assumed: f64,
    },

    #[error(
        "Species named '{name}' live in {} different compartments ({}); identifiers were qualified instead of merging",
        .compartments.len(),
        .compartments.join(", ")
    )]
    CrossCompartmentCollision {
        name: String,
        compartments: Vec<String>,
    },

    #[error(
        "Duplicate reaction '{reaction}' ({signature}) could not be removed: {reason}. Check reaction rates for consistency"
    )]
    ReactionRemovalRefused {
        reaction: String,
        signature: String,
        reason: String,
    },

    #[error("Unit definition '{id}' from model '{model}' differs from an existing one with the same identifier; the first definition is kept")]
    ConflictingUnitDefinition { id: String, model: String },

    #[error("Connection pass did not settle after {passes} passes; the result may still contain uncollapsed species")]
    ConnectionNotSettled { passes: usize },

    #[error("Model '{model}' has {found} compartments but {given} new compartment identifiers were given")]
    CompartmentCountMismatch {
        model: String,
        found: usize,
        given: usize,
    },

    #[error("Model '{model}' is already expressed in {schema}; nothing to convert")]
    SchemaUnchanged { model: String, schema: String },

    #[error("Model '{model}' has no fast reactions to reduce")]
    NoFastReactions { model: String },
}

/// Collects warnings for one operation and mirrors each into the log.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<StructuralWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: StructuralWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[StructuralWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<StructuralWarning> {
        self.warnings
    }
}
