use super::model::Model;
use phf::{Map, phf_map};
use std::fmt;
use thiserror::Error;

static SUPPORTED_SCHEMAS: Map<&'static str, &'static str> = phf_map! {
    "L2V1" => "Level 2 Version 1",
    "L2V2" => "Level 2 Version 2",
    "L2V3" => "Level 2 Version 3",
    "L2V4" => "Level 2 Version 4",
    "L3V1" => "Level 3 Version 1",
    "L3V2" => "Level 3 Version 2",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaVersion {
    pub level: u32,
    pub version: u32,
}

impl SchemaVersion {
    /// The schema new documents are created in and subsystems are upgraded to.
    pub const LATEST: SchemaVersion = SchemaVersion {
        level: 3,
        version: 1,
    };

    pub const fn new(level: u32, version: u32) -> Self {
        Self { level, version }
    }

    fn key(&self) -> String {
        format!("L{}V{}", self.level, self.version)
    }

    pub fn is_supported(&self) -> bool {
        SUPPORTED_SCHEMAS.contains_key(self.key().as_str())
    }

    pub fn description(&self) -> Option<&'static str> {
        SUPPORTED_SCHEMAS.get(self.key().as_str()).copied()
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::LATEST
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}V{}", self.level, self.version)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Unsupported schema {0}")]
    Unsupported(SchemaVersion),

    #[error("Cannot convert model '{model}' to {target}: {}", .issues.join("; "))]
    Incompatible {
        model: String,
        target: SchemaVersion,
        issues: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionOutcome {
    Converted { from: SchemaVersion },
    Unchanged,
}

/// Ownership root for a single [`Model`] together with the schema it is
/// expressed in.
#[derive(Debug, Clone, Default)]
pub struct Document {
    schema: SchemaVersion,
    model: Model,
}

impl Document {
    pub fn new(schema: SchemaVersion, model: Model) -> Self {
        Self { schema, model }
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn into_model(self) -> Model {
        self.model
    }

    /// Lists the parts of the current model that `target` cannot express.
    pub fn compatibility_issues(&self, target: SchemaVersion) -> Vec<String> {
        let mut issues = Vec::new();
        if target.level < 3 && !self.model.units.is_empty() {
            issues.push("model-level unit attributes require Level 3".to_string());
        }
        if target == SchemaVersion::new(2, 1) && !self.model.constraints().is_empty() {
            issues.push(format!(
                "{} constraint(s) cannot be expressed before Level 2 Version 2",
                self.model.constraints().len()
            ));
        }
        issues
    }

    /// Re-targets the document at another schema after checking that nothing
    /// in the model would be lost.
    pub fn convert(&mut self, target: SchemaVersion) -> Result<ConversionOutcome, SchemaError> {
        if !target.is_supported() {
            return Err(SchemaError::Unsupported(target));
        }
        if target == self.schema {
            return Ok(ConversionOutcome::Unchanged);
        }
        let issues = self.compatibility_issues(target);
        if !issues.is_empty() {
            return Err(SchemaError::Incompatible {
                model: self.model.id.clone(),
                target,
                issues,
            });
        }
        let from = self.schema;
        self.schema = target;
        Ok(ConversionOutcome::Converted { from })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::definitions::Constraint;

    #[test]
    fn latest_schema_is_supported_default() {
        assert_eq!(SchemaVersion::default(), SchemaVersion::new(3, 1));
        assert!(SchemaVersion::LATEST.is_supported());
        assert_eq!(
            SchemaVersion::LATEST.description(),
            Some("Level 3 Version 1")
        );
        assert!(!SchemaVersion::new(1, 2).is_supported());
    }

    #[test]
    fn convert_to_same_schema_is_unchanged() {
        let mut document = Document::default();
        assert_eq!(
            document.convert(SchemaVersion::LATEST),
            Ok(ConversionOutcome::Unchanged)
        );
    }

    #[test]
    fn convert_down_to_level_two_succeeds_for_plain_models() {
        let mut document = Document::new(SchemaVersion::LATEST, Model::new("plain"));
        assert_eq!(
            document.convert(SchemaVersion::new(2, 4)),
            Ok(ConversionOutcome::Converted {
                from: SchemaVersion::LATEST
            })
        );
        assert_eq!(document.schema(), SchemaVersion::new(2, 4));
    }

    #[test]
    fn convert_rejects_model_units_below_level_three() {
        let mut model = Model::new("units");
        model.units.substance = Some("count".into());
        let mut document = Document::new(SchemaVersion::LATEST, model);
        let err = document.convert(SchemaVersion::new(2, 4)).unwrap_err();
        assert!(matches!(err, SchemaError::Incompatible { .. }));
        assert_eq!(document.schema(), SchemaVersion::LATEST);
    }

    #[test]
    fn convert_rejects_constraints_in_level_two_version_one() {
        let mut model = Model::new("constrained");
        model.add_constraint(Constraint {
            math: "x > 0".parse().unwrap(),
            message: None,
        });
        let mut document = Document::new(SchemaVersion::new(2, 4), model);
        assert!(document.convert(SchemaVersion::new(2, 1)).is_err());
        assert!(document.convert(SchemaVersion::new(2, 2)).is_ok());
    }

    #[test]
    fn convert_rejects_unsupported_target() {
        let mut document = Document::default();
        assert_eq!(
            document.convert(SchemaVersion::new(4, 0)),
            Err(SchemaError::Unsupported(SchemaVersion::new(4, 0)))
        );
    }
}
