use crate::core::models::subsystem::Subsystem;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value: {0}")]
    InvalidArgument(String),
}

/// How the amount of a collapsed species group is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositionPolicy {
    /// Amounts are weighted by source compartment size and divided by the
    /// target size.
    Volume,
    /// The first member's amount is kept.
    #[default]
    Virtual,
}

impl fmt::Display for CompositionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionPolicy::Volume => f.write_str("volume"),
            CompositionPolicy::Virtual => f.write_str("virtual"),
        }
    }
}

impl FromStr for CompositionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "volume" => Ok(CompositionPolicy::Volume),
            "virtual" => Ok(CompositionPolicy::Virtual),
            other => Err(ConfigError::InvalidArgument(format!(
                "unknown composition policy '{}' (expected 'volume' or 'virtual')",
                other
            ))),
        }
    }
}

/// Species displayed as `connected` are renamed to `name` and merged into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub name: String,
    pub connected: String,
}

impl Connection {
    pub fn new(name: impl Into<String>, connected: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connected: connected.into(),
        }
    }
}

/// An immutable description of one composition.
///
/// Requests own clones of their subsystems, so operators never observe a
/// caller mutating an input mid-run.
#[derive(Debug, Clone)]
pub struct CompositionRequest {
    pub subsystems: Vec<Subsystem>,
    pub shared_resources: Vec<String>,
    pub target_size: Option<f64>,
    pub policy: CompositionPolicy,
    pub combine_by_name: bool,
    pub connections: Vec<Connection>,
}

impl CompositionRequest {
    pub fn is_shared(&self, name: &str) -> bool {
        self.shared_resources.iter().any(|r| r == name)
    }

    pub fn source_ids(&self) -> Vec<&str> {
        self.subsystems.iter().map(|s| s.id()).collect()
    }

    /// Checks the request's own consistency. Connection graph checks belong
    /// to the connect operator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subsystems.is_empty() {
            return Err(ConfigError::MissingParameter("subsystems"));
        }
        if let Some(name) = self.shared_resources.iter().find(|n| n.trim().is_empty()) {
            return Err(ConfigError::InvalidArgument(format!(
                "shared resource names must not be empty (got '{}')",
                name
            )));
        }
        if let Some(size) = self.target_size {
            if !size.is_finite() || size <= 0.0 {
                return Err(ConfigError::InvalidArgument(format!(
                    "target size must be positive and finite (got {})",
                    size
                )));
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct CompositionRequestBuilder {
    subsystems: Vec<Subsystem>,
    shared_resources: Vec<String>,
    target_size: Option<f64>,
    policy: Option<CompositionPolicy>,
    combine_by_name: bool,
    connections: Vec<Connection>,
}

impl CompositionRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subsystem(mut self, subsystem: Subsystem) -> Self {
        self.subsystems.push(subsystem);
        self
    }
    pub fn subsystems(mut self, subsystems: impl IntoIterator<Item = Subsystem>) -> Self {
        self.subsystems.extend(subsystems);
        self
    }
    pub fn shared_resources<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shared_resources.extend(names.into_iter().map(Into::into));
        self
    }
    pub fn target_size(mut self, size: f64) -> Self {
        self.target_size = Some(size);
        self
    }
    pub fn policy(mut self, policy: CompositionPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
    pub fn combine_by_name(mut self, enabled: bool) -> Self {
        self.combine_by_name = enabled;
        self
    }
    pub fn connection(mut self, name: impl Into<String>, connected: impl Into<String>) -> Self {
        self.connections.push(Connection::new(name, connected));
        self
    }
    pub fn connections(mut self, connections: impl IntoIterator<Item = Connection>) -> Self {
        self.connections.extend(connections);
        self
    }

    pub fn build(self) -> Result<CompositionRequest, ConfigError> {
        let request = CompositionRequest {
            subsystems: self.subsystems,
            shared_resources: self.shared_resources,
            target_size: self.target_size,
            policy: self
                .policy
                .ok_or(ConfigError::MissingParameter("policy"))?,
            combine_by_name: self.combine_by_name,
            connections: self.connections,
        };
        request.validate()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::builder::ModelBuilder;
    use crate::core::models::compartment::Compartment;

    fn subsystem(id: &str) -> Subsystem {
        Subsystem::from_model(
            ModelBuilder::new(id)
                .compartment(Compartment::new("cell").with_size(1.0))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Volume".parse::<CompositionPolicy>(), Ok(CompositionPolicy::Volume));
        assert_eq!(" virtual ".parse::<CompositionPolicy>(), Ok(CompositionPolicy::Virtual));
        assert!(matches!(
            "weighted".parse::<CompositionPolicy>(),
            Err(ConfigError::InvalidArgument(_))
        ));
    }

    #[test]
    fn build_succeeds_with_required_values() {
        let request = CompositionRequestBuilder::new()
            .subsystem(subsystem("a"))
            .subsystem(subsystem("b"))
            .shared_resources(["ATP", "RNAP"])
            .policy(CompositionPolicy::Volume)
            .target_size(2.0)
            .build()
            .unwrap();

        assert_eq!(request.source_ids(), vec!["a", "b"]);
        assert!(request.is_shared("ATP"));
        assert!(!request.is_shared("IPTG"));
        assert_eq!(request.target_size, Some(2.0));
        assert!(!request.combine_by_name);
    }

    #[test]
    fn build_fails_if_policy_is_missing() {
        let result = CompositionRequestBuilder::new()
            .subsystem(subsystem("a"))
            .build();
        assert_eq!(result.unwrap_err(), ConfigError::MissingParameter("policy"));
    }

    #[test]
    fn build_fails_without_subsystems() {
        let result = CompositionRequestBuilder::new()
            .policy(CompositionPolicy::Virtual)
            .build();
        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingParameter("subsystems")
        );
    }

    #[test]
    fn build_rejects_non_positive_or_non_finite_target_size() {
        for size in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = CompositionRequestBuilder::new()
                .subsystem(subsystem("a"))
                .policy(CompositionPolicy::Volume)
                .target_size(size)
                .build();
            assert!(matches!(result, Err(ConfigError::InvalidArgument(_))));
        }
    }

    #[test]
    fn build_rejects_empty_shared_resource_names() {
        let result = CompositionRequestBuilder::new()
            .subsystem(subsystem("a"))
            .shared_resources(["ATP", " "])
            .policy(CompositionPolicy::Virtual)
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidArgument(_))));
    }
}
