use biosimi::engine::config::{CompositionPolicy, Connection};
use std::fmt;
use std::path::PathBuf;

/// The composition operator a subcommand runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Share,
    Combine,
    Connect,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Share => f.write_str("share"),
            Operator::Combine => f.write_str("combine"),
            Operator::Connect => f.write_str("connect"),
        }
    }
}

/// A model document to load, with the suffix appended to its identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsystemSource {
    pub path: PathBuf,
    pub suffix: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub operator: Operator,
    /// When set, subsystems are loaded into a system of this name and placed
    /// in its internal compartment.
    pub system_name: Option<String>,
    pub subsystems: Vec<SubsystemSource>,
    pub policy: CompositionPolicy,
    pub target_size: Option<f64>,
    pub combine_by_name: bool,
    pub shared_resources: Vec<String>,
    pub connections: Vec<Connection>,
    pub output: PathBuf,
}
