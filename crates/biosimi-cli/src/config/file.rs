use crate::error::{CliError, Result};
use biosimi::engine::config::Connection;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSubsystem {
    pub path: PathBuf,
    pub suffix: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConnection {
    pub name: String,
    pub connected: String,
}

impl From<FileConnection> for Connection {
    fn from(c: FileConnection) -> Self {
        Connection::new(c.name, c.connected)
    }
}

/// The composition file as written by the user. Every field is optional so
/// that later layers can fill the gaps.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub name: Option<String>,
    pub policy: Option<String>,
    pub target_size: Option<f64>,
    pub combine_by_name: Option<bool>,
    #[serde(default)]
    pub shared_resources: Vec<String>,
    #[serde(default)]
    pub subsystems: Vec<FileSubsystem>,
    #[serde(default)]
    pub connections: Vec<FileConnection>,
}

impl FileConfig {
    /// Reads a composition file. Relative subsystem paths are resolved
    /// against the directory holding the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading composition file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: FileConfig =
            toml::from_str(&content).map_err(|e| CliError::FileParsing {
                path: path.to_path_buf(),
                source: e.into(),
            })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for subsystem in &mut config.subsystems {
            if subsystem.path.is_relative() {
                subsystem.path = base.join(&subsystem.path);
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn from_file_reads_kebab_case_keys_and_resolves_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("composition.toml");
        fs::write(
            &path,
            r#"
            name = "cell"
            policy = "volume"
            target-size = 2.0
            combine-by-name = false
            shared-resources = ["RNAP", "Ribo"]

            [[subsystems]]
            path = "gene1.toml"
            suffix = "g1"

            [[subsystems]]
            path = "/models/gene2.toml"

            [[connections]]
            name = "IPTG"
            connected = "IPTG_ext"
            "#,
        )
        .unwrap();

        let config = FileConfig::from_file(&path).unwrap();
        assert_eq!(config.name.as_deref(), Some("cell"));
        assert_eq!(config.target_size, Some(2.0));
        assert_eq!(config.combine_by_name, Some(false));
        assert_eq!(config.shared_resources, vec!["RNAP", "Ribo"]);
        assert_eq!(config.subsystems[0].path, dir.path().join("gene1.toml"));
        assert_eq!(config.subsystems[0].suffix.as_deref(), Some("g1"));
        assert_eq!(config.subsystems[1].path, PathBuf::from("/models/gene2.toml"));
        let connection: Connection = config.connections[0].clone().into();
        assert_eq!(connection, Connection::new("IPTG", "IPTG_ext"));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("typo.toml");
        fs::write(&path, "polcy = \"volume\"\n").unwrap();
        assert!(matches!(
            FileConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            FileConfig::from_file(&dir.path().join("absent.toml")),
            Err(CliError::Io(_))
        ));
    }
}
