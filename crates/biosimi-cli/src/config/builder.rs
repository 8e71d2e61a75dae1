use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{AppConfig, Operator, SubsystemSource};
use crate::cli::{ComposeArgs, PolicyArg};
use crate::error::{CliError, Result};
use crate::utils::parser;
use biosimi::engine::config::{CompositionPolicy, Connection};
use tracing::warn;

impl From<PolicyArg> for CompositionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Volume => CompositionPolicy::Volume,
            PolicyArg::Virtual => CompositionPolicy::Virtual,
        }
    }
}

pub fn build_config(args: &ComposeArgs, operator: Operator) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let file_config = apply_set_values(file_config, &args.set_values)?;

    let policy = match (args.policy, file_config.policy.as_deref()) {
        (Some(arg), _) => arg.into(),
        (None, Some(text)) => text
            .parse::<CompositionPolicy>()
            .map_err(|e| CliError::Config(e.to_string()))?,
        (None, None) => defaults.policy,
    };

    let target_size = args.target_size.or(file_config.target_size);
    if let Some(size) = target_size {
        if !size.is_finite() || size <= 0.0 {
            return Err(CliError::Config(format!(
                "target size must be positive and finite (got {})",
                size
            )));
        }
    }

    let combine_by_name = if args.no_combine_by_name {
        false
    } else {
        file_config
            .combine_by_name
            .unwrap_or(defaults.combine_by_name)
    };

    let mut shared_resources = file_config.shared_resources;
    for name in &args.shared {
        if !shared_resources.contains(name) {
            shared_resources.push(name.clone());
        }
    }

    let mut connections: Vec<Connection> = file_config
        .connections
        .into_iter()
        .map(Into::into)
        .collect();
    for pair in &args.connections {
        let (name, connected) = parser::parse_pair(pair, "name", "connected")
            .map_err(|e| CliError::Argument(e.to_string()))?;
        connections.push(Connection::new(name, connected));
    }
    if operator != Operator::Connect && !connections.is_empty() {
        warn!(
            "Ignoring {} connection(s): only 'connect' uses them",
            connections.len()
        );
        connections.clear();
    }

    let mut subsystems: Vec<SubsystemSource> = file_config
        .subsystems
        .into_iter()
        .map(|s| SubsystemSource {
            path: s.path,
            suffix: s.suffix.filter(|suffix| !suffix.is_empty()),
        })
        .collect();
    subsystems.extend(args.inputs.iter().map(|path| SubsystemSource {
        path: path.clone(),
        suffix: None,
    }));
    if subsystems.is_empty() {
        return Err(CliError::Config(
            "no subsystems given: list them under [[subsystems]] in the composition file or pass --input".into(),
        ));
    }

    Ok(AppConfig {
        operator,
        system_name: file_config.name.filter(|n| !n.trim().is_empty()),
        subsystems,
        policy,
        target_size,
        combine_by_name,
        shared_resources,
        connections,
        output: args.output.clone(),
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value_str) = parser::parse_pair(kv_pair, "key", "value").map_err(|_| {
            CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            ))
        })?;

        match key {
            "policy" => config.policy = Some(value_str.to_string()),
            "target-size" => {
                config.target_size = Some(value_str.parse().map_err(|_| {
                    CliError::Config(format!("Invalid float value for {}: {}", key, value_str))
                })?);
            }
            "combine-by-name" => {
                config.combine_by_name = Some(value_str.parse().map_err(|_| {
                    CliError::Config(format!("Invalid boolean value for {}: {}", key, value_str))
                })?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::{TempDir, tempdir};

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let file_path = TEST_DIR.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn args_for(config: Option<&Path>) -> ComposeArgs {
        ComposeArgs {
            config: config.map(Path::to_path_buf),
            output: PathBuf::from("out.toml"),
            ..ComposeArgs::default()
        }
    }

    const CELL: &str = r#"
        name = "cell"
        policy = "volume"
        target-size = 3.0
        shared-resources = ["RNAP"]

        [[subsystems]]
        path = "gene1.toml"
        suffix = "g1"

        [[connections]]
        name = "IPTG"
        connected = "IPTG_ext"
    "#;

    #[test]
    fn defaults_fill_what_the_file_omits() {
        let mut args = args_for(None);
        args.inputs = vec![PathBuf::from("a.toml"), PathBuf::from("b.toml")];

        let config = build_config(&args, Operator::Combine).unwrap();
        assert_eq!(config.policy, DefaultsConfig::default().policy);
        assert_eq!(config.combine_by_name, DefaultsConfig::default().combine_by_name);
        assert_eq!(config.target_size, None);
        assert_eq!(config.system_name, None);
        assert_eq!(config.subsystems.len(), 2);
        assert!(config.subsystems.iter().all(|s| s.suffix.is_none()));
    }

    #[test]
    fn file_values_are_read_and_flags_win() {
        let path = write_config_file("cell.toml", CELL);
        let mut args = args_for(Some(&path));
        args.policy = Some(PolicyArg::Virtual);
        args.shared = vec!["Ribo".into(), "RNAP".into()];
        args.inputs = vec![PathBuf::from("extra.toml")];

        let config = build_config(&args, Operator::Connect).unwrap();
        assert_eq!(config.system_name.as_deref(), Some("cell"));
        assert_eq!(config.policy, CompositionPolicy::Virtual);
        assert_eq!(config.target_size, Some(3.0));
        assert_eq!(config.shared_resources, vec!["RNAP", "Ribo"]);
        assert_eq!(
            config.subsystems[0],
            SubsystemSource {
                path: TEST_DIR.path().join("gene1.toml"),
                suffix: Some("g1".into())
            }
        );
        assert_eq!(config.subsystems[1].path, PathBuf::from("extra.toml"));
        assert_eq!(config.connections, vec![Connection::new("IPTG", "IPTG_ext")]);
    }

    #[test]
    fn set_values_override_the_file() {
        let path = write_config_file("cell_set.toml", CELL);
        let mut args = args_for(Some(&path));
        args.set_values = vec![
            "policy=virtual".into(),
            "target-size=7.5".into(),
            "combine-by-name=false".into(),
        ];

        let config = build_config(&args, Operator::Share).unwrap();
        assert_eq!(config.policy, CompositionPolicy::Virtual);
        assert_eq!(config.target_size, Some(7.5));
        assert!(!config.combine_by_name);
        assert!(config.connections.is_empty());
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let path = write_config_file("cell_bad.toml", CELL);
        for set in ["policy=weighted", "target-size=-1", "combine-by-name=maybe", "colour=red", "policy"] {
            let mut args = args_for(Some(&path));
            args.set_values = vec![set.into()];
            assert!(
                matches!(build_config(&args, Operator::Share), Err(CliError::Config(_))),
                "expected a config error for '{}'",
                set
            );
        }
    }

    #[test]
    fn malformed_connection_flag_is_an_argument_error() {
        let mut args = args_for(None);
        args.inputs = vec![PathBuf::from("a.toml")];
        args.connections = vec!["IPTG".into()];
        assert!(matches!(
            build_config(&args, Operator::Connect),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn missing_subsystems_are_reported() {
        let result = build_config(&args_for(None), Operator::Share);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("subsystems")));
    }
}
