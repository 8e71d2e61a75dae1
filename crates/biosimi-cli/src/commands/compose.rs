use super::{load_subsystem, report_warnings, write_document};
use crate::cli::ComposeArgs;
use crate::config::{AppConfig, Operator, build_config};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use biosimi::engine::config::{CompositionRequest, CompositionRequestBuilder};
use biosimi::engine::diagnostics::StructuralWarning;
use biosimi::engine::progress::ProgressReporter;
use biosimi::workflows::{combine, connect, share, system::System};
use tracing::info;

/// Turns the layered configuration into a request. A named configuration
/// loads its subsystems into a [`System`] so that they share its internal
/// compartment; otherwise each document is loaded as is.
fn build_request(config: &AppConfig) -> Result<(CompositionRequest, Vec<StructuralWarning>)> {
    match &config.system_name {
        Some(name) => {
            info!("Loading {} subsystem(s) into system '{}'", config.subsystems.len(), name);
            let mut system = System::new(name.as_str());
            for source in &config.subsystems {
                system.create_subsystem(&source.path, source.suffix.as_deref().unwrap_or(""))?;
            }
            system.append_shared_resources(config.shared_resources.iter().cloned())?;
            if let Some(size) = config.target_size {
                system.set_size(size)?;
            }
            let mut request = system.request(config.policy);
            request.combine_by_name = config.combine_by_name;
            request.connections = config.connections.clone();
            Ok((request, system.warnings().to_vec()))
        }
        None => {
            let mut builder = CompositionRequestBuilder::new()
                .policy(config.policy)
                .combine_by_name(config.combine_by_name)
                .shared_resources(config.shared_resources.iter().cloned())
                .connections(config.connections.iter().cloned());
            if let Some(size) = config.target_size {
                builder = builder.target_size(size);
            }
            for source in &config.subsystems {
                let mut subsystem = load_subsystem(&source.path)?;
                if let Some(suffix) = &source.suffix {
                    subsystem.suffix_all_element_ids(suffix)?;
                }
                builder = builder.subsystem(subsystem);
            }
            let request = builder
                .build()
                .map_err(|e| CliError::Config(e.to_string()))?;
            Ok((request, Vec::new()))
        }
    }
}

pub fn run(args: ComposeArgs, operator: Operator) -> Result<()> {
    let config = build_config(&args, operator)?;
    let (request, mut warnings) = build_request(&config)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Running '{}' over {} subsystem(s) ({} policy)...",
        operator,
        request.subsystems.len(),
        config.policy
    );
    let composition = match operator {
        Operator::Share => share::run(&request, &reporter)?,
        Operator::Combine => combine::run(&request, &reporter)?,
        Operator::Connect => connect::run(&request, &reporter)?,
    };
    info!(
        "Composition produced '{}' with {} species and {} reactions",
        composition.document.model().id,
        composition.document.model().species_count(),
        composition.document.model().reaction_count()
    );

    write_document(&composition.document, &config.output)?;
    warnings.extend(composition.warnings);
    report_warnings(&warnings);
    println!(
        "✓ Model '{}' written to: {}",
        composition.document.model().id,
        config.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{read, write_gene};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn share_from_inputs_collapses_shared_resources() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("shared.toml");
        let args = ComposeArgs {
            inputs: vec![
                write_gene(dir.path(), "gene1", "TetR", 100.0),
                write_gene(dir.path(), "gene2", "LacI", 40.0),
            ],
            output: output.clone(),
            shared: vec!["RNAP".into()],
            ..ComposeArgs::default()
        };

        run(args, Operator::Share).unwrap();

        let document = read(&output);
        let model = document.model();
        assert!(model.id.starts_with("shared_subsystems_"));
        assert_eq!(model.species_named("RNAP").len(), 1);
        assert_eq!(model.species_count(), 3);
        assert!(model.dangling_references().is_empty());
    }

    #[test]
    fn named_composition_file_builds_a_system() {
        let dir = tempdir().unwrap();
        write_gene(dir.path(), "gene1", "TetR", 100.0);
        write_gene(dir.path(), "gene2", "LacI", 40.0);
        let config = dir.path().join("cell.toml");
        fs::write(
            &config,
            r#"
            name = "cell"
            policy = "volume"
            shared-resources = ["RNAP"]

            [[subsystems]]
            path = "gene1.toml"
            suffix = "g1"

            [[subsystems]]
            path = "gene2.toml"
            suffix = "g2"
            "#,
        )
        .unwrap();
        let output = dir.path().join("combined.toml");
        let args = ComposeArgs {
            config: Some(config),
            output: output.clone(),
            ..ComposeArgs::default()
        };

        run(args, Operator::Combine).unwrap();

        let document = read(&output);
        let model = document.model();
        assert!(model.id.starts_with("combined_subsystems_"));
        assert!(model.find_compartment("cell_internal").is_some());
        let rnap = model.species(model.species_named("RNAP")[0]).unwrap();
        assert!((rnap.initial_amount - 70.0).abs() < 1e-9);
    }

    #[test]
    fn connect_merges_connected_names() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("connected.toml");
        let args = ComposeArgs {
            inputs: vec![
                write_gene(dir.path(), "gene1", "TetR", 100.0),
                write_gene(dir.path(), "gene2", "TetR_out", 40.0),
            ],
            output: output.clone(),
            connections: vec!["TetR=TetR_out".into()],
            no_combine_by_name: true,
            ..ComposeArgs::default()
        };

        run(args, Operator::Connect).unwrap();

        let model = read(&output).into_model();
        assert_eq!(model.species_named("TetR").len(), 1);
        assert!(model.species_named("TetR_out").is_empty());
    }

    #[test]
    fn unreadable_subsystem_fails_before_composing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("never.toml");
        let args = ComposeArgs {
            inputs: vec![dir.path().join("absent.toml")],
            output: output.clone(),
            ..ComposeArgs::default()
        };
        assert!(matches!(run(args, Operator::Share), Err(CliError::FileParsing { .. })));
        assert!(!output.exists());
    }
}
