use super::{load_subsystem, report_warnings, write_document};
use crate::cli::RenameArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use biosimi::engine::diagnostics::Diagnostics;
use tracing::info;

pub fn run(args: RenameArgs) -> Result<()> {
    let mut subsystem = load_subsystem(&args.input)?;
    let mut diagnostics = Diagnostics::new();

    for pair in &args.sids {
        let (old_id, new_id) = parser::parse_pair(pair, "old identifier", "new identifier")
            .map_err(|e| CliError::Argument(e.to_string()))?;
        let rewritten = subsystem.rename_sid(old_id, new_id)?;
        info!("Renamed '{}' to '{}' ({} reference(s))", old_id, new_id, rewritten);
    }
    for pair in &args.species {
        let (old_name, new_name) = parser::parse_pair(pair, "old name", "new name")
            .map_err(|e| CliError::Argument(e.to_string()))?;
        let renamed = subsystem.rename_species([old_name], new_name)?;
        info!("Renamed {} species from '{}' to '{}'", renamed, old_name, new_name);
    }
    if let Some(suffix) = &args.suffix {
        let renamed = subsystem.suffix_all_element_ids(suffix)?;
        info!("Suffixed {} identifier(s) with '_{}'", renamed, suffix);
    }
    if !args.compartments.is_empty() {
        subsystem.set_compartments(args.compartments.iter().cloned(), &mut diagnostics)?;
    }

    write_document(subsystem.document(), &args.output)?;
    report_warnings(diagnostics.warnings());
    println!("✓ Renamed model written to: {}", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{read, write_gene};
    use biosimi::engine::error::EngineError;
    use tempfile::tempdir;

    #[test]
    fn renames_apply_in_order_and_keep_references() {
        let dir = tempdir().unwrap();
        let input = write_gene(dir.path(), "gene1", "TetR", 100.0);
        let output = dir.path().join("renamed.toml");
        let args = RenameArgs {
            input,
            output: output.clone(),
            sids: vec!["P=TetR_protein".into()],
            species: vec!["RNAP=RNA_polymerase".into()],
            suffix: Some("v2".into()),
            compartments: vec!["cytoplasm".into()],
        };

        run(args).unwrap();

        let model = read(&output).into_model();
        assert_eq!(model.id, "gene1_v2");
        assert!(model.find_species("TetR_protein_v2").is_some());
        assert_eq!(model.species_named("RNA_polymerase").len(), 1);
        assert!(model.find_compartment("cytoplasm").is_some());
        assert!(model.dangling_references().is_empty());
    }

    #[test]
    fn unknown_species_name_is_an_engine_error() {
        let dir = tempdir().unwrap();
        let args = RenameArgs {
            input: write_gene(dir.path(), "gene1", "TetR", 100.0),
            output: dir.path().join("renamed.toml"),
            species: vec!["LacI=Lac".into()],
            ..RenameArgs::default()
        };
        assert!(matches!(
            run(args),
            Err(CliError::Engine(EngineError::NotFound { .. }))
        ));
    }

    #[test]
    fn malformed_pairs_are_argument_errors() {
        let dir = tempdir().unwrap();
        let args = RenameArgs {
            input: write_gene(dir.path(), "gene1", "TetR", 100.0),
            output: dir.path().join("renamed.toml"),
            sids: vec!["P".into()],
            ..RenameArgs::default()
        };
        assert!(matches!(run(args), Err(CliError::Argument(_))));
    }
}
