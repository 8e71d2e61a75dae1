use super::{load_subsystem, write_document};
use crate::cli::EditArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use tracing::info;

pub fn run(args: EditArgs) -> Result<()> {
    let mut subsystem = load_subsystem(&args.input)?;

    for pair in &args.amounts {
        let (name, amount) =
            parser::parse_amount(pair).map_err(|e| CliError::Argument(e.to_string()))?;
        let changed = subsystem.set_species_amount([name.as_str()], amount)?;
        info!("Set {} species named '{}' to {}", changed, name, amount);
    }
    if !args.fast.is_empty() {
        subsystem.set_fast_reactions(&args.fast)?;
    }

    let rates: Vec<&str> = args.rates.iter().map(String::as_str).collect();
    let rates = (!rates.is_empty()).then_some(rates.as_slice());
    if !args.reversible.is_empty() {
        subsystem = subsystem.set_reversible_reactions(&args.reversible, rates)?;
    } else if !args.irreversible.is_empty() {
        subsystem = subsystem.unset_reversible_reactions(&args.irreversible, rates)?;
    } else if rates.is_some() {
        return Err(CliError::Argument(
            "--rate needs --reversible or --irreversible".into(),
        ));
    }

    write_document(subsystem.document(), &args.output)?;
    println!("✓ Edited model written to: {}", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{read, write_gene};
    use biosimi::core::models::math::MathExpr;
    use biosimi::engine::error::EngineError;
    use tempfile::tempdir;

    #[test]
    fn amounts_and_flags_are_applied() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("edited.toml");
        let args = EditArgs {
            input: write_gene(dir.path(), "gene1", "TetR", 100.0),
            output: output.clone(),
            amounts: vec!["RNAP=250".into()],
            fast: vec![0],
            irreversible: vec![1],
            rates: vec!["k_tx * P * 2".into()],
            ..EditArgs::default()
        };

        run(args).unwrap();

        let model = read(&output).into_model();
        let rnap = model.species(model.species_named("RNAP")[0]).unwrap();
        assert_eq!(rnap.initial_amount, 250.0);
        let reactions: Vec<_> = model.reactions().map(|(_, r)| r).collect();
        assert!(reactions[0].fast);
        assert!(!reactions[1].reversible);
        let expected: MathExpr = "k_tx * P * 2".parse().unwrap();
        assert_eq!(
            reactions[1].kinetic_law.as_ref().map(|law| &law.math),
            Some(&expected)
        );
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let dir = tempdir().unwrap();
        let args = EditArgs {
            input: write_gene(dir.path(), "gene1", "TetR", 100.0),
            output: dir.path().join("edited.toml"),
            fast: vec![5],
            ..EditArgs::default()
        };
        assert!(matches!(
            run(args),
            Err(CliError::Engine(EngineError::InvalidArgument(_)))
        ));
    }

    #[test]
    fn rate_without_reversibility_change_is_an_argument_error() {
        let dir = tempdir().unwrap();
        let args = EditArgs {
            input: write_gene(dir.path(), "gene1", "TetR", 100.0),
            output: dir.path().join("edited.toml"),
            rates: vec!["k_tx".into()],
            ..EditArgs::default()
        };
        assert!(matches!(run(args), Err(CliError::Argument(_))));
    }
}
