use super::{load_subsystem, report_warnings, write_document};
use crate::cli::ReduceArgs;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use biosimi::core::io::trajectory::Trajectory;
use biosimi::engine::error::EngineError;
use biosimi::engine::progress::ProgressReporter;
use biosimi::engine::simulation::ReplaySimulator;
use biosimi::workflows::reduce;
use tracing::info;

pub fn run(args: ReduceArgs) -> Result<()> {
    let subsystem = load_subsystem(&args.input)?;

    info!("Loading fast-reaction trajectory from {:?}", &args.trajectory);
    let trajectory = Trajectory::load(&args.trajectory).map_err(EngineError::from)?;
    let timepoints = if args.timepoints.is_empty() {
        trajectory.times().to_vec()
    } else {
        args.timepoints.clone()
    };
    let simulator = ReplaySimulator::new(trajectory);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Reducing '{}' over {} time point(s)...",
        subsystem.id(),
        timepoints.len()
    );
    let composition = reduce::run(&subsystem, &simulator, &timepoints, &reporter)?;

    write_document(&composition.document, &args.output)?;
    report_warnings(&composition.warnings);
    println!(
        "✓ Reduced model ({} reaction(s)) written to: {}",
        composition.document.model().reaction_count(),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{read, write_gene};
    use crate::error::CliError;
    use biosimi::core::io::toml_model::TomlModelFile;
    use biosimi::core::io::traits::ModelFile;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    /// The gene model with its transcription reaction flagged fast.
    fn write_fast_gene(dir: &Path) -> std::path::PathBuf {
        let path = write_gene(dir, "gene1", "TetR", 100.0);
        let mut subsystem = load_subsystem(&path).unwrap();
        subsystem.set_fast_reactions(&[0]).unwrap();
        TomlModelFile::write_to_path(subsystem.document(), &path).unwrap();
        path
    }

    #[test]
    fn replayed_trajectory_sets_steady_amounts() {
        let dir = tempdir().unwrap();
        let input = write_fast_gene(dir.path());
        let trajectory = dir.path().join("fast.csv");
        fs::write(&trajectory, "time,RNAP,P\n0,100,0\n1,100,12.5\n2,100,20\n").unwrap();
        let output = dir.path().join("reduced.toml");

        run(ReduceArgs {
            input,
            output: output.clone(),
            trajectory,
            timepoints: Vec::new(),
        })
        .unwrap();

        let model = read(&output).into_model();
        assert_eq!(model.reaction_count(), 1);
        assert!(model.find_reaction("tx").is_none());
        let p = model.species(model.find_species("P").unwrap()).unwrap();
        assert_eq!(p.initial_amount, 20.0);
    }

    #[test]
    fn mismatched_time_grid_is_a_simulation_error() {
        let dir = tempdir().unwrap();
        let trajectory = dir.path().join("fast.csv");
        fs::write(&trajectory, "time,RNAP,P\n0,100,0\n1,100,1\n").unwrap();

        let result = run(ReduceArgs {
            input: write_fast_gene(dir.path()),
            output: dir.path().join("reduced.toml"),
            trajectory,
            timepoints: vec![0.0, 2.0],
        });
        assert!(matches!(
            result,
            Err(CliError::Engine(EngineError::Simulation(_)))
        ));
    }
}
