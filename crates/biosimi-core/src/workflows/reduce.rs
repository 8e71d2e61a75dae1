use super::Composition;
use crate::core::models::document::Document;
use crate::core::models::model::Model;
use crate::core::models::subsystem::Subsystem;
use crate::engine::diagnostics::{Diagnostics, StructuralWarning};
use crate::engine::error::EngineError;
use crate::engine::merger::{copy_definitions, copy_dynamics};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::simulation::Simulator;
use tracing::{debug, info, instrument};

fn validate_timepoints(timepoints: &[f64]) -> Result<(), EngineError> {
    if timepoints.is_empty() {
        return Err(EngineError::InvalidArgument(
            "at least one time point is required".into(),
        ));
    }
    if let Some(bad) = timepoints.iter().find(|t| !t.is_finite()) {
        return Err(EngineError::InvalidArgument(format!(
            "time points must be finite (got {})",
            bad
        )));
    }
    if timepoints.windows(2).any(|w| w[1] <= w[0]) {
        return Err(EngineError::InvalidArgument(
            "time points must be strictly increasing".into(),
        ));
    }
    Ok(())
}

/// Builds the sub-model holding only the fast reactions of `source`, the
/// species they touch, and the global sections of `source`.
fn fast_model(source: &Model) -> Result<(Model, Vec<String>), EngineError> {
    let mut fast = Model::new(format!("{}_fast", source.id));
    copy_definitions(&mut fast, source)?;
    copy_dynamics(&mut fast, source)?;

    let mut involved: Vec<String> = Vec::new();
    for (_, reaction) in source.reactions().filter(|(_, r)| r.fast) {
        for id in reaction.participants() {
            if involved.iter().any(|known| known == id) {
                continue;
            }
            let species = source
                .find_species(id)
                .and_then(|key| source.species(key))
                .ok_or_else(|| EngineError::SpeciesNotFound {
                    name: id.to_string(),
                    model: source.id.clone(),
                })?;
            fast.add_species(species.clone())?;
            involved.push(id.to_string());
        }
        fast.add_reaction(reaction.clone())?;
    }
    Ok((fast, involved))
}

/// Replaces the fast reactions of `subsystem` by their simulated end state.
///
/// The fast reactions are simulated on their own over `timepoints`; they are
/// then removed from a copy of the model and every species they touched
/// starts from its final simulated amount (clamped at zero). A model without
/// fast reactions is returned unchanged with a warning.
#[instrument(skip_all, name = "reduce_workflow", fields(model = %subsystem.id()))]
pub fn run(
    subsystem: &Subsystem,
    simulator: &dyn Simulator,
    timepoints: &[f64],
    reporter: &ProgressReporter,
) -> Result<Composition, EngineError> {
    validate_timepoints(timepoints)?;
    let mut diagnostics = Diagnostics::new();
    let mut reduced = subsystem.document().clone();

    let fast_keys: Vec<_> = reduced
        .model()
        .reactions()
        .filter(|(_, r)| r.fast)
        .map(|(key, _)| key)
        .collect();
    if fast_keys.is_empty() {
        diagnostics.push(StructuralWarning::NoFastReactions {
            model: subsystem.id().to_string(),
        });
        return Ok(Composition {
            document: reduced,
            warnings: diagnostics.into_warnings(),
        });
    }

    let (fast, involved) = fast_model(reduced.model())?;
    info!(
        "Simulating {} fast reaction(s) over {} species",
        fast.reaction_count(),
        involved.len()
    );
    let fast_document = Document::new(reduced.schema(), fast);
    let trajectory = reporter.phase("Simulating fast reactions", || {
        simulator.simulate(&fast_document, timepoints)
    })?;

    reporter.phase("Reducing", || {
        let model = reduced.model_mut();
        for key in fast_keys {
            if let Some(removed) = model.remove_reaction(key)? {
                debug!("Removed fast reaction '{}'", removed.id);
            }
        }
        reporter.report(Progress::TaskStart {
            total_steps: involved.len() as u64,
        });
        for id in &involved {
            let value = trajectory
                .final_value(id)
                .ok_or_else(|| EngineError::SpeciesNotFound {
                    name: id.clone(),
                    model: fast_document.model().id.clone(),
                })?;
            let key = model.find_species(id).ok_or_else(|| EngineError::SpeciesNotFound {
                name: id.clone(),
                model: model.id.clone(),
            })?;
            if let Some(species) = model.species_mut(key) {
                species.initial_amount = value.max(0.0);
                debug!("Set '{}' to its steady amount {}", id, species.initial_amount);
            }
            reporter.report(Progress::TaskIncrement);
        }
        reporter.report(Progress::TaskFinish);
        Ok::<(), EngineError>(())
    })?;

    info!(
        "Reduced '{}' to {} reaction(s)",
        subsystem.id(),
        reduced.model().reaction_count()
    );
    Ok(Composition {
        document: reduced,
        warnings: diagnostics.into_warnings(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::trajectory::Trajectory;
    use crate::core::models::reaction::Reaction;
    use crate::engine::simulation::{ReplaySimulator, SimulationError};
    use crate::workflows::fixtures::binding;
    use std::cell::RefCell;

    const GRID: [f64; 3] = [0.0, 5.0, 10.0];

    /// `binding` plus a slow degradation of C, with r1 flagged fast.
    fn two_speed() -> Subsystem {
        let mut subsystem = binding("two_speed", 1.0, 10.0);
        subsystem
            .model_mut()
            .add_reaction(
                Reaction::new("r2")
                    .reactant("C")
                    .with_kinetic_law("k1 * C".parse().unwrap()),
            )
            .unwrap();
        subsystem.set_fast_reactions(&[0]).unwrap();
        subsystem
    }

    fn replay(rows: Vec<Vec<f64>>) -> ReplaySimulator {
        ReplaySimulator::new(Trajectory::new(
            vec!["A".into(), "B".into(), "C".into()],
            GRID.to_vec(),
            rows,
        ))
    }

    struct Recording {
        seen: RefCell<Option<Document>>,
        inner: ReplaySimulator,
    }

    impl Simulator for Recording {
        fn simulate(
            &self,
            document: &Document,
            timepoints: &[f64],
        ) -> Result<Trajectory, SimulationError> {
            *self.seen.borrow_mut() = Some(document.clone());
            self.inner.simulate(document, timepoints)
        }
    }

    fn reduce(subsystem: &Subsystem, simulator: &dyn Simulator) -> Result<Composition, EngineError> {
        run(subsystem, simulator, &GRID, &ProgressReporter::new())
    }

    #[test]
    fn fast_species_start_from_final_simulated_amounts() {
        let simulator = replay(vec![
            vec![10.0, 10.0, 0.0],
            vec![4.0, 4.0, 6.0],
            vec![-1e-12, 0.5, 9.5],
        ]);
        let subsystem = two_speed();
        let composition = reduce(&subsystem, &simulator).unwrap();
        let model = composition.document.model();

        assert_eq!(model.reaction_count(), 1);
        assert!(model.find_reaction("r2").is_some());
        let amount = |id: &str| model.species(model.find_species(id).unwrap()).unwrap().initial_amount;
        assert_eq!(amount("A"), 0.0);
        assert_eq!(amount("B"), 0.5);
        assert_eq!(amount("C"), 9.5);
        assert!(composition.warnings.is_empty());
        assert_eq!(subsystem.model().reaction_count(), 2);
    }

    #[test]
    fn simulator_sees_only_the_fast_sub_model() {
        let simulator = Recording {
            seen: RefCell::new(None),
            inner: replay(vec![vec![1.0, 1.0, 0.0]; 3]),
        };
        reduce(&two_speed(), &simulator).unwrap();

        let seen = simulator.seen.borrow();
        let fast = seen.as_ref().unwrap().model();
        assert_eq!(fast.id, "two_speed_fast");
        assert_eq!(fast.reaction_count(), 1);
        assert!(fast.find_reaction("r1").is_some());
        assert_eq!(fast.species_count(), 3);
        assert!(fast.find_parameter("k1").is_some());
    }

    #[test]
    fn model_without_fast_reactions_is_returned_with_warning() {
        let subsystem = binding("slow", 1.0, 10.0);
        let composition = reduce(&subsystem, &replay(vec![vec![0.0; 3]; 3])).unwrap();
        assert_eq!(composition.document.model().reaction_count(), 1);
        assert_eq!(
            composition.warnings,
            vec![StructuralWarning::NoFastReactions {
                model: "slow".into()
            }]
        );
    }

    #[test]
    fn invalid_time_grids_are_rejected() {
        let subsystem = two_speed();
        let simulator = replay(vec![vec![0.0; 3]; 3]);
        for grid in [&[][..], &[0.0, 0.0][..], &[1.0, 0.5][..], &[0.0, f64::NAN][..]] {
            assert!(matches!(
                run(&subsystem, &simulator, grid, &ProgressReporter::new()),
                Err(EngineError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn species_missing_from_trajectory_is_fatal() {
        let simulator = ReplaySimulator::new(Trajectory::new(
            vec!["A".into(), "B".into()],
            GRID.to_vec(),
            vec![vec![1.0, 1.0]; 3],
        ));
        assert!(matches!(
            reduce(&two_speed(), &simulator),
            Err(EngineError::SpeciesNotFound { name, .. }) if name == "C"
        ));
    }

    #[test]
    fn simulator_failures_propagate() {
        let simulator = ReplaySimulator::new(Trajectory::new(
            vec!["A".into(), "B".into(), "C".into()],
            vec![0.0, 1.0],
            vec![vec![0.0; 3]; 2],
        ));
        assert!(matches!(
            reduce(&two_speed(), &simulator),
            Err(EngineError::Simulation(SimulationError::GridLength { .. }))
        ));
    }
}
