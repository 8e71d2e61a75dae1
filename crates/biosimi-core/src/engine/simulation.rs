use crate::core::io::trajectory::{Trajectory, TrajectoryError};
use crate::core::models::document::Document;
use std::path::Path;
use thiserror::Error;

const TIME_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Requested {requested} time points but the trajectory has {available}")]
    GridLength { requested: usize, available: usize },

    #[error("Time point {index} differs: requested {requested}, trajectory has {available}")]
    GridMismatch {
        index: usize,
        requested: f64,
        available: f64,
    },

    #[error("Simulator backend failed: {0}")]
    Backend(String),
}

/// The numerical integrator a reduction hands its fast sub-model to.
///
/// Implementations return a trajectory sampled at exactly `timepoints` with
/// one column per species identifier.
pub trait Simulator {
    fn simulate(&self, document: &Document, timepoints: &[f64])
    -> Result<Trajectory, SimulationError>;
}

/// Replays a recorded trajectory instead of integrating.
#[derive(Debug, Clone)]
pub struct ReplaySimulator {
    trajectory: Trajectory,
}

impl ReplaySimulator {
    pub fn new(trajectory: Trajectory) -> Self {
        Self { trajectory }
    }

    pub fn load(path: &Path) -> Result<Self, TrajectoryError> {
        Ok(Self::new(Trajectory::load(path)?))
    }
}

impl Simulator for ReplaySimulator {
    fn simulate(
        &self,
        _document: &Document,
        timepoints: &[f64],
    ) -> Result<Trajectory, SimulationError> {
        let recorded = self.trajectory.times();
        if recorded.len() != timepoints.len() {
            return Err(SimulationError::GridLength {
                requested: timepoints.len(),
                available: recorded.len(),
            });
        }
        for (index, (&requested, &available)) in timepoints.iter().zip(recorded).enumerate() {
            if (requested - available).abs() > TIME_TOLERANCE {
                return Err(SimulationError::GridMismatch {
                    index,
                    requested,
                    available,
                });
            }
        }
        Ok(self.trajectory.clone())
    }
}
