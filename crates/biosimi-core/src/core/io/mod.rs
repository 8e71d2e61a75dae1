//! Provides input/output functionality for model documents and simulation
//! trajectories.
//!
//! Model documents are read and written through the [`traits::ModelFile`]
//! interface; [`toml_model`] implements it for the TOML document format.
//! [`trajectory`] loads recorded species time courses from CSV.

pub mod toml_model;
pub mod traits;
pub mod trajectory;
