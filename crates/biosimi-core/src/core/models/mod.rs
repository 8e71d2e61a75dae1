//! # Core Models Module
//!
//! In-memory representation of biochemical reaction models, the documents that
//! own them, and the subsystem handles that composition operates on.
//!
//! ## Overview
//!
//! A [`document::Document`] owns exactly one [`model::Model`] and records the
//! schema (level, version) it is expressed in. The model holds ordered
//! collections of compartments, species, parameters, reactions and the global
//! sections (unit and function definitions, rules, constraints, initial
//! assignments, events). Entities refer to each other by string identifier;
//! the structural entities are additionally stored in slot maps so that the
//! composition engine can track them by stable key while their identifiers
//! are rewritten.
//!
//! ## Key Components
//!
//! - [`model`] - The model container, identifier enumeration and reference rewrite
//! - [`math`] - Expression trees for rate laws, rules and events, with an infix parser
//! - [`species`], [`compartment`], [`reaction`], [`definitions`] - Entity types
//! - [`document`] - Schema versions and conversion
//! - [`subsystem`] - Handle for one input model of a composition
//! - [`builder`] - Fluent model construction
//!
//! ## Usage
//!
//! ```
//! use biosimi::core::models::builder::ModelBuilder;
//! use biosimi::core::models::compartment::Compartment;
//! use biosimi::core::models::species::Species;
//!
//! let model = ModelBuilder::new("IPTG_reservoir")
//!     .compartment(Compartment::new("env").with_size(1.0))
//!     .species(Species::new("IPTG", "env", 100000.0).with_name("IPTG"))
//!     .build()
//!     .unwrap();
//! assert_eq!(model.species_count(), 1);
//! ```

pub mod builder;
pub mod collection;
pub mod compartment;
pub mod definitions;
pub mod document;
pub mod ids;
pub mod math;
pub mod model;
pub mod reaction;
pub mod references;
pub mod species;
pub mod subsystem;
