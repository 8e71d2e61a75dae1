//! # Core Module
//!
//! The foundation layer: stateless data models for biochemical reaction
//! networks, their math, and the file formats they are exchanged in.
//!
//! ## Architecture
//!
//! - **Model Representation** ([`models`]) - Documents, models, species, reactions,
//!   compartments, global definitions and expression trees
//! - **File I/O** ([`io`]) - The model document format and trajectory tables
//! - **Utilities** ([`utils`]) - Identifier syntax and reserved math names
//!
//! Nothing in this layer knows about composition; it only guarantees that a
//! model can enumerate its identifiers and rewrite references to one of them.

pub mod io;
pub mod models;
pub mod utils;
