//! # Engine Module
//!
//! The composition machinery shared by every operator: identifier allocation,
//! reference-safe renaming, species and reaction matching, amount
//! reconciliation and the merging of global model sections.
//!
//! ## Overview
//!
//! Operators never edit their inputs. Each source model is cloned into a
//! working copy whose identifiers are isolated from the copies before it
//! ([`merger::isolate_sources`]); the copies are then poured into a fresh
//! shell document ([`shell`]) where collision groups found by the
//! [`matcher`] are collapsed by the [`reconciler`]. Every identifier change
//! goes through [`renamer::rename_sid`], which rewrites all references before
//! touching the declaration.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Composition requests, policies and connections
//! - **Identifiers** ([`registry`], [`renamer`]) - Unique identifier allocation and renaming
//! - **Matching** ([`matcher`], [`reconciler`]) - Collision groups and their collapse
//! - **Merging** ([`merger`], [`shell`]) - Working copies, global sections, result shells
//! - **Editing** ([`editing`]) - In-place edits of a single subsystem
//! - **Simulation** ([`simulation`]) - The simulator seam used by model reduction
//! - **Diagnostics** ([`diagnostics`], [`progress`], [`error`]) - Warnings, progress events, errors

pub mod config;
pub mod diagnostics;
pub mod editing;
pub mod error;
pub mod matcher;
pub mod merger;
pub mod progress;
pub mod reconciler;
pub mod registry;
pub mod renamer;
pub mod shell;
pub mod simulation;
