//! # Workflows Module
//!
//! The public composition operators and the procedures built on them.
//!
//! ## Overview
//!
//! Each operator consumes an immutable
//! [`CompositionRequest`](crate::engine::config::CompositionRequest), builds a
//! fresh shell document and returns it as a [`Composition`] together with the
//! structural warnings raised on the way. Inputs are never modified.
//!
//! ## Architecture
//!
//! - **Share** ([`share`]) - Merge subsystems, collapsing designated shared resources
//! - **Combine** ([`combine`]) - Share, then remove duplicate reactions and optionally
//!   collapse every species by name
//! - **Connect** ([`connect`]) - Combine, then merge species across declared connections
//! - **System** ([`system`]) - Named builder of internal, external and membrane subsystems
//! - **Reduce** ([`reduce`]) - Replace fast reactions by their simulated end state

use crate::core::models::document::Document;
use crate::core::models::subsystem::Subsystem;
use crate::engine::diagnostics::StructuralWarning;

mod assembly;
pub mod combine;
pub mod connect;
pub mod reduce;
pub mod share;
pub mod system;

/// The result of a composition operator.
#[derive(Debug, Clone)]
pub struct Composition {
    pub document: Document,
    pub warnings: Vec<StructuralWarning>,
}

impl Composition {
    pub fn into_subsystem(self) -> Subsystem {
        Subsystem::new(self.document)
    }
}
