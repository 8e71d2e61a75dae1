//! # BioSIMI Core Library
//!
//! A library for composing independently authored biochemical reaction models
//! into a single consistent model, in the spirit of the BioSIMI modelling
//! toolbox for synthetic biology.
//!
//! ## Architectural Philosophy
//!
//! The library keeps a strict three-layer architecture so that each concern can
//! be tested on its own.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Model`, `Document`,
//!   `Subsystem`), the math expression trees their rate laws and rules are
//!   written in, identifier rules, and the model and trajectory file formats.
//!
//! - **[`engine`]: The Logic Core.** Identifier registries and reference-safe
//!   renaming, species matching by display name, amount reconciliation under
//!   the volume and virtual policies, working-copy isolation and shell
//!   construction, per-subsystem editing, and the simulator seam.
//!
//! - **[`workflows`]: The Public API.** The composition operators (share,
//!   combine, connect), the `System` builder over them, and fast-reaction
//!   reduction. Every operator reads an immutable request and returns a new
//!   document along with the structural warnings it raised.
//!
//! ## Example
//!
//! ```
//! use biosimi::core::models::builder::ModelBuilder;
//! use biosimi::core::models::compartment::Compartment;
//! use biosimi::core::models::species::Species;
//! use biosimi::core::models::subsystem::Subsystem;
//! use biosimi::engine::config::{CompositionPolicy, CompositionRequestBuilder};
//! use biosimi::engine::progress::ProgressReporter;
//! use biosimi::workflows::share;
//!
//! let gene = |id: &str, rnap: f64| {
//!     Subsystem::from_model(
//!         ModelBuilder::new(id)
//!             .compartment(Compartment::new("cell").with_size(1.0))
//!             .species(Species::new("RNAP", "cell", rnap).with_name("RNAP"))
//!             .build()
//!             .unwrap(),
//!     )
//! };
//! let request = CompositionRequestBuilder::new()
//!     .subsystem(gene("gene1", 100.0))
//!     .subsystem(gene("gene2", 40.0))
//!     .shared_resources(["RNAP"])
//!     .policy(CompositionPolicy::Virtual)
//!     .build()
//!     .unwrap();
//!
//! let composition = share::run(&request, &ProgressReporter::new()).unwrap();
//! assert_eq!(composition.document.model().species_count(), 1);
//! ```

pub mod core;
pub mod engine;
pub mod workflows;
