use super::Composition;
use super::{combine, share};
use crate::core::io::toml_model::TomlModelFile;
use crate::core::io::traits::ModelFile;
use crate::core::models::compartment::Compartment;
use crate::core::models::document::{ConversionOutcome, SchemaVersion};
use crate::core::models::subsystem::Subsystem;
use crate::engine::config::{CompositionPolicy, CompositionRequest};
use crate::engine::diagnostics::{Diagnostics, StructuralWarning};
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_SUBSYSTEM_SIZE: f64 = 1.0;
const MEMBRANE_INTERNAL: &str = "internal";
const MEMBRANE_EXTERNAL: &str = "external";

/// A named container of subsystems: those inside it, those outside it, and
/// the membranes between the two.
///
/// Internal subsystems live in the compartment `<name>_internal`, external
/// ones in `<name>_external` (or in the internal compartment of the system set
/// with [`System::set_external_system`]).
#[derive(Debug, Clone)]
pub struct System {
    name: String,
    internal: Vec<Subsystem>,
    external: Vec<Subsystem>,
    membranes: Vec<Subsystem>,
    shared_resources: Vec<String>,
    size: f64,
    external_system: Option<String>,
    diagnostics: Vec<StructuralWarning>,
}

impl System {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            internal: Vec::new(),
            external: Vec::new(),
            membranes: Vec::new(),
            shared_resources: Vec::new(),
            size: 0.0,
            external_system: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn internal(&self) -> &[Subsystem] {
        &self.internal
    }

    pub fn external(&self) -> &[Subsystem] {
        &self.external
    }

    pub fn membranes(&self) -> &[Subsystem] {
        &self.membranes
    }

    pub fn shared_resources(&self) -> &[String] {
        &self.shared_resources
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    /// Warnings raised while subsystems were added to this system.
    pub fn warnings(&self) -> &[StructuralWarning] {
        &self.diagnostics
    }

    pub fn internal_compartment(&self) -> String {
        format!("{}_internal", self.name)
    }

    /// The compartment external and membrane subsystems see as "outside".
    pub fn external_compartment(&self) -> String {
        match &self.external_system {
            Some(outer) => format!("{}_internal", outer),
            None => format!("{}_external", self.name),
        }
    }

    fn place_all(
        &mut self,
        subsystems: Vec<Subsystem>,
        compartment: &str,
    ) -> Result<Vec<Subsystem>, EngineError> {
        if let Some(offender) = subsystems.iter().find(|s| s.model().compartment_count() > 1) {
            return Err(EngineError::InvalidArgument(format!(
                "subsystem '{}' has {} compartments; a subsystem must have one (model multiple compartments as separate systems)",
                offender.id(),
                offender.model().compartment_count()
            )));
        }
        let mut diagnostics = Diagnostics::new();
        let mut placed = Vec::with_capacity(subsystems.len());
        for mut subsystem in subsystems {
            subsystem.set_compartments([compartment], &mut diagnostics)?;
            placed.push(subsystem);
        }
        self.diagnostics.extend(diagnostics.into_warnings());
        Ok(placed)
    }

    /// Adds subsystems inside this system. Every subsystem is checked before
    /// any is placed; one with more than one compartment is rejected.
    pub fn set_internal(
        &mut self,
        subsystems: impl IntoIterator<Item = Subsystem>,
    ) -> Result<(), EngineError> {
        let compartment = self.internal_compartment();
        let placed = self.place_all(subsystems.into_iter().collect(), &compartment)?;
        debug!("Placed {} internal subsystem(s) in '{}'", placed.len(), compartment);
        self.internal.extend(placed);
        Ok(())
    }

    /// Adds subsystems outside this system, with the same checks as
    /// [`System::set_internal`].
    pub fn set_external(
        &mut self,
        subsystems: impl IntoIterator<Item = Subsystem>,
    ) -> Result<(), EngineError> {
        let compartment = self.external_compartment();
        let placed = self.place_all(subsystems.into_iter().collect(), &compartment)?;
        debug!("Placed {} external subsystem(s) in '{}'", placed.len(), compartment);
        self.external.extend(placed);
        Ok(())
    }

    /// Uses the internal subsystems of `outer` as this system's environment.
    pub fn set_external_system(&mut self, outer: &System) {
        self.external = outer.internal.clone();
        self.external_system = Some(outer.name.clone());
    }

    /// Adds a membrane subsystem. It must declare exactly two compartments
    /// named `internal` and `external`, in either order; they are renamed to
    /// this system's internal and external compartments.
    pub fn set_membrane(&mut self, mut membrane: Subsystem) -> Result<(), EngineError> {
        let names: Vec<String> = membrane
            .model()
            .compartments()
            .map(|(_, c)| c.display_name().to_string())
            .collect();
        let inside = self.internal_compartment();
        let outside = self.external_compartment();
        let new_ids = match names.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            [MEMBRANE_INTERNAL, MEMBRANE_EXTERNAL] => [inside, outside],
            [MEMBRANE_EXTERNAL, MEMBRANE_INTERNAL] => [outside, inside],
            _ => {
                return Err(EngineError::InvalidArgument(format!(
                    "membrane '{}' must have exactly two compartments named '{}' and '{}' (found {:?})",
                    membrane.id(),
                    MEMBRANE_INTERNAL,
                    MEMBRANE_EXTERNAL,
                    names
                )));
            }
        };
        let mut diagnostics = Diagnostics::new();
        membrane.set_compartments(new_ids, &mut diagnostics)?;
        self.diagnostics.extend(diagnostics.into_warnings());
        self.membranes.push(membrane);
        Ok(())
    }

    /// Loads a subsystem from a model file into this system.
    ///
    /// The document is converted to the latest schema, every identifier is
    /// suffixed with `suffix` (when not empty), a missing compartment or size
    /// defaults to 1, and the compartment becomes this system's internal one.
    /// The subsystem's size is added to the system size.
    pub fn create_subsystem(
        &mut self,
        path: &Path,
        suffix: &str,
    ) -> Result<&Subsystem, EngineError> {
        let mut subsystem = Subsystem::new(TomlModelFile::read_from_path(path)?);
        if let ConversionOutcome::Converted { from } =
            subsystem.document_mut().convert(SchemaVersion::LATEST)?
        {
            info!(
                "Converted '{}' from {} to {}",
                path.display(),
                from,
                SchemaVersion::LATEST
            );
        }
        if !suffix.is_empty() {
            subsystem.suffix_all_element_ids(suffix)?;
        }

        let mut diagnostics = Diagnostics::new();
        let compartment = self.internal_compartment();
        let model = subsystem.model_mut();
        let model_id = model.id.clone();
        match model.compartment_count() {
            0 => {
                diagnostics.push(StructuralWarning::NoCompartment {
                    model: model_id.clone(),
                    assumed: DEFAULT_SUBSYSTEM_SIZE,
                });
                model.add_compartment(
                    Compartment::new(compartment.clone()).with_size(DEFAULT_SUBSYSTEM_SIZE),
                )?;
            }
            1 => {}
            count => diagnostics.push(StructuralWarning::MultipleCompartments {
                model: model_id.clone(),
                count,
                used: model
                    .compartments()
                    .next()
                    .map(|(_, c)| c.id.clone())
                    .unwrap_or_default(),
            }),
        }
        let mut size = DEFAULT_SUBSYSTEM_SIZE;
        if let Some(first) = model
            .first_compartment_key()
            .and_then(|key| model.compartment_mut(key))
        {
            match first.size {
                Some(declared) => size = declared,
                None => {
                    diagnostics.push(StructuralWarning::MissingCompartmentSize {
                        model: model_id,
                        compartment: first.id.clone(),
                        assumed: DEFAULT_SUBSYSTEM_SIZE,
                    });
                    first.size = Some(DEFAULT_SUBSYSTEM_SIZE);
                }
            }
        }

        subsystem.set_compartments([compartment], &mut diagnostics)?;
        self.diagnostics.extend(diagnostics.into_warnings());
        self.size += size;
        self.internal.push(subsystem);
        info!(
            "Created subsystem from '{}' in system '{}' (size {})",
            path.display(),
            self.name,
            size
        );
        Ok(&self.internal[self.internal.len() - 1])
    }

    pub fn append_shared_resources<I, S>(&mut self, names: I) -> Result<(), EngineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(EngineError::InvalidArgument(
                "shared resource names must not be empty".into(),
            ));
        }
        for name in names {
            if !self.shared_resources.contains(&name) {
                self.shared_resources.push(name);
            }
        }
        Ok(())
    }

    pub fn remove_shared_resource(&mut self, name: &str) -> bool {
        let before = self.shared_resources.len();
        self.shared_resources.retain(|n| n != name);
        before != self.shared_resources.len()
    }

    pub fn set_size(&mut self, size: f64) -> Result<(), EngineError> {
        if !size.is_finite() || size < 0.0 {
            return Err(EngineError::InvalidArgument(format!(
                "system size must be a non-negative finite number (got {})",
                size
            )));
        }
        self.size = size;
        Ok(())
    }

    fn target_size(&self) -> Option<f64> {
        (self.size > 0.0).then_some(self.size)
    }

    fn request_over(&self, subsystems: Vec<Subsystem>, policy: CompositionPolicy) -> CompositionRequest {
        CompositionRequest {
            subsystems,
            shared_resources: self.shared_resources.clone(),
            target_size: self.target_size(),
            policy,
            combine_by_name: true,
            connections: Vec::new(),
        }
    }

    /// A request over the internal subsystems, sharing this system's
    /// resources and sized to the system (when a size is known).
    pub fn request(&self, policy: CompositionPolicy) -> CompositionRequest {
        self.request_over(self.internal.clone(), policy)
    }

    /// Shares this system's resources among its internal subsystems.
    pub fn shared_model(
        &self,
        policy: CompositionPolicy,
        reporter: &ProgressReporter,
    ) -> Result<Composition, EngineError> {
        share::run(&self.request(policy), reporter)
    }

    /// Combines the internal, external and membrane subsystems into one
    /// model.
    pub fn model(
        &self,
        policy: CompositionPolicy,
        reporter: &ProgressReporter,
    ) -> Result<Composition, EngineError> {
        let mut all = self.internal.clone();
        all.extend(self.external.iter().cloned());
        all.extend(self.membranes.iter().cloned());
        combine::run(&self.request_over(all, policy), reporter)
    }
}

/// Combines every subsystem of every system into one model. A subsystem
/// reachable from several systems (as internal of one and external of
/// another) takes part once. Shared resources apply only when a single
/// system is given.
pub fn combine_systems(
    systems: &[System],
    policy: CompositionPolicy,
    reporter: &ProgressReporter,
) -> Result<Composition, EngineError> {
    let mut subsystems: Vec<Subsystem> = Vec::new();
    for system in systems {
        for subsystem in system
            .internal
            .iter()
            .chain(&system.external)
            .chain(&system.membranes)
        {
            if subsystems.iter().any(|s| s.id() == subsystem.id()) {
                debug!("Skipping repeated subsystem '{}'", subsystem.id());
                continue;
            }
            subsystems.push(subsystem.clone());
        }
    }
    let shared_resources = match systems {
        [only] => only.shared_resources.clone(),
        _ => Vec::new(),
    };
    let request = CompositionRequest {
        subsystems,
        shared_resources,
        target_size: None,
        policy,
        combine_by_name: true,
        connections: Vec::new(),
    };
    combine::run(&request, reporter)
}
