use super::collection::OrderedSlotMap;
use super::compartment::Compartment;
use super::definitions::{
    Constraint, Event, FunctionDefinition, InitialAssignment, ModelUnits, Parameter, Rule,
    UnitDefinition,
};
use super::ids::{CompartmentKey, ParameterKey, ReactionKey, SpeciesKey};
use super::reaction::Reaction;
use super::references::SidReferences;
use super::species::Species;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Model,
    FunctionDefinition,
    UnitDefinition,
    Compartment,
    Species,
    Parameter,
    Reaction,
    Event,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ElementKind::Model => "model",
            ElementKind::FunctionDefinition => "function definition",
            ElementKind::UnitDefinition => "unit definition",
            ElementKind::Compartment => "compartment",
            ElementKind::Species => "species",
            ElementKind::Parameter => "parameter",
            ElementKind::Reaction => "reaction",
            ElementKind::Event => "event",
        };
        f.write_str(label)
    }
}

/// Where a declared identifier lives inside a [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementLocation {
    Model,
    FunctionDefinition(usize),
    UnitDefinition(usize),
    Compartment(CompartmentKey),
    Species(SpeciesKey),
    Parameter(ParameterKey),
    Reaction(ReactionKey),
    Event(usize),
}

impl ElementLocation {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementLocation::Model => ElementKind::Model,
            ElementLocation::FunctionDefinition(_) => ElementKind::FunctionDefinition,
            ElementLocation::UnitDefinition(_) => ElementKind::UnitDefinition,
            ElementLocation::Compartment(_) => ElementKind::Compartment,
            ElementLocation::Species(_) => ElementKind::Species,
            ElementLocation::Parameter(_) => ElementKind::Parameter,
            ElementLocation::Reaction(_) => ElementKind::Reaction,
            ElementLocation::Event(_) => ElementKind::Event,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Identifier '{id}' is already declared; cannot add {kind} with the same identifier")]
    DuplicateId { id: String, kind: ElementKind },

    #[error("Cannot remove {kind} '{id}': it is still referenced by other elements")]
    StillReferenced { id: String, kind: ElementKind },
}

/// A reaction network: the sole content of a [`Document`](super::document::Document).
///
/// Every declared identifier is unique across all element kinds, and entity
/// collections iterate in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub id: String,
    pub name: Option<String>,
    pub units: ModelUnits,
    function_definitions: Vec<FunctionDefinition>,
    unit_definitions: Vec<UnitDefinition>,
    compartments: OrderedSlotMap<CompartmentKey, Compartment>,
    species: OrderedSlotMap<SpeciesKey, Species>,
    parameters: OrderedSlotMap<ParameterKey, Parameter>,
    initial_assignments: Vec<InitialAssignment>,
    rules: Vec<Rule>,
    constraints: Vec<Constraint>,
    reactions: OrderedSlotMap<ReactionKey, Reaction>,
    events: Vec<Event>,
}

impl Model {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    fn ensure_free(&self, id: &str, kind: ElementKind) -> Result<(), ModelError> {
        if self.locate(id).is_some() {
            return Err(ModelError::DuplicateId {
                id: id.to_string(),
                kind,
            });
        }
        Ok(())
    }

    pub fn add_function_definition(&mut self, function: FunctionDefinition) -> Result<(), ModelError> {
        self.ensure_free(&function.id, ElementKind::FunctionDefinition)?;
        self.function_definitions.push(function);
        Ok(())
    }

    pub fn add_unit_definition(&mut self, unit: UnitDefinition) -> Result<(), ModelError> {
        self.ensure_free(&unit.id, ElementKind::UnitDefinition)?;
        self.unit_definitions.push(unit);
        Ok(())
    }

    pub fn add_compartment(&mut self, compartment: Compartment) -> Result<CompartmentKey, ModelError> {
        self.ensure_free(&compartment.id, ElementKind::Compartment)?;
        Ok(self.compartments.insert(compartment))
    }

    pub fn add_species(&mut self, species: Species) -> Result<SpeciesKey, ModelError> {
        self.ensure_free(&species.id, ElementKind::Species)?;
        Ok(self.species.insert(species))
    }

    pub fn add_parameter(&mut self, parameter: Parameter) -> Result<ParameterKey, ModelError> {
        self.ensure_free(&parameter.id, ElementKind::Parameter)?;
        Ok(self.parameters.insert(parameter))
    }

    pub fn add_reaction(&mut self, reaction: Reaction) -> Result<ReactionKey, ModelError> {
        self.ensure_free(&reaction.id, ElementKind::Reaction)?;
        Ok(self.reactions.insert(reaction))
    }

    pub fn add_event(&mut self, event: Event) -> Result<(), ModelError> {
        if let Some(id) = &event.id {
            self.ensure_free(id, ElementKind::Event)?;
        }
        self.events.push(event);
        Ok(())
    }

    pub fn add_initial_assignment(&mut self, assignment: InitialAssignment) {
        self.initial_assignments.push(assignment);
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn function_definitions(&self) -> &[FunctionDefinition] {
        &self.function_definitions
    }

    pub fn unit_definitions(&self) -> &[UnitDefinition] {
        &self.unit_definitions
    }

    pub fn initial_assignments(&self) -> &[InitialAssignment] {
        &self.initial_assignments
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn compartment(&self, key: CompartmentKey) -> Option<&Compartment> {
        self.compartments.get(key)
    }

    pub fn compartment_mut(&mut self, key: CompartmentKey) -> Option<&mut Compartment> {
        self.compartments.get_mut(key)
    }

    pub fn compartments(&self) -> impl Iterator<Item = (CompartmentKey, &Compartment)> {
        self.compartments.iter()
    }

    pub fn compartment_count(&self) -> usize {
        self.compartments.len()
    }

    pub fn first_compartment_key(&self) -> Option<CompartmentKey> {
        self.compartments.first_key()
    }

    pub fn find_compartment(&self, id: &str) -> Option<CompartmentKey> {
        self.compartments.find(|c| c.id == id)
    }

    pub fn species(&self, key: SpeciesKey) -> Option<&Species> {
        self.species.get(key)
    }

    pub fn species_mut(&mut self, key: SpeciesKey) -> Option<&mut Species> {
        self.species.get_mut(key)
    }

    pub fn species_iter(&self) -> impl Iterator<Item = (SpeciesKey, &Species)> {
        self.species.iter()
    }

    pub fn species_keys(&self) -> Vec<SpeciesKey> {
        self.species.keys().collect()
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    pub fn find_species(&self, id: &str) -> Option<SpeciesKey> {
        self.species.find(|s| s.id == id)
    }

    /// All species whose display name equals `name`, in declaration order.
    pub fn species_named(&self, name: &str) -> Vec<SpeciesKey> {
        self.species
            .iter()
            .filter(|(_, s)| s.display_name() == name)
            .map(|(key, _)| key)
            .collect()
    }

    pub fn parameter(&self, key: ParameterKey) -> Option<&Parameter> {
        self.parameters.get(key)
    }

    pub fn parameters(&self) -> impl Iterator<Item = (ParameterKey, &Parameter)> {
        self.parameters.iter()
    }

    pub fn find_parameter(&self, id: &str) -> Option<ParameterKey> {
        self.parameters.find(|p| p.id == id)
    }

    pub fn reaction(&self, key: ReactionKey) -> Option<&Reaction> {
        self.reactions.get(key)
    }

    pub fn reaction_mut(&mut self, key: ReactionKey) -> Option<&mut Reaction> {
        self.reactions.get_mut(key)
    }

    pub fn reactions(&self) -> impl Iterator<Item = (ReactionKey, &Reaction)> {
        self.reactions.iter()
    }

    pub fn reaction_keys(&self) -> Vec<ReactionKey> {
        self.reactions.keys().collect()
    }

    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }

    pub fn find_reaction(&self, id: &str) -> Option<ReactionKey> {
        self.reactions.find(|r| r.id == id)
    }

    /// Removes a species, refusing while any element still refers to it.
    pub fn remove_species(&mut self, key: SpeciesKey) -> Result<Option<Species>, ModelError> {
        let Some(id) = self.species.get(key).map(|s| s.id.clone()) else {
            return Ok(None);
        };
        if self.reference_count(&id, None) > 0 {
            return Err(ModelError::StillReferenced {
                id,
                kind: ElementKind::Species,
            });
        }
        Ok(self.species.remove(key))
    }

    /// Removes a reaction, refusing while math elsewhere refers to its
    /// identifier.
    pub fn remove_reaction(&mut self, key: ReactionKey) -> Result<Option<Reaction>, ModelError> {
        let Some(id) = self.reactions.get(key).map(|r| r.id.clone()) else {
            return Ok(None);
        };
        if self.reference_count(&id, Some(ElementLocation::Reaction(key))) > 0 {
            return Err(ModelError::StillReferenced {
                id,
                kind: ElementKind::Reaction,
            });
        }
        Ok(self.reactions.remove(key))
    }

    /// Every declared identifier with its element kind, in declaration order,
    /// including event identifiers.
    pub fn declared_identifiers(&self) -> Vec<(ElementKind, String)> {
        let mut declared = Vec::new();
        if !self.id.is_empty() {
            declared.push((ElementKind::Model, self.id.clone()));
        }
        declared.extend(
            self.function_definitions
                .iter()
                .map(|f| (ElementKind::FunctionDefinition, f.id.clone())),
        );
        declared.extend(
            self.unit_definitions
                .iter()
                .map(|u| (ElementKind::UnitDefinition, u.id.clone())),
        );
        declared.extend(
            self.compartments
                .iter()
                .map(|(_, c)| (ElementKind::Compartment, c.id.clone())),
        );
        declared.extend(
            self.species
                .iter()
                .map(|(_, s)| (ElementKind::Species, s.id.clone())),
        );
        declared.extend(
            self.parameters
                .iter()
                .map(|(_, p)| (ElementKind::Parameter, p.id.clone())),
        );
        declared.extend(
            self.reactions
                .iter()
                .map(|(_, r)| (ElementKind::Reaction, r.id.clone())),
        );
        declared.extend(
            self.events
                .iter()
                .filter_map(|e| e.id.clone().map(|id| (ElementKind::Event, id))),
        );
        declared
    }

    /// The identifier space that generated identifiers must avoid. Event
    /// identifiers and kinetic-law local parameters are not part of it.
    pub fn all_identifiers(&self) -> HashSet<String> {
        self.declared_identifiers()
            .into_iter()
            .filter(|(kind, _)| *kind != ElementKind::Event)
            .map(|(_, id)| id)
            .collect()
    }

    pub fn locate(&self, id: &str) -> Option<ElementLocation> {
        if self.id == id {
            return Some(ElementLocation::Model);
        }
        if let Some(i) = self.function_definitions.iter().position(|f| f.id == id) {
            return Some(ElementLocation::FunctionDefinition(i));
        }
        if let Some(i) = self.unit_definitions.iter().position(|u| u.id == id) {
            return Some(ElementLocation::UnitDefinition(i));
        }
        if let Some(key) = self.find_compartment(id) {
            return Some(ElementLocation::Compartment(key));
        }
        if let Some(key) = self.find_species(id) {
            return Some(ElementLocation::Species(key));
        }
        if let Some(key) = self.find_parameter(id) {
            return Some(ElementLocation::Parameter(key));
        }
        if let Some(key) = self.find_reaction(id) {
            return Some(ElementLocation::Reaction(key));
        }
        self.events
            .iter()
            .position(|e| e.id.as_deref() == Some(id))
            .map(ElementLocation::Event)
    }

    /// Changes the declared identifier at `location` without touching any
    /// reference to it.
    pub fn set_declared_id(&mut self, location: ElementLocation, new_id: &str) {
        let new_id = new_id.to_string();
        match location {
            ElementLocation::Model => self.id = new_id,
            ElementLocation::FunctionDefinition(i) => {
                if let Some(f) = self.function_definitions.get_mut(i) {
                    f.id = new_id;
                }
            }
            ElementLocation::UnitDefinition(i) => {
                if let Some(u) = self.unit_definitions.get_mut(i) {
                    u.id = new_id;
                }
            }
            ElementLocation::Compartment(key) => {
                if let Some(c) = self.compartments.get_mut(key) {
                    c.id = new_id;
                }
            }
            ElementLocation::Species(key) => {
                if let Some(s) = self.species.get_mut(key) {
                    s.id = new_id;
                }
            }
            ElementLocation::Parameter(key) => {
                if let Some(p) = self.parameters.get_mut(key) {
                    p.id = new_id;
                }
            }
            ElementLocation::Reaction(key) => {
                if let Some(r) = self.reactions.get_mut(key) {
                    r.id = new_id;
                }
            }
            ElementLocation::Event(i) => {
                if let Some(e) = self.events.get_mut(i) {
                    e.id = Some(new_id);
                }
            }
        }
    }

    /// Rewrites every reference to `old_id` across all elements, returning the
    /// number of references changed. Declarations are left untouched.
    pub fn rename_sid_refs(&mut self, old_id: &str, new_id: &str) -> usize {
        let mut count = self.units.rename_sid_refs(old_id, new_id);
        count += self
            .function_definitions
            .iter_mut()
            .map(|f| f.rename_sid_refs(old_id, new_id))
            .sum::<usize>();
        count += self
            .compartments
            .values_mut()
            .map(|c| c.rename_sid_refs(old_id, new_id))
            .sum::<usize>();
        count += self
            .species
            .values_mut()
            .map(|s| s.rename_sid_refs(old_id, new_id))
            .sum::<usize>();
        count += self
            .parameters
            .values_mut()
            .map(|p| p.rename_sid_refs(old_id, new_id))
            .sum::<usize>();
        count += self
            .initial_assignments
            .iter_mut()
            .map(|a| a.rename_sid_refs(old_id, new_id))
            .sum::<usize>();
        count += self
            .rules
            .iter_mut()
            .map(|r| r.rename_sid_refs(old_id, new_id))
            .sum::<usize>();
        count += self
            .constraints
            .iter_mut()
            .map(|c| c.rename_sid_refs(old_id, new_id))
            .sum::<usize>();
        count += self
            .reactions
            .values_mut()
            .map(|r| r.rename_sid_refs(old_id, new_id))
            .sum::<usize>();
        count += self
            .events
            .iter_mut()
            .map(|e| e.rename_sid_refs(old_id, new_id))
            .sum::<usize>();
        count
    }

    /// Counts elements holding a reference to `id`, optionally ignoring the
    /// element at `skip`.
    pub fn reference_count(&self, id: &str, skip: Option<ElementLocation>) -> usize {
        let mut holders = usize::from(self.units.references_sid(id));
        holders += self
            .function_definitions
            .iter()
            .filter(|f| f.references_sid(id))
            .count();
        holders += self
            .compartments
            .iter()
            .filter(|(key, c)| skip != Some(ElementLocation::Compartment(*key)) && c.references_sid(id))
            .count();
        holders += self
            .species
            .iter()
            .filter(|(key, s)| skip != Some(ElementLocation::Species(*key)) && s.references_sid(id))
            .count();
        holders += self
            .parameters
            .iter()
            .filter(|(_, p)| p.references_sid(id))
            .count();
        holders += self
            .initial_assignments
            .iter()
            .filter(|a| a.references_sid(id))
            .count();
        holders += self.rules.iter().filter(|r| r.references_sid(id)).count();
        holders += self
            .constraints
            .iter()
            .filter(|c| c.references_sid(id))
            .count();
        holders += self
            .reactions
            .iter()
            .filter(|(key, r)| skip != Some(ElementLocation::Reaction(*key)) && r.references_sid(id))
            .count();
        holders += self.events.iter().filter(|e| e.references_sid(id)).count();
        holders
    }

    /// Identifiers referenced by some element but declared by none.
    pub fn dangling_references(&self) -> Vec<String> {
        let declared: HashSet<String> = self
            .declared_identifiers()
            .into_iter()
            .map(|(_, id)| id)
            .collect();
        let mut referenced: Vec<String> = Vec::new();
        let mut note = |id: &str| {
            if !declared.contains(id) && !referenced.iter().any(|r| r == id) {
                referenced.push(id.to_string());
            }
        };

        for (_, species) in self.species.iter() {
            note(&species.compartment);
        }
        for (_, reaction) in self.reactions.iter() {
            for participant in reaction.participants() {
                note(participant);
            }
            if let Some(law) = &reaction.kinetic_law {
                for symbol in law.math.referenced_symbols() {
                    if !law.local_parameters.iter().any(|p| p.id == symbol) {
                        note(symbol);
                    }
                }
            }
        }
        for rule in &self.rules {
            if let Some(variable) = rule.variable() {
                note(variable);
            }
            for symbol in rule.math().referenced_symbols() {
                note(symbol);
            }
        }
        for assignment in &self.initial_assignments {
            note(&assignment.symbol);
            for symbol in assignment.math.referenced_symbols() {
                note(symbol);
            }
        }
        for event in &self.events {
            for assignment in &event.assignments {
                note(&assignment.variable);
            }
        }
        referenced.retain(|id| !crate::core::utils::identifiers::is_builtin_symbol(id));
        referenced
    }

    pub(crate) fn function_definitions_mut(&mut self) -> &mut Vec<FunctionDefinition> {
        &mut self.function_definitions
    }

    pub(crate) fn unit_definitions_mut(&mut self) -> &mut Vec<UnitDefinition> {
        &mut self.unit_definitions
    }
}
