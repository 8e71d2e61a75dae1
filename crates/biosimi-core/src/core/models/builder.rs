use super::compartment::Compartment;
use super::definitions::{
    Constraint, Event, FunctionDefinition, InitialAssignment, Parameter, Rule, UnitDefinition,
};
use super::model::{Model, ModelError};
use super::reaction::Reaction;
use super::species::Species;

/// Fluent construction of a [`Model`].
///
/// The first declaration error is remembered and returned from
/// [`ModelBuilder::build`]; later additions are ignored once an error occurred.
#[derive(Debug)]
pub struct ModelBuilder {
    model: Model,
    error: Option<ModelError>,
}

impl ModelBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            model: Model::new(id),
            error: None,
        }
    }

    fn apply(mut self, add: impl FnOnce(&mut Model) -> Result<(), ModelError>) -> Self {
        if self.error.is_none() {
            if let Err(e) = add(&mut self.model) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.model.name = Some(name.into());
        self
    }

    pub fn substance_units(mut self, units: impl Into<String>) -> Self {
        self.model.units.substance = Some(units.into());
        self
    }

    pub fn compartment(self, compartment: Compartment) -> Self {
        self.apply(|m| m.add_compartment(compartment).map(|_| ()))
    }

    pub fn species(self, species: Species) -> Self {
        self.apply(|m| m.add_species(species).map(|_| ()))
    }

    pub fn parameter(self, parameter: Parameter) -> Self {
        self.apply(|m| m.add_parameter(parameter).map(|_| ()))
    }

    pub fn reaction(self, reaction: Reaction) -> Self {
        self.apply(|m| m.add_reaction(reaction).map(|_| ()))
    }

    pub fn unit_definition(self, unit: UnitDefinition) -> Self {
        self.apply(|m| m.add_unit_definition(unit))
    }

    pub fn function_definition(self, function: FunctionDefinition) -> Self {
        self.apply(|m| m.add_function_definition(function))
    }

    pub fn event(self, event: Event) -> Self {
        self.apply(|m| m.add_event(event))
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.model.add_rule(rule);
        self
    }

    pub fn initial_assignment(mut self, assignment: InitialAssignment) -> Self {
        self.model.add_initial_assignment(assignment);
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.model.add_constraint(constraint);
        self
    }

    pub fn build(self) -> Result<Model, ModelError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.model),
        }
    }
}
