use super::references::{SidReferences, rename_optional, rename_required};

/// A chemical entity located in one compartment.
///
/// The display name is the semantic key used when matching species across
/// subsystems; the identifier is the structural key that other elements refer
/// to.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub id: String,
    pub name: Option<String>,
    pub compartment: String,
    pub initial_amount: f64,
    pub substance_units: Option<String>,
    pub has_only_substance_units: bool,
    pub boundary_condition: bool,
    pub constant: bool,
}

impl Species {
    pub fn new(id: impl Into<String>, compartment: impl Into<String>, initial_amount: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            compartment: compartment.into(),
            initial_amount,
            substance_units: None,
            has_only_substance_units: false,
            boundary_condition: false,
            constant: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_substance_units(mut self, units: impl Into<String>) -> Self {
        self.substance_units = Some(units.into());
        self
    }

    /// The declared name, or the identifier when no name was declared.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl SidReferences for Species {
    fn rename_sid_refs(&mut self, old_id: &str, new_id: &str) -> usize {
        rename_required(&mut self.compartment, old_id, new_id)
            + rename_optional(&mut self.substance_units, old_id, new_id)
    }

    fn references_sid(&self, id: &str) -> bool {
        self.compartment == id || self.substance_units.as_deref() == Some(id)
    }
}
