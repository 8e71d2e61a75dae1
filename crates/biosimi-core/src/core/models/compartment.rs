use super::references::{SidReferences, rename_optional};

/// A well-mixed reaction volume.
#[derive(Debug, Clone, PartialEq)]
pub struct Compartment {
    pub id: String,
    pub name: Option<String>,
    pub size: Option<f64>,
    pub spatial_dimensions: Option<f64>,
    pub units: Option<String>,
    pub constant: bool,
    /// Identifier of the enclosing compartment, if any.
    pub outside: Option<String>,
}

impl Compartment {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            size: None,
            spatial_dimensions: Some(3.0),
            units: None,
            constant: true,
            outside: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl SidReferences for Compartment {
    fn rename_sid_refs(&mut self, old_id: &str, new_id: &str) -> usize {
        rename_optional(&mut self.units, old_id, new_id)
            + rename_optional(&mut self.outside, old_id, new_id)
    }

    fn references_sid(&self, id: &str) -> bool {
        self.units.as_deref() == Some(id) || self.outside.as_deref() == Some(id)
    }
}
