use super::math::MathExpr;
use super::references::{SidReferences, rename_optional, rename_required};

#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesReference {
    pub species: String,
    pub stoichiometry: f64,
    pub constant: bool,
}

impl SpeciesReference {
    pub fn new(species: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            stoichiometry: 1.0,
            constant: true,
        }
    }

    pub fn with_stoichiometry(mut self, stoichiometry: f64) -> Self {
        self.stoichiometry = stoichiometry;
        self
    }
}

/// A parameter scoped to one kinetic law; shadows model-level identifiers
/// inside that law's math.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalParameter {
    pub id: String,
    pub value: Option<f64>,
    pub units: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KineticLaw {
    pub math: MathExpr,
    pub local_parameters: Vec<LocalParameter>,
}

impl KineticLaw {
    pub fn new(math: MathExpr) -> Self {
        Self {
            math,
            local_parameters: Vec::new(),
        }
    }

    fn shadows(&self, id: &str) -> bool {
        self.local_parameters.iter().any(|p| p.id == id)
    }
}

impl SidReferences for KineticLaw {
    fn rename_sid_refs(&mut self, old_id: &str, new_id: &str) -> usize {
        let mut count: usize = self
            .local_parameters
            .iter_mut()
            .map(|p| rename_optional(&mut p.units, old_id, new_id))
            .sum();
        if !self.shadows(old_id) {
            count += self.math.rename_symbol(old_id, new_id);
        }
        count
    }

    fn references_sid(&self, id: &str) -> bool {
        self.local_parameters
            .iter()
            .any(|p| p.units.as_deref() == Some(id))
            || (!self.shadows(id) && self.math.references(id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub id: String,
    pub name: Option<String>,
    pub reactants: Vec<SpeciesReference>,
    pub products: Vec<SpeciesReference>,
    pub modifiers: Vec<String>,
    pub reversible: bool,
    pub fast: bool,
    pub kinetic_law: Option<KineticLaw>,
}

impl Reaction {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            reactants: Vec::new(),
            products: Vec::new(),
            modifiers: Vec::new(),
            reversible: false,
            fast: false,
            kinetic_law: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn reactant(mut self, species: impl Into<String>) -> Self {
        self.reactants.push(SpeciesReference::new(species));
        self
    }

    pub fn product(mut self, species: impl Into<String>) -> Self {
        self.products.push(SpeciesReference::new(species));
        self
    }

    pub fn modifier(mut self, species: impl Into<String>) -> Self {
        self.modifiers.push(species.into());
        self
    }

    pub fn reversible(mut self, reversible: bool) -> Self {
        self.reversible = reversible;
        self
    }

    pub fn fast(mut self, fast: bool) -> Self {
        self.fast = fast;
        self
    }

    pub fn with_kinetic_law(mut self, math: MathExpr) -> Self {
        self.kinetic_law = Some(KineticLaw::new(math));
        self
    }

    /// Identifiers of every species the reaction touches, reactants first,
    /// without duplicates.
    pub fn participants(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        let all = self
            .reactants
            .iter()
            .chain(self.products.iter())
            .map(|r| r.species.as_str())
            .chain(self.modifiers.iter().map(String::as_str));
        for id in all {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

impl SidReferences for Reaction {
    fn rename_sid_refs(&mut self, old_id: &str, new_id: &str) -> usize {
        let mut count = 0;
        for reference in self.reactants.iter_mut().chain(self.products.iter_mut()) {
            count += rename_required(&mut reference.species, old_id, new_id);
        }
        for modifier in &mut self.modifiers {
            count += rename_required(modifier, old_id, new_id);
        }
        if let Some(law) = &mut self.kinetic_law {
            count += law.rename_sid_refs(old_id, new_id);
        }
        count
    }

    fn references_sid(&self, id: &str) -> bool {
        self.reactants
            .iter()
            .chain(self.products.iter())
            .any(|r| r.species == id)
            || self.modifiers.iter().any(|m| m == id)
            || self
                .kinetic_law
                .as_ref()
                .is_some_and(|law| law.references_sid(id))
    }
}
