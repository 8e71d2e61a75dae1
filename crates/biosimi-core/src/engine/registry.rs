use crate::core::models::model::Model;
use crate::core::utils::identifiers::{is_builtin_function, is_builtin_symbol, name_to_sid};
use std::collections::HashSet;

/// The set of identifiers that freshly generated identifiers must avoid.
///
/// A registry is a snapshot: loops that rename entities one by one rebuild it
/// with [`IdentifierRegistry::scan`] before every allocation. Event identifiers
/// are reserved too, since a rename onto one is refused.
#[derive(Debug, Clone, Default)]
pub struct IdentifierRegistry {
    taken: HashSet<String>,
}

impl IdentifierRegistry {
    pub fn scan(model: &Model) -> Self {
        Self {
            taken: model
                .declared_identifiers()
                .into_iter()
                .map(|(_, id)| id)
                .collect(),
        }
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.taken.contains(id)
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }

    /// Marks `id` as taken. Returns `false` if it already was.
    pub fn reserve(&mut self, id: impl Into<String>) -> bool {
        self.taken.insert(id.into())
    }

    pub fn release(&mut self, id: &str) -> bool {
        self.taken.remove(id)
    }

    fn is_free(&self, id: &str) -> bool {
        !self.taken.contains(id) && !is_builtin_function(id) && !is_builtin_symbol(id)
    }

    /// Returns `candidate` itself if free, otherwise the first free
    /// `candidate_1`, `candidate_2`, ... The result is reserved.
    pub fn unique_identifier(&mut self, candidate: &str) -> String {
        let mut id = candidate.to_string();
        let mut counter = 1usize;
        while !self.is_free(&id) {
            id = format!("{}_{}", candidate, counter);
            counter += 1;
        }
        self.taken.insert(id.clone());
        id
    }

    /// Converts free text into a legal identifier unique within the registry.
    pub fn valid_identifier_for(&mut self, name: &str) -> String {
        let base = name_to_sid(name);
        self.unique_identifier(&base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::builder::ModelBuilder;
    use crate::core::models::compartment::Compartment;
    use crate::core::models::definitions::{Event, Parameter};
    use crate::core::models::species::Species;

    #[test]
    fn scan_reserves_declared_ids_including_events() {
        let model = ModelBuilder::new("m")
            .compartment(Compartment::new("cell"))
            .species(Species::new("A", "cell", 1.0))
            .parameter(Parameter::new("k", 1.0))
            .event(Event {
                id: Some("pulse".into()),
                name: None,
                trigger: "time > 10".parse().unwrap(),
                delay: None,
                assignments: Vec::new(),
            })
            .build()
            .unwrap();

        let registry = IdentifierRegistry::scan(&model);
        for id in ["m", "cell", "A", "k", "pulse"] {
            assert!(registry.contains(id), "{id} should be taken");
        }
        assert_eq!(registry.len(), 5);
        assert_eq!(model.all_identifiers().len(), 4);
    }

    #[test]
    fn valid_identifier_for_sanitises_and_suffixes() {
        let mut registry = IdentifierRegistry::from_ids(["RNAP", "RNAP_1"]);
        assert_eq!(registry.valid_identifier_for("RNAP"), "RNAP_2");
        assert_eq!(registry.valid_identifier_for("RNAP"), "RNAP_3");
        assert_eq!(registry.valid_identifier_for("protein tetR"), "protein_tetR");
        assert_eq!(registry.valid_identifier_for("3OC12"), "_3OC12");
        assert!(registry.contains("protein_tetR"));
    }

    #[test]
    fn unique_identifier_avoids_builtin_names() {
        let mut registry = IdentifierRegistry::default();
        assert_eq!(registry.unique_identifier("time"), "time_1");
        assert_eq!(registry.unique_identifier("ATP_shared"), "ATP_shared");
        assert_eq!(registry.unique_identifier("ATP_shared"), "ATP_shared_1");
    }

    #[test]
    fn release_frees_an_identifier() {
        let mut registry = IdentifierRegistry::from_ids(["x"]);
        assert!(!registry.reserve("x"));
        assert!(registry.release("x"));
        assert_eq!(registry.unique_identifier("x"), "x");
    }
}
