use crate::core::models::document::{Document, SchemaVersion};
use crate::core::models::model::Model;
use crate::core::utils::identifiers::name_to_sid;

/// Identifier of a composed model: `<prefix>_<id1>_<id2>...`.
pub fn shell_id(prefix: &str, source_ids: &[&str]) -> String {
    let mut parts = Vec::with_capacity(source_ids.len() + 1);
    parts.push(prefix);
    parts.extend(source_ids.iter().copied().filter(|id| !id.is_empty()));
    name_to_sid(&parts.join("_"))
}

/// A fresh, empty document in the latest schema that an operator builds its
/// result in.
pub fn new_shell(prefix: &str, source_ids: &[&str]) -> Document {
    Document::new(
        SchemaVersion::LATEST,
        Model::new(shell_id(prefix, source_ids)),
    )
}

/// Sets the size of the shell's first compartment, if it has one.
pub fn resize_first_compartment(model: &mut Model, size: f64) -> bool {
    let Some(key) = model.first_compartment_key() else {
        return false;
    };
    match model.compartment_mut(key) {
        Some(compartment) => {
            compartment.size = Some(size);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::compartment::Compartment;

    #[test]
    fn shell_id_joins_prefix_and_sources() {
        assert_eq!(
            shell_id("shared_subsystems", &["IPTG_reservoir", "cell"]),
            "shared_subsystems_IPTG_reservoir_cell"
        );
        assert_eq!(shell_id("combined_subsystems", &[]), "combined_subsystems");
    }

    #[test]
    fn new_shell_is_empty_and_latest() {
        let shell = new_shell("connected_subsystems", &["a"]);
        assert_eq!(shell.schema(), SchemaVersion::LATEST);
        assert_eq!(shell.model().id, "connected_subsystems_a");
        assert_eq!(shell.model().species_count(), 0);
    }

    #[test]
    fn resize_first_compartment_only_touches_the_first() {
        let mut model = Model::new("m");
        assert!(!resize_first_compartment(&mut model, 2.0));
        model.add_compartment(Compartment::new("a").with_size(1.0)).unwrap();
        model.add_compartment(Compartment::new("b").with_size(1.0)).unwrap();
        assert!(resize_first_compartment(&mut model, 2.0));
        let sizes: Vec<_> = model.compartments().map(|(_, c)| c.size).collect();
        assert_eq!(sizes, vec![Some(2.0), Some(1.0)]);
    }
}
