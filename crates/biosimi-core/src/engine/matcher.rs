use crate::core::models::ids::{ReactionKey, SpeciesKey};
use crate::core::models::model::Model;
use crate::core::models::reaction::{Reaction, SpeciesReference};
use crate::core::models::species::Species;

/// Species sharing one display name, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesGroup {
    pub name: String,
    pub members: Vec<SpeciesKey>,
}

impl SpeciesGroup {
    pub fn is_collision(&self) -> bool {
        self.members.len() > 1
    }

    /// Distinct compartment identifiers occupied by the members, in first
    /// occurrence order.
    pub fn compartments(&self, model: &Model) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for species in self.members.iter().filter_map(|&key| model.species(key)) {
            if !found.contains(&species.compartment) {
                found.push(species.compartment.clone());
            }
        }
        found
    }

    pub fn spans_compartments(&self, model: &Model) -> bool {
        self.compartments(model).len() > 1
    }
}

/// Groups the species accepted by `include` by display name. Groups appear in
/// the order their first member was declared.
pub fn group_species_by_name(
    model: &Model,
    include: impl Fn(&Species) -> bool,
) -> Vec<SpeciesGroup> {
    let mut groups: Vec<SpeciesGroup> = Vec::new();
    for (key, species) in model.species_iter().filter(|(_, s)| include(s)) {
        let name = species.display_name();
        match groups.iter_mut().find(|g| g.name == name) {
            Some(group) => group.members.push(key),
            None => groups.push(SpeciesGroup {
                name: name.to_string(),
                members: vec![key],
            }),
        }
    }
    groups
}

fn side(model: &Model, references: &[SpeciesReference]) -> String {
    references
        .iter()
        .map(|r| {
            model
                .find_species(&r.species)
                .and_then(|key| model.species(key))
                .map_or(r.species.as_str(), |s| s.display_name())
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

/// The order-sensitive text form of a reaction, built from participant
/// display names, e.g. `A + B --> C` or `A <-> B`.
pub fn reaction_signature(model: &Model, reaction: &Reaction) -> String {
    let arrow = if reaction.reversible { "<->" } else { "-->" };
    format!(
        "{} {} {}",
        side(model, &reaction.reactants),
        arrow,
        side(model, &reaction.products)
    )
}

/// Reactions grouped by signature; only groups with more than one member are
/// returned, each in source order.
pub fn duplicate_reactions(model: &Model) -> Vec<(String, Vec<ReactionKey>)> {
    let mut groups: Vec<(String, Vec<ReactionKey>)> = Vec::new();
    for (key, reaction) in model.reactions() {
        let signature = reaction_signature(model, reaction);
        match groups.iter_mut().find(|(s, _)| *s == signature) {
            Some((_, keys)) => keys.push(key),
            None => groups.push((signature, vec![key])),
        }
    }
    groups.retain(|(_, keys)| keys.len() > 1);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::builder::ModelBuilder;
    use crate::core::models::compartment::Compartment;

    fn shell() -> Model {
        ModelBuilder::new("shell")
            .compartment(Compartment::new("cell"))
            .compartment(Compartment::new("env"))
            .species(Species::new("A", "cell", 1.0).with_name("A"))
            .species(Species::new("B", "cell", 1.0).with_name("B"))
            .species(Species::new("C", "cell", 0.0).with_name("C"))
            .species(Species::new("A_1", "cell", 2.0).with_name("A"))
            .species(Species::new("B_1", "cell", 3.0).with_name("B"))
            .species(Species::new("C_1", "cell", 0.0).with_name("C"))
            .species(Species::new("IPTG", "cell", 0.0).with_name("IPTG"))
            .species(Species::new("IPTG_1", "env", 9.0).with_name("IPTG"))
            .reaction(Reaction::new("r1").reactant("A").reactant("B").product("C"))
            .reaction(Reaction::new("r1_1").reactant("A_1").reactant("B_1").product("C_1"))
            .reaction(Reaction::new("r2").reactant("B").reactant("A").product("C"))
            .reaction(Reaction::new("r3").reactant("A").product("C").reversible(true))
            .build()
            .unwrap()
    }

    mod species {
        use super::*;

        #[test]
        fn groups_by_display_name_in_source_order() {
            let model = shell();
            let groups = group_species_by_name(&model, |_| true);
            let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
            assert_eq!(names, vec!["A", "B", "C", "IPTG"]);
            let first_a = model.species(groups[0].members[0]).unwrap();
            assert_eq!(first_a.id, "A");
            assert!(groups.iter().all(SpeciesGroup::is_collision));
        }

        #[test]
        fn include_filter_restricts_candidates() {
            let model = shell();
            let groups = group_species_by_name(&model, |s| s.display_name() == "IPTG");
            assert_eq!(groups.len(), 1);
            assert_eq!(groups[0].members.len(), 2);
        }

        #[test]
        fn detects_groups_spanning_compartments() {
            let model = shell();
            let groups = group_species_by_name(&model, |_| true);
            let iptg = groups.iter().find(|g| g.name == "IPTG").unwrap();
            assert!(iptg.spans_compartments(&model));
            assert_eq!(iptg.compartments(&model), vec!["cell", "env"]);
            assert!(!groups[0].spans_compartments(&model));
        }
    }

    mod reactions {
        use super::*;

        #[test]
        fn signature_uses_display_names_and_direction() {
            let model = shell();
            let r1 = model.reaction(model.find_reaction("r1").unwrap()).unwrap();
            let r3 = model.reaction(model.find_reaction("r3").unwrap()).unwrap();
            assert_eq!(reaction_signature(&model, r1), "A + B --> C");
            assert_eq!(reaction_signature(&model, r3), "A <-> C");
        }

        #[test]
        fn duplicates_are_grouped_order_sensitively() {
            let model = shell();
            let duplicates = duplicate_reactions(&model);
            assert_eq!(duplicates.len(), 1);
            let (signature, keys) = &duplicates[0];
            assert_eq!(signature, "A + B --> C");
            let ids: Vec<_> = keys
                .iter()
                .map(|&k| model.reaction(k).unwrap().id.as_str())
                .collect();
            assert_eq!(ids, vec!["r1", "r1_1"]);
        }
    }
}
