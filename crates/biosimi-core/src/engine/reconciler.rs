use super::config::CompositionPolicy;
use super::error::EngineError;
use super::matcher::SpeciesGroup;
use super::registry::IdentifierRegistry;
use super::renamer::rename_sid;
use crate::core::models::ids::SpeciesKey;
use crate::core::models::model::Model;
use slotmap::SecondaryMap;
use tracing::debug;

const DEFAULT_SOURCE_SIZE: f64 = 1.0;

/// Remembers the compartment size each shell species' amount refers to, so
/// amounts can be weighted when species are collapsed.
#[derive(Debug, Clone, Default)]
pub struct SourceSizes {
    sizes: Vec<f64>,
    weights: SecondaryMap<SpeciesKey, f64>,
}

impl SourceSizes {
    pub fn new(sizes: Vec<f64>) -> Self {
        Self {
            sizes,
            weights: SecondaryMap::new(),
        }
    }

    /// Records that `species` was copied from the source at index `source`.
    pub fn record(&mut self, species: SpeciesKey, source: usize) {
        let size = self.sizes.get(source).copied().unwrap_or(DEFAULT_SOURCE_SIZE);
        self.weights.insert(species, size);
    }

    /// Records that the amount of `species` now refers to a volume of `size`.
    pub fn rebase(&mut self, species: SpeciesKey, size: f64) {
        self.weights.insert(species, size);
    }

    /// The volume `species`' amount refers to; unrecorded species count as
    /// size 1.
    pub fn size_of(&self, species: SpeciesKey) -> f64 {
        self.weights
            .get(species)
            .copied()
            .unwrap_or(DEFAULT_SOURCE_SIZE)
    }

    pub fn total(&self) -> f64 {
        self.sizes.iter().sum()
    }

    pub fn sizes(&self) -> &[f64] {
        &self.sizes
    }
}

fn missing(model: &Model, group: &SpeciesGroup) -> EngineError {
    EngineError::SpeciesNotFound {
        name: group.name.clone(),
        model: model.id.clone(),
    }
}

/// Computes the amount a collapsed group ends up with.
///
/// `volume` weights each member by its source size and divides by
/// `target_size`; `virtual` keeps the first member's amount.
pub fn reconciled_amount(
    model: &Model,
    group: &SpeciesGroup,
    policy: CompositionPolicy,
    target_size: f64,
    sizes: &SourceSizes,
) -> Result<f64, EngineError> {
    match policy {
        CompositionPolicy::Virtual => {
            let first = group
                .members
                .first()
                .and_then(|&key| model.species(key))
                .ok_or_else(|| missing(model, group))?;
            Ok(first.initial_amount)
        }
        CompositionPolicy::Volume => {
            if !target_size.is_finite() || target_size <= 0.0 {
                return Err(EngineError::InvalidArgument(format!(
                    "target size must be positive and finite (got {})",
                    target_size
                )));
            }
            let mut weighted = 0.0;
            for &key in &group.members {
                let species = model.species(key).ok_or_else(|| missing(model, group))?;
                weighted += species.initial_amount * sizes.size_of(key);
            }
            Ok(weighted / target_size)
        }
    }
}

/// Collapses `group` into its first member.
///
/// The survivor is renamed to `<valid id for the name><suffix>`. Every other
/// member is renamed to a placeholder, references to the placeholder are
/// redirected to the survivor, and the placeholder is removed. The survivor
/// finally takes `amount`.
pub fn collapse(
    model: &mut Model,
    group: &SpeciesGroup,
    suffix: &str,
    amount: f64,
) -> Result<SpeciesKey, EngineError> {
    let (&survivor, others) = group
        .members
        .split_first()
        .ok_or_else(|| EngineError::Internal(format!("empty species group '{}'", group.name)))?;

    let mut member_ids = Vec::with_capacity(group.members.len());
    for &key in &group.members {
        let species = model.species(key).ok_or_else(|| missing(model, group))?;
        member_ids.push(species.id.clone());
    }

    let mut placeholders = Vec::with_capacity(others.len());
    for (&key, old_id) in others.iter().zip(member_ids.iter().skip(1)) {
        let placeholder =
            IdentifierRegistry::scan(model).unique_identifier(&format!("{}_placeholder", old_id));
        rename_sid(model, old_id, &placeholder)?;
        placeholders.push((key, placeholder));
    }

    let mut registry = IdentifierRegistry::scan(model);
    registry.release(&member_ids[0]);
    let base = registry.valid_identifier_for(&group.name);
    let survivor_id = registry.unique_identifier(&format!("{}{}", base, suffix));
    if survivor_id != member_ids[0] {
        rename_sid(model, &member_ids[0], &survivor_id)?;
    }

    for (key, placeholder) in placeholders {
        model.rename_sid_refs(&placeholder, &survivor_id);
        model.remove_species(key).map_err(|e| {
            EngineError::Internal(format!(
                "placeholder '{}' still referenced after redirect: {}",
                placeholder, e
            ))
        })?;
    }

    let species = model
        .species_mut(survivor)
        .ok_or_else(|| EngineError::Internal(format!("survivor '{}' vanished", survivor_id)))?;
    species.initial_amount = amount;
    debug!(
        "Collapsed {} species named '{}' into '{}' (amount {})",
        group.members.len(),
        group.name,
        survivor_id,
        amount
    );
    Ok(survivor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::builder::ModelBuilder;
    use crate::core::models::compartment::Compartment;
    use crate::core::models::reaction::Reaction;
    use crate::core::models::species::Species;
    use crate::engine::matcher::group_species_by_name;

    struct Fixture {
        model: Model,
        group: SpeciesGroup,
        sizes: SourceSizes,
    }

    fn fixture() -> Fixture {
        let model = ModelBuilder::new("shell")
            .compartment(Compartment::new("cell").with_size(15.0))
            .species(Species::new("RNAP", "cell", 100.0).with_name("RNAP"))
            .species(Species::new("G", "cell", 0.0).with_name("G"))
            .species(Species::new("RNAP_1", "cell", 40.0).with_name("RNAP"))
            .reaction(Reaction::new("tx1").reactant("RNAP").reactant("G").product("G"))
            .reaction(Reaction::new("tx2").reactant("RNAP_1").product("RNAP_1"))
            .build()
            .unwrap();
        let group = group_species_by_name(&model, |s| s.display_name() == "RNAP")
            .into_iter()
            .next()
            .unwrap();
        let mut sizes = SourceSizes::new(vec![5.0, 10.0]);
        sizes.record(group.members[0], 0);
        sizes.record(group.members[1], 1);
        Fixture {
            model,
            group,
            sizes,
        }
    }

    mod amounts {
        use super::*;

        #[test]
        fn volume_policy_weights_by_source_size() {
            let f = fixture();
            let amount =
                reconciled_amount(&f.model, &f.group, CompositionPolicy::Volume, 15.0, &f.sizes)
                    .unwrap();
            assert!((amount - 60.0).abs() < 1e-12);
        }

        #[test]
        fn virtual_policy_keeps_first_member() {
            let f = fixture();
            let amount =
                reconciled_amount(&f.model, &f.group, CompositionPolicy::Virtual, 15.0, &f.sizes)
                    .unwrap();
            assert_eq!(amount, 100.0);
        }

        #[test]
        fn unrecorded_species_weigh_as_size_one() {
            let f = fixture();
            let sizes = SourceSizes::new(vec![5.0, 10.0]);
            let amount =
                reconciled_amount(&f.model, &f.group, CompositionPolicy::Volume, 1.0, &sizes)
                    .unwrap();
            assert_eq!(amount, 140.0);
            assert_eq!(sizes.total(), 15.0);
        }

        #[test]
        fn rebased_species_weigh_by_their_new_size() {
            let mut f = fixture();
            f.sizes.rebase(f.group.members[0], 15.0);
            let amount =
                reconciled_amount(&f.model, &f.group, CompositionPolicy::Volume, 15.0, &f.sizes)
                    .unwrap();
            assert!((amount - (100.0 * 15.0 + 40.0 * 10.0) / 15.0).abs() < 1e-9);
        }

        #[test]
        fn vanished_member_is_fatal() {
            let mut f = fixture();
            let ghost = SpeciesGroup {
                name: "ghost".into(),
                members: vec![f.group.members[0]],
            };
            f.model.remove_reaction(f.model.find_reaction("tx1").unwrap()).unwrap();
            f.model.remove_species(f.group.members[0]).unwrap();
            assert!(matches!(
                reconciled_amount(&f.model, &ghost, CompositionPolicy::Virtual, 1.0, &f.sizes),
                Err(EngineError::SpeciesNotFound { .. })
            ));
        }
    }

    mod collapsing {
        use super::*;

        #[test]
        fn survivor_takes_new_id_amount_and_all_references() {
            let mut f = fixture();
            let survivor = collapse(&mut f.model, &f.group, "_shared", 60.0).unwrap();

            let species = f.model.species(survivor).unwrap();
            assert_eq!(species.id, "RNAP_shared");
            assert_eq!(species.initial_amount, 60.0);
            assert_eq!(f.model.species_named("RNAP").len(), 1);
            assert_eq!(f.model.species_count(), 2);

            let tx2 = f.model.reaction(f.model.find_reaction("tx2").unwrap()).unwrap();
            assert_eq!(tx2.reactants[0].species, "RNAP_shared");
            assert!(f.model.dangling_references().is_empty());
        }

        #[test]
        fn survivor_id_avoids_unrelated_identifiers() {
            let mut f = fixture();
            f.model
                .add_species(Species::new("RNAP_shared", "cell", 0.0).with_name("other"))
                .unwrap();
            let survivor = collapse(&mut f.model, &f.group, "_shared", 1.0).unwrap();
            assert_eq!(f.model.species(survivor).unwrap().id, "RNAP_shared_1");
        }

        #[test]
        fn survivor_keeps_id_when_already_in_target_form() {
            let mut model = ModelBuilder::new("m")
                .compartment(Compartment::new("c"))
                .species(Species::new("A_combined", "c", 3.0).with_name("A"))
                .species(Species::new("A", "c", 4.0).with_name("A"))
                .build()
                .unwrap();
            let group = group_species_by_name(&model, |_| true).remove(0);
            let survivor = collapse(&mut model, &group, "_combined", 3.0).unwrap();
            assert_eq!(model.species(survivor).unwrap().id, "A_combined");
            assert_eq!(model.species_count(), 1);
        }
    }
}
