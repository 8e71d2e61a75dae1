use super::error::EngineError;
use super::registry::IdentifierRegistry;
use crate::core::models::model::Model;
use crate::core::utils::identifiers::is_valid_sid;
use tracing::{debug, trace};

/// Renames the element declared as `old_id` to `new_id` and rewrites every
/// reference to it, returning the number of references changed.
///
/// All checks happen before the model is touched. The reference rewrite and
/// the declaration change cannot fail, so a rename is either complete or not
/// applied at all.
///
/// # Errors
///
/// - [`EngineError::IdenticalIds`] if both identifiers are equal (benign).
/// - [`EngineError::InvalidIdentifier`] if `new_id` is not a legal identifier.
/// - [`EngineError::NotFound`] if nothing declares `old_id`.
/// - [`EngineError::IdentifierInUse`] if `new_id` is already declared.
pub fn rename_sid(model: &mut Model, old_id: &str, new_id: &str) -> Result<usize, EngineError> {
    if old_id == new_id {
        return Err(EngineError::IdenticalIds(old_id.to_string()));
    }
    if !is_valid_sid(new_id) {
        return Err(EngineError::InvalidIdentifier(new_id.to_string()));
    }
    let location = model.locate(old_id).ok_or_else(|| EngineError::NotFound {
        id: old_id.to_string(),
        model: model.id.clone(),
    })?;
    if model.locate(new_id).is_some() {
        return Err(EngineError::IdentifierInUse(new_id.to_string()));
    }

    let rewritten = model.rename_sid_refs(old_id, new_id);
    model.set_declared_id(location, new_id);
    trace!(
        "Renamed {} '{}' to '{}' ({} references)",
        location.kind(),
        old_id,
        new_id,
        rewritten
    );
    Ok(rewritten)
}

/// Renames `old_id` to `candidate`, or to the first free variant of it when
/// `candidate` is taken. Returns the identifier actually used.
pub fn rename_to_unique(
    model: &mut Model,
    old_id: &str,
    candidate: &str,
) -> Result<String, EngineError> {
    if old_id == candidate {
        return Ok(old_id.to_string());
    }
    let new_id = IdentifierRegistry::scan(model).unique_identifier(candidate);
    rename_sid(model, old_id, &new_id)?;
    Ok(new_id)
}

/// Appends `_<suffix>` to every declared identifier, event identifiers
/// included. Returns the number of elements renamed.
pub fn suffix_all(model: &mut Model, suffix: &str) -> Result<usize, EngineError> {
    if suffix.is_empty() {
        return Err(EngineError::InvalidArgument(
            "identifier suffix must not be empty".into(),
        ));
    }
    let declared = model.declared_identifiers();
    let mut renamed = 0;
    for (kind, old_id) in declared {
        if model.locate(&old_id).is_none() {
            continue;
        }
        let new_id = rename_to_unique(model, &old_id, &format!("{}_{}", old_id, suffix))?;
        debug!("Suffixed {} '{}' as '{}'", kind, old_id, new_id);
        renamed += 1;
    }
    Ok(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::builder::ModelBuilder;
    use crate::core::models::compartment::Compartment;
    use crate::core::models::definitions::{Event, Parameter, Rule};
    use crate::core::models::reaction::Reaction;
    use crate::core::models::species::Species;

    fn binding_model() -> Model {
        ModelBuilder::new("binding")
            .compartment(Compartment::new("cell").with_size(1.0))
            .species(Species::new("A", "cell", 10.0).with_name("A"))
            .species(Species::new("B", "cell", 10.0).with_name("B"))
            .species(Species::new("C", "cell", 0.0).with_name("C"))
            .parameter(Parameter::new("k1", 0.1))
            .reaction(
                Reaction::new("r1")
                    .reactant("A")
                    .reactant("B")
                    .product("C")
                    .with_kinetic_law("k1 * A * B".parse().unwrap()),
            )
            .rule(Rule::Assignment {
                variable: "C".into(),
                math: "A + B".parse().unwrap(),
            })
            .build()
            .unwrap()
    }

    mod rename {
        use super::*;

        #[test]
        fn rewrites_declaration_and_every_reference() {
            let mut model = binding_model();
            let count = rename_sid(&mut model, "A", "A_new").unwrap();

            assert_eq!(count, 3);
            assert!(model.find_species("A").is_none());
            assert!(model.find_species("A_new").is_some());
            assert_eq!(model.reference_count("A", None), 0);
            assert!(model.dangling_references().is_empty());
        }

        #[test]
        fn renaming_a_compartment_moves_its_species() {
            let mut model = binding_model();
            rename_sid(&mut model, "cell", "cell_internal").unwrap();
            assert!(
                model
                    .species_iter()
                    .all(|(_, s)| s.compartment == "cell_internal")
            );
        }

        #[test]
        fn identical_ids_are_a_benign_no_op() {
            let mut model = binding_model();
            let err = rename_sid(&mut model, "A", "A").unwrap_err();
            assert!(err.is_benign());
        }

        #[test]
        fn rejects_invalid_missing_and_taken_identifiers() {
            let mut model = binding_model();
            assert!(matches!(
                rename_sid(&mut model, "A", "1A"),
                Err(EngineError::InvalidIdentifier(_))
            ));
            assert!(matches!(
                rename_sid(&mut model, "Z", "Z2"),
                Err(EngineError::NotFound { .. })
            ));
            assert!(matches!(
                rename_sid(&mut model, "A", "B"),
                Err(EngineError::IdentifierInUse(_))
            ));
            assert!(model.find_species("A").is_some());
            assert!(model.find_species("B").is_some());
        }

        #[test]
        fn rename_to_unique_falls_back_to_numbered_variant() {
            let mut model = binding_model();
            let used = rename_to_unique(&mut model, "A", "B").unwrap();
            assert_eq!(used, "B_1");
            assert!(model.find_species("B_1").is_some());
        }
    }

    mod suffix {
        use super::*;

        #[test]
        fn suffixes_every_declared_identifier() {
            let mut model = binding_model();
            let renamed = suffix_all(&mut model, "gen1").unwrap();

            assert_eq!(renamed, 7);
            assert_eq!(model.id, "binding_gen1");
            for id in ["cell_gen1", "A_gen1", "B_gen1", "C_gen1", "k1_gen1", "r1_gen1"] {
                assert!(model.locate(id).is_some(), "{id} missing");
            }
            assert!(model.dangling_references().is_empty());
        }

        #[test]
        fn suffix_collisions_get_unique_identifiers() {
            let mut model = ModelBuilder::new("m")
                .compartment(Compartment::new("c"))
                .species(Species::new("A", "c", 0.0))
                .species(Species::new("A_x", "c", 0.0))
                .build()
                .unwrap();
            suffix_all(&mut model, "x").unwrap();
            let mut ids: Vec<_> = model.species_iter().map(|(_, s)| s.id.clone()).collect();
            ids.sort();
            assert_eq!(ids.len(), 2);
            assert_ne!(ids[0], ids[1]);
            assert!(ids.contains(&"A_x_x".to_string()));
        }

        #[test]
        fn suffixed_ids_avoid_event_identifiers() {
            let mut model = ModelBuilder::new("m")
                .compartment(Compartment::new("c"))
                .species(Species::new("A", "c", 0.0))
                .event(Event {
                    id: Some("A_x".into()),
                    name: None,
                    trigger: "time > 1".parse().unwrap(),
                    delay: None,
                    assignments: Vec::new(),
                })
                .build()
                .unwrap();

            assert_eq!(suffix_all(&mut model, "x").unwrap(), 4);
            let (_, species) = model.species_iter().next().unwrap();
            assert_eq!(species.id, "A_x_1");
            assert_eq!(model.events()[0].id.as_deref(), Some("A_x_x"));
        }

        #[test]
        fn empty_suffix_is_rejected() {
            let mut model = binding_model();
            assert!(matches!(
                suffix_all(&mut model, ""),
                Err(EngineError::InvalidArgument(_))
            ));
        }
    }
}
