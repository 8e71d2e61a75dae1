use super::diagnostics::{Diagnostics, StructuralWarning};
use super::error::EngineError;
use super::registry::IdentifierRegistry;
use super::renamer::rename_sid;
use crate::core::models::model::{ElementKind, Model};
use crate::core::models::subsystem::Subsystem;
use std::collections::HashSet;
use tracing::{debug, trace};

const DEFAULT_COMPARTMENT_SIZE: f64 = 1.0;

/// The size of the reaction volume a subsystem stands for.
///
/// Subsystems are expected to declare exactly one sized compartment. Anything
/// else is reported and resolved to the first compartment's size, or 1.
pub fn infer_compartment_size(model: &Model, diagnostics: &mut Diagnostics) -> f64 {
    let mut compartments = model.compartments();
    let Some((_, first)) = compartments.next() else {
        diagnostics.push(StructuralWarning::NoCompartment {
            model: model.id.clone(),
            assumed: DEFAULT_COMPARTMENT_SIZE,
        });
        return DEFAULT_COMPARTMENT_SIZE;
    };
    let count = model.compartment_count();
    if count > 1 {
        diagnostics.push(StructuralWarning::MultipleCompartments {
            model: model.id.clone(),
            count,
            used: first.id.clone(),
        });
    }
    match first.size {
        Some(size) => size,
        None => {
            diagnostics.push(StructuralWarning::MissingCompartmentSize {
                model: model.id.clone(),
                compartment: first.id.clone(),
                assumed: DEFAULT_COMPARTMENT_SIZE,
            });
            DEFAULT_COMPARTMENT_SIZE
        }
    }
}

/// Whether `id` in `copy` denotes the same container, unit or function as a
/// declaration of the same kind in an earlier copy.
fn shares_declaration(kind: ElementKind, id: &str, copy: &Model, earlier: &[Model]) -> bool {
    match kind {
        ElementKind::Compartment => earlier.iter().any(|m| m.find_compartment(id).is_some()),
        ElementKind::UnitDefinition => earlier
            .iter()
            .any(|m| m.unit_definitions().iter().any(|u| u.id == id)),
        ElementKind::FunctionDefinition => {
            let mine = copy.function_definitions().iter().find(|f| f.id == id);
            earlier.iter().any(|m| {
                m.function_definitions()
                    .iter()
                    .any(|f| f.id == id && Some(f) == mine)
            })
        }
        _ => false,
    }
}

fn warn_on_conflicting_units(
    id: &str,
    copy: &Model,
    earlier: &[Model],
    diagnostics: &mut Diagnostics,
) {
    let mine = copy.unit_definitions().iter().find(|u| u.id == id);
    let first = earlier
        .iter()
        .find_map(|m| m.unit_definitions().iter().find(|u| u.id == id));
    if let (Some(mine), Some(first)) = (mine, first) {
        if mine.units != first.units {
            diagnostics.push(StructuralWarning::ConflictingUnitDefinition {
                id: id.to_string(),
                model: copy.id.clone(),
            });
        }
    }
}

/// Clones every source model into a working copy whose identifiers do not
/// collide with `reserved` or with any earlier copy.
///
/// Colliding identifiers are renamed inside the copy, so references there
/// follow. Compartments and unit definitions that reuse an earlier identifier
/// stand for the same container or unit and keep it; function definitions
/// keep it only when identical.
pub fn isolate_sources(
    sources: &[Subsystem],
    reserved: &HashSet<String>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Model>, EngineError> {
    let mut claimed: HashSet<String> = reserved.clone();
    let mut copies: Vec<Model> = Vec::with_capacity(sources.len());

    for source in sources {
        let mut copy = source.model().clone();
        for (kind, id) in copy.declared_identifiers() {
            if kind == ElementKind::Model || !claimed.contains(&id) {
                continue;
            }
            if shares_declaration(kind, &id, &copy, &copies) {
                if kind == ElementKind::UnitDefinition {
                    warn_on_conflicting_units(&id, &copy, &copies, diagnostics);
                }
                trace!("Sharing {} '{}' from '{}'", kind, id, copy.id);
                continue;
            }
            let mut registry = IdentifierRegistry::scan(&copy);
            for taken in &claimed {
                registry.reserve(taken.clone());
            }
            let new_id = registry.unique_identifier(&id);
            rename_sid(&mut copy, &id, &new_id)?;
            debug!(
                "Renamed {} '{}' to '{}' in working copy of '{}'",
                kind, id, new_id, copy.id
            );
        }
        claimed.extend(
            copy.declared_identifiers()
                .into_iter()
                .filter(|(kind, _)| *kind != ElementKind::Model)
                .map(|(_, id)| id),
        );
        copies.push(copy);
    }
    Ok(copies)
}

/// Copies unit and function definitions, compartments, parameters and the
/// model-level units from `source`. Declarations whose identifier is already
/// present in `target` are treated as shared and skipped.
pub fn copy_definitions(target: &mut Model, source: &Model) -> Result<(), EngineError> {
    for function in source.function_definitions() {
        if target.locate(&function.id).is_none() {
            target.add_function_definition(function.clone())?;
        }
    }
    for unit in source.unit_definitions() {
        if target.locate(&unit.id).is_none() {
            target.add_unit_definition(unit.clone())?;
        }
    }
    for (_, compartment) in source.compartments() {
        if target.find_compartment(&compartment.id).is_none() {
            target.add_compartment(compartment.clone())?;
        }
    }
    for (_, parameter) in source.parameters() {
        target.add_parameter(parameter.clone())?;
    }

    let units = &source.units;
    for (slot, value) in [
        (&mut target.units.area, &units.area),
        (&mut target.units.extent, &units.extent),
        (&mut target.units.length, &units.length),
        (&mut target.units.substance, &units.substance),
        (&mut target.units.time, &units.time),
        (&mut target.units.volume, &units.volume),
    ] {
        if value.is_some() {
            slot.clone_from(value);
        }
    }
    Ok(())
}

/// Copies initial assignments, rules, constraints and events from `source`.
pub fn copy_dynamics(target: &mut Model, source: &Model) -> Result<(), EngineError> {
    for assignment in source.initial_assignments() {
        target.add_initial_assignment(assignment.clone());
    }
    for rule in source.rules() {
        target.add_rule(rule.clone());
    }
    for constraint in source.constraints() {
        target.add_constraint(constraint.clone());
    }
    for event in source.events() {
        target.add_event(event.clone())?;
    }
    Ok(())
}

/// Concatenates the global sections and reactions of every working copy
/// into `shell`, in order. Species are left to the caller.
pub fn merge_global_sections(shell: &mut Model, copies: &[Model]) -> Result<(), EngineError> {
    for copy in copies {
        copy_definitions(shell, copy)?;
        copy_dynamics(shell, copy)?;
        for (_, reaction) in copy.reactions() {
            shell.add_reaction(reaction.clone())?;
        }
        debug!(
            "Merged global sections of '{}' ({} reactions)",
            copy.id,
            copy.reaction_count()
        );
    }
    Ok(())
}
