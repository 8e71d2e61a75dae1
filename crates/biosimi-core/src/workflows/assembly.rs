use crate::core::models::document::Document;
use crate::core::models::model::{Model, ModelError};
use crate::engine::config::{CompositionPolicy, CompositionRequest};
use crate::engine::diagnostics::{Diagnostics, StructuralWarning};
use crate::engine::error::EngineError;
use crate::engine::matcher::{SpeciesGroup, duplicate_reactions};
use crate::engine::merger::{infer_compartment_size, isolate_sources, merge_global_sections};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::reconciler::{SourceSizes, collapse, reconciled_amount};
use crate::engine::renamer::rename_to_unique;
use crate::engine::shell::{new_shell, resize_first_compartment};
use tracing::{debug, info};

/// A shell in the middle of being composed, with the bookkeeping the
/// collapse steps need.
pub(crate) struct Assembly {
    pub document: Document,
    pub sizes: SourceSizes,
    pub target_size: f64,
    pub diagnostics: Diagnostics,
}

impl Assembly {
    pub fn model(&self) -> &Model {
        self.document.model()
    }
}

/// Builds the shell for `request`: global sections merged from isolated
/// working copies, every species copied unchanged, and the first compartment
/// sized to `target_size` (the sum of source sizes when absent).
pub(crate) fn assemble(
    request: &CompositionRequest,
    prefix: &str,
    target_size: Option<f64>,
    reporter: &ProgressReporter,
) -> Result<Assembly, EngineError> {
    request.validate()?;
    let mut diagnostics = Diagnostics::new();

    let mut sizes = SourceSizes::new(
        request
            .subsystems
            .iter()
            .map(|s| infer_compartment_size(s.model(), &mut diagnostics))
            .collect(),
    );
    let target_size = target_size.unwrap_or_else(|| sizes.total());
    if !target_size.is_finite() || target_size <= 0.0 {
        return Err(EngineError::InvalidArgument(format!(
            "target size must be positive and finite (got {})",
            target_size
        )));
    }

    let mut document = new_shell(prefix, &request.source_ids());
    reporter.phase("Merging", || -> Result<(), EngineError> {
        let reserved = document.model().all_identifiers();
        let copies = isolate_sources(&request.subsystems, &reserved, &mut diagnostics)?;
        let shell = document.model_mut();
        merge_global_sections(shell, &copies)?;
        resize_first_compartment(shell, target_size);
        for (index, copy) in copies.iter().enumerate() {
            for (_, species) in copy.species_iter() {
                let key = shell.add_species(species.clone())?;
                sizes.record(key, index);
            }
        }
        info!(
            "Merged {} subsystems into '{}' ({} species, {} reactions, size {})",
            copies.len(),
            shell.id,
            shell.species_count(),
            shell.reaction_count(),
            target_size
        );
        Ok(())
    })?;

    Ok(Assembly {
        document,
        sizes,
        target_size,
        diagnostics,
    })
}

/// Renames each member of a group that spans compartments to
/// `<id>_<compartment>`, leaving members already in that form alone.
///
/// Returns whether any member was renamed; the collision is only reported
/// then, so a group qualified by an earlier pass stays quiet.
pub(crate) fn qualify_by_compartment(
    model: &mut Model,
    group: &SpeciesGroup,
    diagnostics: &mut Diagnostics,
) -> Result<bool, EngineError> {
    let compartments = group.compartments(model);
    let mut renamed = false;
    for &key in &group.members {
        let Some(species) = model.species(key) else {
            return Err(EngineError::SpeciesNotFound {
                name: group.name.clone(),
                model: model.id.clone(),
            });
        };
        let suffix = format!("_{}", species.compartment);
        if species.id.ends_with(&suffix) {
            continue;
        }
        let old_id = species.id.clone();
        let new_id = rename_to_unique(model, &old_id, &format!("{}{}", old_id, suffix))?;
        debug!("Qualified '{}' as '{}'", old_id, new_id);
        renamed = true;
    }
    if renamed {
        diagnostics.push(StructuralWarning::CrossCompartmentCollision {
            name: group.name.clone(),
            compartments,
        });
    }
    Ok(renamed)
}

/// Collapses every collision group in `groups` with `suffix`, or qualifies
/// it when it spans compartments. Returns the number of groups changed.
pub(crate) fn resolve_groups(
    assembly: &mut Assembly,
    groups: &[SpeciesGroup],
    policy: CompositionPolicy,
    suffix: &str,
    reporter: &ProgressReporter,
) -> Result<usize, EngineError> {
    let collisions: Vec<&SpeciesGroup> = groups.iter().filter(|g| g.is_collision()).collect();
    reporter.report(Progress::TaskStart {
        total_steps: collisions.len() as u64,
    });
    let mut changed = 0;
    for group in collisions {
        let model = assembly.document.model_mut();
        if group.spans_compartments(model) {
            if qualify_by_compartment(model, group, &mut assembly.diagnostics)? {
                reporter.report(Progress::Warning(format!(
                    "species '{}' spans several compartments",
                    group.name
                )));
                changed += 1;
            }
        } else {
            let amount =
                reconciled_amount(model, group, policy, assembly.target_size, &assembly.sizes)?;
            let survivor = collapse(model, group, suffix, amount)?;
            if policy == CompositionPolicy::Volume {
                assembly.sizes.rebase(survivor, assembly.target_size);
            }
            changed += 1;
        }
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    Ok(changed)
}

/// Removes all but the first reaction of every signature group. A removal
/// refused because the reaction is still referenced is reported and the
/// duplicate kept. Returns the number of reactions removed.
pub(crate) fn deduplicate_reactions(
    model: &mut Model,
    diagnostics: &mut Diagnostics,
) -> Result<usize, EngineError> {
    let mut removed = 0;
    for (signature, keys) in duplicate_reactions(model) {
        for &key in keys.iter().skip(1) {
            let id = model
                .reaction(key)
                .map(|r| r.id.clone())
                .unwrap_or_default();
            match model.remove_reaction(key) {
                Ok(_) => {
                    info!(
                        "Removed duplicate reaction '{}' ({}); check reaction rates for consistency",
                        id, signature
                    );
                    removed += 1;
                }
                Err(e @ ModelError::StillReferenced { .. }) => {
                    diagnostics.push(StructuralWarning::ReactionRemovalRefused {
                        reaction: id,
                        signature: signature.clone(),
                        reason: e.to_string(),
                    })
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(removed)
}
