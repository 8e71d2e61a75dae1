use super::Composition;
use super::assembly::{Assembly, assemble, deduplicate_reactions, resolve_groups};
use crate::engine::config::CompositionRequest;
use crate::engine::error::EngineError;
use crate::engine::matcher::group_species_by_name;
use crate::engine::progress::ProgressReporter;
use tracing::{info, instrument};

const SHELL_PREFIX: &str = "combined_subsystems";

/// Shares, removes duplicate reactions and, with `combine_by_name`, collapses
/// the remaining species by name. The target size is always the sum of the
/// source sizes.
pub(crate) fn combine_into(
    request: &CompositionRequest,
    prefix: &str,
    reporter: &ProgressReporter,
) -> Result<Assembly, EngineError> {
    let mut assembly = assemble(request, prefix, None, reporter)?;

    reporter.phase("Sharing", || {
        let groups = group_species_by_name(assembly.model(), |s| {
            request.is_shared(s.display_name())
        });
        resolve_groups(&mut assembly, &groups, request.policy, "_shared", reporter)
    })?;

    let removed = reporter.phase("Deduplicating reactions", || {
        deduplicate_reactions(assembly.document.model_mut(), &mut assembly.diagnostics)
    })?;
    info!("Removed {} duplicate reaction(s)", removed);

    if request.combine_by_name {
        let collapsed = reporter.phase("Combining", || {
            let groups = group_species_by_name(assembly.model(), |s| {
                !request.is_shared(s.display_name())
            });
            resolve_groups(&mut assembly, &groups, request.policy, "_combined", reporter)
        })?;
        info!("Combined {} species group(s) by name", collapsed);
    }
    Ok(assembly)
}

/// Merges the request's subsystems and removes what they duplicate.
///
/// Shared resources are collapsed as by [`share::run`](super::share::run);
/// reactions with the same signature are kept once; with `combine_by_name`
/// every other species is collapsed by name as well.
#[instrument(skip_all, name = "combine_workflow")]
pub fn run(
    request: &CompositionRequest,
    reporter: &ProgressReporter,
) -> Result<Composition, EngineError> {
    let assembly = combine_into(request, SHELL_PREFIX, reporter)?;
    Ok(Composition {
        document: assembly.document,
        warnings: assembly.diagnostics.into_warnings(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::builder::ModelBuilder;
    use crate::core::models::compartment::Compartment;
    use crate::core::models::definitions::Rule;
    use crate::core::models::reaction::Reaction;
    use crate::core::models::species::Species;
    use crate::core::models::subsystem::Subsystem;
    use crate::engine::config::{CompositionPolicy, CompositionRequestBuilder};
    use crate::engine::diagnostics::StructuralWarning;
    use crate::workflows::fixtures::{binding, subsystem};

    fn combine(request: &CompositionRequest) -> Composition {
        run(request, &ProgressReporter::new()).unwrap()
    }

    fn request(combine_by_name: bool, policy: CompositionPolicy) -> CompositionRequest {
        CompositionRequestBuilder::new()
            .subsystem(binding("left", 5.0, 100.0))
            .subsystem(binding("right", 10.0, 40.0))
            .policy(policy)
            .combine_by_name(combine_by_name)
            .build()
            .unwrap()
    }

    #[test]
    fn duplicate_reactions_are_kept_once() {
        let composition = combine(&request(false, CompositionPolicy::Virtual));
        let model = composition.document.model();
        assert!(model.id.starts_with("combined_subsystems_"));
        assert_eq!(model.reaction_count(), 1);
        let (_, kept) = model.reactions().next().unwrap();
        assert_eq!(kept.id, "r1");
        assert_eq!(model.species_count(), 6);
    }

    #[test]
    fn combine_by_name_collapses_every_species() {
        let composition = combine(&request(true, CompositionPolicy::Volume));
        let model = composition.document.model();

        assert_eq!(model.species_count(), 3);
        let a = model.species(model.species_named("A")[0]).unwrap();
        assert_eq!(a.id, "A_combined");
        assert!((a.initial_amount - 60.0).abs() < 1e-9);
        let (_, cell) = model.compartments().next().unwrap();
        assert_eq!(cell.size, Some(15.0));
        assert!(model.dangling_references().is_empty());
    }

    #[test]
    fn target_size_of_request_is_ignored() {
        let request = CompositionRequestBuilder::new()
            .subsystem(binding("left", 5.0, 100.0))
            .subsystem(binding("right", 10.0, 40.0))
            .shared_resources(["A"])
            .target_size(1.0)
            .policy(CompositionPolicy::Volume)
            .build()
            .unwrap();
        let composition = combine(&request);
        let model = composition.document.model();
        let a = model.species(model.species_named("A")[0]).unwrap();
        assert_eq!(a.id, "A_shared");
        assert!((a.initial_amount - 60.0).abs() < 1e-9);
    }

    #[test]
    fn reversible_and_irreversible_reactions_differ() {
        let mut forward = subsystem("f", "cell", 1.0, &[("X", "X", 1.0), ("Y", "Y", 0.0)]);
        let mut reversible = forward.clone();
        reversible.model_mut().id = "r".into();
        forward_reaction(&mut forward, false);
        forward_reaction(&mut reversible, true);

        let request = CompositionRequestBuilder::new()
            .subsystem(forward)
            .subsystem(reversible)
            .policy(CompositionPolicy::Virtual)
            .build()
            .unwrap();
        assert_eq!(combine(&request).document.model().reaction_count(), 2);
    }

    fn forward_reaction(subsystem: &mut Subsystem, reversible: bool) {
        subsystem
            .model_mut()
            .add_reaction(
                Reaction::new("conv")
                    .reactant("X")
                    .product("Y")
                    .reversible(reversible),
            )
            .unwrap();
    }

    #[test]
    fn referenced_duplicate_is_kept_with_a_warning() {
        let watched = Subsystem::from_model(
            ModelBuilder::new("watched")
                .compartment(Compartment::new("cell").with_size(1.0))
                .species(Species::new("A", "cell", 1.0).with_name("A"))
                .species(Species::new("C", "cell", 0.0).with_name("C"))
                .reaction(Reaction::new("r1").reactant("A").product("C"))
                .reaction(Reaction::new("r2").reactant("A").product("C"))
                .rule(Rule::Assignment {
                    variable: "C".into(),
                    math: "r2 * 2".parse().unwrap(),
                })
                .build()
                .unwrap(),
        );
        let request = CompositionRequestBuilder::new()
            .subsystem(watched)
            .policy(CompositionPolicy::Virtual)
            .build()
            .unwrap();
        let composition = combine(&request);
        assert_eq!(composition.document.model().reaction_count(), 2);
        assert!(
            composition
                .warnings
                .iter()
                .any(|w| matches!(w, StructuralWarning::ReactionRemovalRefused { .. }))
        );
    }
}
