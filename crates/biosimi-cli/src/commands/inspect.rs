use super::load_subsystem;
use crate::cli::InspectArgs;
use crate::error::Result;
use biosimi::core::models::reaction::SpeciesReference;
use biosimi::core::models::subsystem::Subsystem;
use std::fmt::Write;

/// A plain-text summary of a model: compartments, species and reactions with
/// their 0-based positions (the positions `edit` takes).
pub fn summarize(subsystem: &Subsystem, identifiers: bool) -> String {
    let document = subsystem.document();
    let model = document.model();
    let mut out = String::new();

    let _ = writeln!(out, "Model '{}' ({})", model.id, document.schema());
    if let Some(name) = &model.name {
        let _ = writeln!(out, "  name: {}", name);
    }

    let _ = writeln!(out, "Compartments ({}):", model.compartment_count());
    for (_, compartment) in model.compartments() {
        let size = compartment
            .size
            .map_or_else(|| "unset".to_string(), |s| s.to_string());
        let _ = writeln!(out, "  {:<24} size {}", compartment.id, size);
    }

    let _ = writeln!(out, "Species ({}):", model.species_count());
    for (_, species) in model.species_iter() {
        let _ = writeln!(
            out,
            "  {:<24} {:<20} {:>12} in {}",
            species.id,
            species.display_name(),
            species.initial_amount,
            species.compartment
        );
    }

    let _ = writeln!(out, "Reactions ({}):", model.reaction_count());
    for (index, (_, reaction)) in model.reactions().enumerate() {
        let side = |refs: &[SpeciesReference]| {
            refs.iter()
                .map(|r| r.species.as_str())
                .collect::<Vec<_>>()
                .join(" + ")
        };
        let arrow = if reaction.reversible { "<->" } else { "-->" };
        let mut flags = Vec::new();
        if reaction.fast {
            flags.push("fast");
        }
        if reaction.kinetic_law.is_none() {
            flags.push("no rate law");
        }
        let _ = write!(
            out,
            "  [{}] {:<20} {} {} {}",
            index,
            reaction.id,
            side(&reaction.reactants),
            arrow,
            side(&reaction.products)
        );
        if !flags.is_empty() {
            let _ = write!(out, " ({})", flags.join(", "));
        }
        out.push('\n');
    }

    if identifiers {
        let ids = subsystem.all_identifiers();
        let _ = writeln!(out, "Identifiers ({}):", ids.len());
        for id in ids {
            let _ = writeln!(out, "  {}", id);
        }
    }
    out
}

pub fn run(args: InspectArgs) -> Result<()> {
    let subsystem = load_subsystem(&args.input)?;
    print!("{}", summarize(&subsystem, args.identifiers));
    Ok(())
}
