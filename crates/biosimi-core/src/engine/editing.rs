use super::diagnostics::{Diagnostics, StructuralWarning};
use super::error::EngineError;
use super::renamer;
use crate::core::models::document::{ConversionOutcome, SchemaVersion};
use crate::core::models::ids::ReactionKey;
use crate::core::models::math::MathExpr;
use crate::core::models::model::ElementKind;
use crate::core::models::reaction::{KineticLaw, Reaction};
use crate::core::models::subsystem::Subsystem;
use tracing::{debug, info};

fn check_amount(amount: f64) -> Result<(), EngineError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(EngineError::InvalidArgument(format!(
            "species amount must be a non-negative finite number (got {})",
            amount
        )));
    }
    Ok(())
}

fn parse_formula(formula: &str) -> Result<MathExpr, EngineError> {
    formula.parse().map_err(|e| {
        EngineError::InvalidArgument(format!("invalid rate formula '{}': {}", formula, e))
    })
}

/// Edits that apply to one subsystem handle. Composition never calls these on
/// its inputs.
impl Subsystem {
    /// See [`renamer::rename_sid`].
    pub fn rename_sid(&mut self, old_id: &str, new_id: &str) -> Result<usize, EngineError> {
        renamer::rename_sid(self.model_mut(), old_id, new_id)
    }

    /// Declared identifiers in declaration order, without event identifiers.
    pub fn all_identifiers(&self) -> Vec<String> {
        self.model()
            .declared_identifiers()
            .into_iter()
            .filter(|(kind, _)| *kind != ElementKind::Event)
            .map(|(_, id)| id)
            .collect()
    }

    pub fn suffix_all_element_ids(&mut self, suffix: &str) -> Result<usize, EngineError> {
        renamer::suffix_all(self.model_mut(), suffix)
    }

    /// Renames the compartments, in order, to `new_ids`. Named compartments
    /// take the new identifier as their name too. A count mismatch is
    /// reported and only the overlapping prefix is renamed.
    pub fn set_compartments<I, S>(
        &mut self,
        new_ids: I,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), EngineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let new_ids: Vec<String> = new_ids.into_iter().map(Into::into).collect();
        let current: Vec<String> = self
            .model()
            .compartments()
            .map(|(_, c)| c.id.clone())
            .collect();
        if current.len() != new_ids.len() {
            diagnostics.push(StructuralWarning::CompartmentCountMismatch {
                model: self.id().to_string(),
                found: current.len(),
                given: new_ids.len(),
            });
        }
        for (old_id, new_id) in current.iter().zip(&new_ids) {
            match self.rename_sid(old_id, new_id) {
                Ok(_) => {}
                Err(e) if e.is_benign() => {}
                Err(e) => return Err(e),
            }
            let model = self.model_mut();
            if let Some(compartment) = model
                .find_compartment(new_id)
                .and_then(|key| model.compartment_mut(key))
            {
                if compartment.name.is_some() {
                    compartment.name = Some(new_id.clone());
                }
            }
        }
        Ok(())
    }

    /// Gives every species displayed as one of `old_names` the display name
    /// `new_name`. Identifiers are unchanged. Returns the number of species
    /// renamed.
    pub fn rename_species<I, S>(&mut self, old_names: I, new_name: &str) -> Result<usize, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if new_name.trim().is_empty() {
            return Err(EngineError::InvalidArgument(
                "new species name must not be empty".into(),
            ));
        }
        let mut targets = Vec::new();
        for old_name in old_names {
            let old_name = old_name.as_ref();
            let keys = self.model().species_named(old_name);
            if keys.is_empty() {
                return Err(EngineError::NotFound {
                    id: old_name.to_string(),
                    model: self.id().to_string(),
                });
            }
            if keys.len() > 1 {
                debug!(
                    "{} species named '{}' in '{}'; renaming all",
                    keys.len(),
                    old_name,
                    self.id()
                );
            }
            targets.extend(keys);
        }
        let model = self.model_mut();
        let mut renamed = 0;
        for key in targets {
            if let Some(species) = model.species_mut(key) {
                species.name = Some(new_name.to_string());
                renamed += 1;
            }
        }
        Ok(renamed)
    }

    /// Sets the initial amount of every species displayed as one of `names`.
    pub fn set_species_amount<I, S>(&mut self, names: I, amount: f64) -> Result<usize, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        check_amount(amount)?;
        let mut targets = Vec::new();
        for name in names {
            let name = name.as_ref();
            let keys = self.model().species_named(name);
            if keys.is_empty() {
                return Err(EngineError::NotFound {
                    id: name.to_string(),
                    model: self.id().to_string(),
                });
            }
            targets.extend(keys);
        }
        let model = self.model_mut();
        for &key in &targets {
            if let Some(species) = model.species_mut(key) {
                species.initial_amount = amount;
            }
        }
        Ok(targets.len())
    }

    pub fn fast_reactions(&self) -> Vec<&Reaction> {
        self.model()
            .reactions()
            .filter(|(_, r)| r.fast)
            .map(|(_, r)| r)
            .collect()
    }

    pub fn reversible_reactions(&self) -> Vec<&Reaction> {
        self.model()
            .reactions()
            .filter(|(_, r)| r.reversible)
            .map(|(_, r)| r)
            .collect()
    }

    fn reaction_keys_at(&self, indexes: &[usize]) -> Result<Vec<ReactionKey>, EngineError> {
        let keys = self.model().reaction_keys();
        indexes
            .iter()
            .map(|&i| {
                keys.get(i).copied().ok_or_else(|| {
                    EngineError::InvalidArgument(format!(
                        "reaction index {} out of range for '{}' ({} reactions)",
                        i,
                        self.id(),
                        keys.len()
                    ))
                })
            })
            .collect()
    }

    /// Marks the reactions at the given 0-based positions as fast.
    pub fn set_fast_reactions(&mut self, indexes: &[usize]) -> Result<(), EngineError> {
        let keys = self.reaction_keys_at(indexes)?;
        let model = self.model_mut();
        for key in keys {
            if let Some(reaction) = model.reaction_mut(key) {
                reaction.fast = true;
            }
        }
        Ok(())
    }

    fn with_reversibility(
        &self,
        indexes: &[usize],
        formulas: Option<&[&str]>,
        reversible: bool,
    ) -> Result<Subsystem, EngineError> {
        let keys = self.reaction_keys_at(indexes)?;
        let laws = match formulas {
            Some(formulas) if formulas.len() != indexes.len() => {
                return Err(EngineError::InvalidArgument(format!(
                    "{} rate formulas given for {} reactions",
                    formulas.len(),
                    indexes.len()
                )));
            }
            Some(formulas) => Some(
                formulas
                    .iter()
                    .map(|f| parse_formula(f))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };

        let mut edited = self.clone();
        let model = edited.model_mut();
        for (i, key) in keys.into_iter().enumerate() {
            if let Some(reaction) = model.reaction_mut(key) {
                reaction.reversible = reversible;
                if let Some(math) = laws.as_ref().and_then(|l| l.get(i)) {
                    reaction.kinetic_law = Some(KineticLaw::new(math.clone()));
                }
            }
        }
        Ok(edited)
    }

    /// Returns a copy with the reactions at `indexes` made reversible,
    /// optionally replacing their rate laws with `formulas` (one per index).
    pub fn set_reversible_reactions(
        &self,
        indexes: &[usize],
        formulas: Option<&[&str]>,
    ) -> Result<Subsystem, EngineError> {
        self.with_reversibility(indexes, formulas, true)
    }

    /// Returns a copy with the reactions at `indexes` made irreversible.
    pub fn unset_reversible_reactions(
        &self,
        indexes: &[usize],
        formulas: Option<&[&str]>,
    ) -> Result<Subsystem, EngineError> {
        self.with_reversibility(indexes, formulas, false)
    }

    /// Re-targets the document at another schema. Converting to the current
    /// schema is reported and leaves the document alone.
    pub fn convert_schema(
        &mut self,
        level: u32,
        version: u32,
        diagnostics: &mut Diagnostics,
    ) -> Result<ConversionOutcome, EngineError> {
        let target = SchemaVersion::new(level, version);
        let outcome = self.document_mut().convert(target)?;
        match outcome {
            ConversionOutcome::Unchanged => diagnostics.push(StructuralWarning::SchemaUnchanged {
                model: self.id().to_string(),
                schema: target.to_string(),
            }),
            ConversionOutcome::Converted { from } => {
                info!("Converted '{}' from {} to {}", self.id(), from, target)
            }
        }
        Ok(outcome)
    }
}
