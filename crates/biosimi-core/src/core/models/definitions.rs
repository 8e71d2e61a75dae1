use super::math::MathExpr;
use super::references::{SidReferences, rename_optional, rename_required};

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub id: String,
    pub name: Option<String>,
    pub value: Option<f64>,
    pub units: Option<String>,
    pub constant: bool,
}

impl Parameter {
    pub fn new(id: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            value: Some(value),
            units: None,
            constant: true,
        }
    }
}

impl SidReferences for Parameter {
    fn rename_sid_refs(&mut self, old_id: &str, new_id: &str) -> usize {
        rename_optional(&mut self.units, old_id, new_id)
    }

    fn references_sid(&self, id: &str) -> bool {
        self.units.as_deref() == Some(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub kind: String,
    pub exponent: f64,
    pub scale: i32,
    pub multiplier: f64,
}

impl Unit {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            exponent: 1.0,
            scale: 0,
            multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitDefinition {
    pub id: String,
    pub name: Option<String>,
    pub units: Vec<Unit>,
}

/// A named lambda. Argument names are bound inside the body and shadow
/// model-level identifiers there.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub id: String,
    pub name: Option<String>,
    pub arguments: Vec<String>,
    pub body: MathExpr,
}

impl SidReferences for FunctionDefinition {
    fn rename_sid_refs(&mut self, old_id: &str, new_id: &str) -> usize {
        if self.arguments.iter().any(|a| a == old_id) {
            return 0;
        }
        self.body.rename_symbol(old_id, new_id)
    }

    fn references_sid(&self, id: &str) -> bool {
        !self.arguments.iter().any(|a| a == id) && self.body.references(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitialAssignment {
    pub symbol: String,
    pub math: MathExpr,
}

impl SidReferences for InitialAssignment {
    fn rename_sid_refs(&mut self, old_id: &str, new_id: &str) -> usize {
        rename_required(&mut self.symbol, old_id, new_id) + self.math.rename_symbol(old_id, new_id)
    }

    fn references_sid(&self, id: &str) -> bool {
        self.symbol == id || self.math.references(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Algebraic { math: MathExpr },
    Assignment { variable: String, math: MathExpr },
    Rate { variable: String, math: MathExpr },
}

impl Rule {
    pub fn variable(&self) -> Option<&str> {
        match self {
            Rule::Algebraic { .. } => None,
            Rule::Assignment { variable, .. } | Rule::Rate { variable, .. } => Some(variable),
        }
    }

    pub fn math(&self) -> &MathExpr {
        match self {
            Rule::Algebraic { math } | Rule::Assignment { math, .. } | Rule::Rate { math, .. } => {
                math
            }
        }
    }
}

impl SidReferences for Rule {
    fn rename_sid_refs(&mut self, old_id: &str, new_id: &str) -> usize {
        match self {
            Rule::Algebraic { math } => math.rename_symbol(old_id, new_id),
            Rule::Assignment { variable, math } | Rule::Rate { variable, math } => {
                rename_required(variable, old_id, new_id) + math.rename_symbol(old_id, new_id)
            }
        }
    }

    fn references_sid(&self, id: &str) -> bool {
        self.variable() == Some(id) || self.math().references(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub math: MathExpr,
    pub message: Option<String>,
}

impl SidReferences for Constraint {
    fn rename_sid_refs(&mut self, old_id: &str, new_id: &str) -> usize {
        self.math.rename_symbol(old_id, new_id)
    }

    fn references_sid(&self, id: &str) -> bool {
        self.math.references(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventAssignment {
    pub variable: String,
    pub math: MathExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: Option<String>,
    pub name: Option<String>,
    pub trigger: MathExpr,
    pub delay: Option<MathExpr>,
    pub assignments: Vec<EventAssignment>,
}

impl SidReferences for Event {
    fn rename_sid_refs(&mut self, old_id: &str, new_id: &str) -> usize {
        let mut count = self.trigger.rename_symbol(old_id, new_id);
        if let Some(delay) = &mut self.delay {
            count += delay.rename_symbol(old_id, new_id);
        }
        for assignment in &mut self.assignments {
            count += rename_required(&mut assignment.variable, old_id, new_id);
            count += assignment.math.rename_symbol(old_id, new_id);
        }
        count
    }

    fn references_sid(&self, id: &str) -> bool {
        self.trigger.references(id)
            || self.delay.as_ref().is_some_and(|d| d.references(id))
            || self
                .assignments
                .iter()
                .any(|a| a.variable == id || a.math.references(id))
    }
}

/// Model-wide default units, each naming a unit definition or base unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelUnits {
    pub area: Option<String>,
    pub extent: Option<String>,
    pub length: Option<String>,
    pub substance: Option<String>,
    pub time: Option<String>,
    pub volume: Option<String>,
}

impl ModelUnits {
    pub fn is_empty(&self) -> bool {
        self.slots().iter().all(|slot| slot.is_none())
    }

    fn slots(&self) -> [&Option<String>; 6] {
        [
            &self.area,
            &self.extent,
            &self.length,
            &self.substance,
            &self.time,
            &self.volume,
        ]
    }
}

impl SidReferences for ModelUnits {
    fn rename_sid_refs(&mut self, old_id: &str, new_id: &str) -> usize {
        [
            &mut self.area,
            &mut self.extent,
            &mut self.length,
            &mut self.substance,
            &mut self.time,
            &mut self.volume,
        ]
        .into_iter()
        .map(|slot| rename_optional(slot, old_id, new_id))
        .sum()
    }

    fn references_sid(&self, id: &str) -> bool {
        self.slots().iter().any(|slot| slot.as_deref() == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn math(text: &str) -> MathExpr {
        text.parse().unwrap()
    }

    #[test]
    fn function_arguments_shadow_renames() {
        let mut function = FunctionDefinition {
            id: "hill".into(),
            name: None,
            arguments: vec!["x".into(), "K".into()],
            body: math("x^n / (K^n + x^n)"),
        };
        assert_eq!(function.rename_sid_refs("x", "IPTG"), 0);
        assert!(!function.references_sid("x"));
        assert_eq!(function.rename_sid_refs("n", "n_hill"), 3);
    }

    #[test]
    fn rule_rename_updates_variable_and_math() {
        let mut rule = Rule::Assignment {
            variable: "total".into(),
            math: math("A + B"),
        };
        assert_eq!(rule.rename_sid_refs("total", "total_1"), 1);
        assert_eq!(rule.rename_sid_refs("A", "A_shared"), 1);
        assert_eq!(rule.variable(), Some("total_1"));
        assert_eq!(rule.math().to_string(), "A_shared + B");
    }

    #[test]
    fn event_rename_reaches_trigger_delay_and_assignments() {
        let mut event = Event {
            id: Some("pulse".into()),
            name: None,
            trigger: math("time > t0"),
            delay: Some(math("t0 / 2")),
            assignments: vec![EventAssignment {
                variable: "IPTG".into(),
                math: math("IPTG + dose"),
            }],
        };
        assert_eq!(event.rename_sid_refs("t0", "t_start"), 2);
        assert_eq!(event.rename_sid_refs("IPTG", "IPTG_shared"), 2);
        assert!(event.references_sid("dose"));
        assert!(!event.references_sid("t0"));
    }

    #[test]
    fn model_units_report_emptiness_and_references() {
        let mut units = ModelUnits::default();
        assert!(units.is_empty());
        units.substance = Some("count".into());
        assert!(!units.is_empty());
        assert_eq!(units.rename_sid_refs("count", "molecules"), 1);
        assert!(units.references_sid("molecules"));
    }
}
