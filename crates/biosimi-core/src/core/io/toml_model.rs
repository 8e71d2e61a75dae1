use crate::core::io::traits::ModelFile;
use crate::core::models::compartment::Compartment;
use crate::core::models::definitions::{
    Constraint, Event, EventAssignment, FunctionDefinition, InitialAssignment, ModelUnits,
    Parameter, Rule, Unit, UnitDefinition,
};
use crate::core::models::document::{Document, SchemaError, SchemaVersion};
use crate::core::models::math::{MathExpr, MathParseError};
use crate::core::models::model::{Model, ModelError};
use crate::core::models::reaction::{KineticLaw, LocalParameter, Reaction, SpeciesReference};
use crate::core::models::species::Species;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Read, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TomlModelError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid math in {context}: {source}")]
    Math {
        context: String,
        #[source]
        source: MathParseError,
    },
    #[error("Invalid model structure: {0}")]
    Model(#[from] ModelError),
    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),
}

fn yes() -> bool {
    true
}

fn one() -> f64 {
    1.0
}

fn is_true(value: &bool) -> bool {
    *value
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct DocumentRecord {
    level: u32,
    version: u32,
    model: ModelRecord,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ModelRecord {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    area_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extent_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    length_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    substance_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    volume_units: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    function_definitions: Vec<FunctionDefinitionRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    unit_definitions: Vec<UnitDefinitionRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    compartments: Vec<CompartmentRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    species: Vec<SpeciesRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    parameters: Vec<ParameterRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    initial_assignments: Vec<InitialAssignmentRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    rules: Vec<RuleRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    constraints: Vec<ConstraintRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    reactions: Vec<ReactionRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    events: Vec<EventRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct FunctionDefinitionRecord {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    arguments: Vec<String>,
    body: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct UnitRecord {
    kind: String,
    #[serde(default = "one")]
    exponent: f64,
    #[serde(default)]
    scale: i32,
    #[serde(default = "one")]
    multiplier: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct UnitDefinitionRecord {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    units: Vec<UnitRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct CompartmentRecord {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    spatial_dimensions: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    units: Option<String>,
    #[serde(default = "yes", skip_serializing_if = "is_true")]
    constant: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    outside: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct SpeciesRecord {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    compartment: String,
    #[serde(default)]
    initial_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    substance_units: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    has_only_substance_units: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    boundary_condition: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    constant: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ParameterRecord {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    units: Option<String>,
    #[serde(default = "yes", skip_serializing_if = "is_true")]
    constant: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct InitialAssignmentRecord {
    symbol: String,
    math: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum RuleRecord {
    Algebraic { math: String },
    Assignment { variable: String, math: String },
    Rate { variable: String, math: String },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ConstraintRecord {
    math: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct SpeciesReferenceRecord {
    species: String,
    #[serde(default = "one")]
    stoichiometry: f64,
    #[serde(default = "yes", skip_serializing_if = "is_true")]
    constant: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct LocalParameterRecord {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    units: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct KineticLawRecord {
    math: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    local_parameters: Vec<LocalParameterRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ReactionRecord {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    reversible: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    fast: bool,
    #[serde(default)]
    reactants: Vec<SpeciesReferenceRecord>,
    #[serde(default)]
    products: Vec<SpeciesReferenceRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    modifiers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kinetic_law: Option<KineticLawRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct EventAssignmentRecord {
    variable: String,
    math: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct EventRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    trigger: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delay: Option<String>,
    #[serde(default)]
    assignments: Vec<EventAssignmentRecord>,
}

fn parse_math(text: &str, context: impl FnOnce() -> String) -> Result<MathExpr, TomlModelError> {
    text.parse().map_err(|source| TomlModelError::Math {
        context: context(),
        source,
    })
}

fn model_from_record(record: ModelRecord) -> Result<Model, TomlModelError> {
    let mut model = Model::new(record.id);
    model.name = record.name;
    model.units = ModelUnits {
        area: record.area_units,
        extent: record.extent_units,
        length: record.length_units,
        substance: record.substance_units,
        time: record.time_units,
        volume: record.volume_units,
    };

    for f in record.function_definitions {
        let body = parse_math(&f.body, || format!("function definition '{}'", f.id))?;
        model.add_function_definition(FunctionDefinition {
            id: f.id,
            name: f.name,
            arguments: f.arguments,
            body,
        })?;
    }

    for u in record.unit_definitions {
        model.add_unit_definition(UnitDefinition {
            id: u.id,
            name: u.name,
            units: u
                .units
                .into_iter()
                .map(|unit| Unit {
                    kind: unit.kind,
                    exponent: unit.exponent,
                    scale: unit.scale,
                    multiplier: unit.multiplier,
                })
                .collect(),
        })?;
    }

    for c in record.compartments {
        model.add_compartment(Compartment {
            id: c.id,
            name: c.name,
            size: c.size,
            spatial_dimensions: c.spatial_dimensions,
            units: c.units,
            constant: c.constant,
            outside: c.outside,
        })?;
    }

    for s in record.species {
        model.add_species(Species {
            id: s.id,
            name: s.name,
            compartment: s.compartment,
            initial_amount: s.initial_amount,
            substance_units: s.substance_units,
            has_only_substance_units: s.has_only_substance_units,
            boundary_condition: s.boundary_condition,
            constant: s.constant,
        })?;
    }

    for p in record.parameters {
        model.add_parameter(Parameter {
            id: p.id,
            name: p.name,
            value: p.value,
            units: p.units,
            constant: p.constant,
        })?;
    }

    for a in record.initial_assignments {
        let math = parse_math(&a.math, || format!("initial assignment for '{}'", a.symbol))?;
        model.add_initial_assignment(InitialAssignment {
            symbol: a.symbol,
            math,
        });
    }

    for (index, r) in record.rules.into_iter().enumerate() {
        let context = || format!("rule #{}", index + 1);
        let rule = match r {
            RuleRecord::Algebraic { math } => Rule::Algebraic {
                math: parse_math(&math, context)?,
            },
            RuleRecord::Assignment { variable, math } => Rule::Assignment {
                math: parse_math(&math, context)?,
                variable,
            },
            RuleRecord::Rate { variable, math } => Rule::Rate {
                math: parse_math(&math, context)?,
                variable,
            },
        };
        model.add_rule(rule);
    }

    for (index, c) in record.constraints.into_iter().enumerate() {
        let math = parse_math(&c.math, || format!("constraint #{}", index + 1))?;
        model.add_constraint(Constraint {
            math,
            message: c.message,
        });
    }

    for r in record.reactions {
        let kinetic_law = match r.kinetic_law {
            Some(law) => Some(KineticLaw {
                math: parse_math(&law.math, || format!("kinetic law of reaction '{}'", r.id))?,
                local_parameters: law
                    .local_parameters
                    .into_iter()
                    .map(|p| LocalParameter {
                        id: p.id,
                        value: p.value,
                        units: p.units,
                    })
                    .collect(),
            }),
            None => None,
        };
        let to_reference = |record: SpeciesReferenceRecord| SpeciesReference {
            species: record.species,
            stoichiometry: record.stoichiometry,
            constant: record.constant,
        };
        model.add_reaction(Reaction {
            id: r.id,
            name: r.name,
            reactants: r.reactants.into_iter().map(to_reference).collect(),
            products: r.products.into_iter().map(to_reference).collect(),
            modifiers: r.modifiers,
            reversible: r.reversible,
            fast: r.fast,
            kinetic_law,
        })?;
    }

    for (index, e) in record.events.into_iter().enumerate() {
        let label = e.id.clone().unwrap_or_else(|| format!("#{}", index + 1));
        let trigger = parse_math(&e.trigger, || format!("trigger of event '{}'", label))?;
        let delay = match &e.delay {
            Some(text) => Some(parse_math(text, || format!("delay of event '{}'", label))?),
            None => None,
        };
        let mut assignments = Vec::with_capacity(e.assignments.len());
        for a in e.assignments {
            let math = parse_math(&a.math, || {
                format!("assignment to '{}' in event '{}'", a.variable, label)
            })?;
            assignments.push(EventAssignment {
                variable: a.variable,
                math,
            });
        }
        model.add_event(Event {
            id: e.id,
            name: e.name,
            trigger,
            delay,
            assignments,
        })?;
    }

    Ok(model)
}

fn record_from_model(model: &Model) -> ModelRecord {
    let to_reference = |r: &SpeciesReference| SpeciesReferenceRecord {
        species: r.species.clone(),
        stoichiometry: r.stoichiometry,
        constant: r.constant,
    };

    ModelRecord {
        id: model.id.clone(),
        name: model.name.clone(),
        area_units: model.units.area.clone(),
        extent_units: model.units.extent.clone(),
        length_units: model.units.length.clone(),
        substance_units: model.units.substance.clone(),
        time_units: model.units.time.clone(),
        volume_units: model.units.volume.clone(),
        function_definitions: model
            .function_definitions()
            .iter()
            .map(|f| FunctionDefinitionRecord {
                id: f.id.clone(),
                name: f.name.clone(),
                arguments: f.arguments.clone(),
                body: f.body.to_string(),
            })
            .collect(),
        unit_definitions: model
            .unit_definitions()
            .iter()
            .map(|u| UnitDefinitionRecord {
                id: u.id.clone(),
                name: u.name.clone(),
                units: u
                    .units
                    .iter()
                    .map(|unit| UnitRecord {
                        kind: unit.kind.clone(),
                        exponent: unit.exponent,
                        scale: unit.scale,
                        multiplier: unit.multiplier,
                    })
                    .collect(),
            })
            .collect(),
        compartments: model
            .compartments()
            .map(|(_, c)| CompartmentRecord {
                id: c.id.clone(),
                name: c.name.clone(),
                size: c.size,
                spatial_dimensions: c.spatial_dimensions,
                units: c.units.clone(),
                constant: c.constant,
                outside: c.outside.clone(),
            })
            .collect(),
        species: model
            .species_iter()
            .map(|(_, s)| SpeciesRecord {
                id: s.id.clone(),
                name: s.name.clone(),
                compartment: s.compartment.clone(),
                initial_amount: s.initial_amount,
                substance_units: s.substance_units.clone(),
                has_only_substance_units: s.has_only_substance_units,
                boundary_condition: s.boundary_condition,
                constant: s.constant,
            })
            .collect(),
        parameters: model
            .parameters()
            .map(|(_, p)| ParameterRecord {
                id: p.id.clone(),
                name: p.name.clone(),
                value: p.value,
                units: p.units.clone(),
                constant: p.constant,
            })
            .collect(),
        initial_assignments: model
            .initial_assignments()
            .iter()
            .map(|a| InitialAssignmentRecord {
                symbol: a.symbol.clone(),
                math: a.math.to_string(),
            })
            .collect(),
        rules: model
            .rules()
            .iter()
            .map(|r| match r {
                Rule::Algebraic { math } => RuleRecord::Algebraic {
                    math: math.to_string(),
                },
                Rule::Assignment { variable, math } => RuleRecord::Assignment {
                    variable: variable.clone(),
                    math: math.to_string(),
                },
                Rule::Rate { variable, math } => RuleRecord::Rate {
                    variable: variable.clone(),
                    math: math.to_string(),
                },
            })
            .collect(),
        constraints: model
            .constraints()
            .iter()
            .map(|c| ConstraintRecord {
                math: c.math.to_string(),
                message: c.message.clone(),
            })
            .collect(),
        reactions: model
            .reactions()
            .map(|(_, r)| ReactionRecord {
                id: r.id.clone(),
                name: r.name.clone(),
                reversible: r.reversible,
                fast: r.fast,
                reactants: r.reactants.iter().map(to_reference).collect(),
                products: r.products.iter().map(to_reference).collect(),
                modifiers: r.modifiers.clone(),
                kinetic_law: r.kinetic_law.as_ref().map(|law| KineticLawRecord {
                    math: law.math.to_string(),
                    local_parameters: law
                        .local_parameters
                        .iter()
                        .map(|p| LocalParameterRecord {
                            id: p.id.clone(),
                            value: p.value,
                            units: p.units.clone(),
                        })
                        .collect(),
                }),
            })
            .collect(),
        events: model
            .events()
            .iter()
            .map(|e| EventRecord {
                id: e.id.clone(),
                name: e.name.clone(),
                trigger: e.trigger.to_string(),
                delay: e.delay.as_ref().map(ToString::to_string),
                assignments: e
                    .assignments
                    .iter()
                    .map(|a| EventAssignmentRecord {
                        variable: a.variable.clone(),
                        math: a.math.to_string(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Model documents stored as TOML, with math kept in infix text form.
pub struct TomlModelFile;

impl TomlModelFile {
    pub fn parse(content: &str) -> Result<Document, TomlModelError> {
        let record: DocumentRecord = toml::from_str(content)?;
        let schema = SchemaVersion::new(record.level, record.version);
        if !schema.is_supported() {
            return Err(SchemaError::Unsupported(schema).into());
        }
        let model = model_from_record(record.model)?;
        Ok(Document::new(schema, model))
    }

    pub fn render(document: &Document) -> Result<String, TomlModelError> {
        let schema = document.schema();
        let record = DocumentRecord {
            level: schema.level,
            version: schema.version,
            model: record_from_model(document.model()),
        };
        Ok(toml::to_string_pretty(&record)?)
    }
}

impl ModelFile for TomlModelFile {
    type Error = TomlModelError;

    fn read_from(reader: &mut impl BufRead) -> Result<Document, Self::Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::parse(&content)
    }

    fn write_to(document: &Document, writer: &mut impl Write) -> Result<(), Self::Error> {
        let content = Self::render(document)?;
        writer.write_all(content.as_bytes())?;
        Ok(())
    }
}
