//! Module providing JSON IO for Models (COBRA JSON schema)
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::io::gpr_parse::{parse_gpr, GprParseError};
use crate::metabolic_model::gene::Gene;
use crate::metabolic_model::group::{Group, GroupMember};
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::{Model, ModelError};
use crate::metabolic_model::reaction::{ReactionBuilder, ReactionBuilderError};

// region JSON Model
/// Represents a JSON serialized model, used for reading and writing models in json format
#[derive(Serialize, Deserialize)]
struct JsonModel {
    metabolites: Vec<JsonMetabolite>,
    reactions: Vec<JsonReaction>,
    #[serde(default)]
    genes: Vec<JsonGene>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    groups: Vec<JsonGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compartments: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct JsonMetabolite {
    id: String,
    name: Option<String>,
    compartment: Option<String>,
    charge: Option<i32>,
    formula: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
}

#[derive(Serialize, Deserialize)]
struct JsonReaction {
    id: String,
    name: Option<String>,
    metabolites: IndexMap<String, f64>,
    lower_bound: f64,
    upper_bound: f64,
    #[serde(default)]
    gene_reaction_rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    objective_coefficient: Option<f64>,
    subsystem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
}

#[derive(Serialize, Deserialize)]
struct JsonGene {
    id: String,
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
}

#[derive(Serialize, Deserialize)]
struct JsonGroup {
    id: String,
    name: Option<String>,
    kind: Option<String>,
    #[serde(default)]
    members: Vec<GroupMember>,
}
// endregion JSON Model

// region Conversions
/// Notes and annotations are kept as serialized JSON strings on the model entities
fn value_to_string(value: Option<Value>) -> Option<String> {
    value.map(|v| v.to_string())
}

fn string_to_value(text: &Option<String>) -> Option<Value> {
    text.as_ref()
        .map(|t| serde_json::from_str(t).unwrap_or_else(|_| Value::String(t.clone())))
}

impl From<JsonGene> for Gene {
    fn from(g: JsonGene) -> Self {
        Self {
            id: g.id,
            name: g.name,
            notes: value_to_string(g.notes),
            annotation: value_to_string(g.annotation),
        }
    }
}

impl From<JsonMetabolite> for Metabolite {
    fn from(m: JsonMetabolite) -> Self {
        Self {
            id: m.id,
            name: m.name,
            compartment: m.compartment,
            charge: m.charge.unwrap_or_default(),
            formula: m.formula,
            notes: value_to_string(m.notes),
            annotation: value_to_string(m.annotation),
        }
    }
}

impl From<JsonGroup> for Group {
    fn from(g: JsonGroup) -> Self {
        Self {
            id: g.id,
            name: g.name,
            kind: g.kind,
            members: g.members,
        }
    }
}

impl From<&Gene> for JsonGene {
    fn from(g: &Gene) -> Self {
        Self {
            id: g.id.clone(),
            name: g.name.clone(),
            notes: string_to_value(&g.notes),
            annotation: string_to_value(&g.annotation),
        }
    }
}

impl From<&Metabolite> for JsonMetabolite {
    fn from(m: &Metabolite) -> Self {
        Self {
            id: m.id.clone(),
            name: m.name.clone(),
            compartment: m.compartment.clone(),
            charge: Some(m.charge),
            formula: m.formula.clone(),
            notes: string_to_value(&m.notes),
            annotation: string_to_value(&m.annotation),
        }
    }
}

impl From<&Group> for JsonGroup {
    fn from(g: &Group) -> Self {
        Self {
            id: g.id.clone(),
            name: g.name.clone(),
            kind: g.kind.clone(),
            members: g.members.clone(),
        }
    }
}

impl Model {
    /// Read a model from a COBRA JSON file
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Model, JsonError> {
        let model_str = fs::read_to_string(path)?;
        Model::from_json_str(&model_str)
    }

    /// Parse a model from a COBRA JSON string
    pub fn from_json_str(json: &str) -> Result<Model, JsonError> {
        let json_model: JsonModel = serde_json::from_str(json)?;
        Model::from_json(json_model)
    }

    /// Write the model to a COBRA JSON file
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Serialize the model to a COBRA JSON string
    pub fn to_json_string(&self) -> Result<String, JsonError> {
        Ok(serde_json::to_string_pretty(&self.to_json())?)
    }

    fn from_json(json_model: JsonModel) -> Result<Self, JsonError> {
        let mut model = Model::new_empty();
        model.id = json_model.id;
        model.compartments = json_model.compartments;
        model.version = json_model.version;
        for g in json_model.genes {
            model.add_gene(Gene::from(g))?;
        }
        for m in json_model.metabolites {
            model.add_metabolite(Metabolite::from(m))?;
        }
        for rxn in json_model.reactions {
            let gpr = if !rxn.gene_reaction_rule.trim().is_empty() {
                Some(parse_gpr(&rxn.gene_reaction_rule, &mut model.genes)?)
            } else {
                None
            };
            let new_reaction = ReactionBuilder::default()
                .id(rxn.id.clone())
                .metabolites(rxn.metabolites)
                .name(rxn.name)
                .gpr(gpr)
                .lower_bound(rxn.lower_bound)
                .upper_bound(rxn.upper_bound)
                .subsystem(rxn.subsystem)
                .notes(value_to_string(rxn.notes))
                .annotation(value_to_string(rxn.annotation))
                .build()?;
            model.add_reaction(new_reaction)?;
            if let Some(coef) = rxn.objective_coefficient.filter(|c| *c != 0.) {
                model.objective.insert(rxn.id, coef);
            }
        }
        for g in json_model.groups {
            model.add_group(Group::from(g))?;
        }
        debug!(
            "Read model with {} reactions, {} metabolites and {} genes",
            model.reactions.len(),
            model.metabolites.len(),
            model.genes.len()
        );
        Ok(model)
    }

    fn to_json(&self) -> JsonModel {
        let reactions = self
            .reactions
            .values()
            .map(|r| JsonReaction {
                id: r.id.clone(),
                name: r.name.clone(),
                metabolites: r.metabolites.clone(),
                lower_bound: r.lower_bound,
                upper_bound: r.upper_bound,
                gene_reaction_rule: r
                    .gpr
                    .as_ref()
                    .map(|rule| rule.to_string_id())
                    .unwrap_or_default(),
                objective_coefficient: self.objective.get(&r.id).copied(),
                subsystem: r.subsystem.clone(),
                notes: string_to_value(&r.notes),
                annotation: string_to_value(&r.annotation),
            })
            .collect();
        JsonModel {
            metabolites: self.metabolites.values().map(JsonMetabolite::from).collect(),
            reactions,
            genes: self.genes.values().map(JsonGene::from).collect(),
            groups: self.groups.values().map(JsonGroup::from).collect(),
            id: self.id.clone(),
            compartments: self.compartments.clone(),
            version: self.version.clone(),
        }
    }
}
// endregion Conversions

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Unable to parse a GPR rule during conversion from JSON: {0}")]
    GprParserError(#[from] GprParseError),
    #[error("Unable to build reaction: {0}")]
    UnableToBuildReaction(#[from] ReactionBuilderError),
    #[error("Serde json error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("Unable to access file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Model described by the file is inconsistent: {0}")]
    InvalidModel(#[from] ModelError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::gene::{Gpr, GprOperation};

    const SMALL_MODEL: &str = r#"{
"id":"toy",
"compartments":{"c":"cytosol","e":"extracellular"},
"metabolites":[
{"id":"glc__D_e","name":"D-Glucose","compartment":"e","charge":0,"formula":"C6H12O6",
 "annotation":{"bigg.metabolite":["glc__D"]}},
{"id":"g6p_c","name":"D-Glucose 6-phosphate","compartment":"c","charge":-2,"formula":"C6H11O9P"}
],
"reactions":[
{"id":"GLCpts","name":"D-glucose transport via PEP:Pyr PTS",
 "metabolites":{"glc__D_e":-1.0,"g6p_c":1.0},"lower_bound":0.0,"upper_bound":1000.0,
 "gene_reaction_rule":"b2417 and (b1101 or b2415)","subsystem":"Transport"},
{"id":"EX_glc__D_e","name":"D-Glucose exchange","metabolites":{"glc__D_e":-1.0},
 "lower_bound":-10.0,"upper_bound":1000.0,"gene_reaction_rule":""},
{"id":"G6P_sink","name":"sink","metabolites":{"g6p_c":-1.0},
 "lower_bound":0.0,"upper_bound":1000.0,"objective_coefficient":1.0}
],
"genes":[{"id":"b2417","name":"crr"}],
"groups":[{"id":"transport","name":"Transport","kind":"partonomy",
 "members":[{"type":"reaction","id":"GLCpts"}]}]
}"#;

    #[test]
    fn read_model_from_str() {
        let model = Model::from_json_str(SMALL_MODEL).unwrap();
        assert_eq!(model.id.as_deref(), Some("toy"));
        assert_eq!(model.metabolites.len(), 2);
        assert_eq!(model.reactions.len(), 3);
        // b1101 and b2415 only appear in the rule
        assert_eq!(model.genes.len(), 3);
        assert_eq!(model.genes["b2417"].name.as_deref(), Some("crr"));
        assert_eq!(model.objective.get("G6P_sink"), Some(&1.));
        assert_eq!(model.metabolites["g6p_c"].charge, -2);
        let exchange = model.reaction("EX_glc__D_e").unwrap();
        assert_eq!((exchange.lower_bound, exchange.upper_bound), (-10., 1000.));
        assert!(exchange.gpr.is_none());
        match &model.reaction("GLCpts").unwrap().gpr {
            Some(Gpr::Operation(GprOperation::And { .. })) => {}
            other => panic!("Unexpected GPR {:?}", other),
        }
        assert_eq!(
            model.groups["transport"].members,
            vec![GroupMember::Reaction("GLCpts".to_string())]
        );
        assert!(model.validate().is_ok());
    }

    #[test]
    fn unknown_metabolite_is_rejected() {
        let broken = r#"{"metabolites":[],"reactions":[
            {"id":"R","name":null,"metabolites":{"x_c":1.0},"lower_bound":0.0,"upper_bound":1.0,
             "subsystem":null}]}"#;
        assert!(matches!(
            Model::from_json_str(broken),
            Err(JsonError::InvalidModel(ModelError::MetaboliteNotFound(_)))
        ));
    }

    #[test]
    fn write_then_read_file() {
        let model = Model::from_json_str(SMALL_MODEL).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toy.json");
        model.write_json(&path).unwrap();
        let read_back = Model::read_json(&path).unwrap();
        assert_eq!(read_back, model);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            Model::read_json("/definitely/not/here.json"),
            Err(JsonError::Io(_))
        ));
    }
}
