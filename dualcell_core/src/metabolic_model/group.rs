//! Groups collect reactions, metabolites and genes under one id (e.g. pathways)
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A named collection of model entities
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Group {
    /// Used to identify the group (must be unique)
    pub id: String,
    /// Human readable name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Kind of grouping, e.g. `partonomy` or `collection`
    #[builder(default = "None")]
    pub kind: Option<String>,
    /// Entities in the group
    #[builder(default = "Vec::new()")]
    pub members: Vec<GroupMember>,
}

/// Reference to an entity of the model
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum GroupMember {
    Reaction(String),
    Metabolite(String),
    Gene(String),
}

impl GroupMember {
    pub fn id(&self) -> &str {
        match self {
            GroupMember::Reaction(id) | GroupMember::Metabolite(id) | GroupMember::Gene(id) => id,
        }
    }

    /// Same kind of member with a new id
    pub(crate) fn with_id(&self, id: String) -> GroupMember {
        match self {
            GroupMember::Reaction(_) => GroupMember::Reaction(id),
            GroupMember::Metabolite(_) => GroupMember::Metabolite(id),
            GroupMember::Gene(_) => GroupMember::Gene(id),
        }
    }
}
