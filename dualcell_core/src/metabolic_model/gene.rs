//! This module provides the Gene struct, representing a gene, and the Gpr enum, representing a
//! gene protein reaction rule
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use thiserror::Error;

/// Structure Representing a Gene
#[derive(Builder, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Gene {
    /// Used to identify the gene
    pub id: String,
    /// Human Readable Gene Name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Notes about the gene
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Gene Annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
}

impl Gene {
    /// Create a gene with only an id
    pub fn new(id: &str) -> Gene {
        Gene {
            id: id.to_string(),
            name: None,
            notes: None,
            annotation: None,
        }
    }
}

impl Display for Gene {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

// region GPR Functionality
/// Representation of a Gene Protein Reaction Rule as an AST
#[derive(Clone, Debug, PartialEq)]
pub enum Gpr {
    /// Operation on two genes (see [`GprOperation`])
    Operation(GprOperation),
    /// A terminal gene Node, holding the gene id
    GeneNode(String),
}

impl Gpr {
    /// Create a new binary operation node
    pub fn new_binary_operation(
        left: Gpr,
        operator: GprOperatorType,
        right: Gpr,
    ) -> Result<Gpr, GprError> {
        let op = match operator {
            GprOperatorType::Or => GprOperation::Or {
                left: Box::new(left),
                right: Box::new(right),
            },
            GprOperatorType::And => GprOperation::And {
                left: Box::new(left),
                right: Box::new(right),
            },
            GprOperatorType::Not => return Err(GprError::InvalidBinaryOp),
        };
        Ok(Gpr::Operation(op))
    }

    /// Create a new unary operation node
    pub fn new_unary_operation(operator: GprOperatorType, operand: Gpr) -> Result<Gpr, GprError> {
        let op = match operator {
            GprOperatorType::Not => GprOperation::Not {
                val: Box::new(operand),
            },
            _ => return Err(GprError::InvalidUnaryOp),
        };
        Ok(Gpr::Operation(op))
    }

    /// Create a new gene node
    pub fn new_gene_node(gene: &str) -> Gpr {
        Gpr::GeneNode(gene.to_string())
    }

    /// All gene ids referenced by the rule, in order of appearance
    pub fn gene_ids(&self) -> Vec<&str> {
        match self {
            Gpr::Operation(GprOperation::Or { left, right })
            | Gpr::Operation(GprOperation::And { left, right }) => {
                let mut ids = left.gene_ids();
                ids.extend(right.gene_ids());
                ids
            }
            Gpr::Operation(GprOperation::Not { val }) => val.gene_ids(),
            Gpr::GeneNode(gene) => vec![gene.as_str()],
        }
    }

    /// Copy of the rule with every gene id passed through `rename`
    pub fn rename_genes<F: Fn(&str) -> String>(&self, rename: &F) -> Gpr {
        match self {
            Gpr::Operation(GprOperation::Or { left, right }) => Gpr::Operation(GprOperation::Or {
                left: Box::new(left.rename_genes(rename)),
                right: Box::new(right.rename_genes(rename)),
            }),
            Gpr::Operation(GprOperation::And { left, right }) => {
                Gpr::Operation(GprOperation::And {
                    left: Box::new(left.rename_genes(rename)),
                    right: Box::new(right.rename_genes(rename)),
                })
            }
            Gpr::Operation(GprOperation::Not { val }) => Gpr::Operation(GprOperation::Not {
                val: Box::new(val.rename_genes(rename)),
            }),
            Gpr::GeneNode(gene) => Gpr::GeneNode(rename(gene)),
        }
    }

    /// Generate a GPR string with gene ids from the GPR AST
    pub fn to_string_id(&self) -> String {
        match self {
            Gpr::Operation(op) => match op {
                GprOperation::Or { left, right } => {
                    format!("({} or {})", left.to_string_id(), right.to_string_id())
                }
                GprOperation::And { left, right } => {
                    format!("({} and {})", left.to_string_id(), right.to_string_id())
                }
                GprOperation::Not { val } => {
                    format!("(not {})", val)
                }
            },
            Gpr::GeneNode(gene_ref) => gene_ref.to_string(),
        }
    }
}

impl Display for Gpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_id())
    }
}

/// Possible operations on genes
#[derive(Clone, Debug, PartialEq)]
pub enum GprOperation {
    Or { left: Box<Gpr>, right: Box<Gpr> },
    And { left: Box<Gpr>, right: Box<Gpr> },
    Not { val: Box<Gpr> },
}

/// Types of Allowed GPR Operations
pub enum GprOperatorType {
    /// Or, results in active if either left or right are active
    Or,
    /// And, results in active if both left and right are active
    And,
    /// Not, results in active if val is inactive
    Not,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum GprError {
    #[error("Invalid Binary Operation")]
    InvalidBinaryOp,
    #[error("Invalid Unary Operation")]
    InvalidUnaryOp,
}
// endregion GPR Functionality

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rule() -> Gpr {
        Gpr::Operation(GprOperation::Or {
            left: Box::new(Gpr::Operation(GprOperation::And {
                left: Box::new(Gpr::new_gene_node("AT1G01")),
                right: Box::new(Gpr::new_gene_node("AT1G02")),
            })),
            right: Box::new(Gpr::Operation(GprOperation::Not {
                val: Box::new(Gpr::new_gene_node("AT1G03")),
            })),
        })
    }

    #[test]
    fn display() {
        assert_eq!(Gpr::new_gene_node("Active1").to_string(), "Active1");
        assert_eq!(
            sample_rule().to_string(),
            "((AT1G01 and AT1G02) or (not AT1G03))"
        );
    }

    #[test]
    fn gene_ids_in_order() {
        assert_eq!(sample_rule().gene_ids(), vec!["AT1G01", "AT1G02", "AT1G03"]);
    }

    #[test]
    fn rename_keeps_structure() {
        let renamed = sample_rule().rename_genes(&|g| format!("B_{g}"));
        assert_eq!(
            renamed.to_string(),
            "((B_AT1G01 and B_AT1G02) or (not B_AT1G03))"
        );
    }

    #[test]
    fn invalid_operators() {
        let gene = Gpr::new_gene_node("g");
        assert_eq!(
            Gpr::new_binary_operation(gene.clone(), GprOperatorType::Not, gene.clone()),
            Err(GprError::InvalidBinaryOp)
        );
        assert_eq!(
            Gpr::new_unary_operation(GprOperatorType::And, gene),
            Err(GprError::InvalidUnaryOp)
        );
    }
}
