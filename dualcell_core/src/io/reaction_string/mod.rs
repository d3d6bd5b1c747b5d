//! Build reactions from short text specifications
//!
//! A specification reads `"<ID>, <label> | <equation>"`, for example
//! `"MB_MAL_c, MAL_c M/B transport | M_MAL_c <-> B_MAL_c"`. The label is optional
//! (`"ID | equation"` is accepted). The equation arrow sets the default bounds: `-->` gives
//! `[0, upper]`, `<--` gives `[lower, 0]` and `<->` gives `[lower, upper]` with the defaults of
//! the global [`Configuration`].
use log::debug;
use thiserror::Error;

use crate::configuration::Configuration;
use crate::io::reaction_string::lexer::LexerError;
use crate::io::reaction_string::parser::{Equation, ParseError};
use crate::metabolic_model::model::{Model, ModelError};
use crate::metabolic_model::reaction::Reaction;

pub use crate::io::reaction_string::token::Direction;

mod lexer;
pub mod parser;
mod token;

/// Parsed reaction specification
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionSpec {
    pub id: String,
    pub label: Option<String>,
    pub equation: Equation,
}

impl ReactionSpec {
    /// Parse a specification string
    pub fn parse(spec: &str) -> Result<ReactionSpec, ReactionStringError> {
        let (head, equation) = spec
            .split_once('|')
            .ok_or_else(|| ReactionStringError::MissingSeparator(spec.to_string()))?;
        let (id, label) = match head.split_once(',') {
            Some((id, label)) => (id.trim(), Some(label.trim())),
            None => (head.trim(), None),
        };
        if id.is_empty() || id.contains(char::is_whitespace) {
            return Err(ReactionStringError::InvalidId(id.to_string()));
        }
        let tokens = lexer::Lexer::new(equation).lex()?;
        let equation = parser::EquationParser::new(tokens).parse()?;
        Ok(ReactionSpec {
            id: id.to_string(),
            label: label.filter(|l| !l.is_empty()).map(str::to_string),
            equation,
        })
    }

    /// Reaction described by the specification, bounds follow the arrow
    pub fn to_reaction(&self) -> Reaction {
        let defaults = Configuration::current();
        let (lower_bound, upper_bound) = match self.equation.direction {
            Direction::Forward => (0., defaults.upper_bound),
            Direction::Backward => (defaults.lower_bound, 0.),
            Direction::Reversible => (defaults.lower_bound, defaults.upper_bound),
        };
        Reaction {
            id: self.id.clone(),
            metabolites: self.equation.metabolites.clone(),
            name: self.label.clone(),
            gpr: None,
            lower_bound,
            upper_bound,
            subsystem: None,
            notes: None,
            annotation: None,
        }
    }
}

/// Parse `spec` and add the reaction it describes to `model`, returns the new reaction id
///
/// # Examples
/// ```rust
/// use dualcell_core::io::reaction_string::add_reaction_from_str;
/// use dualcell_core::metabolic_model::metabolite::Metabolite;
/// use dualcell_core::metabolic_model::model::Model;
/// let mut model = Model::new_empty();
/// model.add_metabolite(Metabolite::new("M_MAL_c", Some("c"))).unwrap();
/// model.add_metabolite(Metabolite::new("B_MAL_c", Some("c"))).unwrap();
/// let id = add_reaction_from_str(&mut model, "MB_MAL_c, MAL_c M/B | M_MAL_c <-> B_MAL_c").unwrap();
/// assert_eq!(model.reaction(&id).unwrap().lower_bound, -1000.);
/// ```
pub fn add_reaction_from_str(model: &mut Model, spec: &str) -> Result<String, ReactionStringError> {
    let parsed = ReactionSpec::parse(spec)?;
    if let Some(unknown) = parsed
        .equation
        .metabolites
        .keys()
        .find(|m| !model.metabolites.contains_key(*m))
    {
        return Err(ReactionStringError::UnknownMetabolite {
            reaction: parsed.id,
            metabolite: unknown.clone(),
        });
    }
    let reaction = parsed.to_reaction();
    debug!("Adding reaction {}: {}", reaction.id, reaction.reaction_string());
    model.add_reaction(reaction)?;
    Ok(parsed.id)
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReactionStringError {
    #[error("Specification {0:?} has no `|` between the header and the equation")]
    MissingSeparator(String),
    #[error("Invalid reaction id {0:?}")]
    InvalidId(String),
    #[error("Unable to lex equation: {0}")]
    Lexing(#[from] LexerError),
    #[error("Unable to parse equation: {0}")]
    Parsing(#[from] ParseError),
    #[error("Reaction {reaction} references unknown metabolite {metabolite}")]
    UnknownMetabolite { reaction: String, metabolite: String },
    #[error("Unable to add reaction: {0}")]
    Model(#[from] ModelError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::metabolite::Metabolite;

    fn model_with(metabolites: &[&str]) -> Model {
        let mut model = Model::new_empty();
        for m in metabolites {
            model.add_metabolite(Metabolite::new(m, None)).unwrap();
        }
        model
    }

    #[test]
    fn header_forms() {
        let with_label = ReactionSpec::parse("Photon_tx, Photon uptake | --> hnu_c").unwrap();
        assert_eq!(with_label.id, "Photon_tx");
        assert_eq!(with_label.label.as_deref(), Some("Photon uptake"));
        let without_label = ReactionSpec::parse("  Photon_tx | --> hnu_c").unwrap();
        assert_eq!(without_label.id, "Photon_tx");
        assert_eq!(without_label.label, None);
        assert_eq!(
            ReactionSpec::parse("Photon_tx --> hnu_c"),
            Err(ReactionStringError::MissingSeparator(
                "Photon_tx --> hnu_c".to_string()
            ))
        );
        assert!(matches!(
            ReactionSpec::parse(" , label | --> hnu_c"),
            Err(ReactionStringError::InvalidId(_))
        ));
    }

    #[test]
    fn bounds_follow_the_arrow() {
        let mut model = model_with(&["A_c", "B_c"]);
        add_reaction_from_str(&mut model, "F, forward | A_c --> B_c").unwrap();
        add_reaction_from_str(&mut model, "R, backward | A_c <-- B_c").unwrap();
        add_reaction_from_str(&mut model, "V, reversible | A_c <-> B_c").unwrap();
        let bounds = |id: &str| {
            let r = model.reaction(id).unwrap();
            (r.lower_bound, r.upper_bound)
        };
        assert_eq!(bounds("F"), (0., 1000.));
        assert_eq!(bounds("R"), (-1000., 0.));
        assert_eq!(bounds("V"), (-1000., 1000.));
        assert_eq!(model.reaction("V").unwrap().name.as_deref(), Some("reversible"));
    }

    #[test]
    fn biomass_style_sink() {
        let mut model = model_with(&["MAL_c", "NO3_c"]);
        let id = add_reaction_from_str(
            &mut model,
            "New_biomass_tx, New biomass for core model | 0.5 MAL_c + 2 NO3_c -->",
        )
        .unwrap();
        let reaction = model.reaction(&id).unwrap();
        assert_eq!(reaction.metabolites["MAL_c"], -0.5);
        assert_eq!(reaction.metabolites["NO3_c"], -2.);
    }

    #[test]
    fn failures() {
        let mut model = model_with(&["A_c"]);
        assert_eq!(
            add_reaction_from_str(&mut model, "X | A_c --> Z_c"),
            Err(ReactionStringError::UnknownMetabolite {
                reaction: "X".to_string(),
                metabolite: "Z_c".to_string()
            })
        );
        add_reaction_from_str(&mut model, "X | A_c -->").unwrap();
        assert!(matches!(
            add_reaction_from_str(&mut model, "X | A_c -->"),
            Err(ReactionStringError::Model(ModelError::DuplicateId { .. }))
        ));
        assert!(matches!(
            add_reaction_from_str(&mut model, "Y | A_c"),
            Err(ReactionStringError::Parsing(ParseError::MissingArrow))
        ));
    }
}
