//! Provides struct for representing a linear constraint
//!
//! The same representation is used for constraints registered on a
//! [`Model`](crate::metabolic_model::model::Model), where the terms refer to reaction ids
//! (i.e. reaction fluxes), and for constraints of a [`Problem`](crate::optimize::problem::Problem),
//! where the terms refer to problem variable ids.
use std::fmt::{Display, Formatter};

/// Represents a named linear constraint
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Represents an equality constraint, where `terms` = `equals`
    Equality {
        /// Used to identify the constraint
        id: String,
        /// Linear terms which are added together, see [`ConstraintTerm`] for more
        terms: Vec<ConstraintTerm>,
        /// The right hand side of the equality constraint
        equals: f64,
    },
    /// Represents an inequality constraint, `lower_bound` <= `terms` <= `upper_bound`
    Inequality {
        /// Used to identify the constraint
        id: String,
        /// Linear terms which are added together, see [`ConstraintTerm`] for more
        terms: Vec<ConstraintTerm>,
        /// The lowest value the sum of the terms can take
        lower_bound: f64,
        /// The highest value the sum of the terms can take
        upper_bound: f64,
    },
}

impl Constraint {
    /// Create a new equality constraint
    ///
    /// # Parameters
    /// - `id`: Identifier of the constraint
    /// - `variables`: A slice of variable ids
    /// - `coefficients`: A slice of coefficients for the variables
    /// - `equals`: The right hand side of the equality
    ///
    /// # Examples
    /// ```rust
    /// use dualcell_core::optimize::constraint::Constraint;
    /// // Create a constraint representing 3*x + 2*y = 6
    /// let new_constraint = Constraint::new_equality("c1", &["x", "y"], &[3.0, 2.0], 6.);
    /// assert_eq!(new_constraint.bounds(), (6., 6.));
    /// ```
    pub fn new_equality(id: &str, variables: &[&str], coefficients: &[f64], equals: f64) -> Self {
        Constraint::Equality {
            id: id.to_string(),
            terms: Constraint::zip_into_terms(variables, coefficients),
            equals,
        }
    }

    /// Create a new inequality constraint
    ///
    /// # Examples
    /// ```rust
    /// use dualcell_core::optimize::constraint::Constraint;
    /// // represents the inequality 2 <= 3*x + 2*y <= 6
    /// let new_constraint = Constraint::new_inequality("c2", &["x", "y"], &[3.0, 2.0], 2., 6.);
    /// assert_eq!(new_constraint.to_string(), "2 <= 3*x + 2*y <= 6");
    /// ```
    pub fn new_inequality(
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Self {
        Constraint::Inequality {
            id: id.to_string(),
            terms: Constraint::zip_into_terms(variables, coefficients),
            lower_bound,
            upper_bound,
        }
    }

    pub fn get_id(&self) -> &str {
        match self {
            Constraint::Equality { id, .. } | Constraint::Inequality { id, .. } => id,
        }
    }

    pub fn get_terms(&self) -> &[ConstraintTerm] {
        match self {
            Constraint::Equality { terms, .. } | Constraint::Inequality { terms, .. } => terms,
        }
    }

    /// Ids of every variable referenced by this constraint
    pub fn get_variables(&self) -> impl Iterator<Item = &str> {
        self.get_terms().iter().map(|t| t.variable.as_str())
    }

    /// Closed interval the sum of the terms must lie in
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            Constraint::Equality { equals, .. } => (*equals, *equals),
            Constraint::Inequality {
                lower_bound,
                upper_bound,
                ..
            } => (*lower_bound, *upper_bound),
        }
    }

    /// Evaluate the sum of the terms for the given variable values, missing variables count as 0
    pub fn evaluate<F: Fn(&str) -> Option<f64>>(&self, value_of: F) -> f64 {
        self.get_terms()
            .iter()
            .map(|t| t.coefficient * value_of(&t.variable).unwrap_or(0.))
            .sum()
    }

    /// Rename every id in the constraint (its own id and the variable ids of its terms)
    pub(crate) fn rename<F: Fn(&str) -> String>(&self, rename: F) -> Constraint {
        let rename_terms = |terms: &[ConstraintTerm]| {
            terms
                .iter()
                .map(|t| ConstraintTerm::new(&rename(&t.variable), t.coefficient))
                .collect()
        };
        match self {
            Constraint::Equality { id, terms, equals } => Constraint::Equality {
                id: rename(id),
                terms: rename_terms(terms),
                equals: *equals,
            },
            Constraint::Inequality {
                id,
                terms,
                lower_bound,
                upper_bound,
            } => Constraint::Inequality {
                id: rename(id),
                terms: rename_terms(terms),
                lower_bound: *lower_bound,
                upper_bound: *upper_bound,
            },
        }
    }

    /// Take a slice of variable ids, and a slice of coefficients and zip
    /// them together into a vec of ConstraintTerms
    fn zip_into_terms(variables: &[&str], coefficients: &[f64]) -> Vec<ConstraintTerm> {
        variables
            .iter()
            .zip(coefficients)
            .map(|(var, coef)| ConstraintTerm::new(var, *coef))
            .collect()
    }

    /// Convert a vector of terms into a String representation
    fn terms_to_string(terms: &[ConstraintTerm]) -> String {
        terms
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::Equality { terms, equals, .. } => {
                write!(f, "{} = {}", Self::terms_to_string(terms), equals)
            }
            Constraint::Inequality {
                terms,
                lower_bound,
                upper_bound,
                ..
            } => write!(
                f,
                "{} <= {} <= {}",
                lower_bound,
                Self::terms_to_string(terms),
                upper_bound
            ),
        }
    }
}

/// Represents a single term in a constraint, specifically
/// represents the multiplication of the `variable` by the `coefficient`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintTerm {
    /// Id of the variable (or reaction, for model constraints)
    pub variable: String,
    /// The coefficient for the variable
    pub coefficient: f64,
}

impl ConstraintTerm {
    pub fn new(variable: &str, coefficient: f64) -> Self {
        ConstraintTerm {
            variable: variable.to_string(),
            coefficient,
        }
    }
}

impl Display for ConstraintTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*{}", self.coefficient, self.variable)
    }
}
