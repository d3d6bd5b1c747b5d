//! Turning a biomass composition table into a reaction specification
use std::fs;
use std::path::Path;

use thiserror::Error;

/// Id of the biomass reaction built from a composition table
pub const BIOMASS_REACTION_ID: &str = "New_biomass_tx";
const BIOMASS_REACTION_LABEL: &str = "New biomass for core model";

/// One row of a biomass composition table
#[derive(Debug, Clone, PartialEq)]
pub struct BiomassComponent {
    pub metabolite: String,
    /// Amount consumed per unit of biomass, negative for by-products
    pub coefficient: f64,
}

/// Parse a comma separated composition table
///
/// The first line is a header. Every other non blank line starts with a metabolite
/// identifier and a coefficient, further columns are ignored.
pub fn parse_biomass_table(text: &str) -> Result<Vec<BiomassComponent>, BiomassError> {
    let mut components = Vec::new();
    for (index, line) in text.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split(',').map(|f| f.trim().trim_matches('"').trim());
        let (metabolite, coefficient) = match (fields.next(), fields.next()) {
            (Some(m), Some(c)) if !m.is_empty() => (m, c),
            _ => return Err(BiomassError::MissingColumn { line: index + 1 }),
        };
        let coefficient = coefficient
            .parse::<f64>()
            .ok()
            .filter(|c| c.is_finite() && *c != 0.)
            .ok_or_else(|| BiomassError::InvalidCoefficient {
                line: index + 1,
                value: coefficient.to_string(),
            })?;
        components.push(BiomassComponent {
            metabolite: metabolite.to_string(),
            coefficient,
        });
    }
    if components.is_empty() {
        return Err(BiomassError::Empty);
    }
    Ok(components)
}

/// Specification string of the biomass drain for the given components
///
/// # Examples
/// ```rust
/// use dualcell_core::io::biomass::{biomass_specification, BiomassComponent};
/// let spec = biomass_specification(&[
///     BiomassComponent { metabolite: "MAL_c".to_string(), coefficient: 0.5 },
///     BiomassComponent { metabolite: "NO3_c".to_string(), coefficient: 1.0 },
/// ]);
/// assert_eq!(spec, "New_biomass_tx, New biomass for core model | 0.5 MAL_c + 1 NO3_c -->");
/// ```
pub fn biomass_specification(components: &[BiomassComponent]) -> String {
    let side = |consumed: bool| {
        components
            .iter()
            .filter(|c| (c.coefficient > 0.) == consumed)
            .map(|c| format!("{} {}", c.coefficient.abs(), c.metabolite))
            .collect::<Vec<_>>()
            .join(" + ")
    };
    let products = side(false);
    let arrow = if products.is_empty() {
        "-->".to_string()
    } else {
        format!("--> {}", products)
    };
    format!(
        "{}, {} | {} {}",
        BIOMASS_REACTION_ID,
        BIOMASS_REACTION_LABEL,
        side(true),
        arrow
    )
}

/// Read a composition table and build the biomass specification string
pub fn read_biomass_specification<P: AsRef<Path>>(path: P) -> Result<String, BiomassError> {
    let text = fs::read_to_string(path)?;
    Ok(biomass_specification(&parse_biomass_table(&text)?))
}

#[derive(Debug, Error)]
pub enum BiomassError {
    #[error("Unable to read biomass table: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line {line} needs an identifier and a coefficient")]
    MissingColumn { line: usize },
    #[error("Line {line} has an invalid coefficient {value:?}")]
    InvalidCoefficient { line: usize, value: String },
    #[error("Biomass table has no components")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "metabolite,coefficient,unit\n\
                         MAL_c, 0.25,mmol/gDW\n\
                         \n\
                         NO3_c, 1.5,mmol/gDW\n";

    #[test]
    fn parse_table() {
        let components = parse_biomass_table(TABLE).unwrap();
        assert_eq!(
            components,
            vec![
                BiomassComponent {
                    metabolite: "MAL_c".to_string(),
                    coefficient: 0.25
                },
                BiomassComponent {
                    metabolite: "NO3_c".to_string(),
                    coefficient: 1.5
                },
            ]
        );
        assert_eq!(
            biomass_specification(&components),
            "New_biomass_tx, New biomass for core model | 0.25 MAL_c + 1.5 NO3_c -->"
        );
    }

    #[test]
    fn by_products_go_right() {
        let spec = biomass_specification(&[
            BiomassComponent {
                metabolite: "ATP_c".to_string(),
                coefficient: 30.,
            },
            BiomassComponent {
                metabolite: "ADP_c".to_string(),
                coefficient: -30.,
            },
        ]);
        assert!(spec.ends_with("| 30 ATP_c --> 30 ADP_c"));
    }

    #[test]
    fn bad_rows() {
        assert!(matches!(
            parse_biomass_table("h\nMAL_c\n"),
            Err(BiomassError::MissingColumn { line: 2 })
        ));
        assert!(matches!(
            parse_biomass_table("h\nMAL_c,abc\n"),
            Err(BiomassError::InvalidCoefficient { line: 2, .. })
        ));
        assert!(matches!(parse_biomass_table("header only\n"), Err(BiomassError::Empty)));
    }

    #[test]
    fn read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("biomass.csv");
        std::fs::write(&path, TABLE).unwrap();
        let spec = read_biomass_specification(&path).unwrap();
        assert!(spec.starts_with("New_biomass_tx, "));
    }
}
