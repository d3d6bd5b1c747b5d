//! This module provides the metabolite struct representing a metabolite

use std::hash::Hash;

use derive_builder::Builder;

/// Represents a metabolite
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Metabolite {
    /// Used to identify the metabolite (must be unique)
    pub id: String,
    /// Human Readable name of the metabolite
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Which compartment the metabolite is in
    #[builder(default = "None")]
    pub compartment: Option<String>,
    /// Electrical charge of the Metabolite
    #[builder(default = "0")]
    pub charge: i32,
    /// Chemical Formula of the metabolite
    #[builder(default = "None")]
    pub formula: Option<String>,
    /// Notes about the metabolite
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Metabolite annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
}

impl Metabolite {
    /// Create a metabolite with only an id and a compartment
    pub fn new(id: &str, compartment: Option<&str>) -> Metabolite {
        Metabolite {
            id: id.to_string(),
            name: None,
            compartment: compartment.map(str::to_string),
            charge: 0,
            formula: None,
            notes: None,
            annotation: None,
        }
    }

    /// Compartment code of the metabolite
    ///
    /// The compartment metadata wins when present, otherwise the code is the identifier
    /// suffix after the last `_` (so `MAL_c` is in `c` and `M_PYR_mc` is in `mc`).
    ///
    /// # Examples
    /// ```rust
    /// use dualcell_core::metabolic_model::metabolite::Metabolite;
    /// assert_eq!(Metabolite::new("MAL_c", None).compartment_code(), Some("c"));
    /// assert_eq!(Metabolite::new("MAL_c", Some("p")).compartment_code(), Some("p"));
    /// assert_eq!(Metabolite::new("Photon", None).compartment_code(), None);
    /// ```
    pub fn compartment_code(&self) -> Option<&str> {
        match self.compartment.as_deref() {
            Some(code) if !code.is_empty() => Some(code),
            _ => compartment_from_id(&self.id),
        }
    }
}

/// Compartment suffix of an identifier, the text after the last `_`
pub fn compartment_from_id(id: &str) -> Option<&str> {
    match id.rsplit_once('_') {
        Some((_, suffix)) if !suffix.is_empty() => Some(suffix),
        _ => None,
    }
}

impl Hash for Metabolite {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state); // Hash by id
                             // If the metabolite has an associated compartment, also hash by that
        if let Some(ref compartment) = self.compartment {
            compartment.hash(state)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compartment_from_suffix() {
        assert_eq!(compartment_from_id("M_PYRUVATE_mc"), Some("mc"));
        assert_eq!(compartment_from_id("CO2_"), None);
        assert_eq!(compartment_from_id("CO2"), None);
    }

    #[test]
    fn builder_defaults() {
        let met = MetaboliteBuilder::default()
            .id("hnu_c".to_string())
            .build()
            .unwrap();
        assert_eq!(met.charge, 0);
        assert_eq!(met.compartment_code(), Some("c"));
    }
}
