//! Physiological bounds and permanent flux relations of the dual-cell model
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::dual_cell::DualCellError;
use crate::metabolic_model::model::{Model, ModelError};
use crate::optimize::constraint::Constraint;

fn default_k1() -> f64 {
    0.0049
}

fn default_k2() -> f64 {
    2.7852
}

fn default_ratio() -> f64 {
    3.
}

/// Light dependent maintenance: `maintenance = k1 * photon + k2`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceCost {
    /// Id of the registered constraint
    pub id: String,
    /// Light capture reaction
    pub photon: String,
    /// Maintenance (ATP hydrolysis) reaction
    pub maintenance: String,
    #[serde(default = "default_k1")]
    pub k1: f64,
    #[serde(default = "default_k2")]
    pub k2: f64,
}

impl MaintenanceCost {
    pub fn new(id: &str, photon: &str, maintenance: &str) -> Self {
        MaintenanceCost {
            id: id.to_string(),
            photon: photon.to_string(),
            maintenance: maintenance.to_string(),
            k1: default_k1(),
            k2: default_k2(),
        }
    }

    /// `{prefix}Photon_tx` driving `{prefix}ATPase_tx`
    pub fn for_partition(prefix: &str) -> Self {
        MaintenanceCost::new(
            &format!("{prefix}maintenance"),
            &format!("{prefix}Photon_tx"),
            &format!("{prefix}ATPase_tx"),
        )
    }

    pub fn to_constraint(&self) -> Constraint {
        Constraint::new_equality(
            &self.id,
            &[self.photon.as_str(), self.maintenance.as_str()],
            &[self.k1, -1.],
            -self.k2,
        )
    }

    fn reactions(&self) -> Vec<&str> {
        vec![self.photon.as_str(), self.maintenance.as_str()]
    }
}

/// Fixed ratio between an energy flux and the sum of reducing equivalent fluxes:
/// `energy = ratio * sum(carriers)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyRatio {
    pub id: String,
    pub energy: String,
    pub carriers: Vec<String>,
    #[serde(default = "default_ratio")]
    pub ratio: f64,
}

impl EnergyRatio {
    pub fn new(id: &str, energy: &str, carriers: &[&str]) -> Self {
        EnergyRatio {
            id: id.to_string(),
            energy: energy.to_string(),
            carriers: carriers.iter().map(|c| c.to_string()).collect(),
            ratio: default_ratio(),
        }
    }

    /// ATP:NADPH of 3:1 over the cytosolic, plastidic and mitochondrial NADPH drains
    pub fn for_partition(prefix: &str) -> Self {
        EnergyRatio {
            id: format!("{prefix}ATP_NADPH_ratio"),
            energy: format!("{prefix}ATPase_tx"),
            carriers: ["NADPHoxc_tx", "NADPHoxp_tx", "NADPHoxm_tx"]
                .iter()
                .map(|c| format!("{prefix}{c}"))
                .collect(),
            ratio: default_ratio(),
        }
    }

    pub fn to_constraint(&self) -> Constraint {
        let mut variables = vec![self.energy.as_str()];
        let mut coefficients = vec![1.];
        for carrier in &self.carriers {
            variables.push(carrier.as_str());
            coefficients.push(-self.ratio);
        }
        Constraint::new_equality(&self.id, &variables, &coefficients, 0.)
    }

    fn reactions(&self) -> Vec<&str> {
        std::iter::once(self.energy.as_str())
            .chain(self.carriers.iter().map(String::as_str))
            .collect()
    }
}

/// Scenario description applied by a [`Configurator`]
///
/// Deserializes from JSON such as
/// `{"bounds": {"B_CO2_tx": [0.0, 0.0]}, "maintenance": [...], "energy_ratios": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfiguratorConfig {
    /// Reaction id to (lower, upper) flux bounds
    #[serde(default)]
    pub bounds: IndexMap<String, (f64, f64)>,
    #[serde(default)]
    pub maintenance: Vec<MaintenanceCost>,
    #[serde(default)]
    pub energy_ratios: Vec<EnergyRatio>,
}

impl ConfiguratorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, DualCellError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self, DualCellError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Later entries win for bounds, relations are appended
    pub fn extend(&mut self, other: ConfiguratorConfig) {
        self.bounds.extend(other.bounds);
        self.maintenance.extend(other.maintenance);
        self.energy_ratios.extend(other.energy_ratios);
    }

    fn constraints(&self) -> impl Iterator<Item = (Constraint, Vec<&str>)> + '_ {
        self.maintenance
            .iter()
            .map(|m| (m.to_constraint(), m.reactions()))
            .chain(
                self.energy_ratios
                    .iter()
                    .map(|r| (r.to_constraint(), r.reactions())),
            )
    }
}

/// Applies a [`ConfiguratorConfig`] to a model
#[derive(Debug, Clone)]
pub struct Configurator {
    config: ConfiguratorConfig,
}

impl Configurator {
    pub fn new(config: ConfiguratorConfig) -> Self {
        Configurator { config }
    }

    pub fn config(&self) -> &ConfiguratorConfig {
        &self.config
    }

    /// Set the bounds and register the relations
    ///
    /// Every referenced reaction and every bound pair is checked before the model is
    /// touched, so a failing configuration leaves the model as it was. Applying the same
    /// configuration twice has no further effect.
    pub fn apply(&self, model: &mut Model) -> Result<(), DualCellError> {
        self.check(model)?;
        for (reaction, (lower_bound, upper_bound)) in &self.config.bounds {
            model.set_bounds(reaction, *lower_bound, *upper_bound)?;
            debug!("Bounds of {} set to [{}, {}]", reaction, lower_bound, upper_bound);
        }
        let mut registered = 0;
        for (constraint, _) in self.config.constraints() {
            if model.add_constraint(constraint)? {
                registered += 1;
            }
        }
        info!(
            "Configured {} reaction bounds and {} new constraints",
            self.config.bounds.len(),
            registered
        );
        Ok(())
    }

    fn check(&self, model: &Model) -> Result<(), DualCellError> {
        for (reaction, (lower_bound, upper_bound)) in &self.config.bounds {
            model.reaction(reaction)?;
            if lower_bound > upper_bound || lower_bound.is_nan() || upper_bound.is_nan() {
                return Err(ModelError::InvalidBounds {
                    id: reaction.clone(),
                    lower_bound: *lower_bound,
                    upper_bound: *upper_bound,
                }
                .into());
            }
        }
        for (constraint, reactions) in self.config.constraints() {
            for reaction in reactions {
                model.reaction(reaction)?;
            }
            if model.metabolites.contains_key(constraint.get_id()) {
                return Err(ModelError::DuplicateId {
                    kind: "constraint",
                    id: constraint.get_id().to_string(),
                }
                .into());
            }
            if let Some(existing) = model.constraint(constraint.get_id()) {
                if *existing != constraint {
                    return Err(ModelError::ConstraintAlreadyExists(
                        constraint.get_id().to_string(),
                    )
                    .into());
                }
            }
        }
        Ok(())
    }
}
