//! Assembly of a two cell type (mesophyll / bundle sheath) model from one base network
//!
//! The pipeline runs [`partition`] twice, [`merge`]s the copies, links the shared cytosolic
//! metabolites with [`TransporterSynthesis`], and applies physiological bounds and relations
//! with a [`Configurator`]. [`simulate`] then optimizes light/nitrogen scenarios without
//! altering the configured model. [`DualCellBuilder`] chains all of it.
use thiserror::Error;

use crate::io::biomass::BiomassError;
use crate::io::exclusion::ExclusionError;
use crate::io::json::JsonError;
use crate::io::reaction_string::ReactionStringError;
use crate::metabolic_model::model::ModelError;
use crate::optimize::problem::ProblemError;
use crate::optimize::solvers::SolverError;

pub mod builder;
pub mod configurator;
pub mod merge;
pub mod partition;
pub mod presets;
pub mod simulation;
pub mod transport;

pub use builder::{DualCell, DualCellBuilder};
pub use configurator::{Configurator, ConfiguratorConfig, EnergyRatio, MaintenanceCost};
pub use merge::merge;
pub use partition::partition;
pub use simulation::{simulate, simulate_many, Scenario, ScenarioReactions};
pub use transport::{
    CouplingEligibility, CytosolEligibility, FailurePolicy, SynthesisConfig, SynthesisReport,
    TransporterSynthesis,
};

/// Errors of the dual-cell pipeline
#[derive(Debug, Error)]
pub enum DualCellError {
    /// The networks could not be partitioned or merged, no usable model exists
    #[error("Unable to construct the dual-cell model: {0}")]
    Construction(#[from] ConstructionError),
    /// An entity expected to exist is missing
    #[error("Missing {kind} {id}")]
    Reference { kind: &'static str, id: String },
    /// A reaction specification was rejected
    #[error("Invalid reaction specification: {0}")]
    Specification(#[from] ReactionStringError),
    /// A bound or constraint was rejected by the model
    #[error("Invalid configuration: {0}")]
    Configuration(ModelError),
    /// The solver could not run
    #[error("Solver failure: {0}")]
    Solver(#[from] SolverError),
    /// An input file could not be read
    #[error("Unable to read input: {0}")]
    Io(#[from] std::io::Error),
    /// A JSON configuration is malformed
    #[error("Invalid configuration file: {0}")]
    ConfigurationFormat(#[from] serde_json::Error),
    #[error("Unable to read model: {0}")]
    Json(#[from] JsonError),
    #[error("Unable to read exclusion list: {0}")]
    Exclusion(#[from] ExclusionError),
    #[error("Unable to read biomass composition: {0}")]
    Biomass(#[from] BiomassError),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("Partition prefix must not be empty")]
    EmptyPrefix,
    #[error("Identifier collision: {kind} {id} exists in both networks")]
    Collision { kind: &'static str, id: String },
    #[error("Network is inconsistent: {0}")]
    Inconsistent(ModelError),
}

impl From<ModelError> for DualCellError {
    fn from(value: ModelError) -> Self {
        match value {
            ModelError::ReactionNotFound(id) => DualCellError::Reference {
                kind: "reaction",
                id,
            },
            ModelError::MetaboliteNotFound(id) => DualCellError::Reference {
                kind: "metabolite",
                id,
            },
            ModelError::GeneNotFound(id) => DualCellError::Reference { kind: "gene", id },
            ModelError::DuplicateId { kind, id } => {
                ConstructionError::Collision { kind, id }.into()
            }
            ModelError::KeyMismatch(_) => ConstructionError::Inconsistent(value).into(),
            ModelError::Solver(err) | ModelError::Problem(ProblemError::Solver(err)) => {
                DualCellError::Solver(err)
            }
            other => DualCellError::Configuration(other),
        }
    }
}
