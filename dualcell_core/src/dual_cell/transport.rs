//! Synthesis of coupling transporters between the two cell types
use indexmap::IndexSet;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::dual_cell::DualCellError;
use crate::io::reaction_string::{add_reaction_from_str, ReactionStringError};
use crate::metabolic_model::metabolite::compartment_from_id;
use crate::metabolic_model::model::Model;

/// Decides from a compartment code whether a metabolite may cross between the cells
pub trait CouplingEligibility {
    fn is_eligible(&self, compartment: &str) -> bool;
}

impl<F: Fn(&str) -> bool> CouplingEligibility for F {
    fn is_eligible(&self, compartment: &str) -> bool {
        self(compartment)
    }
}

/// Cytosolic pools exchange, the shared compartment and organelles do not
///
/// The tests are substring tests on the compartment code: with the defaults `c` is
/// eligible, `mc` is not (shared), and neither are `p` or `m`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CytosolEligibility {
    pub marker: String,
    pub shared: String,
}

impl Default for CytosolEligibility {
    fn default() -> Self {
        CytosolEligibility {
            marker: "c".to_string(),
            shared: "mc".to_string(),
        }
    }
}

impl CouplingEligibility for CytosolEligibility {
    fn is_eligible(&self, compartment: &str) -> bool {
        compartment.contains(&self.marker) && !compartment.contains(&self.shared)
    }
}

/// What to do when a coupling reaction cannot be created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Stop at the first failure and return it
    #[default]
    Abort,
    /// Record the failure in the report and carry on
    Skip,
}

/// Settings of a [`TransporterSynthesis`] run
///
/// Defaults: `M_` to `B_` with `MB_` coupling ids, no exclusions, [`CytosolEligibility`],
/// [`FailurePolicy::Abort`].
pub struct SynthesisConfig {
    /// Prefix of the partition whose metabolites are iterated
    pub source_prefix: String,
    /// Prefix of the partition metabolites are transported to
    pub target_prefix: String,
    /// Prefix of the coupling reaction ids
    pub coupling_prefix: String,
    /// Metabolite families that never get a transporter
    pub exclusion: IndexSet<String>,
    pub eligibility: Box<dyn CouplingEligibility>,
    pub failure_policy: FailurePolicy,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        SynthesisConfig {
            source_prefix: "M_".to_string(),
            target_prefix: "B_".to_string(),
            coupling_prefix: "MB_".to_string(),
            exclusion: IndexSet::new(),
            eligibility: Box::new(CytosolEligibility::default()),
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl SynthesisConfig {
    pub fn with_prefixes(mut self, source: &str, target: &str, coupling: &str) -> Self {
        self.source_prefix = source.to_string();
        self.target_prefix = target.to_string();
        self.coupling_prefix = coupling.to_string();
        self
    }

    pub fn with_exclusion(mut self, exclusion: IndexSet<String>) -> Self {
        self.exclusion = exclusion;
        self
    }

    pub fn with_eligibility<E: CouplingEligibility + 'static>(mut self, eligibility: E) -> Self {
        self.eligibility = Box::new(eligibility);
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }
}

impl std::fmt::Debug for SynthesisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisConfig")
            .field("source_prefix", &self.source_prefix)
            .field("target_prefix", &self.target_prefix)
            .field("coupling_prefix", &self.coupling_prefix)
            .field("exclusion", &self.exclusion)
            .field("failure_policy", &self.failure_policy)
            .finish_non_exhaustive()
    }
}

/// Outcome of a synthesis run, base identifiers (prefix stripped) except for `created`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesisReport {
    /// Ids of the coupling reactions added to the model
    pub created: Vec<String>,
    pub excluded: Vec<String>,
    /// Coupling reaction already present
    pub existing: Vec<String>,
    pub ineligible: Vec<String>,
    /// Only filled with [`FailurePolicy::Skip`]
    pub failed: Vec<(String, ReactionStringError)>,
}

/// Family token of a base metabolite id: the part before the first `_`
///
/// # Examples
/// ```rust
/// use dualcell_core::dual_cell::transport::family_token;
/// assert_eq!(family_token("MAL_c"), "MAL");
/// assert_eq!(family_token("CO2_c"), "CO2");
/// assert_eq!(family_token("Photon"), "Photon");
/// ```
pub fn family_token(base_id: &str) -> &str {
    match base_id.find('_') {
        Some(end) => &base_id[..end],
        None => base_id,
    }
}

/// Creates reversible `source <-> target` reactions for shared metabolites
pub struct TransporterSynthesis {
    config: SynthesisConfig,
}

impl TransporterSynthesis {
    pub fn new(config: SynthesisConfig) -> Self {
        TransporterSynthesis { config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Id of the coupling reaction for a base metabolite id
    pub fn coupling_id(&self, base_id: &str) -> String {
        format!("{}{}", self.config.coupling_prefix, base_id)
    }

    /// Add the missing coupling reactions to a merged model
    ///
    /// Each metabolite of the source partition is skipped when its family is excluded,
    /// when its coupling reaction exists, or when its compartment is not eligible, in that
    /// order. Running this twice adds nothing the second time.
    pub fn run(&self, model: &mut Model) -> Result<SynthesisReport, DualCellError> {
        let config = &self.config;
        let candidates: Vec<(String, Option<String>)> = model
            .metabolites
            .values()
            .filter(|m| m.id.starts_with(&config.source_prefix))
            .map(|m| (m.id.clone(), m.compartment.clone().filter(|c| !c.is_empty())))
            .collect();

        let mut report = SynthesisReport::default();
        for (id, compartment) in candidates {
            let base = &id[config.source_prefix.len()..];
            if config.exclusion.contains(family_token(base)) {
                debug!("{} excluded from coupling", base);
                report.excluded.push(base.to_string());
                continue;
            }
            let coupling_id = self.coupling_id(base);
            if model.reactions.contains_key(&coupling_id) {
                report.existing.push(base.to_string());
                continue;
            }
            // Without metadata the code comes from the unprefixed id
            let compartment = compartment.or_else(|| compartment_from_id(base).map(str::to_string));
            if !compartment.is_some_and(|c| config.eligibility.is_eligible(&c)) {
                report.ineligible.push(base.to_string());
                continue;
            }
            match add_reaction_from_str(model, &self.specification(&coupling_id, base)) {
                Ok(created) => {
                    model.reaction(&created)?;
                    debug!("Created coupling reaction {}", created);
                    report.created.push(created);
                }
                Err(err) => match config.failure_policy {
                    FailurePolicy::Abort => return Err(err.into()),
                    FailurePolicy::Skip => {
                        warn!("Unable to create coupling reaction for {}: {}", base, err);
                        report.failed.push((base.to_string(), err));
                    }
                },
            }
        }
        info!(
            "Coupling synthesis: {} created, {} excluded, {} existing, {} ineligible, {} failed",
            report.created.len(),
            report.excluded.len(),
            report.existing.len(),
            report.ineligible.len(),
            report.failed.len()
        );
        Ok(report)
    }

    fn specification(&self, coupling_id: &str, base: &str) -> String {
        let source = &self.config.source_prefix;
        let target = &self.config.target_prefix;
        format!(
            "{coupling_id}, {base} {}/{} cell transporter | {source}{base} <-> {target}{base}",
            source.trim_end_matches('_'),
            target.trim_end_matches('_'),
        )
    }
}
