mod config;
mod policy;
mod tally;

pub use config::{EvaluationConfig, MEDICAL_CERTIFICATE_CAP};
pub use policy::{BonusDecision, EliminationReason};

use super::catalog::{RuleCatalog, RuleCategory};
use super::domain::Occurrence;
use policy::decide_outcome;
use serde::{Deserialize, Serialize};

/// Stateless evaluator applying a rule catalog to one employee's effective occurrences.
#[derive(Debug, Clone, Default)]
pub struct EvaluationEngine {
    config: EvaluationConfig,
}

impl EvaluationEngine {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn evaluate<'a, I>(&self, occurrences: I, catalog: &RuleCatalog) -> EvaluationResult
    where
        I: IntoIterator<Item = &'a Occurrence>,
    {
        let occurrences: Vec<&Occurrence> = occurrences.into_iter().collect();
        let (components, signals) = tally::tally_occurrences(&occurrences, catalog, &self.config);

        let decision = decide_outcome(&signals);
        let bonus_percent = decision.bonus_percent();
        // Rounding is for display; a residual below 0.05% still earns a bonus.
        let receives_bonus = decision.remaining_percent() > 0.0;

        EvaluationResult {
            total_effective_occurrences: signals.total_occurrences,
            medical_certificate_count: signals.medical_certificates,
            medical_certificate_cap: MEDICAL_CERTIFICATE_CAP,
            medical_certificate_cap_exceeded: signals.medical_certificates
                > MEDICAL_CERTIFICATE_CAP,
            bonus_percent,
            receives_bonus,
            decision,
            components,
        }
    }
}

/// Per-type line of an evaluation, kept for audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    #[serde(rename = "type")]
    pub occurrence_type: String,
    /// `None` when no rule exists for the type.
    pub category: Option<RuleCategory>,
    pub count: u32,
    pub discount: f32,
    pub notes: String,
}

/// Derived bonus standing of one employee; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub total_effective_occurrences: u32,
    pub medical_certificate_count: u32,
    pub medical_certificate_cap: u32,
    pub medical_certificate_cap_exceeded: bool,
    pub bonus_percent: f32,
    pub receives_bonus: bool,
    pub decision: BonusDecision,
    pub components: Vec<ScoreComponent>,
}
