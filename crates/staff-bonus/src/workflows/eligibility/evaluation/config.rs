use serde::{Deserialize, Serialize};

use crate::config::{BonusConfig, DEFAULT_MEDICAL_CERTIFICATE_TYPE};

/// Medical certificates tolerated in a period. Informational only; never configurable.
pub const MEDICAL_CERTIFICATE_CAP: u32 = 2;

/// Evaluation settings that live outside the rule catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub medical_certificate_type: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            medical_certificate_type: DEFAULT_MEDICAL_CERTIFICATE_TYPE.to_string(),
        }
    }
}

impl From<&BonusConfig> for EvaluationConfig {
    fn from(config: &BonusConfig) -> Self {
        Self {
            medical_certificate_type: config.medical_certificate_type.clone(),
        }
    }
}
