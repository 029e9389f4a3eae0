use serde::{Deserialize, Serialize};

use super::tally::TallySignals;

/// Verdict for one employee over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BonusDecision {
    FullBonus,
    Reduced { total_discount: f32 },
    Eliminated(EliminationReason),
}

impl BonusDecision {
    pub fn summary(&self) -> String {
        match self {
            BonusDecision::FullBonus => "full bonus".to_string(),
            BonusDecision::Reduced { total_discount } => {
                format!("bonus reduced by {total_discount:.1}%")
            }
            BonusDecision::Eliminated(reason) => reason.summary(),
        }
    }

    pub fn is_eliminated(&self) -> bool {
        matches!(self, BonusDecision::Eliminated(_))
    }

    /// Unrounded share of the bonus left, clamped to [0, 100].
    pub(crate) fn remaining_percent(&self) -> f32 {
        match self {
            BonusDecision::FullBonus => 100.0,
            BonusDecision::Reduced { total_discount } => {
                (100.0 - total_discount).clamp(0.0, 100.0)
            }
            BonusDecision::Eliminated(_) => 0.0,
        }
    }

    /// Display value, one decimal place.
    pub(crate) fn bonus_percent(&self) -> f32 {
        round_to_tenth(self.remaining_percent())
    }
}

/// Why a bonus was forfeited outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EliminationReason {
    EliminatingOccurrence {
        occurrence_type: String,
    },
    CapExceeded {
        occurrence_type: String,
        count: u32,
        cap: u32,
    },
}

impl EliminationReason {
    pub fn summary(&self) -> String {
        match self {
            EliminationReason::EliminatingOccurrence { occurrence_type } => {
                format!("bonus eliminated by {occurrence_type}")
            }
            EliminationReason::CapExceeded {
                occurrence_type,
                count,
                cap,
            } => format!("bonus eliminated: {count} {occurrence_type} exceeds the limit of {cap}"),
        }
    }
}

/// Eliminating occurrences win over exceeded caps, which win over discounts.
pub(crate) fn decide_outcome(signals: &TallySignals) -> BonusDecision {
    if let Some(reason) = &signals.eliminating {
        return BonusDecision::Eliminated(reason.clone());
    }

    if let Some(reason) = &signals.cap_exceeded {
        return BonusDecision::Eliminated(reason.clone());
    }

    if signals.total_discount > 0.0 {
        return BonusDecision::Reduced {
            total_discount: signals.total_discount,
        };
    }

    BonusDecision::FullBonus
}

fn round_to_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
