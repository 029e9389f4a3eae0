use std::collections::HashMap;

use super::super::catalog::{RuleCatalog, RuleKind, RuleResolution};
use super::super::domain::Occurrence;
use super::config::EvaluationConfig;
use super::policy::EliminationReason;
use super::ScoreComponent;

pub(crate) struct TallySignals {
    pub total_occurrences: u32,
    pub medical_certificates: u32,
    pub eliminating: Option<EliminationReason>,
    pub cap_exceeded: Option<EliminationReason>,
    pub total_discount: f32,
}

/// Counts effective occurrences per type, in catalog order, followed by unscored
/// types in the order they first appear.
fn count_by_type<'a>(
    occurrences: &[&'a Occurrence],
    catalog: &RuleCatalog,
) -> Vec<(&'a str, u32)> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    let mut unscored: Vec<&str> = Vec::new();

    for occurrence in occurrences {
        let kind = occurrence.occurrence_type.as_str();
        let count = counts.entry(kind).or_insert(0);
        if *count == 0 && !catalog.contains(kind) {
            unscored.push(kind);
        }
        *count = count.saturating_add(1);
    }

    let mut ordered: Vec<(&'a str, u32)> = Vec::with_capacity(counts.len());
    for rule in catalog.rules() {
        if let Some((kind, count)) = counts.get_key_value(rule.occurrence_type.as_str()) {
            ordered.push((*kind, *count));
        }
    }
    for kind in unscored {
        ordered.push((kind, counts[kind]));
    }
    ordered
}

/// Counts beyond `u32::MAX` pin at the maximum.
fn saturating_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

pub(crate) fn tally_occurrences(
    occurrences: &[&Occurrence],
    catalog: &RuleCatalog,
    config: &EvaluationConfig,
) -> (Vec<ScoreComponent>, TallySignals) {
    let mut components = Vec::new();
    let mut signals = TallySignals {
        total_occurrences: saturating_count(occurrences.len()),
        medical_certificates: 0,
        eliminating: None,
        cap_exceeded: None,
        total_discount: 0.0,
    };

    for (kind, count) in count_by_type(occurrences, catalog) {
        if kind == config.medical_certificate_type {
            signals.medical_certificates = count;
        }

        let rule = match catalog.resolve(kind) {
            RuleResolution::Scored(rule) => rule,
            RuleResolution::Unscored => {
                components.push(ScoreComponent {
                    occurrence_type: kind.to_string(),
                    category: None,
                    count,
                    discount: 0.0,
                    notes: "no rule configured, counted without discount".to_string(),
                });
                continue;
            }
        };

        match rule.kind {
            RuleKind::Eliminates => {
                signals
                    .eliminating
                    .get_or_insert_with(|| EliminationReason::EliminatingOccurrence {
                        occurrence_type: kind.to_string(),
                    });
                components.push(ScoreComponent {
                    occurrence_type: kind.to_string(),
                    category: Some(rule.category()),
                    count,
                    discount: 100.0,
                    notes: "eliminates the bonus".to_string(),
                });
            }
            RuleKind::Capped {
                cap_count,
                discount_percent,
            } if count > cap_count => {
                signals
                    .cap_exceeded
                    .get_or_insert_with(|| EliminationReason::CapExceeded {
                        occurrence_type: kind.to_string(),
                        count,
                        cap: cap_count,
                    });
                components.push(ScoreComponent {
                    occurrence_type: kind.to_string(),
                    category: Some(rule.category()),
                    count,
                    discount: 100.0,
                    notes: format!(
                        "{count} exceeds the limit of {cap_count} ({discount_percent}% each)"
                    ),
                });
            }
            RuleKind::Capped {
                cap_count,
                discount_percent,
            } => {
                let discount = count as f32 * discount_percent;
                signals.total_discount += discount;
                components.push(ScoreComponent {
                    occurrence_type: kind.to_string(),
                    category: Some(rule.category()),
                    count,
                    discount,
                    notes: format!(
                        "{count} within the limit of {cap_count}, {discount_percent}% each"
                    ),
                });
            }
            RuleKind::PercentageDiscount { discount_percent } => {
                let discount = count as f32 * discount_percent;
                signals.total_discount += discount;
                components.push(ScoreComponent {
                    occurrence_type: kind.to_string(),
                    category: Some(rule.category()),
                    count,
                    discount,
                    notes: format!("{count} x {discount_percent}%"),
                });
            }
        }
    }

    (components, signals)
}
