use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Scoring behaviour attached to an occurrence type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleKind {
    /// A single effective occurrence removes the whole bonus.
    Eliminates,
    /// Up to `cap_count` occurrences cost `discount_percent` each; one more eliminates.
    Capped { cap_count: u32, discount_percent: f32 },
    PercentageDiscount { discount_percent: f32 },
}

impl RuleKind {
    pub fn category(&self) -> RuleCategory {
        match self {
            RuleKind::Eliminates => RuleCategory::Eliminates,
            RuleKind::Capped { .. } => RuleCategory::Capped,
            RuleKind::PercentageDiscount { .. } => RuleCategory::PercentageDiscount,
        }
    }

    /// Per-occurrence discount; `None` for eliminating rules.
    pub fn discount_percent(&self) -> Option<f32> {
        match self {
            RuleKind::Eliminates => None,
            RuleKind::Capped {
                discount_percent, ..
            }
            | RuleKind::PercentageDiscount { discount_percent } => Some(*discount_percent),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Eliminates,
    Capped,
    PercentageDiscount,
}

impl RuleCategory {
    pub fn label(&self) -> &'static str {
        match self {
            RuleCategory::Eliminates => "eliminates",
            RuleCategory::Capped => "capped",
            RuleCategory::PercentageDiscount => "percentage_discount",
        }
    }
}

/// Catalog entry keyed by occurrence type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RuleDefinition", into = "RuleDefinition")]
pub struct Rule {
    pub occurrence_type: String,
    pub kind: RuleKind,
    pub description: Option<String>,
}

impl Rule {
    pub fn eliminates(occurrence_type: impl Into<String>) -> Self {
        Self {
            occurrence_type: occurrence_type.into(),
            kind: RuleKind::Eliminates,
            description: None,
        }
    }

    pub fn capped(
        occurrence_type: impl Into<String>,
        cap_count: u32,
        discount_percent: f32,
    ) -> Self {
        Self {
            occurrence_type: occurrence_type.into(),
            kind: RuleKind::Capped {
                cap_count,
                discount_percent,
            },
            description: None,
        }
    }

    pub fn percentage_discount(occurrence_type: impl Into<String>, discount_percent: f32) -> Self {
        Self {
            occurrence_type: occurrence_type.into(),
            kind: RuleKind::PercentageDiscount { discount_percent },
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(&self) -> RuleCategory {
        self.kind.category()
    }

    /// Checks the invariants the variant shape cannot express on its own.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.occurrence_type.trim().is_empty() {
            return Err(CatalogError::InvalidRuleShape(
                "rule type must not be blank".to_string(),
            ));
        }

        if let Some(discount) = self.kind.discount_percent() {
            check_discount(&self.occurrence_type, discount)?;
        }

        Ok(())
    }
}

fn check_discount(occurrence_type: &str, discount: f32) -> Result<(), CatalogError> {
    if discount.is_finite() && (0.0..=100.0).contains(&discount) {
        Ok(())
    } else {
        Err(CatalogError::InvalidRuleShape(format!(
            "discount_percent for '{occurrence_type}' must be within [0, 100], got {discount}"
        )))
    }
}

/// Flat wire representation of a rule, validated into [`Rule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    #[serde(rename = "type")]
    pub occurrence_type: String,
    pub category: RuleCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TryFrom<RuleDefinition> for Rule {
    type Error = CatalogError;

    fn try_from(definition: RuleDefinition) -> Result<Self, Self::Error> {
        let RuleDefinition {
            occurrence_type,
            category,
            discount_percent,
            cap_count,
            description,
        } = definition;

        if cap_count.is_some() && category != RuleCategory::Capped {
            return Err(CatalogError::InvalidRuleShape(format!(
                "cap_count is only allowed on capped rules, '{occurrence_type}' is {}",
                category.label()
            )));
        }

        let kind = match category {
            RuleCategory::Eliminates => {
                if let Some(discount) = discount_percent {
                    check_discount(&occurrence_type, discount)?;
                }
                RuleKind::Eliminates
            }
            RuleCategory::Capped => {
                let cap_count = cap_count.ok_or_else(|| {
                    CatalogError::InvalidRuleShape(format!(
                        "capped rule '{occurrence_type}' requires cap_count"
                    ))
                })?;
                let discount_percent = discount_percent.ok_or_else(|| {
                    CatalogError::InvalidRuleShape(format!(
                        "capped rule '{occurrence_type}' requires discount_percent"
                    ))
                })?;
                RuleKind::Capped {
                    cap_count,
                    discount_percent,
                }
            }
            RuleCategory::PercentageDiscount => {
                let discount_percent = discount_percent.ok_or_else(|| {
                    CatalogError::InvalidRuleShape(format!(
                        "percentage_discount rule '{occurrence_type}' requires discount_percent"
                    ))
                })?;
                RuleKind::PercentageDiscount { discount_percent }
            }
        };

        let rule = Rule {
            occurrence_type: occurrence_type.trim().to_string(),
            kind,
            description,
        };
        rule.validate()?;
        Ok(rule)
    }
}

impl From<Rule> for RuleDefinition {
    fn from(rule: Rule) -> Self {
        let cap_count = match rule.kind {
            RuleKind::Capped { cap_count, .. } => Some(cap_count),
            _ => None,
        };

        RuleDefinition {
            category: rule.kind.category(),
            discount_percent: rule.kind.discount_percent(),
            cap_count,
            occurrence_type: rule.occurrence_type,
            description: rule.description,
        }
    }
}

/// Result of looking up the rule for an occurrence type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleResolution<'a> {
    Scored(&'a Rule),
    /// No rule configured; the occurrence counts but costs nothing.
    Unscored,
}

impl<'a> RuleResolution<'a> {
    pub fn rule(self) -> Option<&'a Rule> {
        match self {
            RuleResolution::Scored(rule) => Some(rule),
            RuleResolution::Unscored => None,
        }
    }
}

/// Active scoring rules in insertion order, unique by occurrence type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
}

impl RuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with the standard attendance policy.
    pub fn with_defaults() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    pub fn add_rule(&mut self, rule: Rule) -> Result<(), CatalogError> {
        rule.validate()?;
        if self.contains(&rule.occurrence_type) {
            return Err(CatalogError::DuplicateRuleType(rule.occurrence_type));
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn add_definition(&mut self, definition: RuleDefinition) -> Result<Rule, CatalogError> {
        let rule = Rule::try_from(definition)?;
        self.add_rule(rule.clone())?;
        Ok(rule)
    }

    pub fn remove_rule(&mut self, occurrence_type: &str) -> Result<Rule, CatalogError> {
        let position = self
            .rules
            .iter()
            .position(|rule| rule.occurrence_type == occurrence_type)
            .ok_or_else(|| CatalogError::RuleNotFound(occurrence_type.to_string()))?;
        Ok(self.rules.remove(position))
    }

    /// Rules in insertion order. Each call starts a fresh pass.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.rules.iter()
    }

    pub fn resolve(&self, occurrence_type: &str) -> RuleResolution<'_> {
        self.get(occurrence_type)
            .map(RuleResolution::Scored)
            .unwrap_or(RuleResolution::Unscored)
    }

    pub fn get(&self, occurrence_type: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|rule| rule.occurrence_type == occurrence_type)
    }

    pub fn contains(&self, occurrence_type: &str) -> bool {
        self.get(occurrence_type).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

pub fn default_rules() -> Vec<Rule> {
    let eliminating = [
        ("falta", "Unexcused absence forfeits the bonus"),
        ("advertencia", "Written warning forfeits the bonus"),
        ("suspensao", "Suspension forfeits the bonus"),
        ("atraso", "Late arrival forfeits the bonus"),
        ("saida_antecipada", "Early departure forfeits the bonus"),
    ];

    let mut rules: Vec<Rule> = eliminating
        .into_iter()
        .map(|(kind, description)| Rule::eliminates(kind).with_description(description))
        .collect();

    rules.push(
        Rule::capped("atestado", 2, 0.0)
            .with_description("More than two medical certificates forfeit the bonus"),
    );

    let discounts = [
        ("reclamacao_qualidade", 10.0, "Quality complaint reduces the bonus by 10%"),
        ("esqueceu_ponto", 10.0, "Missed time clock punch reduces the bonus by 10%"),
        ("avaria_menor", 10.0, "Minor equipment damage reduces the bonus by 10%"),
        ("avaria_grave", 20.0, "Severe equipment damage reduces the bonus by 20%"),
    ];
    rules.extend(discounts.into_iter().map(|(kind, discount, description)| {
        Rule::percentage_discount(kind, discount).with_description(description)
    }));

    rules
}

/// Rule catalog failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("a rule for occurrence type '{0}' already exists")]
    DuplicateRuleType(String),
    #[error("invalid rule: {0}")]
    InvalidRuleShape(String),
    #[error("no rule configured for occurrence type '{0}'")]
    RuleNotFound(String),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::DuplicateRuleType(_) => ErrorKind::Conflict,
            CatalogError::InvalidRuleShape(_) => ErrorKind::InvalidInput,
            CatalogError::RuleNotFound(_) => ErrorKind::NotFound,
        }
    }
}
