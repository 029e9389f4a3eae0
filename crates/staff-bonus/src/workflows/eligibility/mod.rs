//! Occurrence ledger, rule catalog, and the bonus eligibility engine built on them.
//!
//! Data flows one way: the ledger supplies each employee's effective occurrences, the
//! catalog scores them, the evaluator turns the tally into a bonus percentage, and the
//! report aggregates evaluations across the active workforce.

pub mod catalog;
pub mod directory;
pub mod domain;
pub mod evaluation;
pub mod ledger;
pub mod report;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{
    default_rules, CatalogError, Rule, RuleCatalog, RuleCategory, RuleDefinition, RuleKind,
    RuleResolution,
};
pub use directory::{DirectoryError, EmployeeDirectory};
pub use domain::{
    DateRange, DateRangeError, Employee, EmployeeId, EmployeeRemoval, EmployeeRole,
    EmployeeUpdate, NewEmployee, NewOccurrence, Occurrence, OccurrenceId,
};
pub use evaluation::{
    BonusDecision, EliminationReason, EvaluationConfig, EvaluationEngine, EvaluationResult,
    ScoreComponent, MEDICAL_CERTIFICATE_CAP,
};
pub use ledger::{
    AnnulledSummary, AnnulmentRejection, LedgerError, OccurrenceEntry, OccurrenceFilter,
    OccurrenceLedger,
};
pub use report::{BonusReport, EmployeeEvaluation, OccurrenceDashboard, TypeCount};
pub use router::bonus_router;
pub use service::{BonusService, BonusServiceError};
