use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::catalog::{CatalogError, Rule, RuleCatalog, RuleDefinition};
use super::directory::{DirectoryError, EmployeeDirectory};
use super::domain::{
    DateRange, DateRangeError, Employee, EmployeeId, EmployeeRemoval, EmployeeUpdate,
    NewEmployee, NewOccurrence, Occurrence, OccurrenceId,
};
use super::evaluation::{EvaluationConfig, EvaluationEngine};
use super::ledger::{LedgerError, OccurrenceEntry, OccurrenceFilter, OccurrenceLedger};
use super::report::{self, BonusReport, EmployeeEvaluation, OccurrenceDashboard};
use crate::config::BonusConfig;
use crate::error::ErrorKind;

/// Facade composing the employee directory, rule catalog, occurrence ledger, and evaluator.
///
/// Catalog and ledger writes are serialized behind their locks; reads share them. When both
/// are needed the catalog lock is always taken first.
pub struct BonusService<D> {
    directory: Arc<D>,
    catalog: RwLock<RuleCatalog>,
    ledger: RwLock<OccurrenceLedger>,
    engine: EvaluationEngine,
}

impl<D> BonusService<D>
where
    D: EmployeeDirectory + 'static,
{
    pub fn new(
        directory: Arc<D>,
        catalog: RuleCatalog,
        ledger: OccurrenceLedger,
        config: EvaluationConfig,
    ) -> Self {
        Self {
            directory,
            catalog: RwLock::new(catalog),
            ledger: RwLock::new(ledger),
            engine: EvaluationEngine::new(config),
        }
    }

    /// Empty ledger, catalog seeded according to `config`.
    pub fn from_config(directory: Arc<D>, config: &BonusConfig) -> Self {
        let catalog = if config.seed_default_rules {
            RuleCatalog::with_defaults()
        } else {
            RuleCatalog::new()
        };
        Self::new(
            directory,
            catalog,
            OccurrenceLedger::new(),
            EvaluationConfig::from(config),
        )
    }

    fn catalog(&self) -> RwLockReadGuard<'_, RuleCatalog> {
        self.catalog.read().expect("rule catalog lock poisoned")
    }

    fn catalog_mut(&self) -> RwLockWriteGuard<'_, RuleCatalog> {
        self.catalog.write().expect("rule catalog lock poisoned")
    }

    fn ledger(&self) -> RwLockReadGuard<'_, OccurrenceLedger> {
        self.ledger.read().expect("occurrence ledger lock poisoned")
    }

    fn ledger_mut(&self) -> RwLockWriteGuard<'_, OccurrenceLedger> {
        self.ledger.write().expect("occurrence ledger lock poisoned")
    }

    fn require_employee(&self, id: &EmployeeId) -> Result<Employee, BonusServiceError> {
        self.directory
            .fetch(id)?
            .ok_or_else(|| BonusServiceError::EmployeeNotFound(id.clone()))
    }

    pub fn register_employee(&self, request: NewEmployee) -> Result<Employee, BonusServiceError> {
        let id = request.id.0.trim();
        let name = request.name.trim();
        if id.is_empty() {
            return Err(BonusServiceError::InvalidEmployee(
                "employee id must not be blank".to_string(),
            ));
        }
        if name.is_empty() {
            return Err(BonusServiceError::InvalidEmployee(
                "employee name must not be blank".to_string(),
            ));
        }

        let employee = Employee {
            id: EmployeeId(id.to_string()),
            name: name.to_string(),
            role: request.role,
            active: true,
        };
        let stored = self.directory.insert(employee)?;
        info!(employee_id = %stored.id, "employee registered");
        Ok(stored)
    }

    pub fn update_employee(
        &self,
        id: &EmployeeId,
        update: EmployeeUpdate,
    ) -> Result<Employee, BonusServiceError> {
        if update.is_empty() {
            return Err(BonusServiceError::InvalidEmployee(
                "no fields to update".to_string(),
            ));
        }
        if update
            .name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(BonusServiceError::InvalidEmployee(
                "employee name must not be blank".to_string(),
            ));
        }

        let mut employee = self.require_employee(id)?;
        update.apply(&mut employee);
        self.directory.update(employee.clone())?;
        info!(employee_id = %employee.id, active = employee.active, "employee updated");
        Ok(employee)
    }

    pub fn employee(&self, id: &EmployeeId) -> Result<Employee, BonusServiceError> {
        self.require_employee(id)
    }

    pub fn employees(&self, active_only: bool) -> Result<Vec<Employee>, BonusServiceError> {
        Ok(self.directory.list(active_only)?)
    }

    /// Deletes an employee without history; employees with occurrences are deactivated.
    pub fn remove_employee(&self, id: &EmployeeId) -> Result<EmployeeRemoval, BonusServiceError> {
        // Held for the whole check-and-write so no occurrence lands in between.
        let ledger = self.ledger_mut();
        let mut employee = self.require_employee(id)?;

        if ledger.has_history(id) {
            employee.active = false;
            self.directory.update(employee)?;
            info!(employee_id = %id, "employee with history deactivated");
            Ok(EmployeeRemoval::Deactivated)
        } else {
            self.directory.delete(id)?;
            info!(employee_id = %id, "employee deleted");
            Ok(EmployeeRemoval::Deleted)
        }
    }

    pub fn record_occurrence(
        &self,
        request: NewOccurrence,
    ) -> Result<Occurrence, BonusServiceError> {
        let catalog = self.catalog();
        let mut ledger = self.ledger_mut();

        self.require_employee(&request.employee_id)?;
        if !catalog.contains(&request.occurrence_type) {
            warn!(
                employee_id = %request.employee_id,
                occurrence_type = %request.occurrence_type,
                "occurrence rejected: type not in rule catalog"
            );
            return Err(BonusServiceError::UnknownOccurrenceType(
                request.occurrence_type,
            ));
        }

        let occurrence = ledger.record(request).map_err(|error| {
            warn!(%error, "occurrence rejected");
            error
        })?;
        info!(
            occurrence_id = %occurrence.id,
            employee_id = %occurrence.employee_id,
            occurrence_type = %occurrence.occurrence_type,
            annuls = ?occurrence.annuls.map(|id| id.0),
            "occurrence recorded"
        );
        Ok(occurrence)
    }

    pub fn cancel_occurrence(&self, id: OccurrenceId) -> Result<Occurrence, BonusServiceError> {
        let removed = self.ledger_mut().cancel(id).map_err(|error| {
            warn!(%error, "occurrence cancellation refused");
            error
        })?;
        info!(
            occurrence_id = %removed.id,
            employee_id = %removed.employee_id,
            restored = ?removed.annuls.map(|id| id.0),
            "occurrence cancelled"
        );
        Ok(removed)
    }

    pub fn occurrences(&self, filter: &OccurrenceFilter) -> Vec<OccurrenceEntry> {
        self.ledger().entries(filter)
    }

    pub fn pending_occurrences(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<Occurrence>, BonusServiceError> {
        self.require_employee(employee_id)?;
        Ok(self
            .ledger()
            .pending_occurrences_for(employee_id)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn add_rule(&self, definition: RuleDefinition) -> Result<Rule, BonusServiceError> {
        let rule = self.catalog_mut().add_definition(definition).map_err(|error| {
            warn!(%error, "rule rejected");
            error
        })?;
        info!(
            occurrence_type = %rule.occurrence_type,
            category = rule.category().label(),
            "rule added"
        );
        Ok(rule)
    }

    /// Existing occurrences of the removed type become unscored on the next evaluation.
    pub fn remove_rule(&self, occurrence_type: &str) -> Result<Rule, BonusServiceError> {
        let rule = self.catalog_mut().remove_rule(occurrence_type)?;
        info!(occurrence_type = %rule.occurrence_type, "rule removed");
        Ok(rule)
    }

    pub fn rules(&self) -> Vec<Rule> {
        self.catalog().rules().cloned().collect()
    }

    pub fn evaluate(
        &self,
        employee_id: &EmployeeId,
        range: DateRange,
    ) -> Result<EmployeeEvaluation, BonusServiceError> {
        let employee = self.require_employee(employee_id)?;
        let catalog = self.catalog();
        let ledger = self.ledger();

        let evaluation =
            report::evaluate_employee(&employee, &range, &ledger, &catalog, &self.engine);
        debug!(
            employee_id = %employee.id,
            bonus_percent = evaluation.result.bonus_percent,
            decision = %evaluation.result.decision.summary(),
            "employee evaluated"
        );
        Ok(evaluation)
    }

    pub fn generate_report(&self, range: DateRange) -> Result<BonusReport, BonusServiceError> {
        let employees = self.directory.list(true)?;
        let catalog = self.catalog();
        let ledger = self.ledger();

        let report = report::generate(range, &employees, &ledger, &catalog, &self.engine);
        debug!(
            start = %range.start(),
            end = %range.end(),
            total = report.total_employees,
            receiving = report.receiving_count,
            "bonus report generated"
        );
        Ok(report)
    }

    pub fn dashboard(&self, today: NaiveDate) -> Result<OccurrenceDashboard, BonusServiceError> {
        let active_employees = self.directory.list(true)?.len();
        Ok(report::build_dashboard(today, active_employees, &self.ledger()))
    }
}

/// Error raised by the bonus service. Every variant maps to a stable [`ErrorKind`].
#[derive(Debug, thiserror::Error)]
pub enum BonusServiceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    InvalidDateRange(#[from] DateRangeError),
    #[error("employee {0} not found")]
    EmployeeNotFound(EmployeeId),
    #[error("occurrence type '{0}' has no rule in the catalog")]
    UnknownOccurrenceType(String),
    #[error("invalid employee: {0}")]
    InvalidEmployee(String),
}

impl BonusServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BonusServiceError::Catalog(error) => error.kind(),
            BonusServiceError::Ledger(error) => error.kind(),
            BonusServiceError::Directory(error) => error.kind(),
            BonusServiceError::InvalidDateRange(error) => error.kind(),
            BonusServiceError::EmployeeNotFound(_) => ErrorKind::NotFound,
            BonusServiceError::UnknownOccurrenceType(_)
            | BonusServiceError::InvalidEmployee(_) => ErrorKind::InvalidInput,
        }
    }
}
