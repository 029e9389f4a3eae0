use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::eligibility::catalog::{Rule, RuleCatalog};
use crate::workflows::eligibility::directory::{DirectoryError, EmployeeDirectory};
use crate::workflows::eligibility::domain::{
    DateRange, Employee, EmployeeId, EmployeeRole, NewEmployee, NewOccurrence, OccurrenceId,
};
use crate::workflows::eligibility::evaluation::{EvaluationConfig, EvaluationEngine};
use crate::workflows::eligibility::ledger::OccurrenceLedger;
use crate::workflows::eligibility::{bonus_router, BonusService};

pub(super) fn day(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).expect("valid date")
}

pub(super) fn march() -> DateRange {
    DateRange::new(day(1), day(31)).expect("valid range")
}

/// `atraso` 10% each, `falta` capped at 2 with 5% each, `justificativa_medica` eliminates.
pub(super) fn scenario_catalog() -> RuleCatalog {
    let mut catalog = RuleCatalog::new();
    catalog
        .add_rule(Rule::percentage_discount("atraso", 10.0))
        .expect("atraso rule");
    catalog
        .add_rule(Rule::capped("falta", 2, 5.0))
        .expect("falta rule");
    catalog
        .add_rule(Rule::eliminates("justificativa_medica"))
        .expect("justificativa_medica rule");
    catalog
}

pub(super) fn engine() -> EvaluationEngine {
    EvaluationEngine::new(EvaluationConfig::default())
}

pub(super) fn employee(id: &str, name: &str) -> Employee {
    Employee {
        id: EmployeeId::from(id),
        name: name.to_string(),
        role: Some(EmployeeRole::Operador),
        active: true,
    }
}

pub(super) fn new_employee(id: &str, name: &str) -> NewEmployee {
    NewEmployee {
        id: EmployeeId::from(id),
        name: name.to_string(),
        role: Some(EmployeeRole::Operador),
    }
}

pub(super) fn occurrence(employee_id: &str, kind: &str, date: NaiveDate) -> NewOccurrence {
    NewOccurrence {
        employee_id: EmployeeId::from(employee_id),
        occurrence_type: kind.to_string(),
        date,
        note: None,
        annuls: None,
    }
}

pub(super) fn annulment(
    employee_id: &str,
    kind: &str,
    date: NaiveDate,
    target: OccurrenceId,
) -> NewOccurrence {
    NewOccurrence {
        annuls: Some(target),
        note: Some("medical certificate presented".to_string()),
        ..occurrence(employee_id, kind, date)
    }
}

/// Records each `(type, day)` for the employee and returns the ledger.
pub(super) fn ledger_with(employee_id: &str, entries: &[(&str, u32)]) -> OccurrenceLedger {
    let mut ledger = OccurrenceLedger::new();
    for (kind, date) in entries {
        ledger
            .record(occurrence(employee_id, kind, day(*date)))
            .expect("occurrence recorded");
    }
    ledger
}

pub(super) fn build_service() -> (BonusService<MemoryDirectory>, Arc<MemoryDirectory>) {
    let directory = Arc::new(MemoryDirectory::default());
    let service = BonusService::new(
        directory.clone(),
        scenario_catalog(),
        OccurrenceLedger::new(),
        EvaluationConfig::default(),
    );
    (service, directory)
}

/// Service with employees `1001` (Ana) and `1002` (Bruno) registered.
pub(super) fn staffed_service() -> (BonusService<MemoryDirectory>, Arc<MemoryDirectory>) {
    let (service, directory) = build_service();
    service
        .register_employee(new_employee("1001", "Ana"))
        .expect("register Ana");
    service
        .register_employee(new_employee("1002", "Bruno"))
        .expect("register Bruno");
    (service, directory)
}

#[derive(Default, Clone)]
pub(super) struct MemoryDirectory {
    pub(super) employees: Arc<Mutex<Vec<Employee>>>,
}

impl EmployeeDirectory for MemoryDirectory {
    fn insert(&self, employee: Employee) -> Result<Employee, DirectoryError> {
        let mut guard = self.employees.lock().expect("directory mutex poisoned");
        if guard.iter().any(|existing| existing.id == employee.id) {
            return Err(DirectoryError::Conflict);
        }
        guard.push(employee.clone());
        Ok(employee)
    }

    fn update(&self, employee: Employee) -> Result<(), DirectoryError> {
        let mut guard = self.employees.lock().expect("directory mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == employee.id) {
            Some(existing) => {
                *existing = employee;
                Ok(())
            }
            None => Err(DirectoryError::NotFound),
        }
    }

    fn fetch(&self, id: &EmployeeId) -> Result<Option<Employee>, DirectoryError> {
        let guard = self.employees.lock().expect("directory mutex poisoned");
        Ok(guard.iter().find(|employee| &employee.id == id).cloned())
    }

    fn list(&self, active_only: bool) -> Result<Vec<Employee>, DirectoryError> {
        let guard = self.employees.lock().expect("directory mutex poisoned");
        Ok(guard
            .iter()
            .filter(|employee| !active_only || employee.active)
            .cloned()
            .collect())
    }

    fn delete(&self, id: &EmployeeId) -> Result<(), DirectoryError> {
        let mut guard = self.employees.lock().expect("directory mutex poisoned");
        let before = guard.len();
        guard.retain(|employee| &employee.id != id);
        if guard.len() == before {
            Err(DirectoryError::NotFound)
        } else {
            Ok(())
        }
    }
}

pub(super) struct UnavailableDirectory;

impl EmployeeDirectory for UnavailableDirectory {
    fn insert(&self, _employee: Employee) -> Result<Employee, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _employee: Employee) -> Result<(), DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &EmployeeId) -> Result<Option<Employee>, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _active_only: bool) -> Result<Vec<Employee>, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &EmployeeId) -> Result<(), DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn bonus_router_with_service(service: BonusService<MemoryDirectory>) -> axum::Router {
    bonus_router(Arc::new(service))
}
