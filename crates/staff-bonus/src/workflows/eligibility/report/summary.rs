use serde::Serialize;

use super::super::catalog::RuleCatalog;
use super::super::domain::{DateRange, Employee, EmployeeId, EmployeeRole};
use super::super::evaluation::{EvaluationEngine, EvaluationResult};
use super::super::ledger::OccurrenceLedger;

/// Evaluation of one employee with the identity fields the presentation layer shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeEvaluation {
    pub employee_id: EmployeeId,
    pub name: String,
    pub role: Option<EmployeeRole>,
    /// Occurrences inside the period that were cancelled by an annulment.
    pub annulled_occurrences: usize,
    #[serde(flatten)]
    pub result: EvaluationResult,
}

/// Aggregate bonus standing of the active workforce over a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BonusReport {
    pub period: DateRange,
    pub total_employees: usize,
    pub receiving_count: usize,
    pub not_receiving_count: usize,
    pub employees: Vec<EmployeeEvaluation>,
}

impl BonusReport {
    pub fn receiving(&self) -> impl Iterator<Item = &EmployeeEvaluation> + '_ {
        self.employees
            .iter()
            .filter(|entry| entry.result.receives_bonus)
    }

    pub fn not_receiving(&self) -> impl Iterator<Item = &EmployeeEvaluation> + '_ {
        self.employees
            .iter()
            .filter(|entry| !entry.result.receives_bonus)
    }
}

pub(crate) fn evaluate_employee(
    employee: &Employee,
    range: &DateRange,
    ledger: &OccurrenceLedger,
    catalog: &RuleCatalog,
    engine: &EvaluationEngine,
) -> EmployeeEvaluation {
    let effective = ledger.effective_occurrences_for(&employee.id, range);
    let result = engine.evaluate(effective, catalog);

    EmployeeEvaluation {
        employee_id: employee.id.clone(),
        name: employee.name.clone(),
        role: employee.role,
        annulled_occurrences: ledger.annulled_count_for(&employee.id, range),
        result,
    }
}

/// Evaluates every active employee, in the order given, without touching any state.
pub(crate) fn generate(
    range: DateRange,
    employees: &[Employee],
    ledger: &OccurrenceLedger,
    catalog: &RuleCatalog,
    engine: &EvaluationEngine,
) -> BonusReport {
    let evaluations: Vec<EmployeeEvaluation> = employees
        .iter()
        .filter(|employee| employee.active)
        .map(|employee| evaluate_employee(employee, &range, ledger, catalog, engine))
        .collect();

    let receiving_count = evaluations
        .iter()
        .filter(|entry| entry.result.receives_bonus)
        .count();

    BonusReport {
        period: range,
        total_employees: evaluations.len(),
        receiving_count,
        not_receiving_count: evaluations.len() - receiving_count,
        employees: evaluations,
    }
}
