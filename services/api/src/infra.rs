use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use staff_bonus::workflows::eligibility::{DirectoryError, Employee, EmployeeDirectory, EmployeeId};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local employee registry. Keeps registration order for reports.
#[derive(Default, Clone)]
pub(crate) struct InMemoryEmployeeDirectory {
    employees: Arc<Mutex<Vec<Employee>>>,
}

impl EmployeeDirectory for InMemoryEmployeeDirectory {
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
            return Err(DirectoryError::NotFound);
        }
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
