mod dashboard;
mod summary;

pub use dashboard::{OccurrenceDashboard, TypeCount};
pub use summary::{BonusReport, EmployeeEvaluation};

pub(crate) use dashboard::build_dashboard;
pub(crate) use summary::{evaluate_employee, generate};
