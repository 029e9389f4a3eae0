use super::domain::{Employee, EmployeeId};
use crate::error::ErrorKind;

/// HR registry the engine reads employees from.
///
/// `list` must yield employees in registration order; reports follow it.
pub trait EmployeeDirectory: Send + Sync {
    fn insert(&self, employee: Employee) -> Result<Employee, DirectoryError>;
    fn update(&self, employee: Employee) -> Result<(), DirectoryError>;
    fn fetch(&self, id: &EmployeeId) -> Result<Option<Employee>, DirectoryError>;
    fn list(&self, active_only: bool) -> Result<Vec<Employee>, DirectoryError>;
    fn delete(&self, id: &EmployeeId) -> Result<(), DirectoryError>;
}

/// Error enumeration for directory failures.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("employee already registered")]
    Conflict,
    #[error("employee not found")]
    NotFound,
    #[error("employee directory unavailable: {0}")]
    Unavailable(String),
}

impl DirectoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DirectoryError::Conflict => ErrorKind::Conflict,
            DirectoryError::NotFound => ErrorKind::NotFound,
            DirectoryError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}
