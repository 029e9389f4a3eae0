use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Externally assigned registration number of an employee.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EmployeeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Ledger-assigned, monotonically increasing occurrence identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccurrenceId(pub u64);

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job function on the shop floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeRole {
    Lider,
    Operador,
    Ajudante,
}

impl EmployeeRole {
    pub fn label(&self) -> &'static str {
        match self {
            EmployeeRole::Lider => "LIDER",
            EmployeeRole::Operador => "OPERADOR",
            EmployeeRole::Ajudante => "AJUDANTE",
        }
    }
}

impl fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Employee as held by the HR registry. The engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub role: Option<EmployeeRole>,
    pub active: bool,
}

/// Registration payload for a new employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub role: Option<EmployeeRole>,
}

/// Partial update of an employee; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<EmployeeRole>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl EmployeeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.role.is_none() && self.active.is_none()
    }

    pub(crate) fn apply(self, employee: &mut Employee) {
        if let Some(name) = self.name {
            employee.name = name;
        }
        if let Some(role) = self.role {
            employee.role = Some(role);
        }
        if let Some(active) = self.active {
            employee.active = active;
        }
    }
}

/// Outcome of a removal request: employees with history are only deactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRemoval {
    Deleted,
    Deactivated,
}

/// Request to record an occurrence. The ledger assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOccurrence {
    pub employee_id: EmployeeId,
    #[serde(rename = "type")]
    pub occurrence_type: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub annuls: Option<OccurrenceId>,
}

/// Dated attendance or disciplinary event attributed to one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: OccurrenceId,
    pub employee_id: EmployeeId,
    #[serde(rename = "type")]
    pub occurrence_type: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub annuls: Option<OccurrenceId>,
}

impl Occurrence {
    pub(crate) fn from_request(id: OccurrenceId, request: NewOccurrence) -> Self {
        Self {
            id,
            employee_id: request.employee_id,
            occurrence_type: request.occurrence_type,
            date: request.date,
            note: request.note,
            annuls: request.annuls,
        }
    }
}

/// Inclusive calendar date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if end < start {
            return Err(DateRangeError { start, end });
        }
        Ok(Self { start, end })
    }

    /// From the first day of `today`'s month through `today`.
    pub fn month_to_date(today: NaiveDate) -> Self {
        let start = today.with_day(1).unwrap_or(today);
        Self { start, end: today }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl<'de> Deserialize<'de> for DateRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            start: NaiveDate,
            end: NaiveDate,
        }

        let raw = Raw::deserialize(deserializer)?;
        DateRange::new(raw.start, raw.end).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date range: end {end} precedes start {start}")]
pub struct DateRangeError {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRangeError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).expect("valid date")
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let range = DateRange::new(date(3), date(10)).expect("ordered range");
        assert!(range.contains(date(3)));
        assert!(range.contains(date(10)));
        assert!(!range.contains(date(2)));
        assert!(!range.contains(date(11)));
    }

    #[test]
    fn single_day_range_is_valid() {
        assert!(DateRange::new(date(5), date(5)).is_ok());
    }

    #[test]
    fn rejects_end_before_start() {
        let error = DateRange::new(date(10), date(3)).expect_err("inverted range");
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert!(error.to_string().contains("precedes"));
    }

    #[test]
    fn deserializing_validates_order() {
        let parsed: Result<DateRange, _> =
            serde_json::from_str(r#"{"start":"2025-03-10","end":"2025-03-01"}"#);
        assert!(parsed.is_err());

        let parsed: DateRange =
            serde_json::from_str(r#"{"start":"2025-03-01","end":"2025-03-31"}"#)
                .expect("valid range");
        assert_eq!(parsed.start(), date(1));
        assert_eq!(parsed.end(), date(31));
    }

    #[test]
    fn month_to_date_starts_on_the_first() {
        let range = DateRange::month_to_date(date(17));
        assert_eq!(range.start(), date(1));
        assert_eq!(range.end(), date(17));
    }

    #[test]
    fn employee_update_applies_only_present_fields() {
        let mut employee = Employee {
            id: EmployeeId::from("1001"),
            name: "Ana".to_string(),
            role: Some(EmployeeRole::Operador),
            active: true,
        };
        let update = EmployeeUpdate {
            active: Some(false),
            ..EmployeeUpdate::default()
        };
        assert!(!update.is_empty());
        update.apply(&mut employee);
        assert_eq!(employee.name, "Ana");
        assert_eq!(employee.role, Some(EmployeeRole::Operador));
        assert!(!employee.active);
    }

    #[test]
    fn roles_are_limited_to_the_shop_floor_functions() {
        let parsed: NewEmployee =
            serde_json::from_str(r#"{"id":"1001","name":"Ana","role":"AJUDANTE"}"#)
                .expect("known role");
        assert_eq!(parsed.role, Some(EmployeeRole::Ajudante));

        let parsed: Result<NewEmployee, _> =
            serde_json::from_str(r#"{"id":"1001","name":"Ana","role":"GERENTE"}"#);
        assert!(parsed.is_err());
        assert_eq!(EmployeeRole::Lider.to_string(), "LIDER");
    }
}
