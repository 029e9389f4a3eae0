use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{DateRange, EmployeeId, NewOccurrence, Occurrence, OccurrenceId};
use crate::error::ErrorKind;

/// Occurrence log for the period plus the annulment index.
///
/// `annulled_by` maps a cancelled occurrence to the record that annuls it. A slot can
/// only be claimed while empty, so annulment chains never grow deeper than one hop.
#[derive(Debug, Clone)]
pub struct OccurrenceLedger {
    records: BTreeMap<OccurrenceId, Occurrence>,
    annulled_by: HashMap<OccurrenceId, OccurrenceId>,
    next_id: u64,
}

impl Default for OccurrenceLedger {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            annulled_by: HashMap::new(),
            next_id: 1,
        }
    }
}

impl OccurrenceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, request: NewOccurrence) -> Result<Occurrence, LedgerError> {
        if let Some(target_id) = request.annuls {
            self.check_annulment_target(&request.employee_id, target_id)?;
        }

        let id = OccurrenceId(self.next_id);
        self.next_id += 1;

        let occurrence = Occurrence::from_request(id, request);
        if let Some(target_id) = occurrence.annuls {
            self.annulled_by.insert(target_id, id);
        }
        self.records.insert(id, occurrence.clone());
        Ok(occurrence)
    }

    fn check_annulment_target(
        &self,
        employee_id: &EmployeeId,
        target_id: OccurrenceId,
    ) -> Result<(), LedgerError> {
        let reject = |reason| LedgerError::InvalidAnnulmentTarget {
            target: target_id,
            reason,
        };

        let target = self
            .records
            .get(&target_id)
            .ok_or_else(|| reject(AnnulmentRejection::TargetMissing))?;

        if &target.employee_id != employee_id {
            return Err(reject(AnnulmentRejection::DifferentEmployee {
                owner: target.employee_id.clone(),
            }));
        }

        if let Some(existing) = self.annulled_by.get(&target_id) {
            return Err(reject(AnnulmentRejection::AlreadyAnnulled {
                annulled_by: *existing,
            }));
        }

        Ok(())
    }

    /// Hard-deletes an occurrence. Removing an annulment record returns its target to pending.
    pub fn cancel(&mut self, id: OccurrenceId) -> Result<Occurrence, LedgerError> {
        if !self.records.contains_key(&id) {
            return Err(LedgerError::OccurrenceNotFound(id));
        }
        if let Some(annulled_by) = self.annulled_by.get(&id) {
            return Err(LedgerError::OccurrenceAnnulled {
                id,
                annulled_by: *annulled_by,
            });
        }

        let removed = self
            .records
            .remove(&id)
            .ok_or(LedgerError::OccurrenceNotFound(id))?;
        if let Some(target_id) = removed.annuls {
            self.annulled_by.remove(&target_id);
        }
        Ok(removed)
    }

    pub fn get(&self, id: OccurrenceId) -> Option<&Occurrence> {
        self.records.get(&id)
    }

    pub fn annulled_by(&self, id: OccurrenceId) -> Option<OccurrenceId> {
        self.annulled_by.get(&id).copied()
    }

    pub fn is_annulled(&self, id: OccurrenceId) -> bool {
        self.annulled_by.contains_key(&id)
    }

    /// All records in id order.
    pub fn occurrences(&self) -> impl Iterator<Item = &Occurrence> + '_ {
        self.records.values()
    }

    /// Non-annulled occurrences of the employee inside `range`, by date then id.
    pub fn effective_occurrences_for(
        &self,
        employee_id: &EmployeeId,
        range: &DateRange,
    ) -> Vec<&Occurrence> {
        let mut effective: Vec<&Occurrence> = self
            .for_employee(employee_id)
            .filter(|occurrence| range.contains(occurrence.date))
            .filter(|occurrence| !self.is_annulled(occurrence.id))
            .collect();
        sort_chronologically(&mut effective);
        effective
    }

    /// Occurrences of the employee inside `range` that have been annulled.
    pub fn annulled_count_for(&self, employee_id: &EmployeeId, range: &DateRange) -> usize {
        self.for_employee(employee_id)
            .filter(|occurrence| range.contains(occurrence.date))
            .filter(|occurrence| self.is_annulled(occurrence.id))
            .count()
    }

    /// Candidate annulment targets for the employee, regardless of date.
    pub fn pending_occurrences_for(&self, employee_id: &EmployeeId) -> Vec<&Occurrence> {
        let mut pending: Vec<&Occurrence> = self
            .for_employee(employee_id)
            .filter(|occurrence| !self.is_annulled(occurrence.id))
            .collect();
        sort_chronologically(&mut pending);
        pending
    }

    pub fn has_history(&self, employee_id: &EmployeeId) -> bool {
        self.for_employee(employee_id).next().is_some()
    }

    /// Audit listing, newest first, annotated with annulment links in both directions.
    pub fn entries(&self, filter: &OccurrenceFilter) -> Vec<OccurrenceEntry> {
        let mut matching: Vec<&Occurrence> = self
            .records
            .values()
            .filter(|occurrence| filter.matches(occurrence))
            .collect();
        sort_chronologically(&mut matching);
        matching.reverse();

        matching
            .into_iter()
            .map(|occurrence| OccurrenceEntry {
                annulled_by: self.annulled_by(occurrence.id),
                annulled_occurrence: occurrence
                    .annuls
                    .and_then(|target_id| self.records.get(&target_id))
                    .map(|target| AnnulledSummary {
                        occurrence_type: target.occurrence_type.clone(),
                        date: target.date,
                    }),
                occurrence: occurrence.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn for_employee(&self, employee_id: &EmployeeId) -> impl Iterator<Item = &Occurrence> + '_ {
        let employee_id = employee_id.clone();
        self.records
            .values()
            .filter(move |occurrence| occurrence.employee_id == employee_id)
    }
}

fn sort_chronologically(occurrences: &mut [&Occurrence]) {
    occurrences.sort_by_key(|occurrence| (occurrence.date, occurrence.id));
}

/// Optional criteria for the audit listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceFilter {
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(default, rename = "type")]
    pub occurrence_type: Option<String>,
}

impl OccurrenceFilter {
    pub fn matches(&self, occurrence: &Occurrence) -> bool {
        self.employee_id
            .as_ref()
            .map_or(true, |id| &occurrence.employee_id == id)
            && self.start.map_or(true, |start| occurrence.date >= start)
            && self.end.map_or(true, |end| occurrence.date <= end)
            && self
                .occurrence_type
                .as_deref()
                .map_or(true, |kind| occurrence.occurrence_type == kind)
    }
}

/// Occurrence as shown in the audit listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccurrenceEntry {
    #[serde(flatten)]
    pub occurrence: Occurrence,
    /// Record that cancelled this occurrence, if any.
    pub annulled_by: Option<OccurrenceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annulled_occurrence: Option<AnnulledSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnulledSummary {
    #[serde(rename = "type")]
    pub occurrence_type: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnulmentRejection {
    TargetMissing,
    DifferentEmployee { owner: EmployeeId },
    AlreadyAnnulled { annulled_by: OccurrenceId },
}

impl std::fmt::Display for AnnulmentRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnulmentRejection::TargetMissing => f.write_str("target does not exist"),
            AnnulmentRejection::DifferentEmployee { owner } => {
                write!(f, "target belongs to employee {owner}")
            }
            AnnulmentRejection::AlreadyAnnulled { annulled_by } => {
                write!(f, "target is already annulled by occurrence {annulled_by}")
            }
        }
    }
}

/// Occurrence ledger failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("occurrence {0} not found")]
    OccurrenceNotFound(OccurrenceId),
    #[error("cannot annul occurrence {target}: {reason}")]
    InvalidAnnulmentTarget {
        target: OccurrenceId,
        reason: AnnulmentRejection,
    },
    #[error("occurrence {id} is annulled by occurrence {annulled_by}; cancel that record first")]
    OccurrenceAnnulled {
        id: OccurrenceId,
        annulled_by: OccurrenceId,
    },
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::OccurrenceNotFound(_) => ErrorKind::NotFound,
            LedgerError::InvalidAnnulmentTarget {
                reason: AnnulmentRejection::TargetMissing,
                ..
            } => ErrorKind::NotFound,
            LedgerError::InvalidAnnulmentTarget { .. } | LedgerError::OccurrenceAnnulled { .. } => {
                ErrorKind::Conflict
            }
        }
    }
}
