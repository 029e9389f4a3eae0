use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::super::domain::DateRange;
use super::super::ledger::OccurrenceLedger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub occurrence_type: String,
    pub count: usize,
}

/// Month-to-date activity snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccurrenceDashboard {
    pub period: DateRange,
    pub active_employees: usize,
    pub occurrences_in_period: usize,
    pub by_type: Vec<TypeCount>,
}

pub(crate) fn build_dashboard(
    today: NaiveDate,
    active_employees: usize,
    ledger: &OccurrenceLedger,
) -> OccurrenceDashboard {
    let period = DateRange::month_to_date(today);

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut occurrences_in_period = 0;
    for occurrence in ledger.occurrences() {
        if period.contains(occurrence.date) {
            occurrences_in_period += 1;
            *counts.entry(occurrence.occurrence_type.as_str()).or_insert(0) += 1;
        }
    }

    let mut by_type: Vec<TypeCount> = counts
        .into_iter()
        .map(|(kind, count)| TypeCount {
            occurrence_type: kind.to_string(),
            count,
        })
        .collect();
    by_type.sort_by(|left, right| {
        right
            .count
            .cmp(&left.count)
            .then_with(|| left.occurrence_type.cmp(&right.occurrence_type))
    });

    OccurrenceDashboard {
        period,
        active_employees,
        occurrences_in_period,
        by_type,
    }
}
