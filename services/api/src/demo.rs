use crate::infra::InMemoryEmployeeDirectory;
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use serde::Deserialize;
use staff_bonus::config::{AppConfig, BonusConfig};
use staff_bonus::error::AppError;
use staff_bonus::workflows::eligibility::{
    BonusReport, BonusService, BonusServiceError, DateRange, EmployeeId, EmployeeRole,
    EmployeeUpdate, NewEmployee, NewOccurrence, OccurrenceDashboard, OccurrenceId, RuleDefinition,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// JSON dataset with `employees`, optional `rules`, and `occurrences`
    #[arg(long)]
    pub(crate) data: PathBuf,
    /// First day of the period (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start: NaiveDate,
    /// Last day of the period, inclusive (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) end: NaiveDate,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

type LocalService = BonusService<InMemoryEmployeeDirectory>;

/// Offline snapshot replayed through the service so every ledger rule applies.
///
/// Occurrence ids are assigned in file order starting at 1; `annuls` refers to them.
#[derive(Debug, Deserialize)]
pub(crate) struct Dataset {
    employees: Vec<DatasetEmployee>,
    /// Replaces the default catalog when present.
    #[serde(default)]
    rules: Option<Vec<RuleDefinition>>,
    #[serde(default)]
    occurrences: Vec<NewOccurrence>,
}

#[derive(Debug, Deserialize)]
struct DatasetEmployee {
    id: EmployeeId,
    name: String,
    #[serde(default)]
    role: Option<EmployeeRole>,
    #[serde(default = "active_by_default")]
    active: bool,
}

fn active_by_default() -> bool {
    true
}

impl Dataset {
    pub(crate) fn from_json(raw: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub(crate) fn replay(self, config: &BonusConfig) -> Result<LocalService, BonusServiceError> {
        let directory = Arc::new(InMemoryEmployeeDirectory::default());
        let service = match self.rules {
            Some(rules) => {
                let config = BonusConfig {
                    seed_default_rules: false,
                    ..config.clone()
                };
                let service = BonusService::from_config(directory, &config);
                for definition in rules {
                    service.add_rule(definition)?;
                }
                service
            }
            None => BonusService::from_config(directory, config),
        };

        for employee in self.employees {
            let id = employee.id.clone();
            service.register_employee(NewEmployee {
                id: employee.id,
                name: employee.name,
                role: employee.role,
            })?;
            if !employee.active {
                service.update_employee(
                    &id,
                    EmployeeUpdate {
                        active: Some(false),
                        ..EmployeeUpdate::default()
                    },
                )?;
            }
        }

        for occurrence in self.occurrences {
            service.record_occurrence(occurrence)?;
        }

        Ok(service)
    }
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        data,
        start,
        end,
        json,
    } = args;

    let config = AppConfig::load()?;
    let range = DateRange::new(start, end).map_err(BonusServiceError::from)?;
    let raw = std::fs::read_to_string(&data)?;
    let service = Dataset::from_json(&raw)?.replay(&config.bonus)?;
    let report = service.generate_report(range)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Bonus report for {}", data.display());
        render_report(&report);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let period = DateRange::month_to_date(today);

    let service = demo_dataset(period).replay(&config.bonus)?;

    println!("Staff bonus demo");
    let report = service.generate_report(period)?;
    render_report(&report);

    let dashboard = service.dashboard(today)?;
    render_dashboard(&dashboard);
    Ok(())
}

/// Four employees covering a full bonus, a reduction, an annulled absence, and a forfeit.
fn demo_dataset(period: DateRange) -> Dataset {
    let day = |offset: i64| (period.start() + Duration::days(offset)).min(period.end());
    let occurrence = |employee: &str, kind: &str, offset: i64, annuls: Option<u64>| NewOccurrence {
        employee_id: EmployeeId::from(employee),
        occurrence_type: kind.to_string(),
        date: day(offset),
        note: annuls.map(|_| "medical certificate presented".to_string()),
        annuls: annuls.map(OccurrenceId),
    };

    let employees = [
        ("1001", "Ana Souza", EmployeeRole::Operador),
        ("1002", "Bruno Lima", EmployeeRole::Ajudante),
        ("1003", "Carla Mendes", EmployeeRole::Lider),
        ("1004", "Diego Alves", EmployeeRole::Operador),
    ]
    .into_iter()
    .map(|(id, name, role)| DatasetEmployee {
        id: EmployeeId::from(id),
        name: name.to_string(),
        role: Some(role),
        active: true,
    })
    .collect();

    Dataset {
        employees,
        rules: None,
        occurrences: vec![
            occurrence("1002", "esqueceu_ponto", 1, None),
            occurrence("1002", "avaria_menor", 4, None),
            occurrence("1003", "falta", 2, None),
            occurrence("1003", "atestado", 2, Some(3)),
            occurrence("1004", "advertencia", 5, None),
        ],
    }
}

fn render_report(report: &BonusReport) {
    println!(
        "Period: {} -> {}",
        report.period.start(),
        report.period.end()
    );
    println!(
        "{} active employees | {} receiving | {} not receiving",
        report.total_employees, report.receiving_count, report.not_receiving_count
    );

    for entry in &report.employees {
        println!(
            "\n- {} {}: {:.1}% ({})",
            entry.employee_id,
            entry.name,
            entry.result.bonus_percent,
            entry.result.decision.summary()
        );
        if entry.annulled_occurrences > 0 {
            println!("    {} annulled occurrence(s)", entry.annulled_occurrences);
        }
        if entry.result.medical_certificate_cap_exceeded {
            println!(
                "    medical certificates {} over the limit of {}",
                entry.result.medical_certificate_count, entry.result.medical_certificate_cap
            );
        }
        for component in &entry.result.components {
            println!(
                "    - {} x{}: -{:.1}% ({})",
                component.occurrence_type, component.count, component.discount, component.notes
            );
        }
    }
}

fn render_dashboard(dashboard: &OccurrenceDashboard) {
    println!(
        "\nDashboard {} -> {}: {} occurrences across {} active employees",
        dashboard.period.start(),
        dashboard.period.end(),
        dashboard.occurrences_in_period,
        dashboard.active_employees
    );
    for entry in &dashboard.by_type {
        println!("- {}: {}", entry.occurrence_type, entry.count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date"),
            NaiveDate::from_ymd_opt(2025, 3, 31).expect("valid date"),
        )
        .expect("valid range")
    }

    #[test]
    fn dataset_replay_applies_annulments_and_inactive_flags() {
        let raw = r#"{
            "employees": [
                { "id": "1", "name": "Ana" },
                { "id": "2", "name": "Bruno", "active": false }
            ],
            "occurrences": [
                { "employee_id": "1", "type": "falta", "date": "2025-03-03" },
                { "employee_id": "1", "type": "atestado", "date": "2025-03-04", "annuls": 1 }
            ]
        }"#;

        let service = Dataset::from_json(raw)
            .expect("dataset parses")
            .replay(&BonusConfig::default())
            .expect("dataset replays");
        let report = service.generate_report(march()).expect("report");

        assert_eq!(report.total_employees, 1);
        assert_eq!(report.employees[0].result.bonus_percent, 100.0);
        assert_eq!(report.employees[0].annulled_occurrences, 1);
    }

    #[test]
    fn dataset_rules_replace_the_defaults() {
        let raw = r#"{
            "employees": [{ "id": "1", "name": "Ana" }],
            "rules": [{ "type": "atraso", "category": "percentage_discount", "discount_percent": 15 }],
            "occurrences": [{ "employee_id": "1", "type": "atraso", "date": "2025-03-03" }]
        }"#;

        let service = Dataset::from_json(raw)
            .expect("dataset parses")
            .replay(&BonusConfig::default())
            .expect("dataset replays");

        assert_eq!(service.rules().len(), 1);
        let report = service.generate_report(march()).expect("report");
        assert_eq!(report.employees[0].result.bonus_percent, 85.0);
    }

    #[test]
    fn dataset_replay_stops_at_invalid_records() {
        let raw = r#"{
            "employees": [{ "id": "1", "name": "Ana" }],
            "occurrences": [{ "employee_id": "9", "type": "falta", "date": "2025-03-03" }]
        }"#;

        let error = Dataset::from_json(raw)
            .expect("dataset parses")
            .replay(&BonusConfig::default())
            .err()
            .expect("unknown employee rejected");
        assert!(matches!(error, BonusServiceError::EmployeeNotFound(_)));
    }

    #[test]
    fn demo_dataset_covers_every_outcome() {
        let service = demo_dataset(march())
            .replay(&BonusConfig::default())
            .expect("demo replays");
        let report = service.generate_report(march()).expect("report");

        let percents: Vec<f32> = report
            .employees
            .iter()
            .map(|entry| entry.result.bonus_percent)
            .collect();
        assert_eq!(percents, vec![100.0, 80.0, 100.0, 0.0]);
    }

    #[test]
    fn demo_dates_stay_inside_short_periods() {
        let first = NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date");
        let service = demo_dataset(DateRange::month_to_date(first))
            .replay(&BonusConfig::default())
            .expect("demo replays");
        let dashboard = service.dashboard(first).expect("dashboard");
        assert_eq!(dashboard.occurrences_in_period, 5);
    }
}
