use super::common::*;
use crate::workflows::eligibility::domain::{DateRange, Employee, OccurrenceId};
use crate::workflows::eligibility::report::{build_dashboard, generate, TypeCount};

fn roster() -> Vec<Employee> {
    let mut inactive = employee("1003", "Carla");
    inactive.active = false;
    vec![employee("1001", "Ana"), employee("1002", "Bruno"), inactive]
}

#[test]
fn report_covers_active_employees_in_roster_order() {
    let mut ledger = ledger_with("1001", &[("atraso", 3), ("atraso", 4)]);
    ledger
        .record(occurrence("1002", "justificativa_medica", day(5)))
        .expect("recorded");
    ledger
        .record(occurrence("1003", "atraso", day(5)))
        .expect("recorded");

    let report = generate(march(), &roster(), &ledger, &scenario_catalog(), &engine());

    assert_eq!(report.total_employees, 2);
    assert_eq!(report.receiving_count, 1);
    assert_eq!(report.not_receiving_count, 1);
    let order: Vec<&str> = report
        .employees
        .iter()
        .map(|entry| entry.employee_id.0.as_str())
        .collect();
    assert_eq!(order, vec!["1001", "1002"]);
    assert_eq!(report.employees[0].result.bonus_percent, 80.0);
    assert_eq!(
        report.receiving().map(|entry| entry.name.as_str()).collect::<Vec<_>>(),
        vec!["Ana"]
    );
    assert_eq!(
        report
            .not_receiving()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>(),
        vec!["Bruno"]
    );
}

#[test]
fn counts_add_up_to_the_total() {
    let ledger = ledger_with("1002", &[("falta", 3), ("falta", 4), ("falta", 5)]);

    let report = generate(march(), &roster(), &ledger, &scenario_catalog(), &engine());

    assert_eq!(
        report.receiving_count + report.not_receiving_count,
        report.total_employees
    );
    assert_eq!(report.period, march());
}

#[test]
fn report_generation_is_idempotent() {
    let ledger = ledger_with("1001", &[("atraso", 3), ("falta", 9)]);
    let catalog = scenario_catalog();

    let first = generate(march(), &roster(), &ledger, &catalog, &engine());
    let second = generate(march(), &roster(), &ledger, &catalog, &engine());

    assert_eq!(first, second);
}

#[test]
fn evaluation_reports_annulled_occurrences_in_the_period() {
    let mut ledger = ledger_with("1001", &[("atraso", 3), ("atraso", 4)]);
    ledger
        .record(annulment("1001", "atestado", day(5), OccurrenceId(1)))
        .expect("annulment recorded");

    let report = generate(march(), &roster(), &ledger, &scenario_catalog(), &engine());

    let ana = &report.employees[0];
    assert_eq!(ana.annulled_occurrences, 1);
    assert_eq!(ana.result.total_effective_occurrences, 2);
    assert_eq!(ana.result.bonus_percent, 90.0);
}

#[test]
fn removing_a_rule_leaves_its_occurrences_unscored() {
    let ledger = ledger_with("1001", &[("justificativa_medica", 3)]);
    let mut catalog = scenario_catalog();
    catalog
        .remove_rule("justificativa_medica")
        .expect("rule removed");

    let report = generate(march(), &roster(), &ledger, &catalog, &engine());

    let ana = &report.employees[0];
    assert_eq!(ana.result.bonus_percent, 100.0);
    assert_eq!(ana.result.total_effective_occurrences, 1);
    assert_eq!(ana.result.components[0].category, None);
}

#[test]
fn dashboard_counts_month_to_date_by_frequency() {
    let mut ledger = ledger_with("1001", &[("atraso", 2), ("falta", 3), ("atraso", 14)]);
    ledger
        .record(occurrence("1002", "falta", day(10)))
        .expect("recorded");
    ledger
        .record(occurrence("1002", "advertencia", day(10)))
        .expect("recorded");
    ledger
        .record(occurrence("1002", "atraso", day(20)))
        .expect("after today");

    let dashboard = build_dashboard(day(15), 2, &ledger);

    assert_eq!(
        dashboard.period,
        DateRange::new(day(1), day(15)).expect("valid range")
    );
    assert_eq!(dashboard.active_employees, 2);
    assert_eq!(dashboard.occurrences_in_period, 5);
    let expected = [("atraso", 2), ("falta", 2), ("advertencia", 1)];
    let expected: Vec<TypeCount> = expected
        .iter()
        .map(|(kind, count)| TypeCount {
            occurrence_type: kind.to_string(),
            count: *count,
        })
        .collect();
    assert_eq!(dashboard.by_type, expected);
}
