use std::sync::Arc;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::catalog::RuleDefinition;
use super::directory::EmployeeDirectory;
use super::domain::{
    DateRange, EmployeeId, EmployeeUpdate, NewEmployee, NewOccurrence, OccurrenceId,
};
use super::ledger::OccurrenceFilter;
use super::service::{BonusService, BonusServiceError};
use crate::error::ErrorKind;

/// Router builder exposing the registry, ledger, catalog, and evaluation endpoints.
pub fn bonus_router<D>(service: Arc<BonusService<D>>) -> Router
where
    D: EmployeeDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/employees",
            post(register_employee_handler::<D>).get(list_employees_handler::<D>),
        )
        .route(
            "/api/v1/employees/:employee_id",
            get(employee_handler::<D>)
                .put(update_employee_handler::<D>)
                .delete(remove_employee_handler::<D>),
        )
        .route(
            "/api/v1/employees/:employee_id/pending-occurrences",
            get(pending_occurrences_handler::<D>),
        )
        .route(
            "/api/v1/occurrences",
            post(record_occurrence_handler::<D>).get(list_occurrences_handler::<D>),
        )
        .route(
            "/api/v1/occurrences/:occurrence_id",
            delete(cancel_occurrence_handler::<D>),
        )
        .route(
            "/api/v1/rules",
            get(list_rules_handler::<D>).post(add_rule_handler::<D>),
        )
        .route(
            "/api/v1/rules/:occurrence_type",
            delete(remove_rule_handler::<D>),
        )
        .route("/api/v1/bonus/:employee_id", get(bonus_handler::<D>))
        .route("/api/v1/reports/bonus", post(report_handler::<D>))
        .route("/api/v1/dashboard", get(dashboard_handler::<D>))
        .with_state(service)
}

/// Error payload carrying the stable kind next to the human-readable message.
pub(crate) fn error_response(error: BonusServiceError) -> Response {
    error_payload(error.kind(), error.to_string())
}

/// Bodies, queries, and paths that fail to deserialize are invalid input.
pub(crate) fn rejection_response(message: String) -> Response {
    error_payload(ErrorKind::InvalidInput, message)
}

fn error_payload(kind: ErrorKind, message: String) -> Response {
    let payload = json!({
        "error": message,
        "kind": kind,
    });
    (kind.status_code(), axum::Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    result: Result<T, BonusServiceError>,
) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmployeeListQuery {
    #[serde(default)]
    pub(crate) active: Option<bool>,
}

/// Reporting window as sent by clients; validated into a [`DateRange`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct PeriodRequest {
    pub(crate) start: NaiveDate,
    pub(crate) end: NaiveDate,
}

impl PeriodRequest {
    fn range(self) -> Result<DateRange, BonusServiceError> {
        Ok(DateRange::new(self.start, self.end)?)
    }
}

pub(crate) async fn register_employee_handler<D>(
    State(service): State<Arc<BonusService<D>>>,
    payload: Result<axum::Json<NewEmployee>, JsonRejection>,
) -> Response
where
    D: EmployeeDirectory + 'static,
{
    let request = match payload {
        Ok(axum::Json(request)) => request,
        Err(rejection) => return rejection_response(rejection.body_text()),
    };
    respond(StatusCode::CREATED, service.register_employee(request))
}

pub(crate) async fn list_employees_handler<D>(
    State(service): State<Arc<BonusService<D>>>,
    query: Result<Query<EmployeeListQuery>, QueryRejection>,
) -> Response
where
    D: EmployeeDirectory + 'static,
{
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return rejection_response(rejection.body_text()),
    };
    respond(
        StatusCode::OK,
        service.employees(query.active.unwrap_or(true)),
    )
}

pub(crate) async fn employee_handler<D>(
    State(service): State<Arc<BonusService<D>>>,
    Path(employee_id): Path<String>,
) -> Response
where
    D: EmployeeDirectory + 'static,
{
    respond(StatusCode::OK, service.employee(&EmployeeId(employee_id)))
}

pub(crate) async fn update_employee_handler<D>(
    State(service): State<Arc<BonusService<D>>>,
    Path(employee_id): Path<String>,
    payload: Result<axum::Json<EmployeeUpdate>, JsonRejection>,
) -> Response
where
    D: EmployeeDirectory + 'static,
{
    let update = match payload {
        Ok(axum::Json(update)) => update,
        Err(rejection) => return rejection_response(rejection.body_text()),
    };
    respond(
        StatusCode::OK,
        service.update_employee(&EmployeeId(employee_id), update),
    )
}

pub(crate) async fn remove_employee_handler<D>(
    State(service): State<Arc<BonusService<D>>>,
    Path(employee_id): Path<String>,
) -> Response
where
    D: EmployeeDirectory + 'static,
{
    let id = EmployeeId(employee_id);
    match service.remove_employee(&id) {
        Ok(removal) => {
            let payload = json!({
                "employee_id": id,
                "removal": removal,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn pending_occurrences_handler<D>(
    State(service): State<Arc<BonusService<D>>>,
    Path(employee_id): Path<String>,
) -> Response
where
    D: EmployeeDirectory + 'static,
{
    respond(
        StatusCode::OK,
        service.pending_occurrences(&EmployeeId(employee_id)),
    )
}

pub(crate) async fn record_occurrence_handler<D>(
    State(service): State<Arc<BonusService<D>>>,
    payload: Result<axum::Json<NewOccurrence>, JsonRejection>,
) -> Response
where
    D: EmployeeDirectory + 'static,
{
    let request = match payload {
        Ok(axum::Json(request)) => request,
        Err(rejection) => return rejection_response(rejection.body_text()),
    };
    respond(StatusCode::CREATED, service.record_occurrence(request))
}

pub(crate) async fn list_occurrences_handler<D>(
    State(service): State<Arc<BonusService<D>>>,
    filter: Result<Query<OccurrenceFilter>, QueryRejection>,
) -> Response
where
    D: EmployeeDirectory + 'static,
{
    let filter = match filter {
        Ok(Query(filter)) => filter,
        Err(rejection) => return rejection_response(rejection.body_text()),
    };
    (StatusCode::OK, axum::Json(service.occurrences(&filter))).into_response()
}

pub(crate) async fn cancel_occurrence_handler<D>(
    State(service): State<Arc<BonusService<D>>>,
    occurrence_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    D: EmployeeDirectory + 'static,
{
    let occurrence_id = match occurrence_id {
        Ok(Path(occurrence_id)) => occurrence_id,
        Err(rejection) => return rejection_response(rejection.body_text()),
    };
    respond(
        StatusCode::OK,
        service.cancel_occurrence(OccurrenceId(occurrence_id)),
    )
}

pub(crate) async fn list_rules_handler<D>(State(service): State<Arc<BonusService<D>>>) -> Response
where
    D: EmployeeDirectory + 'static,
{
    (StatusCode::OK, axum::Json(service.rules())).into_response()
}

pub(crate) async fn add_rule_handler<D>(
    State(service): State<Arc<BonusService<D>>>,
    payload: Result<axum::Json<RuleDefinition>, JsonRejection>,
) -> Response
where
    D: EmployeeDirectory + 'static,
{
    let definition = match payload {
        Ok(axum::Json(definition)) => definition,
        Err(rejection) => return rejection_response(rejection.body_text()),
    };
    respond(StatusCode::CREATED, service.add_rule(definition))
}

pub(crate) async fn remove_rule_handler<D>(
    State(service): State<Arc<BonusService<D>>>,
    Path(occurrence_type): Path<String>,
) -> Response
where
    D: EmployeeDirectory + 'static,
{
    respond(StatusCode::OK, service.remove_rule(&occurrence_type))
}

pub(crate) async fn bonus_handler<D>(
    State(service): State<Arc<BonusService<D>>>,
    Path(employee_id): Path<String>,
    period: Result<Query<PeriodRequest>, QueryRejection>,
) -> Response
where
    D: EmployeeDirectory + 'static,
{
    let period = match period {
        Ok(Query(period)) => period,
        Err(rejection) => return rejection_response(rejection.body_text()),
    };
    let result = period
        .range()
        .and_then(|range| service.evaluate(&EmployeeId(employee_id), range));
    respond(StatusCode::OK, result)
}

pub(crate) async fn report_handler<D>(
    State(service): State<Arc<BonusService<D>>>,
    payload: Result<axum::Json<PeriodRequest>, JsonRejection>,
) -> Response
where
    D: EmployeeDirectory + 'static,
{
    let period = match payload {
        Ok(axum::Json(period)) => period,
        Err(rejection) => return rejection_response(rejection.body_text()),
    };
    let result = period
        .range()
        .and_then(|range| service.generate_report(range));
    respond(StatusCode::OK, result)
}

pub(crate) async fn dashboard_handler<D>(State(service): State<Arc<BonusService<D>>>) -> Response
where
    D: EmployeeDirectory + 'static,
{
    let today = Local::now().date_naive();
    respond(StatusCode::OK, service.dashboard(today))
}
