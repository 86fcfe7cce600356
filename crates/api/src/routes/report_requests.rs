//! Report request endpoint handlers.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use domain::models::{ReportRequest, ReportRequestResponse, ReportTransition};
use domain::services::CreateReportRequestCommand;
use domain::{DomainError, ErrorKind};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CallerId;
use crate::middleware::metrics::{record_report_request_created, record_report_request_transition};

/// Base path for report request resources.
pub const REPORT_REQUESTS_PATH: &str = "/api/v1/report-requests";

/// Request body for submitting a report request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequestBody {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Report type must be between 1 and 100 characters"
    ))]
    #[validate(custom(function = "shared::validation::validate_required_text"))]
    pub report_type: String,

    /// Serialized report parameters, stored verbatim.
    #[validate(custom(function = "shared::validation::validate_no_nul"))]
    pub parameters: String,
}

/// Response for a created report request.
#[derive(Debug, Serialize)]
pub struct CreateReportRequestResponse {
    pub id: Uuid,
}

/// Request body for completing a report request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteReportRequestBody {
    #[validate(length(
        min = 1,
        max = 500,
        message = "Report URL must be between 1 and 500 characters"
    ))]
    #[validate(custom(function = "shared::validation::validate_required_text"))]
    pub report_url: String,
}

/// Request body for failing a report request.
///
/// Messages longer than the stored limit are truncated, not rejected.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FailReportRequestBody {
    #[validate(custom(function = "shared::validation::validate_required_text"))]
    pub error_message: String,
}

/// Submit a new report request.
///
/// POST /api/v1/report-requests
pub async fn create_report_request(
    State(state): State<AppState>,
    caller: CallerId,
    Json(body): Json<CreateReportRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    body.validate()?;

    let command = CreateReportRequestCommand::new(caller.0, body.report_type, body.parameters);
    command.validate()?;

    let report_type = command.report_type.clone();
    let id = state.create_handler.handle(command).await?;
    record_report_request_created(&report_type);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("{REPORT_REQUESTS_PATH}/{id}"))],
        Json(CreateReportRequestResponse { id }),
    ))
}

/// Get a report request by id.
///
/// GET /api/v1/report-requests/:id
pub async fn get_report_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportRequestResponse>, ApiError> {
    let request = state.lifecycle.get(id).await?;
    Ok(Json(ReportRequestResponse::from(&request)))
}

/// Mark a pending report request as processing.
///
/// POST /api/v1/report-requests/:id/processing
pub async fn start_processing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportRequestResponse>, ApiError> {
    let result = state.lifecycle.start_processing(id).await;
    respond(ReportTransition::StartProcessing, result)
}

/// Complete a processing report request.
///
/// POST /api/v1/report-requests/:id/completion
pub async fn complete_report_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CompleteReportRequestBody>,
) -> Result<Json<ReportRequestResponse>, ApiError> {
    validate_body(ReportTransition::CompleteSuccessfully, &body)?;

    let result = state.lifecycle.complete(id, body.report_url).await;
    respond(ReportTransition::CompleteSuccessfully, result)
}

/// Fail a processing report request.
///
/// POST /api/v1/report-requests/:id/failure
pub async fn fail_report_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<FailReportRequestBody>,
) -> Result<Json<ReportRequestResponse>, ApiError> {
    validate_body(ReportTransition::Fail, &body)?;

    let result = state.lifecycle.fail(id, body.error_message).await;
    respond(ReportTransition::Fail, result)
}

/// Validates a transition body, counting a failure as a rejected transition.
fn validate_body(operation: ReportTransition, body: &impl Validate) -> Result<(), ApiError> {
    body.validate().map_err(|errors| {
        record_report_request_transition(transition_label(operation), "rejected");
        ApiError::from(errors)
    })
}

fn respond(
    operation: ReportTransition,
    result: Result<ReportRequest, DomainError>,
) -> Result<Json<ReportRequestResponse>, ApiError> {
    let label = transition_label(operation);
    match result {
        Ok(request) => {
            record_report_request_transition(label, "ok");
            info!(
                report_request_id = %request.id(),
                status = %request.status(),
                "Report request updated"
            );
            Ok(Json(ReportRequestResponse::from(&request)))
        }
        Err(err) => {
            let outcome = match err.kind() {
                ErrorKind::Storage => "error",
                _ => "rejected",
            };
            record_report_request_transition(label, outcome);
            Err(err.into())
        }
    }
}

fn transition_label(operation: ReportTransition) -> &'static str {
    match operation {
        ReportTransition::StartProcessing => "start_processing",
        ReportTransition::CompleteSuccessfully => "complete",
        ReportTransition::Fail => "fail",
    }
}
