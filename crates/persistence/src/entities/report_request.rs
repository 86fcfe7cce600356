//! Report request entity (database row mapping).

use std::str::FromStr;

use chrono::{DateTime, Utc};
use domain::models::{ReportRequest, ReportRequestSnapshot, ReportStatus};
use domain::DomainError;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the report_requests table.
///
/// `status` is stored as its lowercase name (`pending`, `processing`, ...).
#[derive(Debug, Clone, FromRow)]
pub struct ReportRequestEntity {
    pub id: Uuid,
    pub user_id: String,
    pub report_type: String,
    pub parameters: String,
    pub status: String,
    pub requested_at_utc: DateTime<Utc>,
    pub processed_at_utc: Option<DateTime<Utc>>,
    pub report_url: Option<String>,
    pub error_message: Option<String>,
    pub version: i32,
}

impl From<&ReportRequest> for ReportRequestEntity {
    fn from(request: &ReportRequest) -> Self {
        Self {
            id: request.id(),
            user_id: request.user_id().to_string(),
            report_type: request.report_type().to_string(),
            parameters: request.parameters().to_string(),
            status: request.status().as_str().to_string(),
            requested_at_utc: request.requested_at_utc(),
            processed_at_utc: request.processed_at_utc(),
            report_url: request.report_url().map(str::to_string),
            error_message: request.error_message().map(str::to_string),
            version: request.version(),
        }
    }
}

impl TryFrom<ReportRequestEntity> for ReportRequest {
    type Error = DomainError;

    /// A row that does not rehydrate into a valid aggregate is a storage fault,
    /// not caller input.
    fn try_from(entity: ReportRequestEntity) -> Result<Self, Self::Error> {
        let id = entity.id;
        let corrupt = |err: DomainError| {
            DomainError::storage(format!("corrupt report_requests row {id}: {err}"))
        };

        let status = ReportStatus::from_str(&entity.status).map_err(corrupt)?;

        ReportRequest::rehydrate(ReportRequestSnapshot {
            id: entity.id,
            user_id: entity.user_id,
            report_type: entity.report_type,
            parameters: entity.parameters,
            status,
            requested_at_utc: entity.requested_at_utc,
            processed_at_utc: entity.processed_at_utc,
            report_url: entity.report_url,
            error_message: entity.error_message,
            version: entity.version,
        })
        .map_err(corrupt)
    }
}
