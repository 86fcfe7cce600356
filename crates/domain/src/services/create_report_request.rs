//! CreateReportRequest command and handler.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::error::DomainResult;
use crate::models::ReportRequest;
use crate::repository::ReportRequestRepository;

/// Command to create a new report request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequestCommand {
    #[validate(length(
        min = 1,
        max = 100,
        message = "User ID must be between 1 and 100 characters"
    ))]
    #[validate(custom(function = "shared::validation::validate_required_text"))]
    pub user_id: String,

    #[validate(length(
        min = 1,
        max = 100,
        message = "Report type must be between 1 and 100 characters"
    ))]
    #[validate(custom(function = "shared::validation::validate_required_text"))]
    pub report_type: String,

    #[validate(custom(function = "shared::validation::validate_no_nul"))]
    pub parameters: String,
}

impl CreateReportRequestCommand {
    pub fn new(
        user_id: impl Into<String>,
        report_type: impl Into<String>,
        parameters: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            report_type: report_type.into(),
            parameters: parameters.into(),
        }
    }
}

/// Turns a [`CreateReportRequestCommand`] into a persisted pending request.
#[derive(Clone)]
pub struct CreateReportRequestHandler {
    repository: Arc<dyn ReportRequestRepository>,
}

impl CreateReportRequestHandler {
    pub fn new(repository: Arc<dyn ReportRequestRepository>) -> Self {
        Self { repository }
    }

    /// Create the aggregate, store it and return its identifier.
    ///
    /// Storage failures are returned unchanged; nothing is retried.
    #[instrument(
        skip(self, command),
        fields(user_id = %command.user_id, report_type = %command.report_type)
    )]
    pub async fn handle(&self, command: CreateReportRequestCommand) -> DomainResult<Uuid> {
        let request =
            ReportRequest::create(command.user_id, command.report_type, command.parameters)?;

        self.repository.add(&request).await?;

        info!(report_request_id = %request.id(), "Report request created");
        Ok(request.id())
    }
}
