//! Report request aggregate.
//!
//! A report request is created in `Pending`, picked up by a worker (`Processing`)
//! and finishes either `Completed` with a download URL or `Failed` with a message.
//! Fields are private; the factory and the three transition methods are the only
//! way to change state.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use shared::validation::{truncate_chars, validate_max_chars, validate_no_nul, validate_not_blank};

/// Maximum length of `user_id`.
pub const MAX_USER_ID_LENGTH: usize = 100;
/// Maximum length of `report_type`.
pub const MAX_REPORT_TYPE_LENGTH: usize = 100;
/// Maximum length of `report_url`.
pub const MAX_REPORT_URL_LENGTH: usize = 500;
/// Maximum length of `error_message`; longer failure messages are truncated.
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 1000;

/// Version assigned to a freshly created aggregate.
pub const INITIAL_VERSION: i32 = 1;

/// Lifecycle status of a report request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Created and waiting for a worker.
    Pending,
    /// A worker is generating the report.
    Processing,
    /// The report is available for download.
    Completed,
    /// Generation failed.
    Failed,
}

impl ReportStatus {
    /// Symbolic name used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Processing => "processing",
            ReportStatus::Completed => "completed",
            ReportStatus::Failed => "failed",
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Completed | ReportStatus::Failed)
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(ReportStatus::Pending),
            "processing" => Ok(ReportStatus::Processing),
            "completed" => Ok(ReportStatus::Completed),
            "failed" => Ok(ReportStatus::Failed),
            other => Err(DomainError::InvalidArgument(format!(
                "Unknown report status: {}",
                other
            ))),
        }
    }
}

/// Lifecycle operations, named in transition errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportTransition {
    StartProcessing,
    CompleteSuccessfully,
    Fail,
}

impl std::fmt::Display for ReportTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportTransition::StartProcessing => write!(f, "start processing"),
            ReportTransition::CompleteSuccessfully => write!(f, "complete"),
            ReportTransition::Fail => write!(f, "fail"),
        }
    }
}

/// Raw stored state of a report request, as read back from a backing store.
///
/// Only [`ReportRequest::rehydrate`] turns this into an aggregate, after checking
/// that the fields describe a reachable lifecycle state.
#[derive(Debug, Clone)]
pub struct ReportRequestSnapshot {
    pub id: Uuid,
    pub user_id: String,
    pub report_type: String,
    pub parameters: String,
    pub status: ReportStatus,
    pub requested_at_utc: DateTime<Utc>,
    pub processed_at_utc: Option<DateTime<Utc>>,
    pub report_url: Option<String>,
    pub error_message: Option<String>,
    pub version: i32,
}

/// Aggregate root for a single report request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    id: Uuid,
    user_id: String,
    report_type: String,
    parameters: String,
    status: ReportStatus,
    requested_at_utc: DateTime<Utc>,
    processed_at_utc: Option<DateTime<Utc>>,
    report_url: Option<String>,
    error_message: Option<String>,
    version: i32,
}

impl ReportRequest {
    /// Create a new pending report request with a fresh identifier.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `user_id` or `report_type` is blank or too long, or if any
    /// field contains a NUL character.
    pub fn create(
        user_id: impl Into<String>,
        report_type: impl Into<String>,
        parameters: impl Into<String>,
    ) -> DomainResult<Self> {
        let user_id = user_id.into();
        let report_type = report_type.into();
        let parameters = parameters.into();

        check_required("user_id", &user_id, MAX_USER_ID_LENGTH)?;
        check_required("report_type", &report_type, MAX_REPORT_TYPE_LENGTH)?;
        check_storable("parameters", &parameters)?;

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            report_type,
            parameters,
            status: ReportStatus::Pending,
            requested_at_utc: utc_now(),
            processed_at_utc: None,
            report_url: None,
            error_message: None,
            version: INITIAL_VERSION,
        })
    }

    /// Rebuild an aggregate from stored state.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the snapshot violates a lifecycle invariant.
    pub fn rehydrate(snapshot: ReportRequestSnapshot) -> DomainResult<Self> {
        let ReportRequestSnapshot {
            id,
            user_id,
            report_type,
            parameters,
            status,
            requested_at_utc,
            processed_at_utc,
            report_url,
            error_message,
            version,
        } = snapshot;

        let corrupt = |reason: &str| {
            DomainError::InvalidArgument(format!(
                "Stored report request {} is inconsistent: {}",
                id, reason
            ))
        };

        if version < INITIAL_VERSION {
            return Err(corrupt("version must be positive"));
        }

        let shape_ok = match status {
            ReportStatus::Pending => {
                processed_at_utc.is_none() && report_url.is_none() && error_message.is_none()
            }
            ReportStatus::Processing => {
                processed_at_utc.is_some() && report_url.is_none() && error_message.is_none()
            }
            ReportStatus::Completed => {
                processed_at_utc.is_some() && report_url.is_some() && error_message.is_none()
            }
            ReportStatus::Failed => {
                processed_at_utc.is_some() && report_url.is_none() && error_message.is_some()
            }
        };
        if !shape_ok {
            return Err(corrupt(&format!(
                "fields do not match status '{}'",
                status
            )));
        }

        if let Some(processed) = processed_at_utc {
            if processed < requested_at_utc {
                return Err(corrupt("processed_at_utc precedes requested_at_utc"));
            }
        }

        Ok(Self {
            id,
            user_id,
            report_type,
            parameters,
            status,
            requested_at_utc,
            processed_at_utc,
            report_url,
            error_message,
            version,
        })
    }

    /// Move a pending request into processing.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the request is `Pending`. The aggregate is left untouched.
    pub fn start_processing(&mut self) -> DomainResult<()> {
        self.guard(ReportStatus::Pending, ReportTransition::StartProcessing)?;

        self.status = ReportStatus::Processing;
        self.processed_at_utc = Some(self.transition_time());
        Ok(())
    }

    /// Mark a processing request as completed with its download location.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the request is `Processing`; `InvalidArgument` if the
    /// URL is blank or longer than [`MAX_REPORT_URL_LENGTH`]. The aggregate is left
    /// untouched on error.
    pub fn complete_successfully(&mut self, report_url: impl Into<String>) -> DomainResult<()> {
        self.guard(ReportStatus::Processing, ReportTransition::CompleteSuccessfully)?;

        let report_url = report_url.into();
        check_required("report_url", &report_url, MAX_REPORT_URL_LENGTH)?;

        self.status = ReportStatus::Completed;
        self.report_url = Some(report_url);
        self.processed_at_utc = Some(self.transition_time());
        Ok(())
    }

    /// Mark a processing request as failed.
    ///
    /// Messages longer than [`MAX_ERROR_MESSAGE_LENGTH`] are truncated.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the request is `Processing`; `InvalidArgument` if the
    /// message is blank or contains a NUL character. The aggregate is left untouched
    /// on error.
    pub fn fail(&mut self, error_message: impl Into<String>) -> DomainResult<()> {
        self.guard(ReportStatus::Processing, ReportTransition::Fail)?;

        let error_message = error_message.into();
        validate_not_blank(&error_message).map_err(|_| {
            DomainError::InvalidArgument("error_message must not be blank".to_string())
        })?;
        check_storable("error_message", &error_message)?;

        self.status = ReportStatus::Failed;
        self.error_message = Some(truncate_chars(&error_message, MAX_ERROR_MESSAGE_LENGTH));
        self.processed_at_utc = Some(self.transition_time());
        Ok(())
    }

    fn guard(&self, expected: ReportStatus, operation: ReportTransition) -> DomainResult<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                id: self.id,
                from: self.status,
                operation,
            })
        }
    }

    /// Current time, never earlier than any timestamp already on the aggregate.
    fn transition_time(&self) -> DateTime<Utc> {
        let floor = self
            .processed_at_utc
            .map_or(self.requested_at_utc, |p| p.max(self.requested_at_utc));
        utc_now().max(floor)
    }

    /// Copy of this aggregate carrying the next version, as written by a store.
    ///
    /// # Errors
    ///
    /// `Storage` if the version counter is exhausted.
    pub(crate) fn with_next_version(&self) -> DomainResult<Self> {
        let version = self.version.checked_add(1).ok_or_else(|| {
            DomainError::storage(format!(
                "version counter exhausted for report request {}",
                self.id
            ))
        })?;
        Ok(Self {
            version,
            ..self.clone()
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn report_type(&self) -> &str {
        &self.report_type
    }

    pub fn parameters(&self) -> &str {
        &self.parameters
    }

    pub fn status(&self) -> ReportStatus {
        self.status
    }

    pub fn requested_at_utc(&self) -> DateTime<Utc> {
        self.requested_at_utc
    }

    pub fn processed_at_utc(&self) -> Option<DateTime<Utc>> {
        self.processed_at_utc
    }

    pub fn report_url(&self) -> Option<&str> {
        self.report_url.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Optimistic concurrency token; incremented by every successful store update.
    pub fn version(&self) -> i32 {
        self.version
    }
}

/// Timestamps are kept at microsecond precision so they survive a database round trip.
fn utc_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn check_storable(field: &str, value: &str) -> DomainResult<()> {
    validate_no_nul(value).map_err(|_| {
        DomainError::InvalidArgument(format!("{} must not contain NUL characters", field))
    })
}

fn check_required(field: &str, value: &str, max: usize) -> DomainResult<()> {
    validate_not_blank(value)
        .map_err(|_| DomainError::InvalidArgument(format!("{} must not be blank", field)))?;
    check_storable(field, value)?;
    validate_max_chars(value, max).map_err(|_| {
        DomainError::InvalidArgument(format!("{} must be at most {} characters", field, max))
    })
}

/// Read model returned to API clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequestResponse {
    pub id: Uuid,
    pub user_id: String,
    pub report_type: String,
    pub parameters: String,
    pub status: ReportStatus,
    pub requested_at_utc: DateTime<Utc>,
    pub processed_at_utc: Option<DateTime<Utc>>,
    pub report_url: Option<String>,
    pub error_message: Option<String>,
}

impl From<&ReportRequest> for ReportRequestResponse {
    fn from(request: &ReportRequest) -> Self {
        Self {
            id: request.id,
            user_id: request.user_id.clone(),
            report_type: request.report_type.clone(),
            parameters: request.parameters.clone(),
            status: request.status,
            requested_at_utc: request.requested_at_utc,
            processed_at_utc: request.processed_at_utc,
            report_url: request.report_url.clone(),
            error_message: request.error_message.clone(),
        }
    }
}
