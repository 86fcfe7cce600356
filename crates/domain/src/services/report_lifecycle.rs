//! Report lifecycle service.
//!
//! Drives a stored report request through its transitions on behalf of the
//! rendering worker: load, apply one transition, write back.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::{ReportRequest, ReportTransition};
use crate::repository::ReportRequestRepository;

/// Load-transition-update orchestration over the repository port.
#[derive(Clone)]
pub struct ReportLifecycleService {
    repository: Arc<dyn ReportRequestRepository>,
}

impl ReportLifecycleService {
    pub fn new(repository: Arc<dyn ReportRequestRepository>) -> Self {
        Self { repository }
    }

    /// Current stored state of a report request.
    pub async fn get(&self, id: Uuid) -> DomainResult<ReportRequest> {
        self.repository.get_by_id(id).await
    }

    /// Move a pending request into processing.
    #[instrument(skip(self))]
    pub async fn start_processing(&self, id: Uuid) -> DomainResult<ReportRequest> {
        self.apply(id, ReportTransition::StartProcessing, |request| {
            request.start_processing()
        })
        .await
    }

    /// Complete a processing request with its download location.
    #[instrument(skip(self, report_url))]
    pub async fn complete(&self, id: Uuid, report_url: String) -> DomainResult<ReportRequest> {
        self.apply(id, ReportTransition::CompleteSuccessfully, move |request| {
            request.complete_successfully(report_url)
        })
        .await
    }

    /// Fail a processing request.
    #[instrument(skip(self, error_message))]
    pub async fn fail(&self, id: Uuid, error_message: String) -> DomainResult<ReportRequest> {
        self.apply(id, ReportTransition::Fail, move |request| {
            request.fail(error_message)
        })
        .await
    }

    async fn apply<F>(
        &self,
        id: Uuid,
        operation: ReportTransition,
        transition: F,
    ) -> DomainResult<ReportRequest>
    where
        F: FnOnce(&mut ReportRequest) -> DomainResult<()> + Send,
    {
        let mut request = self.repository.get_by_id(id).await?;
        let from = request.status();

        if let Err(err) = transition(&mut request) {
            warn!(report_request_id = %id, %operation, from = %from, error = %err, "Transition rejected");
            return Err(err);
        }

        let stored = self.repository.update(&request).await.inspect_err(|err| {
            if let DomainError::ConcurrencyConflict { .. } = err {
                warn!(report_request_id = %id, %operation, "Concurrent update detected");
            }
        })?;

        info!(
            report_request_id = %id,
            %operation,
            from = %from,
            to = %stored.status(),
            version = stored.version(),
            "Report request transitioned"
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::ReportStatus;
    use crate::repository::InMemoryReportRequestRepository;
    use crate::services::{CreateReportRequestCommand, CreateReportRequestHandler};

    struct Fixture {
        repo: InMemoryReportRequestRepository,
        service: ReportLifecycleService,
    }

    impl Fixture {
        fn new() -> Self {
            let repo = InMemoryReportRequestRepository::new();
            let service = ReportLifecycleService::new(Arc::new(repo.clone()));
            Self { repo, service }
        }

        async fn submit(&self) -> Uuid {
            CreateReportRequestHandler::new(Arc::new(self.repo.clone()))
                .handle(CreateReportRequestCommand::new(
                    "u1",
                    "MonthlySales",
                    r#"{"month":10,"year":2024}"#,
                ))
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn test_submit_then_load_is_pending() {
        let fx = Fixture::new();
        let id = fx.submit().await;

        let request = fx.service.get(id).await.unwrap();
        assert_eq!(request.status(), ReportStatus::Pending);
    }

    #[tokio::test]
    async fn test_start_processing_persists() {
        let fx = Fixture::new();
        let id = fx.submit().await;

        fx.service.start_processing(id).await.unwrap();

        let reloaded = fx.service.get(id).await.unwrap();
        assert_eq!(reloaded.status(), ReportStatus::Processing);
        assert!(reloaded.processed_at_utc().unwrap() >= reloaded.requested_at_utc());
    }

    #[tokio::test]
    async fn test_complete_persists_url() {
        let fx = Fixture::new();
        let id = fx.submit().await;
        fx.service.start_processing(id).await.unwrap();

        fx.service
            .complete(id, "https://example/report.pdf".to_string())
            .await
            .unwrap();

        let reloaded = fx.service.get(id).await.unwrap();
        assert_eq!(reloaded.status(), ReportStatus::Completed);
        assert_eq!(reloaded.report_url(), Some("https://example/report.pdf"));
        assert!(reloaded.error_message().is_none());
    }

    #[tokio::test]
    async fn test_fail_persists_message() {
        let fx = Fixture::new();
        let id = fx.submit().await;
        fx.service.start_processing(id).await.unwrap();

        fx.service
            .fail(id, "render timeout".to_string())
            .await
            .unwrap();

        let reloaded = fx.service.get(id).await.unwrap();
        assert_eq!(reloaded.status(), ReportStatus::Failed);
        assert_eq!(reloaded.error_message(), Some("render timeout"));
        assert!(reloaded.report_url().is_none());
    }

    #[tokio::test]
    async fn test_rejected_transition_leaves_store_untouched() {
        let fx = Fixture::new();
        let id = fx.submit().await;
        let before = fx.service.get(id).await.unwrap();

        let err = fx
            .service
            .complete(id, "https://example/report.pdf".to_string())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(fx.service.get(id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let fx = Fixture::new();
        let err = fx.service.start_processing(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_storage_failure_is_propagated() {
        let service =
            ReportLifecycleService::new(Arc::new(InMemoryReportRequestRepository::failing()));
        let err = service.start_processing(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[tokio::test]
    async fn test_each_transition_bumps_version() {
        let fx = Fixture::new();
        let id = fx.submit().await;

        let started = fx.service.start_processing(id).await.unwrap();
        let done = fx
            .service
            .complete(id, "https://example/report.pdf".to_string())
            .await
            .unwrap();

        assert_eq!(started.version(), 2);
        assert_eq!(done.version(), 3);
    }
}
