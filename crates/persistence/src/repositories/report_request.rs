//! Report request repository backed by PostgreSQL.

use async_trait::async_trait;
use domain::models::ReportRequest;
use domain::{DomainError, DomainResult, ReportRequestRepository};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::entities::ReportRequestEntity;
use crate::metrics::QueryTimer;

const SELECT_COLUMNS: &str = r#"
    id, user_id, report_type, parameters, status, requested_at_utc,
    processed_at_utc, report_url, error_message, version
"#;

/// PostgreSQL implementation of [`ReportRequestRepository`].
///
/// Writes are guarded by the `version` column: an update only applies when the
/// stored version equals the caller's, and bumps it by one.
#[derive(Clone)]
pub struct PgReportRequestRepository {
    pool: PgPool,
}

impl PgReportRequestRepository {
    /// Creates a new PgReportRequestRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn exists(&self, id: Uuid) -> DomainResult<bool> {
        let timer = QueryTimer::new("report_requests.exists");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM report_requests WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result.map_err(DomainError::storage)
    }
}

#[async_trait]
impl ReportRequestRepository for PgReportRequestRepository {
    async fn add(&self, request: &ReportRequest) -> DomainResult<()> {
        let row = ReportRequestEntity::from(request);

        let timer = QueryTimer::new("report_requests.add");
        let result = sqlx::query(
            r#"
            INSERT INTO report_requests (
                id, user_id, report_type, parameters, status, requested_at_utc,
                processed_at_utc, report_url, error_message, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(row.id)
        .bind(&row.user_id)
        .bind(&row.report_type)
        .bind(&row.parameters)
        .bind(&row.status)
        .bind(row.requested_at_utc)
        .bind(row.processed_at_utc)
        .bind(&row.report_url)
        .bind(&row.error_message)
        .bind(row.version)
        .execute(&self.pool)
        .await;
        timer.finish(&result);

        result.map_err(DomainError::storage)?;
        debug!(report_request_id = %row.id, "Inserted report request row");
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> DomainResult<ReportRequest> {
        let timer = QueryTimer::new("report_requests.get_by_id");
        let result = sqlx::query_as::<_, ReportRequestEntity>(&format!(
            "SELECT {SELECT_COLUMNS} FROM report_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);

        match result.map_err(DomainError::storage)? {
            Some(entity) => ReportRequest::try_from(entity),
            None => Err(DomainError::NotFound(id)),
        }
    }

    async fn update(&self, request: &ReportRequest) -> DomainResult<ReportRequest> {
        let row = ReportRequestEntity::from(request);

        let timer = QueryTimer::new("report_requests.update");
        let result = sqlx::query_as::<_, ReportRequestEntity>(&format!(
            r#"
            UPDATE report_requests
            SET user_id = $3,
                report_type = $4,
                parameters = $5,
                status = $6,
                requested_at_utc = $7,
                processed_at_utc = $8,
                report_url = $9,
                error_message = $10,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(row.id)
        .bind(row.version)
        .bind(&row.user_id)
        .bind(&row.report_type)
        .bind(&row.parameters)
        .bind(&row.status)
        .bind(row.requested_at_utc)
        .bind(row.processed_at_utc)
        .bind(&row.report_url)
        .bind(&row.error_message)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);

        if let Some(entity) = result.map_err(DomainError::storage)? {
            return ReportRequest::try_from(entity);
        }

        // Zero rows: either the id is gone or the version moved on.
        if self.exists(row.id).await? {
            Err(DomainError::ConcurrencyConflict {
                id: row.id,
                expected_version: row.version,
            })
        } else {
            Err(DomainError::NotFound(row.id))
        }
    }
}
