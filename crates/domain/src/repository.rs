//! Report request repository port.
//!
//! The command handler and lifecycle service only see this trait; the backing
//! store (PostgreSQL, in-memory) is chosen at startup.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::ReportRequest;

/// Durable storage for [`ReportRequest`] aggregates.
///
/// Implementations must make a single aggregate's writes visible to every
/// subsequent read of that aggregate.
#[async_trait]
pub trait ReportRequestRepository: Send + Sync {
    /// Store a new aggregate atomically.
    ///
    /// # Errors
    ///
    /// - `Storage` on persistence failure, including a duplicate identifier
    async fn add(&self, request: &ReportRequest) -> DomainResult<()>;

    /// Load the latest stored state of an aggregate.
    ///
    /// # Errors
    ///
    /// - `NotFound` if nothing is stored under `id`
    /// - `Storage` on persistence failure
    async fn get_by_id(&self, id: Uuid) -> DomainResult<ReportRequest>;

    /// Overwrite the stored aggregate with `request` in full.
    ///
    /// The write only applies if the stored version still equals
    /// `request.version()`. Returns the stored state with its new version.
    ///
    /// # Errors
    ///
    /// - `NotFound` if nothing is stored under `request.id()`
    /// - `ConcurrencyConflict` if the stored version has moved on
    /// - `Storage` on persistence failure
    async fn update(&self, request: &ReportRequest) -> DomainResult<ReportRequest>;
}

/// In-process repository backed by a `HashMap`.
///
/// Used for the `memory` storage backend and in tests.
#[derive(Clone, Default)]
pub struct InMemoryReportRequestRepository {
    store: Arc<RwLock<HashMap<Uuid, ReportRequest>>>,
    simulate_failure: bool,
}

impl InMemoryReportRequestRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository whose every operation fails with a storage error.
    pub fn failing() -> Self {
        Self {
            store: Arc::default(),
            simulate_failure: true,
        }
    }

    /// Number of stored aggregates.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Whether the repository holds no aggregates.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    fn check_available(&self) -> DomainResult<()> {
        if self.simulate_failure {
            Err(DomainError::storage("in-memory store unavailable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ReportRequestRepository for InMemoryReportRequestRepository {
    async fn add(&self, request: &ReportRequest) -> DomainResult<()> {
        self.check_available()?;

        let mut store = self.store.write().await;
        if store.contains_key(&request.id()) {
            return Err(DomainError::storage(format!(
                "report request {} already exists",
                request.id()
            )));
        }
        store.insert(request.id(), request.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> DomainResult<ReportRequest> {
        self.check_available()?;

        self.store
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DomainError::NotFound(id))
    }

    async fn update(&self, request: &ReportRequest) -> DomainResult<ReportRequest> {
        self.check_available()?;

        let mut store = self.store.write().await;
        let stored = store
            .get_mut(&request.id())
            .ok_or(DomainError::NotFound(request.id()))?;

        if stored.version() != request.version() {
            return Err(DomainError::ConcurrencyConflict {
                id: request.id(),
                expected_version: request.version(),
            });
        }

        let next = request.with_next_version()?;
        *stored = next.clone();
        Ok(next)
    }
}
