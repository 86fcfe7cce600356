//! Database metrics collection.

use metrics::histogram;
use std::time::Instant;

/// Times a repository query and records it under `database_query_duration_seconds`.
///
/// Usage:
/// ```ignore
/// let timer = QueryTimer::new("report_requests.get_by_id");
/// let result = sqlx::query_as::<_, ReportRequestEntity>(...).fetch_optional(&pool).await;
/// timer.finish(&result);
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    /// Start timing the named query.
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration, labelled with the query outcome.
    pub fn finish<T, E>(self, result: &Result<T, E>) {
        let outcome = if result.is_ok() { "ok" } else { "error" };
        histogram!(
            "database_query_duration_seconds",
            "query" => self.query_name,
            "outcome" => outcome
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}
