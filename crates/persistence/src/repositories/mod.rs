//! Repository implementations for database operations.

pub mod report_request;

pub use report_request::PgReportRequestRepository;
