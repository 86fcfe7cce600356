//! Domain layer for the Report System backend.
//!
//! This crate contains:
//! - The `ReportRequest` aggregate and its lifecycle state machine
//! - The repository port and an in-memory implementation
//! - Command handling and lifecycle services
//! - Domain error types

pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use error::{DomainError, DomainResult, ErrorKind};
pub use repository::{InMemoryReportRequestRepository, ReportRequestRepository};
