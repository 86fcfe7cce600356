//! Domain services for the Report System.
//!
//! Services orchestrate the aggregate and the repository port.

pub mod create_report_request;
pub mod report_lifecycle;

pub use create_report_request::{CreateReportRequestCommand, CreateReportRequestHandler};
pub use report_lifecycle::ReportLifecycleService;
