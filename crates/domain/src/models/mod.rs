//! Domain models for the Report System.

pub mod report_request;

pub use report_request::{
    ReportRequest, ReportRequestResponse, ReportRequestSnapshot, ReportStatus, ReportTransition,
};
