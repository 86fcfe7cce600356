//! Entity definitions (database row mappings).

pub mod report_request;

pub use report_request::ReportRequestEntity;
