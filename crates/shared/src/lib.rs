//! Shared utilities for the Report System backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Input validation helpers usable from `validator` derives
//! - Bounded string handling for persisted text columns

pub mod validation;
