//! Persistence layer for the report request service.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - The PostgreSQL implementation of the report request repository

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
