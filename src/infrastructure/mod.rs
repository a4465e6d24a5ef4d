//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: The in-memory document store
//! - Database: The sqlite-backed document store
//! - Catalog: Static storefront data

pub mod catalog;
pub mod config;
pub mod database;
pub mod storage;
