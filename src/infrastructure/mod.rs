//! Infrastructure layer
//!
//! Adapters for the domain ports: PostgreSQL repositories, page caches and
//! configuration loading.

pub mod cache;
pub mod config;
pub mod persistence;
