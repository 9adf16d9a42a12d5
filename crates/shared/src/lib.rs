//! Shared types, errors, and configuration for Stockledger.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Decimal tolerance and rounding helpers for ledger arithmetic
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, PostingConfig};
pub use error::{AppError, AppResult};
