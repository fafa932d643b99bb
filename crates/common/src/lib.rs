//! Shared utilities, configuration, and error handling for Fundline
//!
//! This crate provides common functionality used across the Fundline application:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Store error normalization

pub mod config;
pub mod db;
pub mod error;

pub use config::Config;
pub use db::StoreError;
pub use error::{Error, Result};
