//! # Projdesk Common Library
//!
//! Shared code for the projdesk services:
//! - Error type used by configuration and startup
//! - TOML configuration loading and tier resolution
//! - Logging initialization

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
