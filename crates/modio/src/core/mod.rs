//! Core types used throughout the client
//!
//! Error and configuration types that every other module depends on.

pub mod config;
pub mod error;

pub use config::{ClientConfig, Credentials};
pub use error::{ApiError, ModioError, Result, ValidationError};
