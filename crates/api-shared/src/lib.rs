//! # API Shared
//!
//! Shared definitions for the clinical risk APIs.
//!
//! Contains:
//! - Wire types (`types` module) for the JSON surface, with OpenAPI schemas
//! - Shared services like `HealthService`
//!
//! Used by `api-rest`.

pub mod health;
pub mod types;

pub use health::HealthService;
pub use types::*;
