//! # API Shared
//!
//! Shared definitions for the MedWise APIs.
//!
//! Contains:
//! - Request/response bodies (`dto` module) with OpenAPI schemas
//! - Shared services like `HealthService`
//!
//! Used by `api-rest`; the CLI talks to `medwise-core` directly.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
