//! Common utilities and shared types for tokapu-art.
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]

pub mod config;
pub mod error;
pub mod id;

pub use config::{Config, DatabaseConfig, EngagementConfig, ProximityConfig};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
