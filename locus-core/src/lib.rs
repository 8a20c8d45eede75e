//! Locus Core - Foundation crate for the locus line-counting service
//!
//! This crate provides the pieces every other crate of the workspace leans on:
//!
//! # Modules
//!
//! - [`config`]: Strongly-typed configuration with TOML and environment variable support
//! - [`application`]: The application error taxonomy shared by the pipeline and HTTP layer
//! - [`logging`]: Structured logging with tracing
//!
//! # Configuration
//!
//! Load configuration from files and environment:
//!
//! ```rust,ignore
//! use locus_core::Config;
//!
//! let config = Config::load()?;
//! ```
//!
//! Environment variables use the `LOCUS__` prefix with double underscore separators:
//!
//! ```bash
//! LOCUS__SERVER__PORT=3000
//! LOCUS__LIMITS__MAX_REPO_SIZE_MB=500
//! ```
//!
//! # Logging
//!
//! ```rust,ignore
//! use locus_core::init_tracing;
//!
//! init_tracing(&config.logging)?;
//! ```

pub mod application;
pub mod config;
pub mod logging;

pub use application::errors::ApplicationError;
pub use config::Config;
pub use logging::init_tracing;
