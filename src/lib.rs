//! Locus - line-of-code counting service
//!
//! This is the main binary crate that wires the orchestrator to its
//! configuration and external tools.

mod app;

pub use app::{AppHandle, create_app};
pub use locus_core::{Config, init_tracing};
pub use locus_orchestrator::presentation::controllers::OrchestratorState;

pub use locus_core;
pub use locus_orchestrator;
