//! Orchestrator domain layer

pub mod aggregation;
pub mod entities;
pub mod services;
pub mod value_objects;

pub use aggregation::*;
pub use entities::*;
pub use services::*;
pub use value_objects::*;
