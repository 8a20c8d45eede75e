//! Shared application-level types

pub mod errors;

pub use errors::ApplicationError;
