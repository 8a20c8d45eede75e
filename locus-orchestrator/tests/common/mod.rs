//! Shared fakes, fixtures and helpers for orchestrator tests
#![allow(dead_code)]

pub mod factories;
pub mod mocks;
pub mod test_helpers;

pub use factories::*;
pub use mocks::*;
pub use test_helpers::*;
