//! Orchestrator infrastructure layer

pub mod archive;
pub mod git;
pub mod order_token;
pub(crate) mod process;
pub mod providers;
pub mod scc;
pub mod workspace;

pub use archive::*;
pub use git::*;
pub use order_token::*;
pub use providers::*;
pub use scc::*;
pub use workspace::*;
