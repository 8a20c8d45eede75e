//! Line counting with scc

mod executor;
mod output;

pub use executor::SccLineCounter;
pub use output::decode_report;
