//! Search orchestration.
//!
//! Debounces keystrokes, cancels superseded attempts, invokes the remote
//! search and replaces the cache with the results of the one attempt that is
//! still current when it settles.

mod orchestrator;
mod types;

pub use orchestrator::SearchOrchestrator;
pub use types::*;
