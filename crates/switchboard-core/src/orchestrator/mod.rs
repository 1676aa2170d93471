//! Orchestration loop
//!
//! Ties the prefilter, router and tool registry together into one turn:
//! prefilter tools, route, call the provider, run any requested tools, and
//! fold the results into a single follow-up completion.

mod engine;
mod settings;
mod turn;

pub use engine::Orchestrator;
pub use settings::OrchestratorSettings;
pub use turn::{TurnError, TurnErrorKind, TurnRequest, TurnResponse, TurnResult, TurnState};
