//! Model routing
//!
//! Capability filtering, cost/quality ranking, fallback chains and the
//! metrics the router keeps while walking them.

mod catalog;
mod error;
mod metrics;
mod model_router;
mod request;

pub use catalog::{approx_tokens, estimate_cost, ModelCatalog};
pub use error::{AttemptFailure, RouterError, RouterResult};
pub use metrics::{MetricsSnapshot, ProviderMetrics, RouterMetrics};
pub use model_router::ModelRouter;
pub use request::{Completion, Priority, RouteDecision, RouteRequest, RouterSettings};
