//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! InboundRequest (method, action, query, body)
//!     → actions.rs (static ActionSpec lookup)
//!     → router.rs (validate, call upstream at most once, shape response)
//!     → OutwardResponse
//! ```
//!
//! # Design Decisions
//! - Action table compiled in, immutable at runtime
//! - Deterministic: same request and outcome always yield the same response
//! - Unknown GET actions forward upstream unless configured otherwise

pub mod actions;
pub mod router;

pub use actions::{ActionMethod, ActionSpec, BodyMode, ResponseMode, ACTIONS};
pub use router::{ActionRouter, RoutePolicy};
