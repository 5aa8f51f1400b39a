//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → access_policy.rs (origin decision, preflight short-circuit)
//!     → Pass to action router
//!     → access_policy.rs (cross-origin headers on the way out)
//! ```

pub mod access_policy;

pub use access_policy::{access_policy_middleware, AccessDecision, AccessPolicy};
