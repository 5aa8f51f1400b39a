//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → security::access_policy (origin decision, preflight)
//!     → request.rs (InboundRequest: method, origin, action, query, body)
//!     → routing::router (one upstream call at most)
//!     → response.rs (JSON envelope or HTML fragment)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{InboundRequest, MakeRequestUuid, X_REQUEST_ID};
pub use response::{OutwardResponse, Payload};
pub use server::{HttpServer, ServerError};
