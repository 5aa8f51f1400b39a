//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! UpstreamRequest (method, query pairs, body)
//!     → caller.rs (one reqwest call under a hard deadline)
//!     → classifier.rs (JSON / JSON-in-noise / text / unusable page)
//!     → UpstreamOutcome (exactly one per call)
//!
//! Diagnostics:
//!     preview.rs bounds and escapes raw upstream text before it is echoed
//! ```

pub mod caller;
pub mod classifier;
pub mod outcome;
pub mod preview;

pub use caller::{Upstream, UpstreamClient, UpstreamRequest, UpstreamSetupError};
pub use classifier::{classify, ResponseClassifier};
pub use outcome::{UnusableReason, UpstreamOutcome};
