//! # Veilroute Router
//!
//! The orchestration layer: assemble a bounded conversation window, mask
//! it, classify the intent, and dispatch to a registered handler with the
//! real identifiers restored. Every failure along the way degrades to the
//! deterministic fallback decision — [`IntentRouter::route`] cannot fail.

pub mod assembler;
pub mod inject;
pub mod route;
pub mod session;

pub use assembler::{ContextAssembler, HISTORY_DELIMITER};
pub use inject::inject_context;
pub use route::{IntentRouter, RouteOutcome, RouteRequest, RouteTrace};
pub use session::{RESOURCE_ID, Session, SessionMeta, resolve_thread_id};
