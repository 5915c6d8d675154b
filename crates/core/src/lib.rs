//! # Veilroute Core
//!
//! Domain types, traits, and error definitions for the Veilroute
//! privacy-preserving intent router. This crate has **zero framework
//! dependencies** — it defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! The classifier backend is defined as a trait here; implementations live
//! in their own crate. This enables:
//! - Swapping backends via configuration
//! - Easy testing with mock/stub classifiers
//! - Clean dependency graph (all crates depend inward on core)

pub mod classifier;
pub mod decision;
pub mod error;
pub mod handler;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use classifier::Classifier;
pub use decision::RoutingDecision;
pub use error::{ClassifierError, DecisionError, Error, Result, Retryable};
pub use handler::HandlerName;
pub use turn::{Role, Turn};
