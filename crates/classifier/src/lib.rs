//! # Veilroute Classifier
//!
//! The intent-classifier adapter and the decision parser/repairer.
//!
//! The adapter sends one masked text block to an OpenAI-compatible chat
//! endpoint and hands back the raw text. The parser turns that raw —
//! possibly fenced, prose-wrapped, or near-miss — output into a validated
//! [`RoutingDecision`](veilroute_core::RoutingDecision), or fails so the
//! router can fall back.

pub mod http;
pub mod parser;
pub mod prompt;

pub use http::HttpClassifier;
pub use parser::parse_decision;
pub use prompt::classification_prompt;
