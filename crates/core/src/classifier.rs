//! Classifier trait — the abstraction over the intent-classification LLM.
//!
//! A Classifier receives one masked text block and returns the model's raw
//! text output. It never performs the requested action itself, and it never
//! sees unmasked PII — the router masks before calling and the decision
//! parser interprets the raw text afterwards.

use crate::error::ClassifierError;
use async_trait::async_trait;

/// The core Classifier trait.
///
/// The router calls `classify()` without knowing which backend is being
/// used — pure polymorphism. Implementations: OpenAI-compatible HTTP
/// backends, test mocks.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// A human-readable name for this backend (e.g., "openai", "mock").
    fn name(&self) -> &str;

    /// Send the masked input block and return the raw text response.
    ///
    /// One model call, no tool use. The response is expected to contain a
    /// JSON routing decision but callers must treat it as untrusted text.
    async fn classify(&self, masked_input: &str) -> Result<String, ClassifierError>;
}
