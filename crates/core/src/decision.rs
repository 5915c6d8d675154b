//! The validated routing decision.

use crate::handler::HandlerName;
use serde::{Deserialize, Serialize};

/// A routing decision that has already passed registry validation.
///
/// Construct via [`RoutingDecision::new`] or the decision parser; the
/// handler is guaranteed to be a member of the closed registry by type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// The handler to dispatch to.
    pub handler: HandlerName,

    /// Task context the classifier extracted for the handler. May echo
    /// masked PII tokens; the injector unmasks them before dispatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_context: Option<String>,

    /// The classifier's stated reasoning, kept for observability only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl RoutingDecision {
    /// A decision with no extracted context.
    pub fn new(handler: HandlerName) -> Self {
        Self {
            handler,
            task_context: None,
            reasoning: None,
        }
    }

    /// The deterministic fallback decision: default handler, empty context.
    pub fn fallback() -> Self {
        Self::new(HandlerName::DEFAULT)
    }

    pub fn with_task_context(mut self, context: impl Into<String>) -> Self {
        self.task_context = Some(context.into());
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_targets_default_handler() {
        let decision = RoutingDecision::fallback();
        assert_eq!(decision.handler, HandlerName::DEFAULT);
        assert!(decision.task_context.is_none());
        assert!(decision.reasoning.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let decision = RoutingDecision::new(HandlerName::TrainingCreator)
            .with_task_context("training for [USER-AB12CD34]")
            .with_reasoning("user asked for training");
        assert_eq!(decision.handler, HandlerName::TrainingCreator);
        assert_eq!(
            decision.task_context.as_deref(),
            Some("training for [USER-AB12CD34]")
        );
    }

    #[test]
    fn serde_omits_empty_optionals() {
        let json = serde_json::to_string(&RoutingDecision::fallback()).unwrap();
        assert!(!json.contains("task_context"));
        assert!(!json.contains("reasoning"));
    }
}
