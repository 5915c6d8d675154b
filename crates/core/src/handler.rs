//! The closed handler registry.
//!
//! Every routing decision must name one of these handlers. The set is
//! statically known: adding a handler is a code change here, never a
//! runtime registration, so a classifier can never invent a destination.

use serde::{Deserialize, Serialize};

/// A downstream handler the router may dispatch to.
///
/// Wire names are camelCase — this is what the classifier is asked to emit
/// in its `agent` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HandlerName {
    /// Builds security-awareness training modules.
    TrainingCreator,
    /// Builds simulated phishing campaigns.
    PhishingSimulator,
    /// Writes scripts for awareness videos.
    VideoScriptWriter,
    /// Summarizes and answers questions about security policies.
    PolicySummaryAssistant,
    /// Catch-all conversational handler; can ask the user for whatever
    /// information the others would need.
    GeneralAssistant,
}

impl HandlerName {
    /// The deterministic fallback destination when classification fails.
    pub const DEFAULT: HandlerName = HandlerName::GeneralAssistant;

    /// All registered handlers, in stable order.
    pub const ALL: [HandlerName; 5] = [
        HandlerName::TrainingCreator,
        HandlerName::PhishingSimulator,
        HandlerName::VideoScriptWriter,
        HandlerName::PolicySummaryAssistant,
        HandlerName::GeneralAssistant,
    ];

    /// The wire name the classifier uses for this handler.
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerName::TrainingCreator => "trainingCreator",
            HandlerName::PhishingSimulator => "phishingSimulator",
            HandlerName::VideoScriptWriter => "videoScriptWriter",
            HandlerName::PolicySummaryAssistant => "policySummaryAssistant",
            HandlerName::GeneralAssistant => "generalAssistant",
        }
    }

    /// One-line description used when enumerating the registry for the
    /// classifier prompt.
    pub fn description(&self) -> &'static str {
        match self {
            HandlerName::TrainingCreator => {
                "Creates security-awareness training modules for named recipients."
            }
            HandlerName::PhishingSimulator => {
                "Designs simulated phishing campaigns and landing pages."
            }
            HandlerName::VideoScriptWriter => {
                "Writes scripts and storyboards for awareness videos."
            }
            HandlerName::PolicySummaryAssistant => {
                "Summarizes security policies and answers policy questions."
            }
            HandlerName::GeneralAssistant => {
                "General conversation; asks follow-up questions when the request is unclear."
            }
        }
    }
}

impl std::str::FromStr for HandlerName {
    type Err = crate::error::DecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HandlerName::ALL
            .iter()
            .find(|h| h.as_str() == s)
            .copied()
            .ok_or_else(|| crate::error::DecisionError::UnknownHandler(s.to_string()))
    }
}

impl std::fmt::Display for HandlerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
