//! The classification prompt.
//!
//! Enumerates the closed handler registry and instructs the model to emit
//! a single JSON object. The conversation block it receives is already
//! masked; the prompt never mentions or needs real identifiers.

use veilroute_core::HandlerName;

/// Build the full classification prompt for one masked input block.
pub fn classification_prompt(masked_input: &str) -> String {
    let mut handlers = String::new();
    for handler in HandlerName::ALL {
        handlers.push_str(&format!("- {}: {}\n", handler.as_str(), handler.description()));
    }

    format!(
        r#"You route requests to one specialized handler. Read the conversation and pick exactly one handler from the registry below.

REGISTERED HANDLERS:
{handlers}
CONVERSATION:
{masked_input}

Respond ONLY with a JSON object of this shape, no other text:
{{"agent": "<handlerName>", "taskContext": "<short summary of what the handler should do, may be empty>", "reasoning": "<one sentence>"}}

Placeholders such as [USER-XXXXXXXX] or [EMAIL-XXXXXXXX] are opaque identifiers. Copy them into taskContext verbatim when relevant; never invent or expand them."#
    )
}
