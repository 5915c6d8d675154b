//! Session continuity.
//!
//! Callers identify an ongoing conversation with whichever identifier their
//! channel provides. The resolver folds them into one thread id with a
//! fixed priority, so repeated requests land on the same thread regardless
//! of which field the channel happened to populate.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Resource id shared by every thread this router owns.
pub const RESOURCE_ID: &str = "veilroute";

/// The caller-supplied identifiers that may accompany a request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMeta {
    /// Channel-level conversation id (highest priority)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,

    /// Explicit thread id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,

    /// Transport session id (lowest priority)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// A resolved session: the thread this request belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub thread_id: String,
    pub resource_id: String,
}

impl Session {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            resource_id: RESOURCE_ID.to_string(),
        }
    }
}

/// Resolve the thread id for a request.
///
/// Priority: conversation id, then thread id, then session id. Blank
/// values are skipped. When nothing usable is supplied, a fresh UUID
/// starts a new thread.
pub fn resolve_thread_id(meta: &SessionMeta) -> String {
    let provided = [&meta.conversation_id, &meta.thread_id, &meta.session_id]
        .into_iter()
        .flatten()
        .map(|id| id.trim())
        .find(|id| !id.is_empty());

    match provided {
        Some(id) => id.to_string(),
        None => {
            let fresh = Uuid::new_v4().to_string();
            debug!(thread_id = %fresh, "No session identifier supplied, starting new thread");
            fresh
        }
    }
}
