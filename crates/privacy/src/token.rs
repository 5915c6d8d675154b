//! Pseudonymous tokens and the request-scoped mapping.
//!
//! A token id is a deterministic function of the normalized (trimmed,
//! case-folded) original value, so repeated occurrences of the same value
//! within one masking call collapse to the identical token.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The kind of PII a token stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PiiCategory {
    Name,
    Email,
    Phone,
}

impl PiiCategory {
    /// The tag that appears inside the placeholder, e.g. `[USER-A1B2C3D4]`.
    pub fn tag(&self) -> &'static str {
        match self {
            PiiCategory::Name => "USER",
            PiiCategory::Email => "EMAIL",
            PiiCategory::Phone => "PHONE",
        }
    }
}

/// One detected PII value and the placeholder that replaced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiToken {
    /// What kind of value this is.
    pub category: PiiCategory,

    /// The full placeholder string, e.g. `[EMAIL-A1B2C3D4]`.
    pub token: String,

    /// The original value, exactly as it appeared in the source text.
    pub original: String,
}

/// Compute the fixed-width token id for a value: the first 8 hex characters
/// (uppercased) of SHA-256 over the trimmed, lowercased value.
pub fn token_id(value: &str) -> String {
    let normalized = normalize(value);
    let digest = Sha256::digest(normalized.as_bytes());
    let mut id = String::with_capacity(8);
    for byte in &digest[..4] {
        id.push_str(&format!("{byte:02X}"));
    }
    id
}

/// Normalize a value for hashing and deduplication.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Build the full placeholder for a category and value.
pub fn placeholder(category: PiiCategory, value: &str) -> String {
    format!("[{}-{}]", category.tag(), token_id(value))
}

/// The request-scoped token mapping produced by one masking call.
///
/// Deduplicated by normalized value: two occurrences of the same email in
/// different casing yield one entry. Never persist or share this value —
/// drop it with the request.
#[derive(Debug, Clone, Default)]
pub struct PiiMapping {
    entries: Vec<PiiToken>,
}

impl PiiMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a detected value, returning its placeholder. Repeated values
    /// (after normalization) reuse the existing entry.
    pub fn insert(&mut self, category: PiiCategory, original: &str) -> String {
        let token = placeholder(category, original);
        if !self.entries.iter().any(|e| e.token == token) {
            self.entries.push(PiiToken {
                category,
                token: token.clone(),
                original: original.to_string(),
            });
        }
        token
    }

    /// Restore every known token in `text` to its original value.
    ///
    /// Tokens absent from the mapping are left as-is — unmasking degrades
    /// to a no-op rather than failing.
    pub fn unmask(&self, text: &str) -> String {
        let mut out = text.to_string();
        for entry in &self.entries {
            out = out.replace(&entry.token, &entry.original);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PiiToken> {
        self.entries.iter()
    }
}
