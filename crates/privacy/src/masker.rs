//! PII detection and replacement.
//!
//! Detection runs in priority order — emails, then phone numbers, then
//! capitalized multi-word name sequences — over non-overlapping spans.
//! Emails and phones are regex-driven; names go through a heuristic
//! scanner whose deny-list and introducer words are configurable, since
//! the heuristic is expected to be tuned against real traffic.
//!
//! The name bias is conservative: a missed mask is preferable to
//! corrupting legitimate text.

use crate::token::{PiiCategory, PiiMapping};
use regex_lite::Regex;
use std::collections::HashSet;
use tracing::debug;

const EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}";

// Plus-prefixed contiguous numbers, or digit groups joined by `-`, `.`,
// space, or parentheses. Digit-count validation happens after matching.
const PHONE_PATTERN: &str =
    r"\+\d{7,15}|(?:\+\d{1,3}[-. ])?(?:\(\d{1,4}\)[-. ]?)?\d{1,4}(?:[-. ]\d{1,4}){1,4}";

/// Verbs that, followed by an artifact noun, mark the next capitalized
/// sequence as the target of an action ("create training Jane Doe").
const ACTION_VERBS: [&str; 8] = [
    "create", "generate", "make", "build", "prepare", "send", "assign", "schedule",
];

/// Artifact nouns for the action-verb pattern.
const ARTIFACT_NOUNS: [&str; 9] = [
    "training",
    "phishing",
    "module",
    "course",
    "campaign",
    "simulation",
    "video",
    "report",
    "summary",
];

/// Tunable heuristics for name detection.
#[derive(Debug, Clone)]
pub struct MaskerConfig {
    /// Capitalized words that are domain terminology, greetings, or
    /// commands — never part of a person name.
    pub deny_list: Vec<String>,

    /// Words that introduce a person ("training **for** Jane Doe").
    pub introducers: Vec<String>,
}

impl Default for MaskerConfig {
    fn default() -> Self {
        Self {
            deny_list: [
                // Domain/security terminology
                "training",
                "phishing",
                "injection",
                "prevention",
                "attack",
                "security",
                "awareness",
                "policy",
                "module",
                "course",
                "campaign",
                "simulation",
                "video",
                "email",
                "password",
                "compliance",
                "report",
                "summary",
                // Greetings and sign-offs
                "hi",
                "hello",
                "hey",
                "dear",
                "thanks",
                "regards",
                "best",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            introducers: ["for", "to", "by", "with", "from", "para", "pour", "für", "an"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// The result of one masking call: the rewritten text plus the
/// request-scoped mapping needed to reverse it.
#[derive(Debug, Clone)]
pub struct Masked {
    pub text: String,
    pub mapping: PiiMapping,
}

/// Detects and replaces PII. Stateless across calls — build one at startup
/// and share it; every call gets its own fresh mapping.
pub struct PiiMasker {
    email_re: Regex,
    phone_re: Regex,
    deny_list: HashSet<String>,
    introducers: HashSet<String>,
}

#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    category: PiiCategory,
}

#[derive(Debug, Clone, Copy)]
struct Word<'a> {
    start: usize,
    end: usize,
    text: &'a str,
}

impl Default for PiiMasker {
    fn default() -> Self {
        Self::new(MaskerConfig::default())
    }
}

impl PiiMasker {
    pub fn new(config: MaskerConfig) -> Self {
        Self {
            // Patterns are compile-time constants; they always parse.
            email_re: Regex::new(EMAIL_PATTERN).expect("invalid email pattern"),
            phone_re: Regex::new(PHONE_PATTERN).expect("invalid phone pattern"),
            deny_list: config.deny_list.iter().map(|w| w.to_lowercase()).collect(),
            introducers: config.introducers.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Replace every detected email, phone number, and name in `text` with
    /// a pseudonymous token. Text without PII comes back unchanged with an
    /// empty mapping.
    pub fn mask(&self, text: &str) -> Masked {
        let mut spans = self.email_spans(text);
        spans.extend(self.phone_spans(text, &spans));
        spans.extend(self.name_spans(text, &spans));
        spans.sort_by_key(|s| s.start);

        if spans.is_empty() {
            return Masked {
                text: text.to_string(),
                mapping: PiiMapping::new(),
            };
        }

        let mut mapping = PiiMapping::new();
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for span in &spans {
            out.push_str(&text[cursor..span.start]);
            let token = mapping.insert(span.category, &text[span.start..span.end]);
            out.push_str(&token);
            cursor = span.end;
        }
        out.push_str(&text[cursor..]);

        debug!(detected = spans.len(), distinct = mapping.len(), "masked PII");

        Masked { text: out, mapping }
    }

    /// Restore masked tokens in `text` using a mapping from a previous
    /// [`mask`](Self::mask) call. Unknown tokens are left as-is.
    pub fn unmask(text: &str, mapping: &PiiMapping) -> String {
        mapping.unmask(text)
    }

    // ── Detection ──────────────────────────────────────────────────────

    fn email_spans(&self, text: &str) -> Vec<Span> {
        self.email_re
            .find_iter(text)
            .filter(|m| has_clean_boundaries(text, m.start(), m.end()))
            .map(|m| Span {
                start: m.start(),
                end: m.end(),
                category: PiiCategory::Email,
            })
            .collect()
    }

    fn phone_spans(&self, text: &str, taken: &[Span]) -> Vec<Span> {
        self.phone_re
            .find_iter(text)
            .filter(|m| {
                let digits = m.as_str().chars().filter(char::is_ascii_digit).count();
                (7..=15).contains(&digits)
                    && has_clean_boundaries(text, m.start(), m.end())
                    && !overlaps(taken, m.start(), m.end())
            })
            .map(|m| Span {
                start: m.start(),
                end: m.end(),
                category: PiiCategory::Phone,
            })
            .collect()
    }

    /// Heuristic name detection over capitalized multi-word sequences.
    fn name_spans(&self, text: &str, taken: &[Span]) -> Vec<Span> {
        let words = split_words(text);
        let mut spans = Vec::new();
        let mut i = 0;

        while i < words.len() {
            if !self.is_name_word(&words[i]) {
                i += 1;
                continue;
            }
            // Extend a run of name-eligible words joined by single spaces.
            let mut j = i;
            while j + 1 < words.len()
                && self.is_name_word(&words[j + 1])
                && &text[words[j].end..words[j + 1].start] == " "
            {
                j += 1;
            }
            if j > i {
                let (start, end) = (words[i].start, words[j].end);
                if !overlaps(taken, start, end)
                    && self.should_mask_name(text, &words, i, start, end, taken)
                {
                    spans.push(Span {
                        start,
                        end,
                        category: PiiCategory::Name,
                    });
                }
            }
            i = j + 1;
        }

        spans
    }

    /// A word can participate in a name candidate: capitalized, at least
    /// two letters, and not deny-listed terminology.
    fn is_name_word(&self, word: &Word<'_>) -> bool {
        let mut chars = word.text.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        first.is_uppercase()
            && word.text.chars().count() >= 2
            && chars.all(char::is_lowercase)
            && !self.deny_list.contains(&word.text.to_lowercase())
    }

    /// Apply the positional heuristics to a candidate at `words[first..]`
    /// spanning byte range `start..end`.
    fn should_mask_name(
        &self,
        text: &str,
        words: &[Word<'_>],
        first: usize,
        start: usize,
        end: usize,
        detected: &[Span],
    ) -> bool {
        if self.is_promoted(text, words, first, start, end, detected) {
            return true;
        }
        // A capitalized sequence opening a line reads as a command or
        // title, not a person.
        !at_line_start(text, start)
    }

    fn is_promoted(
        &self,
        text: &str,
        words: &[Word<'_>],
        first: usize,
        start: usize,
        end: usize,
        detected: &[Span],
    ) -> bool {
        // Introducer word directly before the candidate.
        if first > 0 {
            let prev = &words[first - 1];
            if &text[prev.end..start] == " "
                && self.introducers.contains(&prev.text.to_lowercase())
            {
                return true;
            }
        }

        // Immediately after a colon or bullet.
        let before = text[..start].trim_end_matches([' ', '\t']);
        if matches!(before.chars().last(), Some(':' | '-' | '*' | '•')) {
            return true;
        }

        // Adjacent to a detected email ("Jane Doe at jane@x.com").
        const ADJACENCY_WINDOW: usize = 24;
        if detected.iter().any(|e| {
            e.category == PiiCategory::Email
                && ((e.start >= end && e.start - end <= ADJACENCY_WINDOW)
                    || (e.end <= start && start - e.end <= ADJACENCY_WINDOW))
        }) {
            return true;
        }

        // Direct object of an action-verb + artifact-noun pattern:
        // "create training Jane Doe".
        if first >= 2 {
            let noun = words[first - 1].text.to_lowercase();
            let verb = words[first - 2].text.to_lowercase();
            if ARTIFACT_NOUNS.contains(&noun.as_str()) && ACTION_VERBS.contains(&verb.as_str()) {
                return true;
            }
        }

        false
    }
}

// ── Helpers ────────────────────────────────────────────────────────────

/// Split text into alphabetic word runs with byte spans.
fn split_words(text: &str) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    for (idx, ch) in text.char_indices() {
        if ch.is_alphabetic() {
            if start.is_none() {
                start = Some(idx);
            }
        } else if let Some(s) = start.take() {
            words.push(Word {
                start: s,
                end: idx,
                text: &text[s..idx],
            });
        }
    }
    if let Some(s) = start {
        words.push(Word {
            start: s,
            end: text.len(),
            text: &text[s..],
        });
    }
    words
}

/// Reject matches glued to surrounding alphanumerics.
fn has_clean_boundaries(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .last()
        .is_none_or(|c| !c.is_alphanumeric() && c != '@');
    let after_ok = text[end..]
        .chars()
        .next()
        .is_none_or(|c| !c.is_alphanumeric() && c != '@');
    before_ok && after_ok
}

fn overlaps(spans: &[Span], start: usize, end: usize) -> bool {
    spans.iter().any(|s| start < s.end && s.start < end)
}

/// True when only whitespace separates `pos` from the start of its line.
fn at_line_start(text: &str, pos: usize) -> bool {
    text[..pos]
        .rfind('\n')
        .map_or(&text[..pos], |nl| &text[nl + 1..pos])
        .chars()
        .all(char::is_whitespace)
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn masker() -> PiiMasker {
        PiiMasker::default()
    }

    // ── Emails ──────────────────────────────────────────────────────

    #[test]
    fn masks_email() {
        let masked = masker().mask("reach me at jane.doe@example.com please");
        assert!(!masked.text.contains("jane.doe@example.com"));
        assert!(masked.text.contains("[EMAIL-"));
        assert_eq!(masked.mapping.len(), 1);
    }

    #[test]
    fn repeated_email_collapses_to_one_token() {
        let masked = masker().mask("cc jane@x.com and also jane@x.com");
        assert_eq!(masked.mapping.len(), 1);
        assert_eq!(masked.text.matches("[EMAIL-").count(), 2);
        let first = masked.text.find("[EMAIL-").unwrap();
        let token = &masked.text[first..first + "[EMAIL-]".len() + 8];
        assert_eq!(masked.text.matches(token).count(), 2);
    }

    // ── Phones ──────────────────────────────────────────────────────

    #[test]
    fn masks_separated_phone_number() {
        let masked = masker().mask("call 555-123-4567 tomorrow");
        assert!(!masked.text.contains("555-123-4567"));
        assert!(masked.text.contains("[PHONE-"));
    }

    #[test]
    fn masks_international_phone() {
        let masked = masker().mask("her number is +1 (555) 123-4567");
        assert!(masked.text.contains("[PHONE-"));
        assert!(!masked.text.contains("555"));
    }

    #[test]
    fn masks_plus_prefixed_contiguous_phone() {
        let masked = masker().mask("ping +4915123456789 on signal");
        assert!(masked.text.contains("[PHONE-"));
    }

    #[test]
    fn short_numbers_are_not_phones() {
        let masked = masker().mask("see section 1.2.3 and room 401");
        assert_eq!(masked.text, "see section 1.2.3 and room 401");
        assert!(masked.mapping.is_empty());
    }

    // ── Names ───────────────────────────────────────────────────────

    #[test]
    fn masks_mid_sentence_name() {
        let masked = masker().mask("My name is Jane Doe and I work here");
        assert!(!masked.text.contains("Jane Doe"));
        assert!(masked.text.contains("[USER-"));
    }

    #[test]
    fn introducer_promotes_name() {
        let masked = masker().mask("please prepare a module for John Smith");
        assert!(masked.text.contains("[USER-"));
        assert!(!masked.text.contains("John Smith"));
    }

    #[test]
    fn name_at_text_start_is_not_masked() {
        let masked = masker().mask("Quarterly Review starts tomorrow");
        assert_eq!(masked.text, "Quarterly Review starts tomorrow");
    }

    #[test]
    fn name_at_line_start_is_not_masked() {
        let masked = masker().mask("agenda:\nQuarterly Review with the team");
        assert!(masked.text.contains("Quarterly Review"));
    }

    #[test]
    fn colon_promotes_name_at_line_position() {
        let masked = masker().mask("Recipient: Jane Doe");
        assert!(masked.text.contains("[USER-"));
        assert!(!masked.text.contains("Jane Doe"));
    }

    #[test]
    fn deny_list_suppresses_topic_phrase() {
        let masked = masker().mask("Create Phishing Training");
        assert_eq!(masked.text, "Create Phishing Training");
        assert!(masked.mapping.is_empty());
    }

    #[test]
    fn greeting_words_do_not_form_names() {
        let masked = masker().mask("Assistant: Hi Jane");
        assert_eq!(masked.text, "Assistant: Hi Jane");
    }

    #[test]
    fn email_adjacency_promotes_name() {
        let masked = masker().mask("Jane Doe at jane@x.com requested access");
        // Line-start suppression is overridden by the adjacent email.
        assert!(masked.text.contains("[USER-"));
        assert!(masked.text.contains("[EMAIL-"));
    }

    #[test]
    fn action_verb_artifact_pattern_promotes_name() {
        let masked = masker().mask("please create training Jane Doe by Friday");
        assert!(masked.text.contains("[USER-"));
    }

    #[test]
    fn single_capitalized_word_is_never_a_name() {
        let masked = masker().mask("ask Jane about it");
        assert_eq!(masked.text, "ask Jane about it");
    }

    #[test]
    fn custom_deny_list_is_respected() {
        let config = MaskerConfig {
            deny_list: vec!["incident".into(), "response".into()],
            ..MaskerConfig::default()
        };
        let masked = PiiMasker::new(config).mask("we updated the Incident Response plan");
        assert!(masked.text.contains("Incident Response"));
    }

    // ── Combined / laws ─────────────────────────────────────────────

    #[test]
    fn round_trip_restores_original() {
        let original =
            "My name is Jane Doe, reach me at jane@x.com or 555-123-4567 for details";
        let masked = masker().mask(original);
        assert_ne!(masked.text, original);
        assert_eq!(PiiMasker::unmask(&masked.text, &masked.mapping), original);
    }

    #[test]
    fn round_trip_on_clean_text_is_identity() {
        let original = "nothing sensitive in here at all";
        let masked = masker().mask(original);
        assert_eq!(masked.text, original);
        assert!(masked.mapping.is_empty());
        assert_eq!(PiiMasker::unmask(&masked.text, &masked.mapping), original);
    }

    #[test]
    fn masked_text_never_contains_detected_values() {
        let masked =
            masker().mask("send it to Jane Doe at jane@x.com or call 555-123-4567 today");
        for entry in masked.mapping.iter() {
            assert!(
                !masked.text.contains(&entry.original),
                "leaked {:?}",
                entry.original
            );
        }
        assert_eq!(masked.mapping.len(), 3);
    }

    #[test]
    fn same_name_across_lines_collapses_to_one_token() {
        let masked = masker().mask("User: My name is Jane Doe\nUser: training for Jane Doe");
        assert_eq!(
            masked
                .mapping
                .iter()
                .filter(|e| e.category == PiiCategory::Name)
                .count(),
            1
        );
        assert_eq!(masked.text.matches("[USER-").count(), 2);
    }

    #[test]
    fn mixed_pii_keeps_categories_distinct() {
        let masked = masker().mask("invoice for Jane Doe at jane@x.com, phone 555-123-4567");
        let categories: Vec<PiiCategory> =
            masked.mapping.iter().map(|e| e.category).collect();
        assert!(categories.contains(&PiiCategory::Name));
        assert!(categories.contains(&PiiCategory::Email));
        assert!(categories.contains(&PiiCategory::Phone));
    }
}
