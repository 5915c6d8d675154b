//! Decision parsing and repair.
//!
//! The classifier is a generative model, not a strict API: its output may
//! arrive wrapped in markdown fences or prose, or as near-miss JSON with
//! trailing commas, smart quotes, or stray control characters. This module
//! extracts the outermost `{...}` span, normalizes the known malformed
//! patterns, parses strictly, attempts one structural repair pass, and
//! validates the handler name against the closed registry.
//!
//! Parse failures are terminal for the request — the raw text has already
//! been received, so retrying cannot help — and the router falls back.

use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, trace};
use veilroute_core::{DecisionError, HandlerName, RoutingDecision};

/// The wire shape the classifier is asked to emit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDecision {
    agent: String,
    #[serde(default, alias = "task_context")]
    task_context: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Extract and validate a routing decision from raw classifier output.
pub fn parse_decision(raw: &str) -> Result<RoutingDecision, DecisionError> {
    trace!(raw, "parsing classifier output");

    let span = isolate_object(raw).ok_or(DecisionError::NoJson)?;
    let normalized = normalize(span);

    let wire = match serde_json::from_str::<WireDecision>(&normalized) {
        Ok(wire) => wire,
        Err(first_err) => {
            debug!(error = %first_err, "strict parse failed, attempting repair");
            let repaired = repair(&normalized);
            serde_json::from_str::<WireDecision>(&repaired)
                .map_err(|_| DecisionError::Malformed(first_err.to_string()))?
        }
    };

    validate(wire)
}

fn validate(wire: WireDecision) -> Result<RoutingDecision, DecisionError> {
    let handler = HandlerName::from_str(&wire.agent)?;
    Ok(RoutingDecision {
        handler,
        task_context: wire.task_context.filter(|s| !s.trim().is_empty()),
        reasoning: wire.reasoning.filter(|s| !s.trim().is_empty()),
    })
}

/// Isolate the outermost `{...}` span with a string-aware brace scan.
/// Fences and surrounding prose fall away for free: they live outside the
/// braces.
fn isolate_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0u32;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Normalize the well-known malformed patterns: smart double quotes,
/// raw control characters inside strings, trailing commas.
fn normalize(json: &str) -> String {
    let straightened: String = json
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            c => c,
        })
        .collect();

    let mut out = String::with_capacity(straightened.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in straightened.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(ch);
                continue;
            }
            match ch {
                '\\' => {
                    escaped = true;
                    out.push(ch);
                }
                '"' => {
                    in_string = false;
                    out.push(ch);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if (c as u32) < 0x20 => {} // drop other control chars
                c => out.push(c),
            }
        } else {
            if ch == '"' {
                in_string = true;
            }
            out.push(ch);
        }
    }

    strip_trailing_commas(&out)
}

/// Remove `,` directly before a closing brace or bracket (string-aware).
fn strip_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &ch) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            out.push(ch);
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(ch);
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

/// One structural repair pass: treat single-quoted strings as
/// double-quoted. Applied only after a strict parse has failed.
fn repair(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut in_double = false;
    let mut in_single = false;
    let mut escaped = false;
    let mut prev_significant = ' ';

    for ch in json.chars() {
        if escaped {
            escaped = false;
            out.push(ch);
            continue;
        }
        match ch {
            '\\' if in_double || in_single => {
                escaped = true;
                out.push(ch);
            }
            '"' if !in_single => {
                in_double = !in_double;
                out.push(ch);
            }
            '\'' | '\u{2018}' | '\u{2019}' if !in_double => {
                if in_single {
                    in_single = false;
                    out.push('"');
                } else if matches!(prev_significant, '{' | '[' | ',' | ':') {
                    in_single = true;
                    out.push('"');
                } else {
                    out.push(ch);
                }
            }
            c => out.push(c),
        }
        if !ch.is_whitespace() {
            prev_significant = ch;
        }
    }
    out
}
