//! Context injection.
//!
//! The classifier's extracted task context travels in masked form. Just
//! before dispatch the injector restores the real values and prepends the
//! context as a bracketed block, so the handler receives the user's own
//! words plus what the classifier understood the task to be.

use veilroute_privacy::PiiMapping;

/// Prepend the unmasked task context to the handler-bound prompt.
///
/// An absent or blank context leaves the prompt untouched. Tokens in the
/// context that the mapping does not know are left as-is rather than
/// guessed at.
pub fn inject_context(prompt: &str, task_context: Option<&str>, mapping: &PiiMapping) -> String {
    let context = match task_context.map(str::trim) {
        Some(ctx) if !ctx.is_empty() => ctx,
        _ => return prompt.to_string(),
    };
    format!("[CONTEXT: {}]\n\n{}", mapping.unmask(context), prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use veilroute_privacy::{MaskerConfig, PiiMasker};

    #[test]
    fn no_context_leaves_prompt_untouched() {
        let mapping = PiiMapping::default();
        assert_eq!(inject_context("do the thing", None, &mapping), "do the thing");
        assert_eq!(inject_context("do the thing", Some("   "), &mapping), "do the thing");
    }

    #[test]
    fn context_is_prepended_as_a_bracketed_block() {
        let mapping = PiiMapping::default();
        let out = inject_context("write the module", Some("security basics"), &mapping);
        assert_eq!(out, "[CONTEXT: security basics]\n\nwrite the module");
    }

    #[test]
    fn tokens_in_context_are_restored() {
        let masker = PiiMasker::new(MaskerConfig::default());
        let masked = masker.mask("assign it to Jane Doe");
        let token = masked.mapping.iter().next().unwrap().token.clone();

        let out = inject_context(
            "create the training",
            Some(&format!("training for {token}")),
            &masked.mapping,
        );
        assert_eq!(out, "[CONTEXT: training for Jane Doe]\n\ncreate the training");
    }

    #[test]
    fn unknown_tokens_pass_through_unchanged() {
        let mapping = PiiMapping::default();
        let out = inject_context("go", Some("for [USER-DEADBEEF]"), &mapping);
        assert!(out.contains("[USER-DEADBEEF]"));
    }
}
