//! Context assembly.
//!
//! Builds the single text block the classifier sees: the most recent
//! window of history turns rendered as `Role: content` lines, a stable
//! delimiter, then the current message. The block is masked once, after
//! concatenation, so a value split across a turn boundary and its repeat
//! in the current message collapse to the same token.

use tracing::debug;
use veilroute_config::MaskingConfig;
use veilroute_core::Turn;
use veilroute_privacy::{Masked, MaskerConfig, PiiMasker};

/// Separates rendered history from the current message.
pub const HISTORY_DELIMITER: &str = "---";

/// Assembles and masks classifier input blocks.
pub struct ContextAssembler {
    masker: PiiMasker,
    history_window: usize,
}

impl ContextAssembler {
    pub fn new(masking: &MaskingConfig, history_window: usize) -> Self {
        let mut config = MaskerConfig::default();
        if let Some(deny_list) = &masking.deny_list {
            config.deny_list = deny_list.clone();
        }
        if let Some(introducers) = &masking.introducers {
            config.introducers = introducers.clone();
        }
        Self {
            masker: PiiMasker::new(config),
            history_window: history_window.max(1),
        }
    }

    /// Build the masked classifier input for one request.
    ///
    /// Only the most recent `history_window` turns are included; older
    /// turns are dropped outright. The returned mapping is scoped to this
    /// request and must be used to restore values before dispatch.
    pub fn build_classifier_input(&self, history: &[Turn], current: &str) -> Masked {
        let start = history.len().saturating_sub(self.history_window);
        let window = &history[start..];

        let mut block = String::new();
        for turn in window {
            block.push_str(&turn.render());
            block.push('\n');
        }
        if !window.is_empty() {
            block.push_str(HISTORY_DELIMITER);
            block.push('\n');
        }
        block.push_str(current);

        let masked = self.masker.mask(&block);
        debug!(
            turns = window.len(),
            dropped = history.len() - window.len(),
            tokens = masked.mapping.len(),
            "Assembled classifier input"
        );
        masked
    }
}
