// Summary length budget and pre-model truncation

use crate::config::BudgetConfig;
use crate::types::LengthBudget;

pub const DEFAULT_MAX_CHARS: usize = 3500;

/// Pick the (min, max) summary length for an input of `word_count` words.
pub fn length_budget(word_count: usize, table: &BudgetConfig) -> LengthBudget {
    if word_count < table.medium_from {
        table.short_budget()
    } else if word_count < table.long_from {
        table.medium_budget()
    } else {
        table.long_budget()
    }
}

/// First `max_chars` characters of `text`, or `text` itself when it already fits.
/// Counts Unicode scalar values and may cut mid-word.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
