use std::borrow::Cow;
use tracing::warn;

/// Approximate characters per token
pub const CHARS_PER_TOKEN: usize = 4;

/// Default engine input window in tokens
pub const DEFAULT_MAX_INPUT_TOKENS: usize = 1024;

/// Character budget for a token window
pub fn char_budget(max_tokens: usize) -> usize {
    max_tokens.saturating_mul(CHARS_PER_TOKEN)
}

/// Cut `text` to at most `max_chars` characters
///
/// Never fails; a cut is logged. The cut lands on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        None => Cow::Borrowed(text),
        Some((byte_idx, _)) => {
            warn!(
                "Input truncated to {} characters (dropped {} bytes)",
                max_chars,
                text.len() - byte_idx
            );
            Cow::Borrowed(&text[..byte_idx])
        }
    }
}

/// Cut `text` to the character budget of a token window
pub fn truncate_to_budget(text: &str, max_tokens: usize) -> Cow<'_, str> {
    truncate_chars(text, char_budget(max_tokens))
}
