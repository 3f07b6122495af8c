/// Longest cast Warpcast accepts, in characters.
pub const MAX_CAST_LENGTH: usize = 320;

/// True if `text` fits in a single cast.
pub fn validate_cast_text(text: &str) -> bool {
    text.chars().count() <= MAX_CAST_LENGTH
}
