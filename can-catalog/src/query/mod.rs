//! Frame and signal query engines
//!
//! Both engines are pure functions of the index and their explicit inputs.
//! Free text is tokenized on whitespace and lowercased; a record matches when
//! every token is a substring of its search text.

pub mod frames;
pub mod signals;

pub use frames::{FrameQuery, SortMode};
pub use signals::{filter_signals, SignalRef};

/// Split free text into lowercase, non-empty tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("  Gear   PARK\tdi_ "), vec!["gear", "park", "di_"]);
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("").is_empty());
    }
}
