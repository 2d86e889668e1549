//! Display helpers for Recast.
//!
//! Renders expression trees for explain output and rewrite traces.

mod tree;

pub use tree::{DisplayTree, TreeNode};

/// Shorten a label to at most `max_chars` characters, appending `...`.
pub fn truncate_label(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short", 10), "short");
        assert_eq!(truncate_label("a rather long label", 9), "a rath...");
        assert_eq!(truncate_label("ÄÖÜäöü", 5), "ÄÖ...");
    }
}
