//! Whitespace normalisation for extracted text fragments.

/// Trim `text` and collapse every run of whitespace, newlines included,
/// into a single space.
pub fn clean_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_inner_whitespace() {
        assert_eq!(clean_text("Gupta \n\n  gold\tdinar"), "Gupta gold dinar");
    }

    #[test]
    fn trims_edges() {
        assert_eq!(clean_text("   Kushan  "), "Kushan");
    }

    #[test]
    fn blank_becomes_empty() {
        assert_eq!(clean_text(" \n\t "), "");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn unicode_whitespace_collapsed() {
        assert_eq!(clean_text("rupee\u{00a0}\u{2003}coin"), "rupee coin");
    }
}
