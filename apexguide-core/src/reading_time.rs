//! Reading-time estimation.

use serde::{Deserialize, Serialize};

/// Fixed reading speed used for every estimate.
pub const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingTime {
    /// Whole minutes, rounded up, never below 1
    pub minutes: usize,
    pub words: usize,
    /// e.g. "6 min read"
    pub display_text: String,
}

impl ReadingTime {
    /// Estimate from plain text, counting whitespace-delimited tokens.
    pub fn from_text(text: &str) -> Self {
        Self::from_word_count(text.split_whitespace().count())
    }

    /// Estimate from HTML by stripping tags first.
    pub fn from_html(html: &str) -> Self {
        Self::from_text(&html_to_text(html))
    }

    pub fn from_word_count(words: usize) -> Self {
        let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
        Self {
            minutes,
            words,
            display_text: format!("{} min read", minutes),
        }
    }
}

/// Strip tags and decode the basic entities.
///
/// Tags become whitespace so adjacent block elements do not fuse words.
pub fn html_to_text(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;

    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                result.push(' ');
            }
            '>' if in_tag => {
                in_tag = false;
                result.push(' ');
            }
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }

    result
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_one_minute() {
        let rt = ReadingTime::from_text("");
        assert_eq!(rt.minutes, 1);
        assert_eq!(rt.words, 0);
        assert_eq!(rt.display_text, "1 min read");
    }

    #[test]
    fn test_rounds_up() {
        assert_eq!(ReadingTime::from_word_count(200).minutes, 1);
        assert_eq!(ReadingTime::from_word_count(201).minutes, 2);
        assert_eq!(ReadingTime::from_word_count(1150).minutes, 6);
        assert_eq!(ReadingTime::from_word_count(1150).display_text, "6 min read");
    }

    #[test]
    fn test_counts_whitespace_tokens() {
        let rt = ReadingTime::from_text("  one\ttwo\nthree   four ");
        assert_eq!(rt.words, 4);
    }

    #[test]
    fn test_from_html_strips_tags() {
        let rt = ReadingTime::from_html("<h2 id=\"a\">Title</h2><p>Hello <strong>bold</strong> world</p>");
        assert_eq!(rt.words, 4);
    }

    #[test]
    fn test_monotonic_when_appending_words() {
        let mut body = String::new();
        let mut previous = ReadingTime::from_text(&body).minutes;
        for i in 0..1000 {
            body.push_str(&format!(" word{i}"));
            let current = ReadingTime::from_text(&body).minutes;
            assert!(current >= previous);
            previous = current;
        }
        assert_eq!(previous, 5);
    }

    #[test]
    fn test_deterministic() {
        let text = "Apex is a strongly typed language. ".repeat(90);
        assert_eq!(ReadingTime::from_text(&text), ReadingTime::from_text(&text));
    }

    #[test]
    fn test_html_to_text_decodes_entities() {
        assert_eq!(html_to_text("<p>a &lt; b &amp;&amp; c</p>"), "a < b && c");
    }
}
