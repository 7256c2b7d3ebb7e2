//! Slug generation for topic files and heading anchors.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

static HYPHEN_RUN: OnceLock<Regex> = OnceLock::new();

fn hyphen_run() -> &'static Regex {
    HYPHEN_RUN.get_or_init(|| Regex::new(r"-+").expect("static regex"))
}

/// Convert a string to a URL-safe slug
///
/// Rules:
/// - Lowercase
/// - Replace whitespace and underscores with hyphens
/// - Remove punctuation (unicode letters survive)
/// - Collapse multiple hyphens
/// - Trim leading/trailing hyphens
///
/// # Examples
///
/// ```
/// use apexguide_core::slugify;
///
/// assert_eq!(slugify("Governor Limits"), "governor-limits");
/// assert_eq!(slugify("SOQL & SOSL"), "soql-sosl");
/// assert_eq!(slugify("Batch Apex: start()"), "batch-apex-start");
/// ```
pub fn slugify(input: &str) -> String {
    let lowercased = input.to_lowercase();

    let cleaned = lowercased
        .graphemes(true)
        .filter_map(|g| match g {
            " " | "_" | "\t" | "\n" | "\r" => Some("-"),
            _ => {
                let c = g.chars().next()?;
                if c.is_ascii_alphanumeric() || c == '-' || c.is_alphabetic() {
                    Some(g)
                } else {
                    None
                }
            }
        })
        .collect::<String>();

    hyphen_run()
        .replace_all(&cleaned, "-")
        .trim_matches('-')
        .to_string()
}

/// Derive a topic slug from its file name (stem, slugified).
pub fn slug_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let slug = slugify(stem);
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

/// Hands out unique anchor ids within one document.
///
/// The first use of a base id is returned unchanged; repeats get `-1`, `-2`, ...
#[derive(Debug, Default)]
pub struct AnchorIds {
    counts: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl AnchorIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a unique id derived from `text`.
    pub fn unique(&mut self, text: &str) -> String {
        let base = match slugify(text) {
            s if s.is_empty() => "section".to_string(),
            s => s,
        };
        self.claim(base)
    }

    /// Reserve an explicit id, suffixing it if already taken.
    ///
    /// Suffixed forms skip ids already handed out, so "Setup 1" followed by
    /// two "Setup" headings yields `setup-1`, `setup`, `setup-2`.
    pub fn claim(&mut self, base: String) -> String {
        let mut n = self.counts.get(&base).copied().unwrap_or(0);
        let id = loop {
            let candidate = if n == 0 {
                base.clone()
            } else {
                format!("{}-{}", base, n)
            };
            n += 1;
            if !self.taken.contains(&candidate) {
                break candidate;
            }
        };
        self.counts.insert(base, n);
        self.taken.insert(id.clone());
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_basic_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Trigger Context Variables"), "trigger-context-variables");
    }

    #[test]
    fn test_special_characters() {
        assert_eq!(slugify("SOQL & SOSL"), "soql-sosl");
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify("@future methods"), "future-methods");
    }

    #[test]
    fn test_unicode() {
        assert_eq!(slugify("Café"), "café");
    }

    #[test]
    fn test_underscores_and_spaces() {
        assert_eq!(slugify("apex_triggers"), "apex-triggers");
        assert_eq!(slugify("  Many    Spaces  "), "many-spaces");
    }

    #[test]
    fn test_empty_and_special_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slug_from_path() {
        assert_eq!(
            slug_from_path(&PathBuf::from("content/apex/Governor_Limits.md")),
            Some("governor-limits".to_string())
        );
        assert_eq!(slug_from_path(&PathBuf::from("content/apex/!!!.md")), None);
    }

    #[test]
    fn test_anchor_ids_deduplicate() {
        let mut ids = AnchorIds::new();
        assert_eq!(ids.unique("FAQ"), "faq");
        assert_eq!(ids.unique("FAQ"), "faq-1");
        assert_eq!(ids.unique("FAQ"), "faq-2");
        assert_eq!(ids.unique("Other"), "other");
    }

    #[test]
    fn test_anchor_ids_fallback_for_symbols() {
        let mut ids = AnchorIds::new();
        assert_eq!(ids.unique("???"), "section");
        assert_eq!(ids.unique("!!!"), "section-1");
    }

    #[test]
    fn test_anchor_ids_manual_suffix_does_not_collide() {
        let mut ids = AnchorIds::new();
        assert_eq!(ids.unique("Setup"), "setup");
        assert_eq!(ids.unique("Setup"), "setup-1");
        assert_eq!(ids.unique("Setup 1"), "setup-1-1");
    }

    #[test]
    fn test_anchor_ids_skip_suffix_claimed_as_base() {
        let mut ids = AnchorIds::new();
        assert_eq!(ids.unique("Setup 1"), "setup-1");
        assert_eq!(ids.unique("Setup"), "setup");
        assert_eq!(ids.unique("Setup"), "setup-2");
        assert_eq!(ids.unique("Setup"), "setup-3");
        assert_eq!(ids.claim("setup-1".to_string()), "setup-1-1");
    }
}
