//! Table-of-contents extraction from document headings.

use crate::markdown::html_escape;
use serde::{Deserialize, Serialize};

/// Shallowest heading level shown in the TOC (level 1 is the page title).
pub const TOC_MIN_LEVEL: u8 = 2;
/// Deepest heading level shown in the TOC.
pub const TOC_MAX_LEVEL: u8 = 4;

/// A heading as it appears in the rendered document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub id: String,
    pub title: String,
}

/// One node of the nested outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Anchor id, identical to the heading's `id` attribute
    pub id: String,
    pub title: String,
    pub level: u8,
    pub children: Vec<TocEntry>,
}

impl TocEntry {
    fn leaf(heading: &Heading) -> Self {
        Self {
            id: heading.id.clone(),
            title: heading.title.clone(),
            level: heading.level,
            children: Vec::new(),
        }
    }
}

/// Build the nested outline from headings in document order.
///
/// A heading nests under the most recent heading with a smaller level, even
/// when levels are skipped (h2 followed directly by h4).
pub fn build_toc(headings: &[Heading]) -> Vec<TocEntry> {
    let mut roots = Vec::new();
    for heading in headings
        .iter()
        .filter(|h| (TOC_MIN_LEVEL..=TOC_MAX_LEVEL).contains(&h.level))
    {
        insert(&mut roots, TocEntry::leaf(heading));
    }
    roots
}

fn insert(siblings: &mut Vec<TocEntry>, entry: TocEntry) {
    match siblings.last_mut() {
        Some(last) if last.level < entry.level => insert(&mut last.children, entry),
        _ => siblings.push(entry),
    }
}

/// Render the outline as nested lists. Empty outline renders nothing.
pub fn render_toc_html(entries: &[TocEntry]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    let mut html = String::from(r#"<nav class="toc-nav" aria-label="On this page">"#);
    push_list(&mut html, entries);
    html.push_str("</nav>");
    Some(html)
}

fn push_list(html: &mut String, entries: &[TocEntry]) {
    html.push_str(r#"<ul class="toc-list">"#);
    for entry in entries {
        html.push_str(&format!(
            r##"<li class="toc-level-{}"><a href="#{}">{}</a>"##,
            entry.level,
            html_escape(&entry.id),
            html_escape(&entry.title)
        ));
        if !entry.children.is_empty() {
            push_list(html, &entry.children);
        }
        html.push_str("</li>");
    }
    html.push_str("</ul>");
}

/// Count every node in the outline
pub fn toc_len(entries: &[TocEntry]) -> usize {
    entries.iter().map(|e| 1 + toc_len(&e.children)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headings(levels: &[u8]) -> Vec<Heading> {
        levels
            .iter()
            .enumerate()
            .map(|(i, level)| Heading {
                level: *level,
                id: format!("h{i}"),
                title: format!("Heading {i}"),
            })
            .collect()
    }

    #[test]
    fn test_nesting_with_level_gap() {
        let toc = build_toc(&headings(&[2, 3, 3, 2, 4]));

        assert_eq!(toc.len(), 2);
        assert_eq!(toc[0].children.len(), 2);
        assert!(toc[0].children.iter().all(|c| c.level == 3));
        assert_eq!(toc[1].children.len(), 1);
        assert_eq!(toc[1].children[0].level, 4);
        assert_eq!(toc[1].children[0].id, "h4");
    }

    #[test]
    fn test_excludes_title_and_deep_levels() {
        let toc = build_toc(&headings(&[1, 2, 5, 6, 3]));
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].id, "h1");
        assert_eq!(toc[0].children.len(), 1);
        assert_eq!(toc[0].children[0].id, "h4");
    }

    #[test]
    fn test_leading_deeper_heading_becomes_root() {
        let toc = build_toc(&headings(&[3, 2, 4, 3]));
        assert_eq!(toc.len(), 2);
        assert_eq!(toc[0].level, 3);
        // h3 after h4 is a sibling of the h4, both under the h2
        assert_eq!(toc[1].children.len(), 2);
        assert_eq!(toc[1].children[0].level, 4);
        assert_eq!(toc[1].children[1].level, 3);
    }

    #[test]
    fn test_preserves_document_order_and_count() {
        let input = headings(&[2, 3, 4, 4, 3, 2, 2]);
        let toc = build_toc(&input);
        assert_eq!(toc_len(&toc), input.len());

        fn flatten(entries: &[TocEntry], out: &mut Vec<String>) {
            for e in entries {
                out.push(e.id.clone());
                flatten(&e.children, out);
            }
        }
        let mut ids = Vec::new();
        flatten(&toc, &mut ids);
        let expected: Vec<String> = input.iter().map(|h| h.id.clone()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_empty_toc() {
        assert!(build_toc(&[]).is_empty());
        assert_eq!(render_toc_html(&[]), None);
    }

    #[test]
    fn test_render_nested_html() {
        let toc = build_toc(&[
            Heading {
                level: 2,
                id: "dml".into(),
                title: "DML & SOQL".into(),
            },
            Heading {
                level: 3,
                id: "insert".into(),
                title: "Insert".into(),
            },
        ]);
        let html = render_toc_html(&toc).unwrap();
        assert!(html.contains(r##"<a href="#dml">DML &amp; SOQL</a><ul class="toc-list">"##));
        assert!(html.contains(r##"<li class="toc-level-3"><a href="#insert">Insert</a></li>"##));
    }
}
