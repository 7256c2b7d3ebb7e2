//! Markdown rendering: headings with stable anchors, highlighted code, TOC.

pub mod highlight;

use crate::reading_time::html_to_text;
use crate::slug::AnchorIds;
use crate::toc::{build_toc, Heading, TocEntry};
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

pub use highlight::HighlightTransformer;

/// Output of one markdown render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMarkdown {
    pub html: String,
    /// Every heading (levels 1-6) in document order, with its anchor id
    pub headings: Vec<Heading>,
    /// Nested outline of levels 2-4
    pub toc: Vec<TocEntry>,
    /// Document text with markup removed, for reading-time estimates
    pub plain_text: String,
}

/// Markdown processor with the portal's extensions enabled
pub struct MarkdownProcessor {
    options: Options,
    highlighter: HighlightTransformer,
}

impl MarkdownProcessor {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self {
            options,
            highlighter: HighlightTransformer::new(),
        }
    }

    /// Render a markdown body. The same input always yields the same HTML.
    pub fn render(&self, markdown: &str) -> RenderedMarkdown {
        let events: Vec<Event> = Parser::new_ext(markdown, self.options).collect();

        let headings = collect_headings(&events);
        let plain_text = collect_plain_text(&events);

        let events = attach_heading_ids(events, &headings);
        let events = add_heading_anchors(events);
        let events = self.highlighter.transform(events);

        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, events.into_iter());

        let toc = build_toc(&headings);

        RenderedMarkdown {
            html: html_output,
            headings,
            toc,
            plain_text,
        }
    }

    /// Convert markdown to HTML only
    pub fn render_html(&self, markdown: &str) -> String {
        self.render(markdown).html
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_headings(events: &[Event]) -> Vec<Heading> {
    let mut ids = AnchorIds::new();
    let mut headings = Vec::new();
    let mut current: Option<(u8, Option<String>, String)> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current = Some((*level as u8, id.as_ref().map(|s| s.to_string()), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, ref mut title)) = current {
                    title.push_str(text.as_ref());
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, explicit, title)) = current.take() {
                    let title = title.trim().to_string();
                    let id = match explicit {
                        Some(explicit) if !explicit.is_empty() => ids.claim(explicit),
                        _ => ids.unique(&title),
                    };
                    headings.push(Heading { level, id, title });
                }
            }
            _ => {}
        }
    }

    headings
}

fn collect_plain_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::Html(raw) | Event::InlineHtml(raw) => {
                text.push(' ');
                text.push_str(&html_to_text(raw));
                text.push(' ');
            }
            // Inline spans do not separate words
            Event::End(
                TagEnd::Emphasis
                | TagEnd::Strong
                | TagEnd::Strikethrough
                | TagEnd::Link
                | TagEnd::Image,
            ) => {}
            Event::End(_) | Event::SoftBreak | Event::HardBreak | Event::Rule => text.push(' '),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn attach_heading_ids<'a>(events: Vec<Event<'a>>, headings: &[Heading]) -> Vec<Event<'a>> {
    let mut heading_iter = headings.iter();

    events
        .into_iter()
        .map(|event| match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                let id = heading_iter
                    .next()
                    .map(|h| CowStr::Boxed(h.id.clone().into_boxed_str()))
                    .or(id);
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                })
            }
            other => other,
        })
        .collect()
}

fn add_heading_anchors(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut result = Vec::with_capacity(events.len());
    let mut current_id: Option<String> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                current_id = id.as_ref().map(|s| s.to_string());
                result.push(Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }));
            }
            Event::End(TagEnd::Heading(level)) => {
                if let Some(id) = current_id.take() {
                    let anchor = format!(
                        "<a class=\"heading-anchor\" href=\"#{}\" aria-label=\"Link to this section\">#</a>",
                        html_escape(&id)
                    );
                    result.push(Event::Html(CowStr::Boxed(anchor.into_boxed_str())));
                }
                result.push(Event::End(TagEnd::Heading(level)));
            }
            other => result.push(other),
        }
    }

    result
}

/// Escape text for use in HTML content and attribute values
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_markdown() {
        let processor = MarkdownProcessor::new();
        let html = processor.render_html("# Hello World\n\nThis is a **test** with `code`.");
        assert!(html.contains("<h1 id=\"hello-world\">"));
        assert!(html.contains("<strong>test</strong>"));
        assert!(html.contains("<code>code</code>"));
    }

    #[test]
    fn test_heading_ids_and_anchors() {
        let processor = MarkdownProcessor::new();
        let out = processor.render("## Governor Limits\n\ntext\n\n## Governor Limits\n");
        assert!(out.html.contains("<h2 id=\"governor-limits\">"));
        assert!(out.html.contains("<h2 id=\"governor-limits-1\">"));
        assert!(out
            .html
            .contains("<a class=\"heading-anchor\" href=\"#governor-limits-1\""));
        assert_eq!(out.toc.len(), 2);
        assert_eq!(out.toc[1].id, "governor-limits-1");
    }

    #[test]
    fn test_numbered_heading_before_repeats_keeps_ids_unique() {
        let processor = MarkdownProcessor::new();
        let out = processor.render("## Setup 1\n\n## Setup\n\n## Setup\n");
        let ids: Vec<_> = out.toc.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["setup-1", "setup", "setup-2"]);
        assert_eq!(out.html.matches("id=\"setup-1\"").count(), 1);
    }

    #[test]
    fn test_explicit_heading_id_wins() {
        let processor = MarkdownProcessor::new();
        let out = processor.render("## Bulk Patterns {#bulk}\n");
        assert!(out.html.contains("<h2 id=\"bulk\">"));
        assert_eq!(out.toc[0].id, "bulk");
        assert_eq!(out.toc[0].title, "Bulk Patterns");
    }

    #[test]
    fn test_heading_with_inline_code_title() {
        let processor = MarkdownProcessor::new();
        let out = processor.render("## The `with sharing` keyword\n");
        assert_eq!(out.headings[0].title, "The with sharing keyword");
        assert_eq!(out.headings[0].id, "the-with-sharing-keyword");
    }

    #[test]
    fn test_toc_ids_match_html_ids() {
        let processor = MarkdownProcessor::new();
        let md = "# Title\n\n## Setup\n\n### Org\n\n#### Scratch\n\n## Deploy\n";
        let out = processor.render(md);
        assert_eq!(out.toc.len(), 2);
        for heading in out.headings.iter().filter(|h| h.level >= 2) {
            assert!(out.html.contains(&format!("id=\"{}\"", heading.id)));
        }
        assert_eq!(out.toc[0].children[0].children[0].id, "scratch");
    }

    #[test]
    fn test_tables() {
        let processor = MarkdownProcessor::new();
        let md = "| Limit | Value |\n|---|---|\n| SOQL queries | 100 |\n";
        let html = processor.render_html(md);
        assert!(html.contains("<table>"));
        assert!(html.contains("<th>Limit</th>"));
    }

    #[test]
    fn test_lists_links_emphasis() {
        let processor = MarkdownProcessor::new();
        let html = processor.render_html("- *one*\n- [two](https://example.com)\n");
        assert!(html.contains("<ul>"));
        assert!(html.contains("<em>one</em>"));
        assert!(html.contains("<a href=\"https://example.com\">two</a>"));
    }

    #[test]
    fn test_fenced_code_highlighted() {
        let processor = MarkdownProcessor::new();
        let html = processor.render_html("```apex\npublic class Foo {}\n```\n");
        assert!(html.contains("class=\"code-block\""));
        assert!(html.contains("data-lang=\"apex\""));
        assert!(html.contains("<pre style="));
        assert!(html.contains("Foo"));
    }

    #[test]
    fn test_raw_html_passes_through() {
        let processor = MarkdownProcessor::new();
        let md = "<details class=\"qa\"><summary>Why?</summary>\n\nBecause.\n\n</details>\n";
        let html = processor.render_html(md);
        assert!(html.contains("<details class=\"qa\"><summary>Why?</summary>"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let processor = MarkdownProcessor::new();
        let md = "# T\n\n## A\n\n```apex\nSystem.debug('x');\n```\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n## A\n";
        let first = processor.render(md);
        let second = MarkdownProcessor::new().render(md);
        assert_eq!(first.html, second.html);
        assert_eq!(first, second);
    }

    #[test]
    fn test_plain_text_excludes_markup() {
        let processor = MarkdownProcessor::new();
        let out = processor.render("## Heading\n\nSome **bold** words and `inline`.\n\n<div>raw</div>\n");
        assert_eq!(out.plain_text, "Heading Some bold words and inline. raw");
    }

    #[test]
    fn test_no_headings_means_empty_toc() {
        let processor = MarkdownProcessor::new();
        let out = processor.render("Just a paragraph.");
        assert!(out.toc.is_empty());
    }
}
