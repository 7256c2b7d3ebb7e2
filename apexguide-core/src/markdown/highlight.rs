//! Code syntax highlighting using syntect.

use super::html_escape;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd};
use std::sync::OnceLock;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::{SyntaxReference, SyntaxSet};

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME: OnceLock<Option<Theme>> = OnceLock::new();

/// Fence tags used in the content that syntect does not ship a grammar for.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("apex", "java"),
    ("cls", "java"),
    ("trigger", "java"),
    ("soql", "sql"),
    ("sosl", "sql"),
    ("lwc", "js"),
    ("aura", "html"),
    ("visualforce", "html"),
];

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme() -> Option<&'static Theme> {
    THEME
        .get_or_init(|| {
            let theme_set = ThemeSet::load_defaults();
            theme_set
                .themes
                .get("InspiredGitHub")
                .or_else(|| theme_set.themes.get("base16-ocean.light"))
                .cloned()
        })
        .as_ref()
}

/// Transformer for syntax highlighting fenced code blocks
///
/// Each fenced block becomes a `div.code-block` holding the highlighted
/// `<pre>` and a copy button. Indented blocks are left to the HTML writer.
pub struct HighlightTransformer;

impl HighlightTransformer {
    pub fn new() -> Self {
        Self
    }

    pub fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut result = Vec::with_capacity(events.len());
        let mut code_lang: Option<String> = None;
        let mut code_content = String::new();

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                    // Info string may carry extras after the language ("apex title=x")
                    let lang = info.split_whitespace().next().unwrap_or("").to_lowercase();
                    code_lang = Some(lang);
                    code_content.clear();
                }
                Event::Text(text) if code_lang.is_some() => {
                    code_content.push_str(text.as_ref());
                }
                Event::End(TagEnd::CodeBlock) if code_lang.is_some() => {
                    let lang = code_lang.take().unwrap_or_default();
                    let html = self.render_block(&code_content, &lang);
                    result.push(Event::Html(CowStr::Boxed(html.into_boxed_str())));
                }
                other => result.push(other),
            }
        }

        result
    }

    fn render_block(&self, code: &str, lang: &str) -> String {
        let body = if lang.is_empty() {
            plain_block(code)
        } else {
            self.highlight_code(code, lang)
        };

        let lang_attr = if lang.is_empty() { "text" } else { lang };
        format!(
            "<div class=\"code-block\" data-lang=\"{}\">\
             <button class=\"copy-button\" type=\"button\" aria-label=\"Copy code\">Copy</button>\
             {}</div>\n",
            html_escape(lang_attr),
            body
        )
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let ss = syntax_set();
        let Some(theme) = theme() else {
            return plain_block(code);
        };

        match highlighted_html_for_string(code, ss, find_syntax(ss, lang), theme) {
            Ok(html) => html,
            Err(err) => {
                tracing::debug!("Highlighting failed for '{}': {}", lang, err);
                plain_block(code)
            }
        }
    }
}

impl Default for HighlightTransformer {
    fn default() -> Self {
        Self::new()
    }
}

fn find_syntax<'s>(ss: &'s SyntaxSet, lang: &str) -> &'s SyntaxReference {
    let token = LANGUAGE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lang)
        .map(|(_, target)| *target)
        .unwrap_or(lang);

    ss.find_syntax_by_token(token)
        .or_else(|| ss.find_syntax_by_extension(token))
        .unwrap_or_else(|| ss.find_syntax_plain_text())
}

fn plain_block(code: &str) -> String {
    format!("<pre><code>{}</code></pre>", html_escape(code))
}
