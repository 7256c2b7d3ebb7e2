//! Askama template definitions.

use askama::Template;

/// Site-wide header, navigation and footer data shared by every page
#[derive(Debug, Clone)]
pub struct PageChrome {
    pub site_title: String,
    pub site_author: String,
    pub site_description: String,
    pub base_url: String,
    pub year: i32,
    pub nav: Vec<NavLink>,
}

/// One entry of the top section navigation
#[derive(Debug, Clone)]
pub struct NavLink {
    pub title: String,
    pub url: String,
    pub active: bool,
}

/// A section reference for headings and breadcrumbs
#[derive(Debug, Clone)]
pub struct SectionLink {
    pub slug: String,
    pub title: String,
    pub url: String,
}

/// A topic reference used in listings, the sidebar and the pager
#[derive(Debug, Clone)]
pub struct TopicLink {
    pub url: String,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub current: bool,
}

#[derive(Debug, Clone)]
pub struct ResourceLink {
    pub title: String,
    pub url: String,
}

/// A section with its topics on the home page
#[derive(Debug, Clone)]
pub struct SectionEntry {
    pub section: SectionLink,
    pub topics: Vec<TopicLink>,
}

/// Topic page template
#[derive(Template)]
#[template(path = "topic.html")]
pub struct TopicTemplate {
    pub chrome: PageChrome,
    pub section: SectionLink,
    pub slug: String,

    // Header
    pub title: String,
    pub description: String,
    pub overview: Option<String>,
    pub difficulty: String,
    pub exam_weight: Option<String>,
    pub read_time: String,
    pub last_updated: Option<String>,
    pub concepts: Vec<String>,

    // Body
    pub toc_html: Option<String>,
    pub content: String,

    // Cross-references
    pub prerequisites: Vec<TopicLink>,
    pub resources: Vec<ResourceLink>,
    pub related: Vec<TopicLink>,

    // Navigation
    pub section_topics: Vec<TopicLink>,
    pub previous: Option<TopicLink>,
    pub next: Option<TopicLink>,
}

/// Section listing template
#[derive(Template)]
#[template(path = "section.html")]
pub struct SectionTemplate {
    pub chrome: PageChrome,
    pub section: SectionLink,
    pub topics: Vec<TopicLink>,
}

/// Home page template
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub chrome: PageChrome,
    pub sections: Vec<SectionEntry>,
}

/// 404 error page template
#[derive(Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {
    pub chrome: PageChrome,
}

/// Page shown in place of a topic whose source file is broken
#[derive(Template)]
#[template(path = "error.html")]
pub struct ContentErrorTemplate {
    pub chrome: PageChrome,
    pub path: String,
    pub line: Option<usize>,
    pub message: String,
}
