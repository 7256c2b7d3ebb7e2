//! Page assembly: turns repository lookups into rendered HTML.
//!
//! The static build and the dev server both go through these functions so a
//! page looks the same whichever way it was produced.

use crate::templates::{
    ContentErrorTemplate, IndexTemplate, NavLink, NotFoundTemplate, PageChrome, ResourceLink,
    SectionEntry, SectionLink, SectionTemplate, TopicLink, TopicTemplate,
};
use apexguide_core::config::normalize_base_url;
use apexguide_core::{
    adjacent, render_toc_html, Config, ContentParseError, Section, Topic, TopicRepository,
};
use askama::Template;
use chrono::Datelike;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to render {page}: {source}")]
    Template {
        page: String,
        #[source]
        source: askama::Error,
    },
}

/// Site metadata every page needs, detached from the on-disk config
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub title: String,
    pub author: String,
    pub description: String,
    pub base_url: String,
    pub related_limit: usize,
    /// Footer year, fixed once so every page of a build agrees
    pub year: i32,
}

impl SiteContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            title: config.site.title.clone(),
            author: config.site.author.clone(),
            description: config.site.description.clone(),
            base_url: config.normalized_base_url(),
            related_limit: config.related_limit,
            year: config
                .site
                .copyright_year
                .unwrap_or_else(|| chrono::Utc::now().year()),
        }
    }

    /// Same site served under a different root
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    fn chrome(&self, repo: &TopicRepository, active: Option<Section>) -> PageChrome {
        let nav = repo
            .sections()
            .into_iter()
            .map(|section| NavLink {
                title: section.title().to_string(),
                url: self.section_url(section),
                active: Some(section) == active,
            })
            .collect();

        PageChrome {
            site_title: self.title.clone(),
            site_author: self.author.clone(),
            site_description: self.description.clone(),
            base_url: self.base_url.clone(),
            year: self.year,
            nav,
        }
    }

    fn section_url(&self, section: Section) -> String {
        format!("{}{}", self.base_url, section)
    }

    fn section_link(&self, section: Section) -> SectionLink {
        SectionLink {
            slug: section.as_str().to_string(),
            title: section.title().to_string(),
            url: self.section_url(section),
        }
    }

    fn topic_link(&self, topic: &Topic, current: bool) -> TopicLink {
        TopicLink {
            url: topic.url(&self.base_url),
            title: topic.title().to_string(),
            description: topic.frontmatter.description.clone(),
            difficulty: topic.frontmatter.difficulty.as_str().to_string(),
            current,
        }
    }
}

/// Result of resolving `/<section>/<slug>`
#[derive(Debug)]
pub enum TopicPage {
    Found(String),
    /// The source file exists but failed to parse; holds the error page
    Broken(String),
    /// Holds the 404 page
    Missing(String),
}

impl TopicPage {
    pub fn html(&self) -> &str {
        match self {
            TopicPage::Found(html) | TopicPage::Broken(html) | TopicPage::Missing(html) => html,
        }
    }
}

/// Resolve a topic URL to the page that should be served for it.
pub fn render_topic_route(
    ctx: &SiteContext,
    repo: &TopicRepository,
    section: Section,
    slug: &str,
) -> Result<TopicPage, RenderError> {
    if let Some(html) = render_topic_page(ctx, repo, section, slug)? {
        return Ok(TopicPage::Found(html));
    }
    if let Some(err) = repo.failure_for(section, slug) {
        return Ok(TopicPage::Broken(render_error_page(ctx, repo, err)?));
    }
    Ok(TopicPage::Missing(render_not_found_page(ctx, repo)?))
}

/// Render one topic page. `None` when the topic does not exist.
pub fn render_topic_page(
    ctx: &SiteContext,
    repo: &TopicRepository,
    section: Section,
    slug: &str,
) -> Result<Option<String>, RenderError> {
    let Some(rendered) = repo.get_topic_by_slug(section, slug) else {
        return Ok(None);
    };
    let topic = &rendered.topic;
    let frontmatter = &topic.frontmatter;
    let nav = adjacent(repo, section, slug);

    let template = TopicTemplate {
        chrome: ctx.chrome(repo, Some(section)),
        section: ctx.section_link(section),
        slug: topic.slug.clone(),
        title: frontmatter.title.clone(),
        description: frontmatter.description.clone(),
        overview: frontmatter.overview.clone(),
        difficulty: frontmatter.difficulty.as_str().to_string(),
        exam_weight: frontmatter.exam_weight.map(|w| w.as_str().to_string()),
        read_time: rendered.read_time_label(),
        last_updated: frontmatter
            .last_updated
            .map(|d| d.format("%Y-%m-%d").to_string()),
        concepts: frontmatter.concepts.clone(),
        toc_html: render_toc_html(&rendered.toc),
        content: rendered.html.clone(),
        prerequisites: repo
            .get_prerequisites(section, slug)
            .iter()
            .map(|t| ctx.topic_link(t, false))
            .collect(),
        resources: frontmatter
            .resources
            .iter()
            .map(|r| ResourceLink {
                title: r.title.clone(),
                url: r.url.clone(),
            })
            .collect(),
        related: repo
            .get_related_topics(section, slug, ctx.related_limit)
            .iter()
            .map(|t| ctx.topic_link(t, false))
            .collect(),
        section_topics: repo
            .get_topics_by_section(section)
            .iter()
            .map(|t| ctx.topic_link(t, t.slug == topic.slug))
            .collect(),
        previous: nav.previous.as_deref().map(|t| ctx.topic_link(t, false)),
        next: nav.next.as_deref().map(|t| ctx.topic_link(t, false)),
    };

    let html = template.render().map_err(|source| RenderError::Template {
        page: topic.key().to_string(),
        source,
    })?;
    tracing::debug!("Rendered page {}", topic.key());
    Ok(Some(html))
}

/// Render the listing page of one section, empty or not.
pub fn render_section_page(
    ctx: &SiteContext,
    repo: &TopicRepository,
    section: Section,
) -> Result<String, RenderError> {
    let template = SectionTemplate {
        chrome: ctx.chrome(repo, Some(section)),
        section: ctx.section_link(section),
        topics: repo
            .get_topics_by_section(section)
            .iter()
            .map(|t| ctx.topic_link(t, false))
            .collect(),
    };
    template.render().map_err(|source| RenderError::Template {
        page: format!("section {section}"),
        source,
    })
}

pub fn render_index_page(ctx: &SiteContext, repo: &TopicRepository) -> Result<String, RenderError> {
    let sections = repo
        .sections()
        .into_iter()
        .map(|section| SectionEntry {
            section: ctx.section_link(section),
            topics: repo
                .get_topics_by_section(section)
                .iter()
                .map(|t| ctx.topic_link(t, false))
                .collect(),
        })
        .collect();

    let template = IndexTemplate {
        chrome: ctx.chrome(repo, None),
        sections,
    };
    template.render().map_err(|source| RenderError::Template {
        page: "index".to_string(),
        source,
    })
}

pub fn render_not_found_page(
    ctx: &SiteContext,
    repo: &TopicRepository,
) -> Result<String, RenderError> {
    let template = NotFoundTemplate {
        chrome: ctx.chrome(repo, None),
    };
    template.render().map_err(|source| RenderError::Template {
        page: "404".to_string(),
        source,
    })
}

pub fn render_error_page(
    ctx: &SiteContext,
    repo: &TopicRepository,
    error: &ContentParseError,
) -> Result<String, RenderError> {
    // Show the path relative to the content root when possible
    let path = error
        .path
        .strip_prefix(repo.content_dir())
        .unwrap_or(&error.path)
        .display()
        .to_string();

    let template = ContentErrorTemplate {
        chrome: ctx.chrome(repo, None),
        path,
        line: error.line,
        message: error.message.clone(),
    };
    template.render().map_err(|source| RenderError::Template {
        page: format!("error page for {}", error.path.display()),
        source,
    })
}
