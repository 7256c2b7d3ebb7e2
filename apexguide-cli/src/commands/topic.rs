//! Inspect a single topic in structured form.

use crate::TopicFormat;
use anyhow::{bail, Context, Result};
use apexguide_core::frontmatter::render_frontmatter;
use apexguide_core::{
    adjacent, render_toc_html, Config, Frontmatter, ReadingTime, RenderedTopic, Section,
    TocEntry, Topic, TopicRepository,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TopicPayload<'a> {
    section: Section,
    slug: &'a str,
    url: String,
    source_path: &'a Path,
    frontmatter: &'a Frontmatter,
    reading_time: &'a ReadingTime,
    read_time_label: String,
    toc: &'a [TocEntry],
    previous: Option<String>,
    next: Option<String>,
    prerequisites: Vec<String>,
    related: Vec<String>,
    html: &'a str,
}

/// Fetch a single topic and print it in the requested format.
pub fn show_topic(config_path: &Path, section: &str, slug: &str, format: TopicFormat) -> Result<()> {
    let config = Config::from_file(config_path).context("Failed to load configuration")?;
    let section: Section = section.parse()?;
    let repo = TopicRepository::load(config.content_dir()).context("Failed to load content")?;

    if let Some(err) = repo.failure_for(section, slug) {
        bail!("Topic '{}/{}' is broken: {}", section, slug, err);
    }
    let rendered = repo
        .get_topic_by_slug(section, slug)
        .with_context(|| format!("Topic '{}/{}' not found", section, slug))?;

    match format {
        TopicFormat::Json => {
            let payload = payload(&repo, &rendered, &config);
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        TopicFormat::Html => {
            println!("{}", rendered.html);
        }
        TopicFormat::Toc => match render_toc_html(&rendered.toc) {
            Some(html) => println!("{html}"),
            None => tracing::info!("{} has no table of contents", rendered.topic.key()),
        },
        TopicFormat::Frontmatter => {
            let block = render_frontmatter(&rendered.topic.frontmatter)
                .context("Failed to serialize front-matter")?;
            print!("{block}");
        }
    }

    Ok(())
}

fn payload<'a>(
    repo: &TopicRepository,
    rendered: &'a RenderedTopic,
    config: &Config,
) -> TopicPayload<'a> {
    let topic = &rendered.topic;
    let nav = adjacent(repo, topic.section, &topic.slug);

    TopicPayload {
        section: topic.section,
        slug: &topic.slug,
        url: topic.url(&config.normalized_base_url()),
        source_path: &topic.source_path,
        frontmatter: &topic.frontmatter,
        reading_time: &rendered.reading_time,
        read_time_label: rendered.read_time_label(),
        toc: &rendered.toc,
        previous: nav.previous.map(|t| t.key().to_string()),
        next: nav.next.map(|t| t.key().to_string()),
        prerequisites: keys(repo.get_prerequisites(topic.section, &topic.slug)),
        related: keys(repo.get_related_topics(topic.section, &topic.slug, config.related_limit)),
        html: &rendered.html,
    }
}

fn keys(topics: Vec<Arc<Topic>>) -> Vec<String> {
    topics.iter().map(|t| t.key().to_string()).collect()
}
