//! Build command implementation.

use crate::assets;
use anyhow::{bail, Context, Result};
use apexguide_core::{Config, Section, Topic, TopicRepository};
use apexguide_render::{
    render_error_page, render_index_page, render_not_found_page, render_section_page,
    render_topic_page, SiteContext,
};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Outcome of a static build
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Topic pages written successfully
    pub pages: usize,
    /// One line per topic that could not be built
    pub failed: Vec<String>,
}

/// One line of topics.json
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestEntry<'a> {
    section: Section,
    slug: &'a str,
    title: &'a str,
    description: &'a str,
    order: u32,
    difficulty: &'a str,
    url: String,
    reading_time: String,
    concepts: &'a [String],
}

/// Build the static site from a config file
pub fn build_site(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!("Loading config from {:?}", config_path);
    let config = Config::from_file(config_path).context("Failed to load configuration")?;
    let report = build_site_with_config(&config)?;

    if strict && !report.failed.is_empty() {
        bail!(
            "{} topic(s) failed to build:\n  {}",
            report.failed.len(),
            report.failed.join("\n  ")
        );
    }
    Ok(())
}

/// Build the site from an already loaded config.
///
/// A broken topic never stops the build: it gets an error page at its URL
/// and is listed in the report.
pub fn build_site_with_config(config: &Config) -> Result<BuildReport> {
    let repo = TopicRepository::load(config.content_dir()).context("Failed to load content")?;
    let ctx = SiteContext::from_config(config);

    tracing::info!("Building site: {}", config.site.title);

    let output_dir = config.output_dir();
    fs::create_dir_all(&output_dir).context("Failed to create output directory")?;

    let topics: Vec<&Arc<Topic>> = repo.topics().collect();
    let results: Vec<Result<(), String>> = topics
        .par_iter()
        .map(|topic| {
            render_topic_file(&ctx, &repo, topic, &output_dir)
                .map_err(|err| format!("{}: {:#}", topic.key(), err))
        })
        .collect();

    let mut report = BuildReport::default();
    for result in results {
        match result {
            Ok(()) => report.pages += 1,
            Err(message) => {
                tracing::error!("Failed to build {}", message);
                report.failed.push(message);
            }
        }
    }

    for (key, error) in repo.failed_topics() {
        let html = render_error_page(&ctx, &repo, error)
            .with_context(|| format!("Failed to render error page for {}", key))?;
        let rel = Path::new(key.section.as_str())
            .join(&key.slug)
            .join("index.html");
        write_page(&output_dir, &rel, &html)?;
    }
    report
        .failed
        .extend(repo.failures().iter().map(|error| error.to_string()));

    for section in repo.sections() {
        let html = render_section_page(&ctx, &repo, section)
            .with_context(|| format!("Failed to render section {}", section))?;
        write_page(&output_dir, &Path::new(section.as_str()).join("index.html"), &html)?;
    }

    let index = render_index_page(&ctx, &repo).context("Failed to render index page")?;
    write_page(&output_dir, Path::new("index.html"), &index)?;

    let not_found = render_not_found_page(&ctx, &repo).context("Failed to render 404 page")?;
    write_page(&output_dir, Path::new("404.html"), &not_found)?;
    tracing::info!("Rendered 404 page");

    generate_manifest(&repo, &ctx, &output_dir)?;

    assets::extract(&output_dir.join("static"))?;
    tracing::info!("Copied static assets");

    tracing::info!("✓ Built {} pages", report.pages);
    if !report.failed.is_empty() {
        tracing::warn!("{} topic(s) failed; see errors above", report.failed.len());
    }
    tracing::info!("✓ Output written to {:?}", output_dir);

    Ok(report)
}

fn render_topic_file(
    ctx: &SiteContext,
    repo: &TopicRepository,
    topic: &Topic,
    output_dir: &Path,
) -> Result<()> {
    let html = render_topic_page(ctx, repo, topic.section, &topic.slug)?
        .with_context(|| format!("{} disappeared from the repository", topic.key()))?;
    write_page(output_dir, &topic.output_rel_path(), &html)
}

fn write_page(output_dir: &Path, rel: &Path, html: &str) -> Result<()> {
    let output_path = output_dir.join(rel);
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    fs::write(&output_path, html).with_context(|| format!("Failed to write {:?}", output_path))?;
    tracing::debug!("Wrote {:?}", rel);
    Ok(())
}

/// Generate topics.json: every topic in curriculum order
fn generate_manifest(repo: &TopicRepository, ctx: &SiteContext, output_dir: &Path) -> Result<()> {
    let entries: Vec<ManifestEntry> = repo
        .topics()
        .map(|topic| ManifestEntry {
            section: topic.section,
            slug: &topic.slug,
            title: topic.title(),
            description: &topic.frontmatter.description,
            order: topic.order(),
            difficulty: topic.frontmatter.difficulty.as_str(),
            url: topic.url(&ctx.base_url),
            reading_time: repo
                .get_topic_by_slug(topic.section, &topic.slug)
                .map(|rendered| rendered.read_time_label())
                .unwrap_or_default(),
            concepts: &topic.frontmatter.concepts,
        })
        .collect();

    let output_path = output_dir.join("topics.json");
    let json = serde_json::to_string_pretty(&entries).context("Failed to serialize topics")?;
    fs::write(&output_path, json).context("Failed to write topics.json")?;

    tracing::info!("Generated topics.json with {} entries", entries.len());
    Ok(())
}
