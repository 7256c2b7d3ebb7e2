//! In-memory topic index: discovery, lookup, ordering and cross-references.

use crate::frontmatter::{parse_frontmatter, ContentParseError};
use crate::markdown::MarkdownProcessor;
use crate::models::{Diagnostic, DiagnosticSeverity, RenderedTopic, Section, Topic, TopicKey};
use crate::reading_time::ReadingTime;
use crate::slug::{slug_from_path, slugify};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use walkdir::WalkDir;

/// Related topics shown per page unless configured otherwise
pub const DEFAULT_RELATED_LIMIT: usize = 3;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("content directory {0:?} does not exist or is not a directory")]
    MissingContentDir(PathBuf),
}

/// Read-only index of every topic, built once per build or server start.
///
/// Lookups never fail: unknown topics are `None`, broken content files are
/// kept aside in [`TopicRepository::failures`], dangling cross-references are
/// dropped. Rendering happens on first request and is memoized.
pub struct TopicRepository {
    content_dir: PathBuf,
    topics: HashMap<TopicKey, Arc<Topic>>,
    by_section: BTreeMap<Section, Vec<Arc<Topic>>>,
    failures: Vec<ContentParseError>,
    failed_keys: HashMap<TopicKey, usize>,
    diagnostics: Vec<Diagnostic>,
    processor: MarkdownProcessor,
    rendered: RwLock<HashMap<TopicKey, Arc<RenderedTopic>>>,
}

impl TopicRepository {
    /// Scan `<content_dir>/<section>/*.md` and index every topic.
    pub fn load(content_dir: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let content_dir = content_dir.as_ref();
        if !content_dir.is_dir() {
            return Err(RepositoryError::MissingContentDir(content_dir.to_path_buf()));
        }

        let mut topics = Vec::new();
        let mut failures = Vec::new();
        let mut unknown_dirs = HashSet::new();
        let mut owners: HashMap<TopicKey, PathBuf> = HashMap::new();

        for entry in WalkDir::new(content_dir)
            .min_depth(1)
            .max_depth(2)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!("Skipping unreadable content entry: {}", err);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !matches!(path.extension(), Some(ext) if ext == "md") {
                continue;
            }

            if entry.depth() == 1 {
                tracing::warn!("Ignoring {:?}: topics must live in a section directory", path);
                continue;
            }

            let dir_name = path
                .parent()
                .and_then(Path::file_name)
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            let Ok(section) = dir_name.parse::<Section>() else {
                if unknown_dirs.insert(dir_name.to_string()) {
                    tracing::warn!("Ignoring unknown section directory '{}'", dir_name);
                }
                continue;
            };

            // File names that differ only in case or punctuation share a
            // slug; the first file in path order keeps it.
            let result = read_topic(path, section).and_then(|topic| {
                match owners.get(&topic.key()) {
                    Some(owner) => Err(slug_collision(content_dir, path, &topic.slug, owner)),
                    None => {
                        owners.insert(topic.key(), path.to_path_buf());
                        Ok(topic)
                    }
                }
            });
            match result {
                Ok(topic) => topics.push(topic),
                Err(failure) => {
                    tracing::error!("Skipping topic: {}", failure.error);
                    failures.push(failure);
                }
            }
        }

        let mut repo = Self::index(content_dir.to_path_buf(), topics);
        for failure in failures {
            match failure.key {
                // A topic that loaded fine owns its URL; so does an earlier broken file.
                Some(key)
                    if !repo.topics.contains_key(&key) && !repo.failed_keys.contains_key(&key) =>
                {
                    repo.failed_keys.insert(key, repo.failures.len());
                }
                _ => {}
            }
            repo.failures.push(failure.error);
        }

        tracing::info!(
            "Loaded {} topics across {} sections ({} failed)",
            repo.len(),
            repo.by_section.len(),
            repo.failures.len()
        );

        Ok(repo)
    }

    /// Build a repository from topics already in memory.
    pub fn from_topics(topics: Vec<Topic>) -> Self {
        Self::index(PathBuf::new(), topics)
    }

    fn index(content_dir: PathBuf, topics: Vec<Topic>) -> Self {
        let mut map = HashMap::new();
        let mut by_section: BTreeMap<Section, Vec<Arc<Topic>>> = BTreeMap::new();
        let mut diagnostics = Vec::new();

        for topic in topics {
            let topic = Arc::new(topic);
            if let Some(previous) = map.insert(topic.key(), topic.clone()) {
                // load() rejects colliding files first, so only from_topics gets here.
                tracing::warn!("Duplicate topic {} replaces {:?}", topic.key(), previous.source_path);
                by_section
                    .entry(topic.section)
                    .or_default()
                    .retain(|t| t.slug != topic.slug);
            }
            by_section.entry(topic.section).or_default().push(topic);
        }

        for (section, list) in by_section.iter_mut() {
            list.sort_by(|a, b| a.order().cmp(&b.order()).then_with(|| a.slug.cmp(&b.slug)));
            for pair in list.windows(2) {
                if pair[0].order() == pair[1].order() {
                    let message = format!(
                        "'{}' and '{}' share order {} in section '{}'",
                        pair[0].slug,
                        pair[1].slug,
                        pair[0].order(),
                        section
                    );
                    tracing::warn!("{}", message);
                    diagnostics.push(Diagnostic {
                        code: "order.duplicate".to_string(),
                        message,
                        severity: DiagnosticSeverity::Warning,
                        section: Some(*section),
                        slug: Some(pair[1].slug.clone()),
                        source_path: Some(pair[1].source_path.clone()),
                    });
                }
            }
        }

        let mut repo = Self {
            content_dir,
            topics: map,
            by_section,
            failures: Vec::new(),
            failed_keys: HashMap::new(),
            diagnostics,
            processor: MarkdownProcessor::new(),
            rendered: RwLock::new(HashMap::new()),
        };
        let dangling = repo.find_dangling_references();
        repo.diagnostics.extend(dangling);
        repo
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Sections with at least one topic, in curriculum order
    pub fn sections(&self) -> Vec<Section> {
        self.by_section.keys().copied().collect()
    }

    /// Every topic, grouped by section in curriculum order, each group by `order`
    pub fn topics(&self) -> impl Iterator<Item = &Arc<Topic>> {
        self.by_section.values().flatten()
    }

    /// Unrendered lookup
    pub fn topic(&self, section: Section, slug: &str) -> Option<Arc<Topic>> {
        self.topics.get(&TopicKey::new(section, slug)).cloned()
    }

    /// Look up a topic and render it (memoized).
    ///
    /// Unknown slugs, including files that failed to parse, return `None`.
    pub fn get_topic_by_slug(&self, section: Section, slug: &str) -> Option<Arc<RenderedTopic>> {
        let key = TopicKey::new(section, slug);
        if let Some(hit) = self.rendered.read().get(&key) {
            return Some(hit.clone());
        }

        let topic = self.topics.get(&key)?.clone();
        // Rendered outside the lock; a concurrent render of the same immutable
        // topic produces identical output and the first insert wins.
        let rendered = Arc::new(self.render(topic));
        let mut cache = self.rendered.write();
        Some(cache.entry(key).or_insert(rendered).clone())
    }

    fn render(&self, topic: Arc<Topic>) -> RenderedTopic {
        let markdown = self.processor.render(&topic.content);
        let reading_time = ReadingTime::from_text(&markdown.plain_text);
        tracing::debug!(
            "Rendered {} ({} words, {} headings)",
            topic.key(),
            reading_time.words,
            markdown.headings.len()
        );

        RenderedTopic {
            topic,
            html: markdown.html,
            toc: markdown.toc,
            reading_time,
        }
    }

    /// Topics of one section sorted ascending by `order`
    pub fn get_topics_by_section(&self, section: Section) -> &[Arc<Topic>] {
        self.by_section
            .get(&section)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolve `relatedTopics` in declared order, skipping dangling slugs.
    ///
    /// Returns at most `limit` topics and never pads with unrelated content.
    pub fn get_related_topics(&self, section: Section, slug: &str, limit: usize) -> Vec<Arc<Topic>> {
        match self.topic(section, slug) {
            Some(topic) => self.resolve_all(&topic, &topic.frontmatter.related_topics, limit),
            None => Vec::new(),
        }
    }

    /// Resolve `prerequisites` in declared order, skipping dangling slugs.
    pub fn get_prerequisites(&self, section: Section, slug: &str) -> Vec<Arc<Topic>> {
        match self.topic(section, slug) {
            Some(topic) => self.resolve_all(&topic, &topic.frontmatter.prerequisites, usize::MAX),
            None => Vec::new(),
        }
    }

    fn resolve_all(&self, from: &Topic, references: &[String], limit: usize) -> Vec<Arc<Topic>> {
        let mut seen = HashSet::new();
        references
            .iter()
            .filter_map(|reference| self.resolve_reference(from.section, reference))
            .filter(|topic| topic.key() != from.key())
            .filter(|topic| seen.insert(topic.key()))
            .take(limit)
            .collect()
    }

    /// Resolve a reference written in front-matter.
    ///
    /// `section/slug` is looked up directly. A bare slug is looked up in
    /// `from` first, then in the remaining sections in curriculum order.
    pub fn resolve_reference(&self, from: Section, reference: &str) -> Option<Arc<Topic>> {
        let reference = reference.trim().trim_matches('/');
        if let Some((section, slug)) = reference.split_once('/') {
            let section = section.parse::<Section>().ok()?;
            return self.topic(section, &slugify(slug));
        }

        let slug = slugify(reference);
        std::iter::once(from)
            .chain(Section::ALL.into_iter().filter(|s| *s != from))
            .find_map(|section| self.topic(section, &slug))
    }

    /// Files that could not be parsed
    pub fn failures(&self) -> &[ContentParseError] {
        &self.failures
    }

    /// Parse failure for a topic path, if that file is broken
    pub fn failure_for(&self, section: Section, slug: &str) -> Option<&ContentParseError> {
        self.failed_keys
            .get(&TopicKey::new(section, slug))
            .and_then(|idx| self.failures.get(*idx))
    }

    /// Broken files that still map to a topic URL, in path order
    pub fn failed_topics(&self) -> Vec<(&TopicKey, &ContentParseError)> {
        let mut failed: Vec<_> = self
            .failed_keys
            .iter()
            .filter_map(|(key, idx)| self.failures.get(*idx).map(|err| (key, err)))
            .collect();
        failed.sort_by(|a, b| a.1.path.cmp(&b.1.path));
        failed
    }

    /// Content-authoring warnings: dangling references and duplicate orders
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Only the dangling-reference warnings
    pub fn dangling_references(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.code.starts_with("reference."))
            .cloned()
            .collect()
    }

    fn find_dangling_references(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for topic in self.topics() {
            let fields = [
                ("prerequisites", &topic.frontmatter.prerequisites),
                ("relatedTopics", &topic.frontmatter.related_topics),
            ];
            for (field, references) in fields {
                for reference in references {
                    if self.resolve_reference(topic.section, reference).is_some() {
                        continue;
                    }
                    let message = format!(
                        "{} in {} references unknown topic '{}'",
                        field,
                        topic.key(),
                        reference
                    );
                    tracing::warn!("{}", message);
                    diagnostics.push(Diagnostic {
                        code: "reference.dangling".to_string(),
                        message,
                        severity: DiagnosticSeverity::Warning,
                        section: Some(topic.section),
                        slug: Some(topic.slug.clone()),
                        source_path: Some(topic.source_path.clone()),
                    });
                }
            }
        }
        diagnostics
    }
}

struct LoadFailure {
    key: Option<TopicKey>,
    error: ContentParseError,
}

fn slug_collision(content_dir: &Path, path: &Path, slug: &str, owner: &Path) -> LoadFailure {
    let owner = owner.strip_prefix(content_dir).unwrap_or(owner);
    LoadFailure {
        key: None,
        error: ContentParseError {
            path: path.to_path_buf(),
            line: None,
            message: format!("slug '{}' already used by {}", slug, owner.display()),
        },
    }
}

fn read_topic(path: &Path, section: Section) -> Result<Topic, LoadFailure> {
    let slug = slug_from_path(path).ok_or_else(|| LoadFailure {
        key: None,
        error: ContentParseError {
            path: path.to_path_buf(),
            line: None,
            message: "file name does not produce a usable slug".to_string(),
        },
    })?;
    let key = TopicKey::new(section, slug.clone());

    let raw = fs::read_to_string(path).map_err(|e| LoadFailure {
        key: Some(key.clone()),
        error: ContentParseError::io(path, &e),
    })?;

    let (frontmatter, content) = parse_frontmatter(&raw).map_err(|e| LoadFailure {
        key: Some(key.clone()),
        error: ContentParseError::from_frontmatter(path, &e),
    })?;

    Ok(Topic {
        slug,
        section,
        frontmatter,
        content,
        source_path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, Frontmatter};

    fn topic(section: Section, slug: &str, order: u32, related: &[&str]) -> Topic {
        Topic {
            slug: slug.to_string(),
            section,
            frontmatter: Frontmatter {
                title: slug.to_uppercase(),
                description: String::new(),
                overview: None,
                order,
                difficulty: Difficulty::Beginner,
                read_time: None,
                concepts: vec![],
                prerequisites: vec![],
                related_topics: related.iter().map(|s| s.to_string()).collect(),
                last_updated: None,
                exam_weight: None,
                resources: vec![],
            },
            content: format!("## {slug}\n\nBody of {slug}."),
            source_path: PathBuf::from(format!("{section}/{slug}.md")),
        }
    }

    #[test]
    fn test_section_listing_sorted_by_order() {
        let repo = TopicRepository::from_topics(vec![
            topic(Section::Apex, "loops", 2, &[]),
            topic(Section::Apex, "intro", 1, &[]),
            topic(Section::Apex, "classes", 3, &[]),
        ]);
        let slugs: Vec<_> = repo
            .get_topics_by_section(Section::Apex)
            .iter()
            .map(|t| t.slug.as_str())
            .collect();
        assert_eq!(slugs, vec!["intro", "loops", "classes"]);
        assert!(repo.get_topics_by_section(Section::Integration).is_empty());
    }

    #[test]
    fn test_duplicate_order_is_warned_and_broken_by_slug() {
        let repo = TopicRepository::from_topics(vec![
            topic(Section::Apex, "b", 1, &[]),
            topic(Section::Apex, "a", 1, &[]),
        ]);
        let slugs: Vec<_> = repo
            .get_topics_by_section(Section::Apex)
            .iter()
            .map(|t| t.slug.clone())
            .collect();
        assert_eq!(slugs, vec!["a", "b"]);
        assert!(repo.diagnostics().iter().any(|d| d.code == "order.duplicate"));
    }

    #[test]
    fn test_related_topics_skip_missing() {
        let repo = TopicRepository::from_topics(vec![
            topic(Section::Apex, "a", 1, &["valid-slug", "missing-slug"]),
            topic(Section::Apex, "valid-slug", 2, &[]),
        ]);
        let related = repo.get_related_topics(Section::Apex, "a", 5);
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].slug, "valid-slug");

        let dangling = repo.dangling_references();
        assert_eq!(dangling.len(), 1);
        assert!(dangling[0].message.contains("missing-slug"));
    }

    #[test]
    fn test_related_topics_order_and_limit() {
        let repo = TopicRepository::from_topics(vec![
            topic(Section::Apex, "a", 1, &["d", "b", "c"]),
            topic(Section::Apex, "b", 2, &[]),
            topic(Section::Apex, "c", 3, &[]),
            topic(Section::Apex, "d", 4, &[]),
        ]);
        let related: Vec<_> = repo
            .get_related_topics(Section::Apex, "a", 2)
            .iter()
            .map(|t| t.slug.clone())
            .collect();
        assert_eq!(related, vec!["d", "b"]);
        assert!(repo.get_related_topics(Section::Apex, "unknown", 2).is_empty());
        assert!(repo.get_related_topics(Section::Apex, "a", 0).is_empty());
    }

    #[test]
    fn test_reference_resolution_across_sections() {
        let repo = TopicRepository::from_topics(vec![
            topic(
                Section::InterviewPrep,
                "triggers-qa",
                1,
                &["triggers", "fundamentals/data-model", "triggers-qa"],
            ),
            topic(Section::Apex, "triggers", 1, &[]),
            topic(Section::Fundamentals, "data-model", 1, &[]),
        ]);
        let related: Vec<_> = repo
            .get_related_topics(Section::InterviewPrep, "triggers-qa", 10)
            .iter()
            .map(|t| t.key().to_string())
            .collect();
        // Self-reference is dropped.
        assert_eq!(related, vec!["apex/triggers", "fundamentals/data-model"]);
    }

    #[test]
    fn test_same_section_wins_for_bare_slug() {
        let repo = TopicRepository::from_topics(vec![
            topic(Section::Apex, "limits", 1, &[]),
            topic(Section::Fundamentals, "limits", 1, &[]),
        ]);
        let hit = repo.resolve_reference(Section::Fundamentals, "limits").unwrap();
        assert_eq!(hit.section, Section::Fundamentals);
        let hit = repo.resolve_reference(Section::Integration, "limits").unwrap();
        assert_eq!(hit.section, Section::Fundamentals);
    }

    #[test]
    fn test_get_topic_by_slug_renders_and_memoizes() {
        let repo = TopicRepository::from_topics(vec![topic(Section::Apex, "intro", 1, &[])]);
        let first = repo.get_topic_by_slug(Section::Apex, "intro").unwrap();
        let second = repo.get_topic_by_slug(Section::Apex, "intro").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.html.contains("<h2 id=\"intro\">"));
        assert_eq!(first.toc.len(), 1);
        assert_eq!(first.reading_time.minutes, 1);
        assert!(repo.get_topic_by_slug(Section::Apex, "missing").is_none());
    }

    #[test]
    fn test_repository_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TopicRepository>();
    }
}
