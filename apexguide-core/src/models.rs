//! Content model: sections, front-matter, topics and diagnostics.

use crate::reading_time::ReadingTime;
use crate::toc::TocEntry;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Curriculum area. Each section is one content directory and one URL segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Fundamentals,
    Apex,
    Language,
    ComponentModel,
    Integration,
    InterviewPrep,
}

impl Section {
    /// All sections in curriculum order.
    pub const ALL: [Section; 6] = [
        Section::Fundamentals,
        Section::Apex,
        Section::Language,
        Section::ComponentModel,
        Section::Integration,
        Section::InterviewPrep,
    ];

    /// URL segment and directory name
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Fundamentals => "fundamentals",
            Section::Apex => "apex",
            Section::Language => "language",
            Section::ComponentModel => "component-model",
            Section::Integration => "integration",
            Section::InterviewPrep => "interview-prep",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Fundamentals => "Fundamentals",
            Section::Apex => "Apex",
            Section::Language => "Language Basics",
            Section::ComponentModel => "Component Model",
            Section::Integration => "Integration",
            Section::InterviewPrep => "Interview Prep",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSection(pub String);

impl fmt::Display for UnknownSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown section '{}'", self.0)
    }
}

impl std::error::Error for UnknownSection {}

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == needle)
            .ok_or(UnknownSection(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

/// How heavily the certification exam emphasizes a topic. Descriptive only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamWeight {
    Low,
    Medium,
    High,
}

impl ExamWeight {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamWeight::Low => "low",
            ExamWeight::Medium => "medium",
            ExamWeight::High => "high",
        }
    }
}

/// External reading attached to a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resource {
    pub title: String,
    pub url: String,
}

/// Front-matter metadata of a topic file.
///
/// Keys are camelCase in the file; unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Frontmatter {
    pub title: String,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,

    /// Position within the section (previous/next ordering)
    pub order: u32,

    pub difficulty: Difficulty,

    /// Author-supplied display string, e.g. "6 min"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_topics: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_weight: Option<ExamWeight>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
}

/// Identity of a topic: slugs are unique per section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicKey {
    pub section: Section,
    pub slug: String,
}

impl TopicKey {
    pub fn new(section: Section, slug: impl Into<String>) -> Self {
        Self {
            section,
            slug: slug.into(),
        }
    }
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.section, self.slug)
    }
}

/// One content file. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Topic {
    /// File stem, slugified (e.g. "governor-limits")
    pub slug: String,

    pub section: Section,

    pub frontmatter: Frontmatter,

    /// Raw markdown body without the front-matter block
    pub content: String,

    /// Path of the source file on disk
    pub source_path: PathBuf,
}

impl Topic {
    pub fn key(&self) -> TopicKey {
        TopicKey::new(self.section, self.slug.clone())
    }

    pub fn title(&self) -> &str {
        &self.frontmatter.title
    }

    pub fn order(&self) -> u32 {
        self.frontmatter.order
    }

    /// URL path of the topic page ("/apex/triggers" under a "/" base)
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}{}/{}",
            crate::config::normalize_base_url(base_url),
            self.section,
            self.slug
        )
    }

    /// Output file relative to the build directory
    pub fn output_rel_path(&self) -> PathBuf {
        PathBuf::from(self.section.as_str())
            .join(&self.slug)
            .join("index.html")
    }
}

/// A topic with its derived, render-time data.
#[derive(Debug, Clone)]
pub struct RenderedTopic {
    pub topic: Arc<Topic>,
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub reading_time: ReadingTime,
}

impl RenderedTopic {
    /// Reading time label: the author's override when given, the estimate otherwise.
    pub fn read_time_label(&self) -> String {
        match &self.topic.frontmatter.read_time {
            Some(label) if !label.trim().is_empty() => label.trim().to_string(),
            _ => self.reading_time.display_text.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Warning,
    Error,
}

/// Content-authoring finding surfaced by `check` and logged at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub severity: DiagnosticSeverity,
    pub section: Option<Section>,
    pub slug: Option<String>,
    pub source_path: Option<PathBuf>,
}
