//! # apexguide-core
//!
//! Content pipeline for the apexguide learning portal.
//!
//! Topic files are markdown with a YAML front-matter block, organized one
//! directory per curriculum section. This crate parses them, renders the
//! markdown with highlighted code and anchored headings, derives the table of
//! contents and reading time, and indexes everything in a read-only
//! [`TopicRepository`].

pub mod config;
pub mod frontmatter;
pub mod markdown;
pub mod models;
pub mod navigation;
pub mod reading_time;
pub mod repository;
pub mod slug;
pub mod toc;

pub use config::Config;
pub use frontmatter::{ContentParseError, FrontmatterError};
pub use markdown::{MarkdownProcessor, RenderedMarkdown};
pub use models::{
    Diagnostic, DiagnosticSeverity, Difficulty, ExamWeight, Frontmatter, RenderedTopic, Resource,
    Section, Topic, TopicKey,
};
pub use navigation::{adjacent, static_paths, Adjacent};
pub use reading_time::{ReadingTime, WORDS_PER_MINUTE};
pub use repository::{RepositoryError, TopicRepository, DEFAULT_RELATED_LIMIT};
pub use slug::slugify;
pub use toc::{render_toc_html, TocEntry};
