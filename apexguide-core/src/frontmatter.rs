//! Front-matter parsing for topic files.

use crate::models::Frontmatter;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DELIMITER: &str = "---";

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("file does not start with a `---` front-matter block")]
    Missing,

    #[error("front-matter block opened on line 1 is never closed")]
    Unterminated,

    #[error("invalid front-matter: {message}")]
    Yaml { line: usize, message: String },

    #[error("front-matter `title` is empty")]
    EmptyTitle { line: usize },
}

impl FrontmatterError {
    /// 1-based line in the source file the error points at
    pub fn line(&self) -> usize {
        match self {
            FrontmatterError::Missing | FrontmatterError::Unterminated => 1,
            FrontmatterError::Yaml { line, .. } | FrontmatterError::EmptyTitle { line } => *line,
        }
    }
}

/// A content file that could not be turned into a topic.
///
/// Isolated to its own page: the rest of the site still builds.
#[derive(Error, Debug, Clone, Serialize)]
#[error("{}{}: {message}", .path.display(), .line.map(|l| format!(":{l}")).unwrap_or_default())]
pub struct ContentParseError {
    pub path: PathBuf,
    pub line: Option<usize>,
    pub message: String,
}

impl ContentParseError {
    pub fn from_frontmatter(path: &Path, err: &FrontmatterError) -> Self {
        Self {
            path: path.to_path_buf(),
            line: Some(err.line()),
            message: err.to_string(),
        }
    }

    pub fn io(path: &Path, err: &std::io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            line: None,
            message: format!("cannot read file: {}", err),
        }
    }
}

/// Split the raw file text into the YAML block and the markdown body.
fn split_block(content: &str) -> Result<(&str, &str), FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');

    let opening = lines.next().ok_or(FrontmatterError::Missing)?;
    if opening.trim_end() != DELIMITER {
        return Err(FrontmatterError::Missing);
    }

    let block_start = opening.len();
    let mut offset = block_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let block = &content[block_start..offset];
            let body = &content[offset + line.len()..];
            return Ok((block, body));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unterminated)
}

/// Parse front-matter from a topic file
///
/// Returns a tuple of (frontmatter, markdown_body).
///
/// # Example
///
/// ```
/// use apexguide_core::frontmatter::parse_frontmatter;
/// use apexguide_core::Difficulty;
///
/// let content = "---\ntitle: Triggers\ndescription: Before and after\norder: 2\ndifficulty: beginner\n---\n## Hello\n";
///
/// let (fm, body) = parse_frontmatter(content).unwrap();
/// assert_eq!(fm.title, "Triggers");
/// assert_eq!(fm.difficulty, Difficulty::Beginner);
/// assert!(body.starts_with("## Hello"));
/// ```
pub fn parse_frontmatter(content: &str) -> Result<(Frontmatter, String), FrontmatterError> {
    let (block, body) = split_block(content)?;

    let frontmatter: Frontmatter =
        serde_yaml::from_str(block).map_err(|e| FrontmatterError::Yaml {
            // +1 for the opening delimiter line
            line: e.location().map(|loc| loc.line() + 1).unwrap_or(2),
            message: e.to_string(),
        })?;

    if frontmatter.title.trim().is_empty() {
        return Err(FrontmatterError::EmptyTitle {
            line: key_line(block, "title").unwrap_or(2),
        });
    }

    Ok((frontmatter, body.to_string()))
}

/// File line of a top-level key inside the YAML block.
fn key_line(block: &str, key: &str) -> Option<usize> {
    block
        .lines()
        .position(|line| {
            line.strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with(':'))
        })
        // +2: 1-based, after the opening delimiter line
        .map(|idx| idx + 2)
}

/// Serialize front-matter back into a delimited block
pub fn render_frontmatter(frontmatter: &Frontmatter) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(frontmatter)?;
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n"))
}
