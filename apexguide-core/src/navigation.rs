//! Previous/next sequencing within a section and static path listing.

use crate::models::{Section, Topic};
use crate::repository::TopicRepository;
use std::sync::Arc;

/// Neighbours of a topic in its section's ordered list
#[derive(Debug, Clone, Default)]
pub struct Adjacent {
    pub previous: Option<Arc<Topic>>,
    pub next: Option<Arc<Topic>>,
}

/// Find the topics before and after `slug`, clamped at the section ends.
///
/// An unknown slug has no neighbours.
pub fn adjacent(repo: &TopicRepository, section: Section, slug: &str) -> Adjacent {
    let topics = repo.get_topics_by_section(section);
    let Some(index) = topics.iter().position(|t| t.slug == slug) else {
        return Adjacent::default();
    };

    Adjacent {
        previous: index.checked_sub(1).and_then(|i| topics.get(i)).cloned(),
        next: topics.get(index + 1).cloned(),
    }
}

/// URL path of every topic page, in curriculum order
pub fn static_paths(repo: &TopicRepository, base_url: &str) -> Vec<String> {
    repo.topics().map(|topic| topic.url(base_url)).collect()
}
