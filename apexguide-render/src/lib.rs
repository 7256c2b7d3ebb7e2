//! # apexguide-render
//!
//! HTML page rendering for apexguide using Askama templates.

pub mod pages;
pub mod templates;

pub use pages::{
    render_error_page, render_index_page, render_not_found_page, render_section_page,
    render_topic_page, render_topic_route, RenderError, SiteContext, TopicPage,
};
pub use templates::{PageChrome, SectionLink, TopicLink};
