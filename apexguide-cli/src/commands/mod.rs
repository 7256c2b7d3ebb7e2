//! CLI command implementations.

pub mod build;
pub mod check;
pub mod dev;
pub mod init;
pub mod topic;

pub use build::build_site;
pub use check::check_site;
pub use dev::dev_server;
pub use init::init_project;
pub use topic::show_topic;
