//! # apexguide CLI
//!
//! Command-line interface for the apexguide learning portal generator.

mod assets;
mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "apexguide")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "apexguide.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new apexguide project
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Build the static site
    Build {
        /// Exit with an error when any topic failed to build
        #[arg(long)]
        strict: bool,
    },

    /// Start development server with rebuild on change
    Dev {
        /// Server port (defaults to server.port from the config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Inspect a single topic
    Topic {
        /// Section directory name (e.g. "apex")
        section: String,

        /// Topic slug (file name without .md)
        slug: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = TopicFormat::Json)]
        format: TopicFormat,
    },

    /// Report broken content files and dangling references
    Check {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Copy, Clone, ValueEnum)]
pub enum TopicFormat {
    Json,
    Html,
    Toc,
    Frontmatter,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { path } => commands::init_project(path.as_deref()),
        Commands::Build { strict } => commands::build_site(&cli.config, strict),
        Commands::Dev { port } => commands::dev_server(&cli.config, port).await,
        Commands::Topic {
            section,
            slug,
            format,
        } => commands::show_topic(&cli.config, &section, &slug, format),
        Commands::Check { json } => commands::check_site(&cli.config, json),
    }
}
