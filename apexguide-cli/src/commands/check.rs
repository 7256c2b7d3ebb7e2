//! Report content problems without writing any output.

use anyhow::{bail, Context, Result};
use apexguide_core::{
    Config, ContentParseError, Diagnostic, DiagnosticSeverity, TopicRepository,
};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct CheckSummary<'a> {
    topics: usize,
    errors: usize,
    warnings: usize,
    failures: &'a [ContentParseError],
    diagnostics: &'a [Diagnostic],
}

/// Load every topic and surface parse failures and authoring warnings.
///
/// Fails when any content file could not be parsed.
pub fn check_site(config_path: &Path, json: bool) -> Result<()> {
    let config = Config::from_file(config_path).context("Failed to load configuration")?;
    let repo = TopicRepository::load(config.content_dir()).context("Failed to load content")?;

    let diagnostics = repo.diagnostics();
    let failures = repo.failures();
    let errors = failures.len()
        + diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
            .count();
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == DiagnosticSeverity::Warning)
        .count();

    let summary = CheckSummary {
        topics: repo.len(),
        errors,
        warnings,
        failures,
        diagnostics,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Check complete: {} topics, {} errors, {} warnings",
            summary.topics, errors, warnings
        );
        for failure in failures {
            println!("- error content.parse {}", failure);
        }
        for diag in diagnostics {
            let source = diag
                .source_path
                .as_deref()
                .map(|s| format!(" ({})", s.display()))
                .unwrap_or_default();
            println!(
                "- {:?} {}{}: {}",
                diag.severity, diag.code, source, diag.message
            );
        }
    }

    if !failures.is_empty() {
        bail!("{} content file(s) failed to parse", failures.len());
    }
    Ok(())
}
