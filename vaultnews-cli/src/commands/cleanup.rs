//! Cleanup command implementation.

use super::{open_vault, print_diagnostics};
use anyhow::{Context, Result};
use std::path::Path;
use vaultnews_core::cleanup;

/// Retire stale markers and report what changed.
pub fn cleanup_vault(config_path: &Path, json: bool) -> Result<()> {
    let (config, store) = open_vault(config_path)?;
    let report = cleanup(&store, &config).context("Failed to clean up vault")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.is_noop() {
        println!("Nothing to clean up");
    } else {
        println!(
            "✓ Cleanup complete: {} renamed, {} links rewritten, {} markers cleared",
            report.renamed_files, report.rewritten_links, report.cleared_markers
        );
    }
    for rename in &report.renames {
        println!("  {} -> {}", rename.from_path, rename.to_path);
    }
    print_diagnostics(&report.diagnostics);

    Ok(())
}
