//! Sync command implementation.

use super::{open_vault, print_diagnostics};
use anyhow::{Context, Result};
use std::path::Path;
use vaultnews_core::{prepare, synchronize};

/// Refresh the vault and write (or print) the digest.
pub fn sync_digest(config_path: &Path, dry_run: bool) -> Result<()> {
    let (config, store) = open_vault(config_path)?;

    if dry_run {
        let outcome = prepare(&store, &config).context("Failed to render digest")?;
        print!("{}", outcome.digest);
        return Ok(());
    }

    let outcome = synchronize(&store, &config).context("Failed to synchronize digest")?;
    let classification = &outcome.classification;
    println!(
        "✓ Wrote {} ({} detected, {} marked, {} pointed)",
        outcome.digest_path,
        classification.detected.len(),
        classification.marked.len(),
        classification.pointed.len()
    );
    print_diagnostics(&classification.diagnostics);

    Ok(())
}
