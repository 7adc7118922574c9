//! CLI command implementations.

pub mod cleanup;
pub mod init;
pub mod scan;
pub mod sync;
pub mod watch;

pub use cleanup::cleanup_vault;
pub use init::init_project;
pub use scan::scan_vault;
pub use sync::sync_digest;
pub use watch::watch_vault;

use anyhow::{Context, Result};
use std::path::Path;
use vaultnews_core::{Config, Diagnostic, FsStore};

/// Load the configuration and open the vault it points at
pub(crate) fn open_vault(config_path: &Path) -> Result<(Config, FsStore)> {
    let config = Config::from_file(config_path).context("Failed to load configuration")?;
    let store = FsStore::new(config.vault_dir());
    Ok((config, store))
}

/// Verify-style listing: one line per diagnostic, plus its context
pub(crate) fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        let path = diag
            .path
            .as_deref()
            .map(|p| format!(" ({})", p))
            .unwrap_or_default();
        println!("- {:?} {}{}: {}", diag.severity, diag.code, path, diag.message);
        if let Some(ctx) = &diag.context {
            println!("  context: {}", ctx);
        }
    }
}
