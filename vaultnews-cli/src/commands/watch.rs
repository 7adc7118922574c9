//! Keep the digest in sync while the vault changes.

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use vaultnews_core::{synchronize, Config, FsStore};

const SETTLE_DELAY: Duration = Duration::from_millis(500);

pub async fn watch_vault(config_path: &Path) -> Result<()> {
    let config = Config::from_file(config_path).context("Failed to load configuration")?;
    let vault_dir = config.vault_dir();
    let digest_path = vault_dir.join(config.digest_file_name());

    run_sync(&config).await;
    println!("Watching {:?} for changes (Ctrl+C to stop)...", vault_dir);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut _watcher = RecommendedWatcher::new(
        move |res| {
            let _ = tx.send(res);
        },
        notify::Config::default(),
    )
    .context("Failed to initialize watcher")?;

    _watcher
        .watch(&vault_dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {:?}", vault_dir))?;

    while let Some(event) = rx.recv().await {
        match event {
            Ok(ev) if touches_vault(&ev, &vault_dir, &digest_path) => {
                // Let a burst of saves settle, then drain it
                tokio::time::sleep(SETTLE_DELAY).await;
                while rx.try_recv().is_ok() {}

                tracing::info!("Change detected in {:?}, synchronizing digest", ev.paths);
                run_sync(&config).await;
            }
            Ok(ev) => tracing::debug!("Ignoring event on {:?}", ev.paths),
            Err(err) => tracing::warn!("Watcher error: {}", err),
        }
    }

    Ok(())
}

async fn run_sync(config: &Config) {
    let config = config.clone();
    let res = tokio::task::spawn_blocking(move || {
        let store = FsStore::new(config.vault_dir());
        synchronize(&store, &config).map(|outcome| outcome.digest_path)
    })
    .await;

    match res {
        Ok(Ok(path)) => tracing::info!("Digest {} updated", path),
        Ok(Err(e)) => tracing::error!("Synchronization failed: {:?}", e),
        Err(e) => tracing::error!("Synchronization task panicked: {}", e),
    }
}

fn touches_vault(event: &Event, vault_dir: &Path, digest_path: &Path) -> bool {
    event
        .paths
        .iter()
        .any(|path| is_relevant(path, vault_dir, digest_path))
}

/// Markdown outside hidden directories, other than the digest itself
fn is_relevant(path: &Path, vault_dir: &Path, digest_path: &Path) -> bool {
    if path == digest_path {
        return false;
    }
    if path.extension().map(|ext| ext != "md").unwrap_or(true) {
        return false;
    }
    let rel: PathBuf = path.strip_prefix(vault_dir).unwrap_or(path).to_path_buf();
    !rel.components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevant_paths() {
        let vault = Path::new("/v");
        let digest = Path::new("/v/News.md");

        assert!(is_relevant(Path::new("/v/notes/Idea.md"), vault, digest));
        assert!(!is_relevant(digest, vault, digest));
        assert!(!is_relevant(Path::new("/v/.obsidian/workspace.md"), vault, digest));
        assert!(!is_relevant(Path::new("/v/image.png"), vault, digest));
        assert!(!is_relevant(Path::new("/v/notes/Idea.md.swp"), vault, digest));
    }
}
