//! Init command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use vaultnews_core::template::DEFAULT_TEMPLATE;

const DEFAULT_CONFIG: &str = include_str!("../../../vaultnews.yml.example");

/// Initialize a new vaultnews project
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;

    write_if_missing(&root.join("vaultnews.yml"), DEFAULT_CONFIG)?;
    write_if_missing(&root.join("NewsTemplate.md"), DEFAULT_TEMPLATE)?;
    scaffold_vault(root)?;

    println!("✓ vaultnews initialized in {:?}", root);
    println!("  - Edit vaultnews.yml to change the marker and the time windows");
    println!("  - Run `vaultnews sync` to write the digest");
    Ok(())
}

fn write_if_missing(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        println!("{:?} already exists", path);
        return Ok(());
    }

    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    println!("Created {:?}", path);
    Ok(())
}

fn scaffold_vault(root: &Path) -> Result<()> {
    let vault_root = root.join("vault");
    fs::create_dir_all(&vault_root).with_context(|| format!("Failed to create {:?}", vault_root))?;

    write_if_missing(&vault_root.join("Welcome 🆕.md"), sample_note())
}

fn sample_note() -> &'static str {
    r#"# Welcome

This vault keeps a digest of what is new in `News.md`. Run:

```bash
vaultnews sync
vaultnews cleanup
```

- Documents modified recently are listed automatically.
- Put 🆕 in a document name to mark it as new.
- Put 🆕 next to a link, like [[Welcome 🆕]] 🆕, to point at a document.

Markers are removed by `vaultnews cleanup` once they are old enough.
"#
}
