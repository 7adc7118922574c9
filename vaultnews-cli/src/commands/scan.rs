//! Show the current classification of the vault.

use super::{open_vault, print_diagnostics};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use vaultnews_core::{refresh, Diagnostic, Document, PointedLink};

#[derive(Serialize)]
struct ScanSummary<'a> {
    documents: usize,
    scanned_at: String,
    detected: &'a [Document],
    marked: &'a [Document],
    pointed: &'a [PointedLink],
    pointer: &'a [Document],
    diagnostics: &'a [Diagnostic],
}

pub fn scan_vault(config_path: &Path, json: bool) -> Result<()> {
    let (config, store) = open_vault(config_path)?;
    let classification = refresh(&store, &config).context("Failed to scan vault")?;

    let summary = ScanSummary {
        documents: classification.corpus.len(),
        scanned_at: classification.scanned_at.to_rfc3339(),
        detected: &classification.detected,
        marked: &classification.marked,
        pointed: &classification.pointed,
        pointer: &classification.pointer,
        diagnostics: &classification.diagnostics,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "Scanned {} documents: {} detected, {} marked, {} pointed",
        summary.documents,
        summary.detected.len(),
        summary.marked.len(),
        summary.pointed.len()
    );

    println!("\nRecently modified:");
    for doc in summary.detected {
        println!("  {}  {}", doc.modified.format("%Y-%m-%d %H:%M"), doc.path);
    }
    println!("\nMarked as new:");
    for doc in summary.marked {
        println!("  {}", doc.path);
    }
    println!("\nPointed as new:");
    for link in summary.pointed {
        println!("  {}  (from {})", link.raw_link, link.source.path);
    }

    if !summary.diagnostics.is_empty() {
        println!("\nDiagnostics:");
        print_diagnostics(summary.diagnostics);
    }

    Ok(())
}
