//! Rendering the digest document and writing it into the vault.

use crate::config::Config;
use crate::models::{Classification, Diagnostic};
use crate::scanner::{ScanError, Scanner};
use crate::store::{DocumentStore, MtimePolicy, StoreError};
use crate::template::{SectionTag, Segment, Template, TemplateError};
use chrono::Utc;
use thiserror::Error;

/// Terminator of every generated digest line
pub const LINE_END: &str = "\r\n";

#[derive(Error, Debug)]
pub enum DigestError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Failed to write digest: {0}")]
    Write(#[from] StoreError),
}

/// Result of a full synchronize cycle.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub classification: Classification,
    pub digest_path: String,
    pub digest: String,
}

/// Render `template` with the collections of `classification`.
///
/// Fails only when the template lacks a section listed in
/// `config.required_sections`.
pub fn render(
    template: &Template,
    classification: &Classification,
    config: &Config,
) -> Result<String, TemplateError> {
    template.require(&config.required_sections)?;

    let mut out = String::new();
    for segment in template.segments() {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Section(tag) => out.push_str(&render_section(tag, classification, config)),
        }
    }
    Ok(out)
}

fn render_section(tag: SectionTag, classification: &Classification, config: &Config) -> String {
    let mut block = String::new();

    match tag {
        SectionTag::Detected => {
            for doc in &classification.detected {
                block.push_str(&config.date_format.prefix(doc.modified));
                block.push_str(&format!("[[{}]]{LINE_END}", doc.bare_name()));
            }
        }
        SectionTag::Marked => {
            for doc in &classification.marked {
                block.push_str(&format!("[[{}]]{LINE_END}", doc.bare_name()));
            }
        }
        SectionTag::Pointed => {
            for link in &classification.pointed {
                if config.pointed_dates {
                    block.push_str(&config.date_format.prefix(link.target.modified));
                }
                block.push_str(&link.raw_link);
                block.push_str(LINE_END);
            }
        }
        SectionTag::Other(c) => {
            tracing::warn!("Unexpected tag found in template: %{}News%, rendered empty", c);
        }
    }

    block
}

/// Refresh, render and write the digest.
pub fn synchronize(store: &dyn DocumentStore, config: &Config) -> Result<SyncOutcome, DigestError> {
    let outcome = prepare(store, config)?;

    tracing::info!("Writing digest to {}", outcome.digest_path);
    store.write_content(&outcome.digest_path, &outcome.digest, MtimePolicy::Touch)?;

    Ok(outcome)
}

/// Refresh and render without writing anything.
pub fn prepare(store: &dyn DocumentStore, config: &Config) -> Result<SyncOutcome, DigestError> {
    let scanner = Scanner::new(config)?;
    let mut classification = scanner.refresh_at(store, Utc::now())?;
    let template = Template::load(config.template_path().as_deref())?;
    let digest = render(&template, &classification, config)?;

    for tag in template.tags() {
        if let SectionTag::Other(c) = tag {
            classification.diagnostics.push(
                Diagnostic::warning("template.unknown_tag", None, "Section rendered empty")
                    .with_context(format!("%{c}News%")),
            );
        }
    }

    Ok(SyncOutcome {
        classification,
        digest_path: config.digest_file_name(),
        digest,
    })
}
