//! Classification of vault documents into the four news collections.

use crate::config::{Config, MarkedDetection};
use crate::links::LinkExtractor;
use crate::models::{Classification, Diagnostic, Document, PointedLink};
use crate::store::{DocumentStore, StoreError};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid marker pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("The news marker cannot be empty")]
    EmptyMarker,
}

/// Walks the vault once per refresh and classifies every document.
pub struct Scanner<'a> {
    config: &'a Config,
    extractor: LinkExtractor,
}

impl<'a> Scanner<'a> {
    pub fn new(config: &'a Config) -> Result<Self, ScanError> {
        if config.marker.is_empty() {
            return Err(ScanError::EmptyMarker);
        }
        Ok(Self {
            config,
            extractor: LinkExtractor::new(&config.marker)?,
        })
    }

    pub fn extractor(&self) -> &LinkExtractor {
        &self.extractor
    }

    /// Classify the vault as of now
    pub fn refresh(&self, store: &dyn DocumentStore) -> Result<Classification, ScanError> {
        self.refresh_at(store, Utc::now())
    }

    /// Classify the vault as of `now`.
    ///
    /// Only a failure to list the vault is fatal. A document that cannot be
    /// stat'ed or read is reported and left out of all four collections.
    pub fn refresh_at(
        &self,
        store: &dyn DocumentStore,
        now: DateTime<Utc>,
    ) -> Result<Classification, ScanError> {
        tracing::info!("Refreshing news classification");

        let mut corpus = Vec::new();
        let mut stat_failures = Vec::new();
        for entry in store.list_documents()? {
            match entry {
                Ok(doc) => corpus.push(doc),
                Err(err) => {
                    tracing::warn!("Skipping document that could not be stat'ed: {}", err);
                    stat_failures.push(
                        Diagnostic::warning("io.stat", None, err.to_string())
                            .with_context("refresh"),
                    );
                }
            }
        }

        let mut result = Classification::new(corpus, now);
        result.diagnostics = stat_failures;
        let index = result.name_index();

        let mut detected = Vec::new();
        let mut marked = Vec::new();
        let mut pointed = Vec::new();
        let mut pointer = Vec::new();
        let mut diagnostics = Vec::new();

        for doc in &result.corpus {
            if self.config.is_special_path(&doc.path) {
                tracing::debug!("Skipping special path {}", doc.path);
                continue;
            }

            let content = match store.read_content(&doc.path) {
                Ok(content) => content,
                Err(err) => {
                    tracing::warn!("Failed to read {}: {}", doc.path, err);
                    diagnostics.push(
                        Diagnostic::warning("io.read", Some(doc.path.as_str()), err.to_string())
                            .with_context("refresh"),
                    );
                    continue;
                }
            };

            if doc.age(now) < self.config.detection_window() {
                detected.push(doc.clone());
            }

            if self.is_marked(doc, &content) {
                marked.push(doc.clone());
            }

            if !content.contains(&self.config.marker) {
                continue;
            }

            let links = self.extractor.extract(&content);
            for link in &links {
                match index.get(link.target.as_str()) {
                    Some(&idx) => pointed.push(PointedLink {
                        target: result.corpus[idx].clone(),
                        raw_link: link.raw.clone(),
                        source: doc.clone(),
                    }),
                    None => {
                        tracing::warn!(
                            "Could not resolve news link {} in {}: no document named '{}'",
                            link.raw,
                            doc.path,
                            link.target
                        );
                        diagnostics.push(
                            Diagnostic::warning(
                                "link.unresolved",
                                Some(doc.path.as_str()),
                                format!("No document named '{}'", link.target),
                            )
                            .with_context(link.raw.clone()),
                        );
                    }
                }
            }
            if !links.is_empty() {
                pointer.push(doc.clone());
            }
        }

        // Newest first; sort_by is stable so ties keep scan order
        detected.sort_by(|a: &Document, b: &Document| b.modified.cmp(&a.modified));
        pointed.sort_by(|a: &PointedLink, b: &PointedLink| b.target.modified.cmp(&a.target.modified));

        drop(index);
        result.detected = detected;
        result.marked = marked;
        result.pointed = pointed;
        result.pointer = pointer;
        result.diagnostics.extend(diagnostics);

        tracing::info!(
            "Found news: {} detected, {} marked, {} pointed, {} pointer documents",
            result.detected.len(),
            result.marked.len(),
            result.pointed.len(),
            result.pointer.len()
        );

        Ok(result)
    }

    fn is_marked(&self, doc: &Document, content: &str) -> bool {
        let marker = self.config.marker.as_str();
        match self.config.marked_detection {
            MarkedDetection::Name => doc.name.contains(marker),
            MarkedDetection::Content => doc.name.contains(marker) || content.contains(marker),
        }
    }
}

/// Classify the documents of `store` under `config`.
pub fn refresh(store: &dyn DocumentStore, config: &Config) -> Result<Classification, ScanError> {
    Scanner::new(config)?.refresh(store)
}
