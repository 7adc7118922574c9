//! # vaultnews-core
//!
//! Core library for the vaultnews digest generator.
//!
//! This crate classifies the documents of a markdown vault as recently
//! modified, explicitly marked, or pointed to by a marked link, renders a
//! "what's new" digest from a tagged template, and retires stale markers while
//! keeping every `[[wikilink]]` in the vault consistent.

pub mod cleanup;
pub mod config;
pub mod dates;
pub mod digest;
pub mod edit;
pub mod links;
pub mod models;
pub mod scanner;
pub mod store;
pub mod template;

pub use cleanup::{cleanup, CleanupEngine, MAX_REWRITES_PER_PAIR};
pub use config::{Config, ConfigError, MarkedDetection};
pub use dates::DateFormat;
pub use digest::{prepare, render, synchronize, DigestError, SyncOutcome};
pub use links::{extract_marked_links, target_name, LinkExtractor, MarkedLink};
pub use models::{
    Classification, CleanupReport, Diagnostic, DiagnosticSeverity, Document, PointedLink, Rename,
};
pub use scanner::{refresh, ScanError, Scanner};
pub use store::{DocumentStore, FsStore, MemoryStore, MtimePolicy, StoreError};
pub use template::{parse_template, SectionTag, Segment, Template, TemplateError};
