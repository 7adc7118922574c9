//! Retiring stale news markers.
//!
//! A cleanup run renames stale marked documents, rewrites every link to the
//! renamed documents across the vault, then strips stale markers from the
//! links in pointer documents. Rewritten documents keep their modification
//! time so that cleanup does not make them look like news.

use crate::config::Config;
use crate::edit::{apply_edits, Edit};
use crate::links::{wikilinks, MarkedLink};
use crate::models::{bare_name, Classification, CleanupReport, Diagnostic, Rename};
use crate::scanner::{ScanError, Scanner};
use crate::store::{DocumentStore, MtimePolicy, StoreError};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::ops::Range;

/// Upper bound on rewrites of one rename pair inside one document
pub const MAX_REWRITES_PER_PAIR: usize = 1000;

/// Result of rewriting the links of one rename pair in one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub content: String,
    pub rewrites: usize,
    /// The bound was hit and later links were left alone
    pub truncated: bool,
}

/// True when the folder written before a link's name can refer to `from_path`.
///
/// `[[Name]]` matches any folder, `[[b/Name]]` matches `a/b/Name.md` but not
/// `c/Name.md`.
fn prefix_matches(prefix: &str, from_path: &str) -> bool {
    let prefix = prefix.trim().replace('\\', "/");
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        return true;
    }
    let dir = from_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    dir == prefix || dir.ends_with(&format!("/{prefix}"))
}

/// Point every link to `rename.old_name` at `rename.new_name`, keeping path
/// prefix and alias. Links whose folder prefix names another document are
/// left alone.
pub fn rewrite_links(content: &str, rename: &Rename, limit: usize) -> Rewrite {
    let mut edits = Vec::new();
    let mut truncated = false;

    for link in wikilinks(content) {
        if &content[link.name.clone()] != rename.old_name.as_str() {
            continue;
        }
        if !prefix_matches(&content[link.span.start + 2..link.name.start], &rename.from_path) {
            continue;
        }
        if edits.len() >= limit {
            truncated = true;
            break;
        }
        edits.push(Edit::replace(link.name, &rename.new_name));
    }

    Rewrite {
        content: apply_edits(content, &edits),
        rewrites: edits.len(),
        truncated,
    }
}

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

fn blanks_forward(bytes: &[u8], mut pos: usize, upper: usize) -> usize {
    while pos < upper && is_blank(bytes[pos]) {
        pos += 1;
    }
    pos
}

fn blanks_back(bytes: &[u8], mut pos: usize, lower: usize) -> usize {
    while pos > lower && is_blank(bytes[pos - 1]) {
        pos -= 1;
    }
    pos
}

/// Byte range covering the marker of `link` and the blanks around it.
///
/// Repeated markers on the far side of the link (`[[X]] 🆕🆕`) are taken
/// along, unless the next one decorates a neighbouring link. The range never
/// reaches into the link itself nor below `floor`, the end of the previous
/// removal in the same text.
pub fn marker_removal(content: &str, link: &MarkedLink, floor: usize) -> Range<usize> {
    let bytes = content.as_bytes();
    let marker = &content[link.marker_span.clone()];

    if link.marker_follows_link() {
        let upper = content.len();
        let start = blanks_back(bytes, link.marker_span.start, link.link_span.end.max(floor));
        let mut end = blanks_forward(bytes, link.marker_span.end, upper);
        while content[end..].starts_with(marker) {
            let next = blanks_forward(bytes, end + marker.len(), upper);
            if content[next..].starts_with("[[") {
                break;
            }
            end = next;
        }
        start..end
    } else {
        let lower = floor;
        let mut start = blanks_back(bytes, link.marker_span.start, lower);
        while start >= lower + marker.len() && content[..start].ends_with(marker) {
            let prev = blanks_back(bytes, start - marker.len(), lower);
            if content[..prev].ends_with("]]") {
                break;
            }
            start = prev;
        }
        let end = blanks_forward(bytes, link.marker_span.end, link.link_span.start);
        start..end
    }
}

pub struct CleanupEngine<'a> {
    config: &'a Config,
    scanner: Scanner<'a>,
    marker_strip: Regex,
}

impl<'a> CleanupEngine<'a> {
    pub fn new(config: &'a Config) -> Result<Self, ScanError> {
        let scanner = Scanner::new(config)?;
        let marker = regex::escape(&config.marker);
        let marker_strip = Regex::new(&format!(r"[ \t]*{marker}[ \t]*"))?;
        Ok(Self {
            config,
            scanner,
            marker_strip,
        })
    }

    /// File name with the marker and its surrounding blanks removed
    pub fn strip_marker(&self, name: &str) -> String {
        self.marker_strip.replace_all(name, "").into_owned()
    }

    pub fn run(&self, store: &dyn DocumentStore) -> Result<CleanupReport, ScanError> {
        self.run_at(store, Utc::now())
    }

    /// Run a full cleanup as of `now`.
    ///
    /// Re-running is safe: documents that no longer carry a stale marker are
    /// not touched again.
    pub fn run_at(
        &self,
        store: &dyn DocumentStore,
        now: DateTime<Utc>,
    ) -> Result<CleanupReport, ScanError> {
        tracing::info!("Cleaning marked or pointed documents that are not new anymore");
        let mut report = CleanupReport::default();

        let classification = self.scanner.refresh_at(store, now)?;
        let renames = self.retire_marked(store, &classification, now, &mut report);
        tracing::info!("Removed the news marker from {} document names", renames.len());

        // Renamed pointer documents must be read at their new path
        let classification = if renames.is_empty() {
            classification
        } else {
            self.propagate_renames(store, &renames, &mut report)?;
            self.scanner.refresh_at(store, now)?
        };

        self.retire_pointers(store, &classification, now, &mut report);

        report.renames = renames;
        tracing::info!(
            "Cleanup finished: {} renamed, {} links rewritten, {} markers cleared",
            report.renamed_files,
            report.rewritten_links,
            report.cleared_markers
        );
        Ok(report)
    }

    fn retire_marked(
        &self,
        store: &dyn DocumentStore,
        classification: &Classification,
        now: DateTime<Utc>,
        report: &mut CleanupReport,
    ) -> Vec<Rename> {
        let mut renames = Vec::new();

        for doc in &classification.marked {
            if doc.age(now) <= self.config.retirement_window() {
                continue;
            }

            let new_name = self.strip_marker(&doc.name);
            if new_name == doc.name {
                tracing::debug!("{} carries the marker in its content only", doc.path);
                continue;
            }
            if bare_name(&new_name).trim().is_empty() || new_name.starts_with('.') {
                tracing::warn!("Not renaming {}: nothing left without the marker", doc.path);
                report.diagnostics.push(
                    Diagnostic::warning(
                        "rename.empty",
                        Some(doc.path.as_str()),
                        "Name is empty without the marker",
                    )
                    .with_context(new_name),
                );
                continue;
            }

            let new_path = format!("{}{}", doc.dir_prefix(), new_name);
            match store.rename(&doc.path, &new_path) {
                Ok(()) => {
                    tracing::info!("Renamed {} to {}", doc.path, new_path);
                    report.renamed_files += 1;
                    renames.push(Rename {
                        from_path: doc.path.clone(),
                        to_path: new_path,
                        old_name: doc.bare_name().to_string(),
                        new_name: bare_name(&new_name).to_string(),
                    });
                }
                Err(StoreError::AlreadyExists(existing)) => {
                    tracing::warn!("Not renaming {}: {} already exists", doc.path, existing);
                    report.diagnostics.push(
                        Diagnostic::warning("rename.exists", Some(doc.path.as_str()), "Target name is taken")
                            .with_context(existing),
                    );
                }
                Err(err) => {
                    tracing::warn!("Failed to rename {} to {}: {}", doc.path, new_path, err);
                    report.diagnostics.push(
                        Diagnostic::warning("io.rename", Some(doc.path.as_str()), err.to_string())
                            .with_context(new_path),
                    );
                }
            }
        }

        renames
    }

    fn propagate_renames(
        &self,
        store: &dyn DocumentStore,
        renames: &[Rename],
        report: &mut CleanupReport,
    ) -> Result<(), ScanError> {
        for entry in store.list_documents()? {
            let doc = match entry {
                Ok(doc) => doc,
                Err(err) => {
                    tracing::warn!("Skipping link rewrite, stat failed: {}", err);
                    report.diagnostics.push(
                        Diagnostic::warning("io.stat", None, err.to_string()).with_context("rewrite"),
                    );
                    continue;
                }
            };

            let original = match store.read_content(&doc.path) {
                Ok(content) => content,
                Err(err) => {
                    tracing::warn!("Skipping link rewrite in {}: {}", doc.path, err);
                    report.diagnostics.push(
                        Diagnostic::warning("io.read", Some(doc.path.as_str()), err.to_string())
                            .with_context("rewrite"),
                    );
                    continue;
                }
            };
            if !original.contains("[[") {
                continue;
            }

            let mut content = original;
            let mut rewrites = 0;
            for rename in renames {
                let outcome = rewrite_links(&content, rename, MAX_REWRITES_PER_PAIR);
                if outcome.truncated {
                    tracing::warn!(
                        "More than {} links to '{}' in {}, stopped rewriting them",
                        MAX_REWRITES_PER_PAIR,
                        rename.old_name,
                        doc.path
                    );
                    report.diagnostics.push(
                        Diagnostic::warning(
                            "rewrite.runaway",
                            Some(doc.path.as_str()),
                            format!("Rewrite bound of {MAX_REWRITES_PER_PAIR} reached"),
                        )
                        .with_context(format!("{} -> {}", rename.old_name, rename.new_name)),
                    );
                }
                if outcome.rewrites > 0 {
                    rewrites += outcome.rewrites;
                    content = outcome.content;
                }
            }

            if rewrites == 0 {
                continue;
            }
            match store.write_content(&doc.path, &content, MtimePolicy::Preserve(doc.modified)) {
                Ok(()) => {
                    tracing::debug!("Rewrote {} links in {}", rewrites, doc.path);
                    report.rewritten_links += rewrites;
                }
                Err(err) => {
                    tracing::warn!("Failed to write rewritten links to {}: {}", doc.path, err);
                    report.diagnostics.push(
                        Diagnostic::warning("io.write", Some(doc.path.as_str()), err.to_string())
                            .with_context("rewrite"),
                    );
                }
            }
        }

        Ok(())
    }

    fn retire_pointers(
        &self,
        store: &dyn DocumentStore,
        classification: &Classification,
        now: DateTime<Utc>,
        report: &mut CleanupReport,
    ) {
        let index = classification.name_index();
        let mut cleared_docs = 0;

        for doc in &classification.pointer {
            let content = match store.read_content(&doc.path) {
                Ok(content) => content,
                Err(err) => {
                    tracing::warn!("Skipping pointer document {}: {}", doc.path, err);
                    report.diagnostics.push(
                        Diagnostic::warning("io.read", Some(doc.path.as_str()), err.to_string())
                            .with_context("clear markers"),
                    );
                    continue;
                }
            };

            let mut edits = Vec::new();
            let mut floor = 0;
            for link in self.scanner.extractor().extract(&content) {
                let Some(&idx) = index.get(link.target.as_str()) else {
                    tracing::warn!(
                        "Couldn't find linked document '{}' from {}, link left as is",
                        link.target,
                        doc.path
                    );
                    report.diagnostics.push(
                        Diagnostic::warning(
                            "link.unresolved",
                            Some(doc.path.as_str()),
                            format!("No document named '{}'", link.target),
                        )
                        .with_context(link.raw.clone()),
                    );
                    continue;
                };

                if classification.corpus[idx].age(now) <= self.config.retirement_window() {
                    continue;
                }
                let range = marker_removal(&content, &link, floor);
                if range.start < floor {
                    continue;
                }
                floor = range.end;
                edits.push(Edit::remove(range));
            }

            if edits.is_empty() {
                continue;
            }
            let updated = apply_edits(&content, &edits);
            match store.write_content(&doc.path, &updated, MtimePolicy::Preserve(doc.modified)) {
                Ok(()) => {
                    report.cleared_markers += edits.len();
                    cleared_docs += 1;
                }
                Err(err) => {
                    tracing::warn!("Failed to write {}: {}", doc.path, err);
                    report.diagnostics.push(
                        Diagnostic::warning("io.write", Some(doc.path.as_str()), err.to_string())
                            .with_context("clear markers"),
                    );
                }
            }
        }

        tracing::info!(
            "Cleared {} stale link markers in {} documents",
            report.cleared_markers,
            cleared_docs
        );
    }
}

/// Retire stale markers in `store` under `config`.
pub fn cleanup(store: &dyn DocumentStore, config: &Config) -> Result<CleanupReport, ScanError> {
    CleanupEngine::new(config)?.run(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::extract_marked_links;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        now() - Duration::days(days)
    }

    fn remove_all(content: &str) -> String {
        let links = extract_marked_links(content, "🆕").unwrap();
        let mut floor = 0;
        let mut edits = Vec::new();
        for link in &links {
            let range = marker_removal(content, link, floor);
            if range.start < floor {
                continue;
            }
            floor = range.end;
            edits.push(Edit::remove(range));
        }
        apply_edits(content, &edits)
    }

    #[test]
    fn test_three_removals_position_for_position() {
        let content = "Intro [[A]] 🆕 mid 🆕 [[B|bee]] tail [[C]]\t🆕\nend";
        assert_eq!(remove_all(content), "Intro [[A]]mid[[B|bee]] tail [[C]]\nend");
    }

    #[test]
    fn test_removal_keeps_marker_inside_link() {
        assert_eq!(remove_all("x [[Note 🆕]] 🆕 y"), "x [[Note 🆕]]y");
        assert_eq!(remove_all("🆕[[A]]🆕[[B]]"), "[[A]][[B]]");
    }

    #[test]
    fn test_repeated_markers_removed_together() {
        assert_eq!(remove_all("[[Stale]] 🆕🆕 end"), "[[Stale]]end");
        assert_eq!(remove_all("[[Stale]] 🆕 🆕\t🆕\nend"), "[[Stale]]\nend");
        assert_eq!(remove_all("x 🆕🆕 [[Stale]]"), "x[[Stale]]");
    }

    #[test]
    fn test_repeated_markers_stop_at_neighbour_link() {
        assert_eq!(remove_all("[[A]]🆕🆕[[B]]"), "[[A]][[B]]");
        assert_eq!(remove_all("[[A]] 🆕 🆕 [[B]] tail"), "[[A]][[B]] tail");
    }

    fn rename(from_path: &str, to_path: &str) -> Rename {
        Rename {
            from_path: from_path.into(),
            to_path: to_path.into(),
            old_name: bare_name(from_path.rsplit('/').next().unwrap_or(from_path)).into(),
            new_name: bare_name(to_path.rsplit('/').next().unwrap_or(to_path)).into(),
        }
    }

    #[test]
    fn test_rewrite_preserves_alias_and_path() {
        let content = "See [[OldName|display text]], [[dir/OldName]] and [[OldNameX]].";
        let pair = rename("dir/OldName.md", "dir/NewName.md");
        let outcome = rewrite_links(content, &pair, MAX_REWRITES_PER_PAIR);

        assert_eq!(
            outcome.content,
            "See [[NewName|display text]], [[dir/NewName]] and [[OldNameX]]."
        );
        assert_eq!(outcome.rewrites, 2);
        assert!(!outcome.truncated);
    }

    #[test]
    fn test_rewrite_skips_links_into_other_folders() {
        let content = "[[archive/Plan 🆕]] and [[ideas/Plan 🆕|plan]] and [[Plan 🆕]]";
        let pair = rename("notes/ideas/Plan 🆕.md", "notes/ideas/Plan.md");
        let outcome = rewrite_links(content, &pair, MAX_REWRITES_PER_PAIR);

        assert_eq!(
            outcome.content,
            "[[archive/Plan 🆕]] and [[ideas/Plan|plan]] and [[Plan]]"
        );
        assert_eq!(outcome.rewrites, 2);
    }

    #[test]
    fn test_prefix_matches() {
        assert!(prefix_matches("", "a/b/N.md"));
        assert!(prefix_matches("b/", "a/b/N.md"));
        assert!(prefix_matches("a/b/", "a/b/N.md"));
        assert!(prefix_matches("a\\b\\", "a/b/N.md"));
        assert!(!prefix_matches("ab/", "a/xab/N.md"));
        assert!(!prefix_matches("c/", "a/b/N.md"));
        assert!(!prefix_matches("b/", "N.md"));
    }

    #[test]
    fn test_rewrite_bound() {
        let content = "[[A]]".repeat(5);
        let outcome = rewrite_links(&content, &rename("A.md", "B.md"), 3);

        assert_eq!(outcome.content, "[[B]][[B]][[B]][[A]][[A]]");
        assert_eq!(outcome.rewrites, 3);
        assert!(outcome.truncated);
    }

    #[test]
    fn test_strip_marker() {
        let config = Config::default();
        let engine = CleanupEngine::new(&config).unwrap();

        assert_eq!(engine.strip_marker("Idea 🆕.md"), "Idea.md");
        assert_eq!(engine.strip_marker("🆕 Idea.md"), "Idea.md");
        assert_eq!(engine.strip_marker("Idea.md"), "Idea.md");
    }

    fn corpus() -> MemoryStore {
        MemoryStore::new()
            .with("notes/Old 🆕.md", "old body", days_ago(60))
            .with("Recent 🆕.md", "recent body", days_ago(3))
            .with("Hub.md", "[[Old 🆕]] and [[Fresh]] 🆕 and [[Stale]] 🆕", days_ago(1))
            .with("Other.md", "see [[notes/Old 🆕|the old one]]", days_ago(45))
            .with("Fresh.md", "", days_ago(2))
            .with("Stale.md", "", days_ago(90))
    }

    #[test]
    fn test_cleanup_end_to_end() {
        let store = corpus();
        let config = Config::default();
        let engine = CleanupEngine::new(&config).unwrap();

        let report = engine.run_at(&store, now()).unwrap();

        assert_eq!(report.renamed_files, 1);
        assert_eq!(report.rewritten_links, 2);
        assert_eq!(report.cleared_markers, 1);
        assert_eq!(
            report.renames,
            vec![Rename {
                from_path: "notes/Old 🆕.md".into(),
                to_path: "notes/Old.md".into(),
                old_name: "Old 🆕".into(),
                new_name: "Old".into(),
            }]
        );

        assert!(store.exists("notes/Old.md"));
        assert!(store.exists("Recent 🆕.md"));
        assert_eq!(
            store.content("Hub.md").as_deref(),
            Some("[[Old]] and [[Fresh]] 🆕 and [[Stale]]")
        );
        assert_eq!(
            store.content("Other.md").as_deref(),
            Some("see [[notes/Old|the old one]]")
        );

        // rewritten documents keep their timestamps
        assert_eq!(store.modified("Hub.md"), Some(days_ago(1)));
        assert_eq!(store.modified("Other.md"), Some(days_ago(45)));
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let store = corpus();
        let config = Config::default();
        let engine = CleanupEngine::new(&config).unwrap();

        let first = engine.run_at(&store, now()).unwrap();
        assert!(!first.is_noop());

        let snapshot: Vec<(String, Option<String>)> =
            store.paths().into_iter().map(|p| (p.clone(), store.content(&p))).collect();

        let second = engine.run_at(&store, now()).unwrap();
        assert!(second.is_noop());
        assert_eq!(second.renamed_files, 0);
        assert_eq!(second.rewritten_links, 0);

        let after: Vec<(String, Option<String>)> =
            store.paths().into_iter().map(|p| (p.clone(), store.content(&p))).collect();
        assert_eq!(snapshot, after);
    }

    #[test]
    fn test_rename_conflict_is_reported() {
        let store = MemoryStore::new()
            .with("Dup 🆕.md", "", days_ago(60))
            .with("Dup.md", "", days_ago(60));
        let config = Config::default();

        let report = CleanupEngine::new(&config).unwrap().run_at(&store, now()).unwrap();

        assert_eq!(report.renamed_files, 0);
        assert!(store.exists("Dup 🆕.md"));
        assert!(report.diagnostics.iter().any(|d| d.code == "rename.exists"));
    }

    #[test]
    fn test_content_marked_documents_are_not_renamed() {
        let store = MemoryStore::new().with("Body.md", "talks about 🆕 things", days_ago(60));
        let mut config = Config::default();
        config.marked_detection = crate::config::MarkedDetection::Content;

        let report = CleanupEngine::new(&config).unwrap().run_at(&store, now()).unwrap();

        assert!(report.is_noop());
        assert_eq!(store.content("Body.md").as_deref(), Some("talks about 🆕 things"));
    }

    #[test]
    fn test_unreadable_pointer_skipped() {
        let store = MemoryStore::new()
            .with("A.md", "[[Stale]] 🆕", days_ago(1))
            .with("B.md", "[[Stale]] 🆕", days_ago(1))
            .with("Stale.md", "", days_ago(90));
        let config = Config::default();
        let engine = CleanupEngine::new(&config).unwrap();
        let classification = engine.scanner.refresh_at(&store, now()).unwrap();
        store.fail_reads("A.md");

        let mut report = CleanupReport::default();
        engine.retire_pointers(&store, &classification, now(), &mut report);

        assert_eq!(report.cleared_markers, 1);
        assert_eq!(store.content("B.md").as_deref(), Some("[[Stale]]"));
        assert!(report.diagnostics.iter().any(|d| d.code == "io.read"));
    }

    fn codes(report: &CleanupReport) -> Vec<(&str, Option<&str>)> {
        report
            .diagnostics
            .iter()
            .map(|d| (d.code.as_str(), d.path.as_deref()))
            .collect()
    }

    #[test]
    fn test_rename_leaves_same_name_in_other_folder() {
        let store = MemoryStore::new()
            .with("ideas/Plan 🆕.md", "", days_ago(60))
            .with("archive/Plan 🆕.md", "", days_ago(3))
            .with("Hub.md", "[[archive/Plan 🆕]] and [[ideas/Plan 🆕]]", days_ago(1));
        let config = Config::default();

        let report = CleanupEngine::new(&config).unwrap().run_at(&store, now()).unwrap();

        assert_eq!(report.renamed_files, 1);
        assert_eq!(report.rewritten_links, 1);
        assert!(store.exists("archive/Plan 🆕.md"));
        assert!(store.exists("ideas/Plan.md"));
        assert_eq!(
            store.content("Hub.md").as_deref(),
            Some("[[archive/Plan 🆕]] and [[ideas/Plan]]")
        );
    }

    #[test]
    fn test_repeated_markers_cleared_in_one_run() {
        let store = MemoryStore::new()
            .with("Hub.md", "[[Stale]] 🆕🆕 end", days_ago(1))
            .with("Stale.md", "", days_ago(90));
        let config = Config::default();
        let engine = CleanupEngine::new(&config).unwrap();

        let first = engine.run_at(&store, now()).unwrap();
        assert_eq!(first.cleared_markers, 1);
        assert_eq!(store.content("Hub.md").as_deref(), Some("[[Stale]]end"));

        let second = engine.run_at(&store, now()).unwrap();
        assert!(second.is_noop());
        assert_eq!(store.content("Hub.md").as_deref(), Some("[[Stale]]end"));
    }

    #[test]
    fn test_vanished_document_rename_is_reported() {
        let store = MemoryStore::new()
            .with("Gone 🆕.md", "", days_ago(60))
            .with("Kept 🆕.md", "", days_ago(60));
        store.fail_renames("Gone 🆕.md");
        let config = Config::default();

        let report = CleanupEngine::new(&config).unwrap().run_at(&store, now()).unwrap();

        assert_eq!(report.renamed_files, 1);
        assert!(store.exists("Kept.md"));
        assert_eq!(codes(&report), vec![("io.rename", Some("Gone 🆕.md"))]);
    }

    #[test]
    fn test_failed_rewrite_write_is_reported() {
        let store = MemoryStore::new()
            .with("Old 🆕.md", "", days_ago(60))
            .with("A.md", "[[Old 🆕]]", days_ago(1))
            .with("B.md", "[[Old 🆕]]", days_ago(1));
        store.fail_writes("A.md");
        let config = Config::default();

        let report = CleanupEngine::new(&config).unwrap().run_at(&store, now()).unwrap();

        assert_eq!(report.renamed_files, 1);
        assert_eq!(report.rewritten_links, 1);
        assert_eq!(store.content("A.md").as_deref(), Some("[[Old 🆕]]"));
        assert_eq!(store.content("B.md").as_deref(), Some("[[Old]]"));
        assert_eq!(codes(&report), vec![("io.write", Some("A.md"))]);
    }

    #[test]
    fn test_failed_marker_write_is_reported() {
        let store = MemoryStore::new()
            .with("A.md", "[[Stale]] 🆕", days_ago(1))
            .with("B.md", "[[Stale]] 🆕", days_ago(1))
            .with("Stale.md", "", days_ago(90));
        store.fail_writes("A.md");
        let config = Config::default();

        let report = CleanupEngine::new(&config).unwrap().run_at(&store, now()).unwrap();

        assert_eq!(report.cleared_markers, 1);
        assert_eq!(store.content("A.md").as_deref(), Some("[[Stale]] 🆕"));
        assert_eq!(store.content("B.md").as_deref(), Some("[[Stale]]"));
        assert_eq!(codes(&report), vec![("io.write", Some("A.md"))]);
    }

    #[test]
    fn test_runaway_rewrites_stop_at_bound() {
        let many = "[[Old 🆕]] ".repeat(MAX_REWRITES_PER_PAIR + 1);
        let store = MemoryStore::new()
            .with("Old 🆕.md", "", days_ago(60))
            .with("Many.md", &many, days_ago(1))
            .with("Other.md", "[[Old 🆕]]", days_ago(1));
        let config = Config::default();

        let report = CleanupEngine::new(&config).unwrap().run_at(&store, now()).unwrap();

        assert_eq!(report.rewritten_links, MAX_REWRITES_PER_PAIR + 1);
        assert_eq!(codes(&report), vec![("rewrite.runaway", Some("Many.md"))]);

        let rewritten = store.content("Many.md").unwrap();
        assert_eq!(rewritten.matches("[[Old]]").count(), MAX_REWRITES_PER_PAIR);
        assert!(rewritten.ends_with("[[Old 🆕]] "));
        assert_eq!(store.content("Other.md").as_deref(), Some("[[Old]]"));
    }
}
