//! Extraction of `[[wikilinks]]`, with and without the news marker.

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

const LINK_PATTERN: &str = r"\[\[[^\[\]\r\n]+\]\]";

static LINK_REGEX: OnceLock<Regex> = OnceLock::new();

fn link_regex() -> &'static Regex {
    LINK_REGEX.get_or_init(|| Regex::new(LINK_PATTERN).unwrap())
}

/// A `[[link]]` decorated with the marker, either `[[X]] 🆕` or `🆕 [[X]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedLink {
    /// The bracket link exactly as written
    pub raw: String,

    /// Bare document name the link targets
    pub target: String,

    /// Byte range of the whole match (link, marker and the blanks between)
    pub span: Range<usize>,

    /// Byte range of the bracket link
    pub link_span: Range<usize>,

    /// Byte range of the marker glyph
    pub marker_span: Range<usize>,
}

impl MarkedLink {
    /// True for `[[X]] 🆕`, false for `🆕 [[X]]`
    pub fn marker_follows_link(&self) -> bool {
        self.marker_span.start >= self.link_span.end
    }
}

/// Finds marker-decorated links for one marker glyph.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    marker: String,
    marked: Regex,
}

impl LinkExtractor {
    pub fn new(marker: &str) -> Result<Self, regex::Error> {
        let m = regex::escape(marker);
        let marked = Regex::new(&format!(
            r"{LINK_PATTERN}[ \t]*{m}|{m}[ \t]*{LINK_PATTERN}"
        ))?;
        Ok(Self {
            marker: marker.to_string(),
            marked,
        })
    }

    /// Marker-decorated links in order of appearance. Never mutates `content`.
    ///
    /// When a marker sits between two links, it binds to the preceding one.
    pub fn extract(&self, content: &str) -> Vec<MarkedLink> {
        let mut links = Vec::new();

        for found in self.marked.find_iter(content) {
            let Some(inner) = link_regex().find(found.as_str()) else {
                tracing::warn!(
                    "Malformed news link '{}' at byte {}, skipped",
                    found.as_str(),
                    found.start()
                );
                continue;
            };

            let link_span = found.start() + inner.start()..found.start() + inner.end();
            let marker_span = if link_span.start == found.start() {
                found.end() - self.marker.len()..found.end()
            } else {
                found.start()..found.start() + self.marker.len()
            };

            links.push(MarkedLink {
                raw: inner.as_str().to_string(),
                target: target_name(inner.as_str()),
                span: found.range(),
                link_span,
                marker_span,
            });
        }

        links
    }
}

/// Extract the marker-decorated links of `content`.
pub fn extract_marked_links(content: &str, marker: &str) -> Result<Vec<MarkedLink>, regex::Error> {
    Ok(LinkExtractor::new(marker)?.extract(content))
}

/// Bare document name a link refers to.
///
/// `[[folder/sub/Target|shown text]]` -> `Target`
pub fn target_name(raw_link: &str) -> String {
    let stripped: String = raw_link.chars().filter(|c| *c != '[' && *c != ']').collect();
    let target = stripped.split('|').next().unwrap_or_default();
    let segment = target.rsplit('/').next().unwrap_or_default();
    let segment = segment.rsplit('\\').next().unwrap_or_default();
    segment.trim().to_string()
}

/// A plain `[[link]]` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink {
    /// Byte range of the whole `[[...]]`
    pub span: Range<usize>,

    /// Byte range of the target name (last path segment, before any alias)
    pub name: Range<usize>,
}

/// Every `[[link]]` in `content`, in order of appearance.
pub fn wikilinks(content: &str) -> impl Iterator<Item = WikiLink> + '_ {
    link_regex().find_iter(content).map(|found| {
        let inner_start = found.start() + 2;
        let inner = &content[inner_start..found.end() - 2];

        let target_len = inner.find('|').unwrap_or(inner.len());
        let target = &inner[..target_len];
        let segment_start = target.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
        let segment = &target[segment_start..];

        let leading = segment.len() - segment.trim_start().len();
        let trimmed_len = segment.trim().len();
        let start = inner_start + segment_start + leading;

        WikiLink {
            span: found.range(),
            name: start..start + trimmed_len,
        }
    })
}
