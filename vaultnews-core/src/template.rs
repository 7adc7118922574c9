//! Digest templates: literal text interleaved with `%XNews%` section tags.

use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Template used when no template file is configured
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/news.md");

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

fn tag_regex() -> &'static Regex {
    TAG_REGEX.get_or_init(|| Regex::new(r"%[ \t]*([^\s%])[ \t]*News[ \t]*%").unwrap())
}

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template has no %{0}News% section")]
    MissingSection(char),
}

/// Which collection a tag renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionTag {
    Detected,
    Marked,
    Pointed,
    /// Accepted by the parser, rendered as an empty section
    Other(char),
}

impl SectionTag {
    pub fn from_char(c: char) -> Self {
        match c {
            'D' => SectionTag::Detected,
            'M' => SectionTag::Marked,
            'P' => SectionTag::Pointed,
            other => SectionTag::Other(other),
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            SectionTag::Detected => 'D',
            SectionTag::Marked => 'M',
            SectionTag::Pointed => 'P',
            SectionTag::Other(c) => *c,
        }
    }
}

impl fmt::Display for SectionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}News%", self.as_char())
    }
}

/// One piece of a parsed template, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Section(SectionTag),
}

/// A parsed template.
///
/// Invariant: `fragments.len() == tags.len() + 1`; fragment `i` precedes tag
/// `i` and the last fragment trails the final tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    fragments: Vec<String>,
    tags: Vec<SectionTag>,
}

impl Template {
    /// Split `raw` at every tag, left to right. A tag used twice yields two
    /// sections.
    pub fn parse(raw: &str) -> Self {
        let mut fragments = Vec::new();
        let mut tags = Vec::new();
        let mut cursor = 0;

        for caps in tag_regex().captures_iter(raw) {
            let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(c) = tag.as_str().chars().next() else {
                continue;
            };
            fragments.push(raw[cursor..whole.start()].to_string());
            tags.push(SectionTag::from_char(c));
            cursor = whole.end();
        }
        fragments.push(raw[cursor..].to_string());

        let found: String = tags.iter().map(SectionTag::as_char).collect();
        tracing::debug!("Found tags [{}] in template", found);

        Self { fragments, tags }
    }

    /// Load a template file, or the built-in template when `path` is None
    pub fn load(path: Option<&Path>) -> Result<Self, TemplateError> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                tracing::info!("Template file read from {:?}", path);
                Ok(Self::parse(&raw))
            }
            None => Ok(Self::parse(DEFAULT_TEMPLATE)),
        }
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn tags(&self) -> &[SectionTag] {
        &self.tags
    }

    /// Alternating literal and section segments
    pub fn segments(&self) -> impl Iterator<Item = Segment<'_>> {
        let head = std::iter::once(Segment::Literal(self.fragments[0].as_str()));
        let rest = self
            .tags
            .iter()
            .zip(self.fragments[1..].iter())
            .flat_map(|(tag, text)| [Segment::Section(*tag), Segment::Literal(text.as_str())]);
        head.chain(rest)
    }

    pub fn contains(&self, tag: char) -> bool {
        self.tags.iter().any(|t| t.as_char() == tag)
    }

    /// Fail on the first required tag the template lacks
    pub fn require(&self, required: &[char]) -> Result<(), TemplateError> {
        match required.iter().find(|c| !self.contains(**c)) {
            Some(missing) => Err(TemplateError::MissingSection(*missing)),
            None => Ok(()),
        }
    }
}

/// Parse a template string.
pub fn parse_template(raw: &str) -> Template {
    Template::parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let template = parse_template("A%DNews%B%MNews%C");
        assert_eq!(template.fragments(), ["A", "B", "C"]);
        assert_eq!(template.tags(), [SectionTag::Detected, SectionTag::Marked]);
    }

    #[test]
    fn test_no_tags() {
        let template = parse_template("just text");
        assert_eq!(template.fragments(), ["just text"]);
        assert!(template.tags().is_empty());
    }

    #[test]
    fn test_repeated_tag_splits_each_occurrence() {
        let template = parse_template("x%PNews%y%PNews%z");
        assert_eq!(template.fragments(), ["x", "y", "z"]);
        assert_eq!(template.tags(), [SectionTag::Pointed, SectionTag::Pointed]);
    }

    #[test]
    fn test_unknown_and_spaced_tags() {
        let template = parse_template("% D News %|%QNews%|");
        assert_eq!(template.tags(), [SectionTag::Detected, SectionTag::Other('Q')]);
        assert_eq!(template.fragments(), ["", "|", "|"]);
    }

    #[test]
    fn test_adjacent_tags_and_percent_text() {
        let template = parse_template("100% sure %MNews%%DNews%");
        assert_eq!(template.fragments(), ["100% sure ", "", ""]);
        assert_eq!(template.tags(), [SectionTag::Marked, SectionTag::Detected]);
    }

    #[test]
    fn test_segments_alternate() {
        let template = parse_template("A%DNews%B");
        let segments: Vec<Segment> = template.segments().collect();
        assert_eq!(
            segments,
            vec![
                Segment::Literal("A"),
                Segment::Section(SectionTag::Detected),
                Segment::Literal("B"),
            ]
        );
    }

    #[test]
    fn test_require() {
        let template = parse_template("%DNews%");
        assert!(template.require(&['D']).is_ok());
        assert!(matches!(
            template.require(&['D', 'M']),
            Err(TemplateError::MissingSection('M'))
        ));
    }

    #[test]
    fn test_default_template_has_all_sections() {
        let template = Template::load(None).unwrap();
        assert!(template.require(&['D', 'M', 'P']).is_ok());
    }
}
