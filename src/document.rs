//! Markdown documents: a `---` delimited YAML header followed by the body.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::DocumentError;
use crate::value::{RawFrontmatter, Value};

lazy_static! {
    // Header and closing fence. The opening fence is checked before matching.
    static ref FRONTMATTER_RE: Regex =
        Regex::new(r"(?sm)\A---[ \t]*\r?\n(.*?)(?:\r?\n)?^---[ \t]*(?:\r?\n|\z)").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub frontmatter: RawFrontmatter,
    pub body: String,
}

impl Document {
    /// Splits a document into its frontmatter and body. A document without a header
    /// has an empty frontmatter.
    pub fn parse(text: &str) -> Result<Document, DocumentError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let first_line = text.lines().next().unwrap_or("");
        if first_line.trim_end() != "---" {
            return Ok(Document {
                frontmatter: RawFrontmatter::new(),
                body: text.to_string(),
            });
        }

        let captures = FRONTMATTER_RE.captures(text).ok_or(DocumentError::Unterminated)?;
        let header = captures.get(1).map_or("", |m| m.as_str());
        let body_start = captures.get(0).map_or(text.len(), |m| m.end());

        Ok(Document {
            frontmatter: parse_header(header)?,
            body: text[body_start..].to_string(),
        })
    }
}

fn parse_header(header: &str) -> Result<RawFrontmatter, DocumentError> {
    if header.trim().is_empty() {
        return Ok(RawFrontmatter::new());
    }

    let yaml: serde_yaml::Value = serde_yaml::from_str(header)?;
    match Value::from(yaml) {
        Value::Mapping(fields) => Ok(fields),
        // Only comments
        Value::Null => Ok(RawFrontmatter::new()),
        other => Err(DocumentError::NotAMapping(other.kind())),
    }
}
