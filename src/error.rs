//! Error types for frontmatter validation and collection loading

use std::fmt;

use itertools::Itertools;
use thiserror::Error;

//----- Field paths

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a field within a frontmatter record, e.g. `updates[2].date`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> FieldPath {
        FieldPath(Vec::new())
    }

    pub fn key(name: &str) -> FieldPath {
        FieldPath::root().join(name)
    }

    pub fn join(&self, name: &str) -> FieldPath {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(name.to_string()));
        FieldPath(segments)
    }

    pub fn at(&self, index: usize) -> FieldPath {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        FieldPath(segments)
    }

    /// The first sequence index in the path, i.e. which `updates` entry is concerned.
    pub fn index(&self) -> Option<usize> {
        self.0.iter().find_map(|s| match s {
            PathSegment::Index(i) => Some(*i),
            PathSegment::Key(_) => None,
        })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(k) if pos == 0 => f.write_str(k)?,
                PathSegment::Key(k) => write!(f, ".{}", k)?,
                PathSegment::Index(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

//----- Validation

/// Why a frontmatter record doesn't match the collection schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0}: missing required field")]
    MissingField(FieldPath),

    #[error("{field}: expected {expected}, found {found}")]
    WrongType {
        field: FieldPath,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{field}: invalid date {value:?}")]
    InvalidDate { field: FieldPath, value: String },
}

impl ValidationError {
    pub fn field(&self) -> &FieldPath {
        match self {
            ValidationError::MissingField(field) => field,
            ValidationError::WrongType { field, .. } => field,
            ValidationError::InvalidDate { field, .. } => field,
        }
    }
}

/// All the issues of one record, in schema field order. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors {
    first: ValidationError,
    rest: Vec<ValidationError>,
}

impl ValidationErrors {
    pub(crate) fn new(errors: Vec<ValidationError>) -> Option<ValidationErrors> {
        let mut errors = errors.into_iter();
        errors.next().map(|first| ValidationErrors {
            first,
            rest: errors.collect(),
        })
    }

    pub fn first(&self) -> &ValidationError {
        &self.first
    }

    pub fn into_first(self) -> ValidationError {
        self.first
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }

    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iter().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::iter::Chain<std::iter::Once<ValidationError>, std::vec::IntoIter<ValidationError>>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(self.first).chain(self.rest)
    }
}

//----- Documents

/// A document whose header can't be turned into a raw frontmatter record.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("unterminated frontmatter block")]
    Unterminated,

    #[error("invalid frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("frontmatter must be a mapping, found {0}")]
    NotAMapping(&'static str),
}

/// Why a document was left out of its collection.
#[derive(Error, Debug)]
pub enum EntryError {
    #[error("cannot read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot list document: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Schema(#[from] ValidationErrors),
}

#[derive(Error, Debug)]
#[error("[{collection}] {id}: {error}")]
pub struct DocumentFailure {
    pub collection: String,
    pub id: String,
    pub error: EntryError,
}

impl DocumentFailure {
    pub fn new(collection: &str, id: &str, error: impl Into<EntryError>) -> Self {
        DocumentFailure {
            collection: collection.to_string(),
            id: id.to_string(),
            error: error.into(),
        }
    }

    /// The schema issues, if this document failed validation.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match &self.error {
            EntryError::Schema(errors) => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_field_path_display() {
        let path = FieldPath::key("updates").at(2).join("date");
        assert_eq!("updates[2].date", path.to_string());
        assert_eq!(Some(2), path.index());
        assert_eq!(None, FieldPath::key("title").index());
    }

    #[test]
    fn test_messages() {
        let errors = ValidationErrors::new(vec![
            ValidationError::MissingField(FieldPath::key("title")),
            ValidationError::WrongType {
                field: FieldPath::key("heroImage"),
                expected: "string",
                found: "integer",
            },
            ValidationError::InvalidDate {
                field: FieldPath::key("updates").at(2).join("date"),
                value: "2021-13-40".to_string(),
            },
        ])
        .unwrap();

        insta::assert_snapshot!(
            errors.to_string(),
            @r###"title: missing required field; heroImage: expected string, found integer; updates[2].date: invalid date "2021-13-40""###
        );

        let failure = DocumentFailure::new("blog", "2021-09-05-sorting.md", errors);
        insta::assert_snapshot!(
            failure.to_string(),
            @r###"[blog] 2021-09-05-sorting.md: title: missing required field; heroImage: expected string, found integer; updates[2].date: invalid date "2021-13-40""###
        );
        assert_eq!(3, failure.validation_errors().map_or(0, |e| e.len()));
    }

    #[test]
    fn test_empty_errors() {
        assert_eq!(None, ValidationErrors::new(Vec::new()));
    }
}
