//! Content collections: a named directory of documents sharing the post schema.

use std::collections::{hash_map, HashMap};
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use itertools::{Either, Itertools};
use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::document::Document;
use crate::error::{DocumentFailure, EntryError};
use crate::post::PostFrontmatter;
use crate::schema;

/// Where a collection lives and which files belong to it. Passed explicitly to the
/// loader, there is no global registry.
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    pub name: String,
    pub directory: PathBuf,
    pub extensions: Vec<String>,
}

impl CollectionConfig {
    pub const BLOG: &'static str = "blog";

    /// The `blog` collection of a content directory.
    pub fn blog(content_dir: impl AsRef<Path>) -> CollectionConfig {
        CollectionConfig {
            name: CollectionConfig::BLOG.to_string(),
            directory: content_dir.as_ref().join(CollectionConfig::BLOG),
            extensions: vec!["md".to_string(), "markdown".to_string()],
        }
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Document paths, sorted, along with the entries that couldn't be listed. Entries
    /// starting with `.` or `_` are skipped, symbolic links are followed. Only an error on
    /// the collection directory itself fails the listing.
    pub fn document_paths(&self) -> anyhow::Result<(Vec<PathBuf>, Vec<DocumentFailure>)> {
        let mut paths = Vec::new();
        let mut failures = Vec::new();
        let walker = WalkDir::new(&self.directory)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_excluded(e));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.accepts(entry.path()) {
                        paths.push(entry.into_path());
                    }
                }
                Err(err) if err.depth() == 0 => {
                    return Err(err).with_context(|| format!("Cannot list collection '{}' in {:?}", self.name, self.directory));
                }
                Err(err) => {
                    let id = err.path().map(|p| self.entry_id(p)).unwrap_or_default();
                    failures.push(DocumentFailure::new(&self.name, &id, err));
                }
            }
        }

        Ok((paths, failures))
    }

    /// Entry id: the path relative to the collection directory, with `/` separators.
    pub fn entry_id(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.directory).unwrap_or(path);
        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy()),
                _ => None,
            })
            .join("/")
    }
}

fn is_excluded(entry: &DirEntry) -> bool {
    entry.file_name()
        .to_str()
        .map_or(false, |name| name.starts_with('.') || name.starts_with('_'))
}

lazy_static! {
    static ref SLUG_STRIP_RE: Regex = Regex::new(r"[^\p{Alphabetic}\p{Nd}\s_-]").unwrap();
    static ref SLUG_SPACE_RE: Regex = Regex::new(r"\s").unwrap();
}

/// Slug of an entry id: extension and trailing `index` removed, each segment lowercased
/// and stripped of punctuation.
pub fn slug(id: &str) -> String {
    let stem = match id.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => stem,
        _ => id,
    };
    let stem = if stem == "index" {
        ""
    } else {
        stem.strip_suffix("/index").unwrap_or(stem)
    };

    stem.split('/')
        .map(|segment| {
            let segment = segment.to_lowercase();
            let segment = SLUG_STRIP_RE.replace_all(&segment, "");
            SLUG_SPACE_RE.replace_all(&segment, "-").into_owned()
        })
        .join("/")
}

/// A validated document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub id: String,
    pub slug: String,
    pub data: PostFrontmatter,
    #[serde(skip)]
    pub body: String,
}

/// The documents of a collection: valid entries newest first, and the documents that
/// were left out along with the reason why.
#[derive(Debug)]
pub struct Collection {
    name: String,
    entries: Vec<Entry>,
    failures: Vec<DocumentFailure>,
}

impl Collection {
    /// Loads and validates all documents of a collection. Invalid documents don't fail the
    /// load, they end up in [`Collection::failures`].
    pub fn load(config: &CollectionConfig) -> anyhow::Result<Collection> {
        let (paths, unlisted) = config.document_paths()?;
        info!(collection = config.name.as_str(), documents = paths.len(), "Loading collection");

        let results = paths
            .par_iter()
            .map(|path| {
                let id = config.entry_id(path);
                match fs::read_to_string(path) {
                    Ok(text) => Collection::validate_entry(config, &id, &text),
                    Err(err) => Err(DocumentFailure::new(&config.name, &id, err)),
                }
            })
            .collect::<Vec<_>>();

        let (entries, mut failures): (Vec<_>, Vec<_>) = results.into_iter().partition_map(|result| match result {
            Ok(entry) => Either::Left(entry),
            Err(failure) => Either::Right(failure),
        });
        failures.extend(unlisted);

        for failure in &failures {
            warn!(collection = failure.collection.as_str(), id = failure.id.as_str(), "Skipping invalid document: {}", failure.error);
        }
        info!(
            collection = config.name.as_str(),
            valid = entries.len(),
            invalid = failures.len(),
            "Collection loaded"
        );

        Ok(Collection::new(&config.name, entries, failures))
    }

    /// Parses and validates a single document of a collection.
    pub fn validate_entry(config: &CollectionConfig, id: &str, text: &str) -> Result<Entry, DocumentFailure> {
        debug!(collection = config.name.as_str(), id, "Validating document");
        let failure = |err: EntryError| DocumentFailure::new(&config.name, id, err);

        let doc = Document::parse(text).map_err(|e| failure(e.into()))?;
        let data = schema::validate_all(&doc.frontmatter).map_err(|e| failure(e.into()))?;

        Ok(Entry {
            id: id.to_string(),
            slug: slug(id),
            data,
            body: doc.body,
        })
    }

    pub fn new(name: &str, mut entries: Vec<Entry>, mut failures: Vec<DocumentFailure>) -> Collection {
        entries.sort_by(|a, b| {
            b.data.pub_date
                .cmp(&a.data.pub_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        failures.sort_by(|a, b| a.id.cmp(&b.id));

        for (entry, shadowing) in shadowed_entries(&entries) {
            warn!(
                collection = name,
                slug = entry.slug.as_str(),
                id = entry.id.as_str(),
                shadowed_by = shadowing.id.as_str(),
                "Duplicate slug"
            );
        }

        Collection {
            name: name.to_string(),
            entries,
            failures,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Valid entries, newest first.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn failures(&self) -> &[DocumentFailure] {
        &self.failures
    }

    pub fn get(&self, slug: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.slug == slug)
    }
}

/// Entries hidden by an earlier entry with the same slug, paired with that earlier entry.
fn shadowed_entries(entries: &[Entry]) -> Vec<(&Entry, &Entry)> {
    let mut first_by_slug = HashMap::new();
    entries
        .iter()
        .filter_map(|entry| match first_by_slug.entry(entry.slug.as_str()) {
            hash_map::Entry::Occupied(first) => Some((entry, *first.get())),
            hash_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                None
            }
        })
        .collect()
}
