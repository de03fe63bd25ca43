//! Frontmatter schema of the blog's `blog` content collection.
//!
//! Markdown posts start with a YAML header. This crate extracts that header
//! ([`document`]), validates and coerces it against the post schema ([`schema`]) into a
//! typed [`PostFrontmatter`], and loads whole collections of posts ([`collection`]),
//! keeping invalid documents apart rather than failing the whole collection.

#[macro_use]
extern crate serde_derive;

pub mod collection;
pub mod config;
pub mod date;
pub mod document;
pub mod error;
mod post;
pub mod schema;
pub mod value;

pub use collection::{Collection, CollectionConfig, Entry};
pub use date::PostDate;
pub use document::Document;
pub use error::{DocumentError, DocumentFailure, EntryError, FieldPath, ValidationError, ValidationErrors};
pub use post::{PostFrontmatter, Update};
pub use schema::{validate, validate_all};
pub use value::{RawFrontmatter, Value};
