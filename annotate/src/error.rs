//! Error types for docstring parsing, section registration, and entity
//! resolution.
//!
//! Parse failures are terminal: the call that hit them returns no partial
//! annotation. Recoverable problems (undocumented or undeclared keys) are not
//! errors; see [`AnnotationWarning`](crate::parser::AnnotationWarning).

use doc_annotate_core::InvalidShortcut;
use thiserror::Error;

/// Grammar the term tree builder accepts for one term header line.
pub const TERM_GRAMMAR: &str = "<name>[ (<attr>[; <attr>]*)]: [<help>]";

/// Grammar of one attribute clause inside a term header.
pub const ATTR_GRAMMAR: &str = "<name>[:<value>] or <name>[=<value>]";

/// A line or attribute clause that does not follow the term grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermSyntaxError {
    /// A non-blank line appeared before any term header.
    #[error("invalid item line: {line:?} (expected {})", TERM_GRAMMAR)]
    InvalidItem { line: String },

    /// An attribute clause did not match `name[:=value]`.
    #[error("invalid item attribute: {attr:?} (expected {})", ATTR_GRAMMAR)]
    InvalidAttribute { attr: String },
}

/// Errors that can occur while annotating entities.
#[derive(Debug, Error)]
pub enum AnnotateError {
    /// A section body could not be parsed.
    #[error("malformed annotation in {owner} (section {section}): {source}")]
    MalformedAnnotation {
        owner: String,
        section: String,
        #[source]
        source: TermSyntaxError,
    },

    /// A section was registered with an unknown shortcut keyword.
    #[error(transparent)]
    InvalidShortcut(#[from] InvalidShortcut),

    /// An entity (or an entity's base) is not known to the annotator.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// Following base entities led back to an entity being resolved.
    #[error("inheritance cycle detected at entity: {0}")]
    InheritanceCycle(String),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`AnnotateError`].
pub type Result<T> = std::result::Result<T, AnnotateError>;
