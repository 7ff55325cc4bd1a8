//! Structured docstring parsing and inheritance-aware annotation.
//!
//! A docstring is split into named sections. Each section is parsed by the
//! classifier registered for its name: a summary, free text, or an indented
//! tree of terms with attributes and help text. Entities that declare a
//! schema (input keys, outputs, parameter defaults) get their `Input`,
//! `Output`, and `Envs` sections reconciled against it, with warnings for
//! keys that are undocumented or undeclared.
//!
//! An [`Annotator`] resolves entities along their base chain, merging each
//! derived annotation onto its base's, and caches the results.
//!
//! # Quick Start
//!
//! ```
//! use doc_annotate::parse_docstring;
//!
//! let doc = "Sort a file
//!
//!     Args:
//!         key (type=str): Sort key.
//!             Defaults to the whole line.
//!         reverse (flag): Sort descending
//! ";
//! let parsed = parse_docstring(doc).unwrap();
//! let args = parsed.annotation.items("Args").unwrap();
//! assert_eq!(args.get("key").unwrap().help, "Sort key.\nDefaults to the whole line.");
//! assert!(args.get("reverse").unwrap().attr("flag").unwrap().is_flag());
//! ```

pub mod catalog;
pub mod entity;
pub mod error;
pub mod merge;
pub mod output;
pub mod parser;
pub mod registry;

pub use catalog::Catalog;
pub use entity::{Annotated, Annotator, Entity};
pub use error::{AnnotateError, Result, TermSyntaxError};
pub use merge::merge_annotations;
pub use output::{OutputFormat, format_annotation, format_annotations, render_docstring};
pub use parser::{AnnotationWarning, DocstringParser, SectionClassifier, WarningKind, parse_terms};
pub use registry::SectionRegistry;

pub use doc_annotate_core::{
    Annotation, AttrValue, EntitySchema, SectionKind, SectionValue, Summary, Term, Terms,
    TextBlock,
};

use tracing::debug;

/// Name recorded as the owner of warnings from free-standing docstrings.
pub const ANONYMOUS_OWNER: &str = "<docstring>";

/// Parses a free-standing docstring with the default sections.
///
/// # Errors
///
/// Returns [`AnnotateError::MalformedAnnotation`] when an item section does
/// not follow the term grammar.
pub fn parse_docstring(docstring: &str) -> Result<Annotated> {
    parse_docstring_with(&SectionRegistry::default(), ANONYMOUS_OWNER, None, docstring)
}

/// Parses a docstring with an explicit registry, owner name, and schema.
pub fn parse_docstring_with(
    registry: &SectionRegistry,
    owner: &str,
    schema: Option<&EntitySchema>,
    docstring: &str,
) -> Result<Annotated> {
    debug!(owner, bytes = docstring.len(), "parsing docstring");
    let mut parser = DocstringParser::new(registry, owner).with_schema(schema);
    let annotation = parser.parse(Some(docstring))?;
    Ok(Annotated {
        annotation,
        warnings: parser.into_warnings(),
    })
}
