//! Core annotation types, entity schemas, and merge rules.
//!
//! This crate defines the foundational types for modeling structured
//! docstring annotations:
//!
//! - [`Term`]: one documented entity with attributes, help, and children.
//! - [`SectionValue`]: a parsed section: [`Summary`], [`TextBlock`], or a
//!   map of [`Terms`].
//! - [`Annotation`]: all sections of one entity, in declaration order.
//! - [`SectionKind`]: the built-in section kinds and their shortcut keywords.
//! - [`EntitySchema`]: the declared inputs, outputs, and parameter defaults a
//!   docstring is reconciled against.
//!
//! Merging ([`merge_terms`], [`merge_section`]) composes a derived annotation
//! onto a base annotation without mutating the base.
//!
//! # Example
//!
//! ```
//! use doc_annotate_core::*;
//!
//! let mut base = Terms::new();
//! base.insert("infile", Term::new("The input file").with_attr("itype", "file"));
//!
//! let mut derived = Terms::new();
//! derived.insert("infile", Term::new("A sorted input file"));
//!
//! let merged = SectionKind::Input.merge(
//!     &SectionValue::Items(base),
//!     &SectionValue::Items(derived),
//! );
//! let infile = merged.as_items().unwrap().get("infile").unwrap();
//! assert_eq!(infile.help, "A sorted input file");
//! assert_eq!(infile.attr("itype").and_then(AttrValue::as_str), Some("file"));
//! ```

mod kind;
mod merge;
mod schema;
mod types;

pub use kind::{InvalidShortcut, SectionKind};
pub use merge::{merge_attrs, merge_section, merge_summary, merge_term, merge_terms, merge_text};
pub use schema::*;
pub use types::*;
