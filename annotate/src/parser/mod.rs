//! Docstring parser.
//!
//! A docstring is split into sections. Every line that ends with `:` and
//! either names a registered section or is shaped like a header (`See Also:`)
//! opens a new section; all other lines belong to the section that is open.
//! The text before the first header is the `Summary` section.
//!
//! Each section body is handed to the [`SectionClassifier`] registered for
//! its name. Unregistered headers are parsed as free text.
//!
//! The primary entry point is [`DocstringParser::new`] followed by
//! [`DocstringParser::parse`]; most callers use
//! [`parse_docstring`](crate::parse_docstring) or an
//! [`Annotator`](crate::Annotator) instead.

mod diagnostics;
mod normalize;
mod sections;
mod terms;

use std::sync::Arc;
use tracing::debug;

use doc_annotate_core::{Annotation, EntitySchema, SUMMARY_SECTION, SectionKind};

use crate::error::Result;
use crate::registry::SectionRegistry;

pub use diagnostics::{AnnotationWarning, ParseContext, WarningKind};
pub use normalize::{cleanup_empty_lines, dedent, end_of_sentence, normalize_docstring};
pub(crate) use sections::OpenSection;
pub use sections::SectionClassifier;
pub use terms::parse_terms;

/// Sections a schema-bearing entity always has, with the kind they are
/// parsed as when the docstring omits them.
const SCHEMA_SECTIONS: [(&str, SectionKind); 3] = [
    ("Input", SectionKind::Input),
    ("Output", SectionKind::Output),
    ("Envs", SectionKind::Envs),
];

/// Parses one entity's docstring against a section registry.
#[derive(Debug)]
pub struct DocstringParser<'a> {
    registry: &'a SectionRegistry,
    owner: &'a str,
    schema: Option<&'a EntitySchema>,
    warnings: Vec<AnnotationWarning>,
}

impl<'a> DocstringParser<'a> {
    pub fn new(registry: &'a SectionRegistry, owner: &'a str) -> Self {
        Self {
            registry,
            owner,
            schema: None,
            warnings: Vec::new(),
        }
    }

    /// Reconciles the docstring with `schema` while parsing.
    pub fn with_schema(mut self, schema: Option<&'a EntitySchema>) -> Self {
        self.schema = schema;
        self
    }

    /// Warnings collected by the last [`parse`](Self::parse) call.
    pub fn warnings(&self) -> &[AnnotationWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<AnnotationWarning> {
        self.warnings
    }

    /// Parses a docstring into an annotation.
    ///
    /// A missing or empty docstring yields an empty annotation, unless the
    /// parser has a schema: then the `Input`, `Output`, and `Envs` sections
    /// are still produced from the declared keys.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::MalformedAnnotation`](crate::AnnotateError::MalformedAnnotation)
    /// when an item section body does not follow the term grammar.
    pub fn parse(&mut self, docstring: Option<&str>) -> Result<Annotation> {
        let mut ctx = ParseContext::new(self.owner, self.schema);
        let mut annotation = Annotation::new();

        if let Some(docstring) = docstring.filter(|doc| !doc.is_empty()) {
            let mut section = OpenSection::new(SUMMARY_SECTION, Arc::new(SectionKind::Summary));
            for raw in normalize_docstring(docstring) {
                let line = raw.trim_end();
                let Some(name) = self.section_header(line) else {
                    section.consume(line);
                    continue;
                };

                let classifier = self
                    .registry
                    .get(name)
                    .unwrap_or_else(|| Arc::new(SectionKind::Text));
                let finished = std::mem::replace(&mut section, OpenSection::new(name, classifier));
                let (finished_name, value) = finished.close(&mut ctx)?;
                debug!(owner = self.owner, section = %finished_name, "parsed section");
                annotation.insert(finished_name, value);
            }
            let (name, value) = section.close(&mut ctx)?;
            annotation.insert(name, value);
        }

        if let Some(schema) = self.schema {
            debug!(owner = self.owner, ?schema, "reconciling schema sections");
            for (name, kind) in SCHEMA_SECTIONS {
                if !annotation.contains(name) {
                    let (name, value) = OpenSection::new(name, Arc::new(kind)).close(&mut ctx)?;
                    annotation.insert(name, value);
                }
            }
        }

        self.warnings = ctx.into_warnings();
        Ok(annotation)
    }

    /// Returns the section name if `line` is a section header.
    fn section_header<'l>(&self, line: &'l str) -> Option<&'l str> {
        let name = line.strip_suffix(':')?;
        (self.registry.contains(name) || normalize::is_section_header(name)).then_some(name)
    }
}
