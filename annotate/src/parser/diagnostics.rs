//! Non-fatal findings collected while reconciling a docstring with its schema.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use doc_annotate_core::EntitySchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A declared key has no documented term.
    MissingAnnotation,
    /// A documented term has no declared key.
    UnknownItem,
}

/// One recoverable annotation problem.
///
/// `key` is dotted for nested parameter namespaces (`opts.depth`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationWarning {
    pub kind: WarningKind,
    pub owner: String,
    pub section: String,
    pub key: String,
}

impl fmt::Display for AnnotationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            WarningKind::MissingAnnotation => "missing annotation for",
            WarningKind::UnknownItem => "unknown annotation item in",
        };
        write!(f, "{what} {}: {} ({})", self.section, self.key, self.owner)
    }
}

/// State shared by the section classifiers of one parse run.
#[derive(Debug)]
pub struct ParseContext<'a> {
    owner: &'a str,
    schema: Option<&'a EntitySchema>,
    warnings: Vec<AnnotationWarning>,
}

impl<'a> ParseContext<'a> {
    pub fn new(owner: &'a str, schema: Option<&'a EntitySchema>) -> Self {
        Self {
            owner,
            schema,
            warnings: Vec::new(),
        }
    }

    /// Name of the entity whose docstring is being parsed.
    pub fn owner(&self) -> &'a str {
        self.owner
    }

    /// Schema declared by the entity, if any.
    pub fn schema(&self) -> Option<&'a EntitySchema> {
        self.schema
    }

    /// Records a warning and logs it.
    pub fn warn(&mut self, kind: WarningKind, section: &str, key: &str) {
        let warning = AnnotationWarning {
            kind,
            owner: self.owner.to_string(),
            section: section.to_string(),
            key: key.to_string(),
        };
        warn!(owner = self.owner, section, key, "{warning}");
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[AnnotationWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<AnnotationWarning> {
        self.warnings
    }
}
