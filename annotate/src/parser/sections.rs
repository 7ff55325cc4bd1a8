//! Section classifiers: how the body of each section kind is parsed and
//! merged.
//!
//! Built-in kinds are implemented on [`SectionKind`]. Custom kinds implement
//! [`SectionClassifier`] and are added to a
//! [`SectionRegistry`](crate::SectionRegistry).

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use doc_annotate_core::{
    AttrValue, SectionKind, SectionValue, Summary, Term, TextBlock, Terms, merge_section,
};

use super::diagnostics::{ParseContext, WarningKind};
use super::normalize::{cleanup_empty_lines, dedent, strip_blank_edges};
use super::terms::parse_terms;
use crate::error::{AnnotateError, Result, TermSyntaxError};

/// Parses and merges one kind of docstring section.
pub trait SectionClassifier: fmt::Debug + Send + Sync {
    /// Parses the raw body lines of the section named `section`.
    fn parse(
        &self,
        section: &str,
        lines: &[String],
        ctx: &mut ParseContext<'_>,
    ) -> std::result::Result<SectionValue, TermSyntaxError>;

    /// Combines a base entity's section with a derived entity's section.
    fn merge(&self, base: &SectionValue, derived: &SectionValue) -> SectionValue;

    /// Short label used when listing registered sections.
    fn label(&self) -> &str;
}

impl SectionClassifier for SectionKind {
    fn parse(
        &self,
        section: &str,
        lines: &[String],
        ctx: &mut ParseContext<'_>,
    ) -> std::result::Result<SectionValue, TermSyntaxError> {
        Ok(match self {
            SectionKind::Summary => SectionValue::Summary(parse_summary(lines)),
            SectionKind::Text => SectionValue::Text(parse_text(lines)),
            SectionKind::Items => SectionValue::Items(parse_terms(lines)?),
            SectionKind::Input => SectionValue::Items(parse_input(section, lines, ctx)?),
            SectionKind::Output => SectionValue::Items(parse_output(section, lines, ctx)?),
            SectionKind::Envs => SectionValue::Items(parse_envs(section, lines, ctx)?),
        })
    }

    fn merge(&self, base: &SectionValue, derived: &SectionValue) -> SectionValue {
        merge_section(*self, base, derived)
    }

    fn label(&self) -> &str {
        self.shortcut()
    }
}

/// A section whose header has been seen and whose body is being collected.
#[derive(Debug)]
pub(crate) struct OpenSection {
    name: String,
    classifier: Arc<dyn SectionClassifier>,
    lines: Vec<String>,
}

impl OpenSection {
    pub(crate) fn new(name: impl Into<String>, classifier: Arc<dyn SectionClassifier>) -> Self {
        Self {
            name: name.into(),
            classifier,
            lines: Vec::new(),
        }
    }

    pub(crate) fn consume(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    /// Parses the collected body.
    pub(crate) fn close(self, ctx: &mut ParseContext<'_>) -> Result<(String, SectionValue)> {
        let value = self
            .classifier
            .parse(&self.name, &self.lines, ctx)
            .map_err(|source| AnnotateError::MalformedAnnotation {
                owner: ctx.owner().to_string(),
                section: self.name.clone(),
                source,
            })?;
        Ok((self.name, value))
    }
}

/// First run of non-blank lines joined with spaces is the short summary;
/// everything after it is the long summary.
fn parse_summary(lines: &[String]) -> Summary {
    let start = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines[start..]
        .iter()
        .position(|line| line.trim().is_empty())
        .map_or(lines.len(), |offset| start + offset);

    let short = lines[start..end]
        .iter()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join(" ");
    let long = strip_blank_edges(dedent(&lines[end..])).join("\n");

    Summary { short, long }
}

fn parse_text(lines: &[String]) -> TextBlock {
    TextBlock {
        lines: cleanup_empty_lines(dedent(lines)),
    }
}

/// Reconciles documented inputs with the declared input keys.
///
/// Without a schema the section is parsed as plain items.
fn parse_input(
    section: &str,
    lines: &[String],
    ctx: &mut ParseContext<'_>,
) -> std::result::Result<Terms, TermSyntaxError> {
    let mut terms = parse_terms(lines)?;
    let Some(schema) = ctx.schema() else {
        return Ok(terms);
    };

    let keys = schema.input_keys();
    let declared: HashSet<&str> = keys.iter().map(|key| key.name.as_str()).collect();
    for name in terms.keys().filter(|name| !declared.contains(name)) {
        ctx.warn(WarningKind::UnknownItem, section, name);
    }

    for key in &keys {
        if !terms.contains_key(&key.name) {
            ctx.warn(WarningKind::MissingAnnotation, section, &key.name);
        }
        let term = terms.get_or_insert_with(&key.name, Term::default);
        term.attrs.insert("itype", key.itype.as_str().into());
        term.attrs.insert("nargs", "+".into());
        term.attrs.insert("action", key.action().into());
    }
    Ok(terms)
}

/// Reconciles documented outputs with the declared output entries.
///
/// A schema without an output spec yields an empty section.
fn parse_output(
    section: &str,
    lines: &[String],
    ctx: &mut ParseContext<'_>,
) -> std::result::Result<Terms, TermSyntaxError> {
    let mut terms = parse_terms(lines)?;
    let Some(schema) = ctx.schema() else {
        return Ok(terms);
    };
    if !schema.has_output() {
        return Ok(Terms::new());
    }

    let entries = schema.output_entries();
    let declared: HashSet<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
    for name in terms.keys().filter(|name| !declared.contains(name)) {
        ctx.warn(WarningKind::UnknownItem, section, name);
    }

    for entry in &entries {
        if !terms.contains_key(&entry.name) {
            ctx.warn(WarningKind::MissingAnnotation, section, &entry.name);
        }
        let term = terms.get_or_insert_with(&entry.name, Term::default);
        term.attrs.insert("otype", entry.otype.as_str().into());
        term.attrs.insert("default", entry.default.as_str().into());
    }
    Ok(terms)
}

/// Reconciles documented parameters with the declared defaults.
fn parse_envs(
    section: &str,
    lines: &[String],
    ctx: &mut ParseContext<'_>,
) -> std::result::Result<Terms, TermSyntaxError> {
    let mut terms = parse_terms(lines)?;
    if let Some(envs) = ctx.schema().and_then(|schema| schema.envs.as_ref()) {
        reconcile_envs(&mut terms, envs, None, section, ctx);
    }
    Ok(terms)
}

fn reconcile_envs(
    terms: &mut Terms,
    envs: &Map<String, Value>,
    parent: Option<&str>,
    section: &str,
    ctx: &mut ParseContext<'_>,
) {
    for (key, value) in envs {
        let dotted = match parent {
            Some(parent) => format!("{parent}.{key}"),
            None => key.clone(),
        };
        if !terms.contains_key(key) {
            ctx.warn(WarningKind::MissingAnnotation, section, &dotted);
        }
        let term = terms.get_or_insert_with(key, Term::default);

        if is_namespace(term, value) {
            if !term.attrs.contains_key("action") {
                term.attrs.insert("action", "namespace".into());
            }
            if let Value::Object(children) = value {
                reconcile_envs(&mut term.terms, children, Some(&dotted), section, ctx);
            }
            continue;
        }

        if !term.attrs.contains_key("default") {
            term.attrs.insert("default", AttrValue::Value(value.clone()));
        }
        if !term.attrs.contains_key("atype") {
            if let Some(atype) = scalar_type_name(value) {
                term.attrs.insert("atype", atype.into());
            }
        }
        if value.is_array() {
            if !term.attrs.contains_key("action") {
                term.attrs.insert("action", "clear_extend".into());
            }
            if !term.attrs.contains_key("nargs") {
                term.attrs.insert("nargs", "+".into());
            }
        }
    }
}

/// Decides whether a parameter is a namespace of further parameters.
///
/// Explicit attributes win, then the shape of the declared default. A null
/// default counts as a namespace only when children are documented.
fn is_namespace(term: &Term, value: &Value) -> bool {
    if term.attrs.contains_key("ns") || term.attrs.contains_key("namespace") {
        return true;
    }
    if let Some(action) = term.attr("action") {
        return action.as_str() == Some("namespace");
    }
    match value {
        Value::Object(_) => true,
        Value::Null => !term.terms.is_empty(),
        _ => false,
    }
}

fn scalar_type_name(value: &Value) -> Option<&'static str> {
    match value {
        Value::Bool(_) => Some("bool"),
        Value::Number(n) if n.is_f64() => Some("float"),
        Value::Number(_) => Some("int"),
        Value::String(_) => Some("str"),
        _ => None,
    }
}
