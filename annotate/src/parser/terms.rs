//! Term tree builder.
//!
//! Turns the body of an item section into an ordered tree of [`Term`]s:
//!
//! ```text
//! name (attr1:val1; attr2): help line
//!     continuation of the help
//!     - child: help of a child term
//!         - grandchild: ...
//! ```
//!
//! A header whose help is exactly `|` starts a literal block: the following
//! help lines are kept verbatim instead of being joined.

use regex::Regex;
use std::sync::LazyLock;

use doc_annotate_core::{AttrValue, Attrs, Term, Terms};

use super::normalize::{dedent, end_of_sentence, is_code_line};
use crate::error::TermSyntaxError;

/// Prefix of a nested term header line.
const BULLET: &str = "- ";

/// Help value that switches a term to literal help.
const LITERAL_MARKER: &str = "|";

static TERM_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[\w-]+)\s*(?:\((?P<attrs>.+?)\))?:(?P<help>.*)$")
        .expect("static regex must compile")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[\w-]+)(?:\s*[:=]\s*(?P<value>.*))?$")
        .expect("static regex must compile")
});

/// Parses the lines of an item section into a tree of terms.
///
/// The block is dedented first; blank lines before the first term are
/// ignored and any other line before it is an error. A repeated name
/// replaces the earlier term at its original position.
///
/// # Examples
///
/// ```
/// use doc_annotate::parser::parse_terms;
///
/// let terms = parse_terms(&[
///     "ncores (type=int): Number of cores.",
///     "    Must be positive.",
///     "    - min: Lower bound",
/// ]).unwrap();
///
/// let ncores = terms.get("ncores").unwrap();
/// assert_eq!(ncores.help, "Number of cores.\nMust be positive.");
/// assert_eq!(ncores.attr("type").and_then(|v| v.as_str()), Some("int"));
/// assert_eq!(ncores.terms.get("min").unwrap().help, "Lower bound");
/// ```
pub fn parse_terms<S: AsRef<str>>(lines: &[S]) -> Result<Terms, TermSyntaxError> {
    parse_level(lines, "")
}

fn parse_level<S: AsRef<str>>(lines: &[S], prefix: &str) -> Result<Terms, TermSyntaxError> {
    let mut terms = Terms::new();
    let mut open: Option<OpenTerm> = None;

    for line in dedent(lines) {
        let header = match line.strip_prefix(prefix) {
            Some(rest) => OpenTerm::from_header(rest)?,
            None => None,
        };
        if let Some(next) = header {
            if let Some(done) = open.replace(next) {
                done.finish_into(&mut terms)?;
            }
            continue;
        }

        match open.as_mut() {
            Some(term) => term.push_line(line),
            None if line.trim().is_empty() => {}
            None => return Err(TermSyntaxError::InvalidItem { line }),
        }
    }

    if let Some(done) = open {
        done.finish_into(&mut terms)?;
    }
    Ok(terms)
}

/// A term whose header has been read and whose body is still being
/// collected.
struct OpenTerm {
    name: String,
    attrs: Attrs,
    first_help: String,
    literal: bool,
    help_lines: Vec<String>,
    sub_lines: Vec<String>,
}

impl OpenTerm {
    fn from_header(text: &str) -> Result<Option<Self>, TermSyntaxError> {
        let Some(caps) = TERM_HEADER_RE.captures(text) else {
            return Ok(None);
        };

        let attrs = match caps.name("attrs") {
            Some(raw) => parse_attrs(raw.as_str())?,
            None => Attrs::new(),
        };
        let help = caps.name("help").map_or("", |m| m.as_str().trim());
        let literal = help == LITERAL_MARKER;

        Ok(Some(Self {
            name: caps["name"].to_string(),
            attrs,
            first_help: if literal { String::new() } else { help.to_string() },
            literal,
            help_lines: Vec::new(),
            sub_lines: Vec::new(),
        }))
    }

    /// Routes a body line: help until the first nested bullet, sub-lines
    /// from then on.
    fn push_line(&mut self, line: String) {
        if self.sub_lines.is_empty() && !line.trim_start().starts_with(BULLET) {
            self.help_lines.push(line);
        } else {
            self.sub_lines.push(line);
        }
    }

    fn finish_into(self, terms: &mut Terms) -> Result<(), TermSyntaxError> {
        let help = if self.literal {
            literal_help(&self.help_lines)
        } else {
            joined_help(&self.first_help, &self.help_lines)
        };
        let children = parse_level(&self.sub_lines, BULLET)?;

        terms.insert(
            self.name,
            Term {
                attrs: self.attrs,
                help,
                terms: children,
            },
        );
        Ok(())
    }
}

/// Parses `name[:value]; name[=value]; ...` into attributes.
fn parse_attrs(raw: &str) -> Result<Attrs, TermSyntaxError> {
    let mut attrs = Attrs::new();
    for clause in raw.split(';').map(str::trim) {
        let caps = ATTR_RE
            .captures(clause)
            .ok_or_else(|| TermSyntaxError::InvalidAttribute {
                attr: clause.to_string(),
            })?;
        let value = caps
            .name("value")
            .map_or(AttrValue::Flag, |v| AttrValue::Text(v.as_str().trim().to_string()));
        attrs.insert(&caps["name"], value);
    }
    Ok(attrs)
}

fn literal_help(lines: &[String]) -> String {
    let mut block = dedent(lines);
    while block.last().is_some_and(String::is_empty) {
        block.pop();
    }
    let start = block
        .iter()
        .position(|line| !line.is_empty())
        .unwrap_or(block.len());
    block[start..].join("\n")
}

/// Joins help lines with a space, or with a newline after a sentence end,
/// a blank line, or around `>>> ` example lines.
fn joined_help(first: &str, lines: &[String]) -> String {
    let mut help = first.to_string();
    let mut prev = first;
    let mut paragraph_break = false;

    for line in lines.iter().map(|line| line.trim()) {
        if line.is_empty() {
            paragraph_break = !help.is_empty();
            continue;
        }
        if !help.is_empty() {
            let newline = paragraph_break
                || end_of_sentence(prev)
                || is_code_line(prev)
                || is_code_line(line);
            help.push(if newline { '\n' } else { ' ' });
        }
        help.push_str(line);
        prev = line;
        paragraph_break = false;
    }
    help
}

#[cfg(test)]
mod tests {
    use super::*;

    fn help_of<'a>(terms: &'a Terms, name: &str) -> &'a str {
        &terms.get(name).unwrap().help
    }

    #[test]
    fn test_nested_terms() {
        let terms = parse_terms(&[
            "item1: help1",
            "    more help for item1",
            "    - subitem1: subhelp1",
            "        more help for subitem1",
            "    - subitem2: subhelp2",
            "        more help for subitem2",
            "        - subsubitem1: subsubhelp1",
            "            more help for subsubitem1",
            "        - subsubitem2: subsubhelp2",
            "item2: help2",
        ])
        .unwrap();

        assert_eq!(terms.keys().collect::<Vec<_>>(), vec!["item1", "item2"]);
        assert_eq!(help_of(&terms, "item1"), "help1 more help for item1");
        let item1 = terms.get("item1").unwrap();
        assert_eq!(help_of(&item1.terms, "subitem1"), "subhelp1 more help for subitem1");
        let subitem2 = item1.terms.get("subitem2").unwrap();
        assert_eq!(
            help_of(&subitem2.terms, "subsubitem1"),
            "subsubhelp1 more help for subsubitem1"
        );
        assert_eq!(help_of(&subitem2.terms, "subsubitem2"), "subsubhelp2");
        assert_eq!(help_of(&terms, "item2"), "help2");
    }

    #[test]
    fn test_attribute_forms() {
        let terms = parse_terms(&["a (attr1:val1; attr2; attr3 = val3): help"]).unwrap();
        let attrs = &terms.get("a").unwrap().attrs;
        assert_eq!(attrs.get("attr1"), Some(&AttrValue::Text("val1".into())));
        assert_eq!(attrs.get("attr2"), Some(&AttrValue::Flag));
        assert_eq!(attrs.get("attr3"), Some(&AttrValue::Text("val3".into())));
        assert_eq!(attrs.keys().collect::<Vec<_>>(), vec!["attr1", "attr2", "attr3"]);
    }

    #[test]
    fn test_attribute_value_keeps_inner_colons() {
        let terms = parse_terms(&["a (default: x:y): help"]).unwrap();
        assert_eq!(
            terms.get("a").unwrap().attr("default"),
            Some(&AttrValue::Text("x:y".into()))
        );
    }

    #[test]
    fn test_sentence_end_forces_newline() {
        let dotted = parse_terms(&["a: help1.", "    help2"]).unwrap();
        assert_eq!(help_of(&dotted, "a"), "help1.\nhelp2");

        let plain = parse_terms(&["a: help1", "    help2"]).unwrap();
        assert_eq!(help_of(&plain, "a"), "help1 help2");
    }

    #[test]
    fn test_code_lines_keep_their_own_lines() {
        let terms = parse_terms(&[
            "arg1: help11",
            "    >>> some code",
            "    >>> some more code",
            "    help12",
        ])
        .unwrap();
        assert_eq!(
            help_of(&terms, "arg1"),
            "help11\n>>> some code\n>>> some more code\nhelp12"
        );
    }

    #[test]
    fn test_blank_line_starts_new_paragraph() {
        let terms = parse_terms(&["a: first", "    ", "    second"]).unwrap();
        assert_eq!(help_of(&terms, "a"), "first\nsecond");
    }

    #[test]
    fn test_literal_help_block() {
        let terms = parse_terms(&[
            "a: |",
            "    line one",
            "      indented",
            "    last",
            "",
            "b: next",
        ])
        .unwrap();
        assert_eq!(help_of(&terms, "a"), "line one\n  indented\nlast");
        assert_eq!(help_of(&terms, "b"), "next");
    }

    #[test]
    fn test_help_may_continue_on_next_line_only() {
        let terms = parse_terms(&["a:", "    help on the next line"]).unwrap();
        assert_eq!(help_of(&terms, "a"), "help on the next line");
    }

    #[test]
    fn test_duplicate_name_replaces_in_place() {
        let terms = parse_terms(&["a: one", "b: two", "a: three"]).unwrap();
        assert_eq!(terms.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(help_of(&terms, "a"), "three");
    }

    #[test]
    fn test_leading_blank_lines_are_skipped() {
        let terms = parse_terms(&["", "   ", "a: help"]).unwrap();
        assert_eq!(terms.len(), 1);
    }

    #[test]
    fn test_line_before_first_term_is_an_error() {
        let err = parse_terms(&["no colon here", "a: help"]).unwrap_err();
        assert_eq!(
            err,
            TermSyntaxError::InvalidItem {
                line: "no colon here".into()
            }
        );
    }

    #[test]
    fn test_malformed_attribute_is_an_error() {
        let err = parse_terms(&["a (x y): help"]).unwrap_err();
        assert!(matches!(err, TermSyntaxError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_terms::<&str>(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_dashed_names() {
        let terms = parse_terms(&["dry-run: Do nothing"]).unwrap();
        assert_eq!(help_of(&terms, "dry-run"), "Do nothing");
    }
}
