//! Declared entity schema: input keys, output spec, and parameter defaults.
//!
//! A schema is read-only data owned by the annotated entity. The parser
//! consults it to backfill types and defaults on documented terms and to
//! report keys that are documented but not declared, or declared but not
//! documented.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Input type used when a declared input key carries no type.
pub const INPUT_TYPE_VAR: &str = "var";
/// Input type for a list of files.
pub const INPUT_TYPE_FILES: &str = "files";
/// Input type for a list of directories.
pub const INPUT_TYPE_DIRS: &str = "dirs";

/// Output type used when a declared output entry carries no type.
pub const OUTPUT_TYPE_VAR: &str = "var";

/// A list of declared keys, written either as one comma-joined string or as
/// a list of strings.
///
/// # Examples
///
/// ```
/// use doc_annotate_core::KeySpec;
///
/// let joined = KeySpec::from("infile:file, in2");
/// let listed = KeySpec::from(vec!["infile:file", "in2"]);
/// assert_eq!(joined.tokens(), listed.tokens());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeySpec {
    Joined(String),
    List(Vec<String>),
}

impl KeySpec {
    /// Returns the trimmed, non-empty tokens in declaration order.
    pub fn tokens(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::Joined(joined) => joined.split(',').collect(),
            Self::List(list) => list.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(String::from)
            .collect()
    }
}

impl From<&str> for KeySpec {
    fn from(joined: &str) -> Self {
        Self::Joined(joined.to_string())
    }
}

impl From<String> for KeySpec {
    fn from(joined: String) -> Self {
        Self::Joined(joined)
    }
}

impl<S: Into<String>> From<Vec<S>> for KeySpec {
    fn from(list: Vec<S>) -> Self {
        Self::List(list.into_iter().map(Into::into).collect())
    }
}

/// One declared input key (`name[:type]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputKey {
    pub name: String,
    pub itype: String,
}

impl InputKey {
    /// Parses `name[:type]`; the type defaults to [`INPUT_TYPE_VAR`].
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_annotate_core::InputKey;
    ///
    /// let key = InputKey::parse("infiles:files");
    /// assert_eq!(key.name, "infiles");
    /// assert_eq!(key.action(), "append");
    /// assert_eq!(InputKey::parse("in2").itype, "var");
    /// ```
    pub fn parse(token: &str) -> Self {
        match token.split_once(':') {
            Some((name, itype)) => Self {
                name: name.trim().to_string(),
                itype: itype.trim().to_string(),
            },
            None => Self {
                name: token.trim().to_string(),
                itype: INPUT_TYPE_VAR.to_string(),
            },
        }
    }

    /// Returns `true` when each job receives a list of paths.
    pub fn is_list_kind(&self) -> bool {
        self.itype == INPUT_TYPE_FILES || self.itype == INPUT_TYPE_DIRS
    }

    /// Command-line action for the key: list kinds append, others extend.
    pub fn action(&self) -> &'static str {
        if self.is_list_kind() {
            "append"
        } else {
            "extend"
        }
    }
}

/// One declared output entry (`name:type:default`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEntry {
    pub name: String,
    pub otype: String,
    pub default: String,
}

impl OutputEntry {
    /// Parses `name:type:default`, `name:default`, or `name`.
    ///
    /// A two-field entry has type [`OUTPUT_TYPE_VAR`]; a one-field entry
    /// additionally has an empty default. The default may itself contain
    /// colons. Returns `None` when the name is not a valid identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_annotate_core::OutputEntry;
    ///
    /// let out = OutputEntry::parse("outfile:file:{{in.infile}}.txt").unwrap();
    /// assert_eq!(out.otype, "file");
    /// assert_eq!(OutputEntry::parse("out:{{c}}").unwrap().otype, "var");
    /// assert!(OutputEntry::parse("1").is_none());
    /// ```
    pub fn parse(token: &str) -> Option<Self> {
        let parts: Vec<&str> = token.trim().splitn(3, ':').collect();
        let name = parts[0].trim();
        if !is_identifier(name) {
            return None;
        }

        let (otype, default) = match parts.as_slice() {
            [_, otype, default] => (otype.trim(), *default),
            [_, default] => (OUTPUT_TYPE_VAR, *default),
            _ => (OUTPUT_TYPE_VAR, ""),
        };

        Some(Self {
            name: name.to_string(),
            otype: otype.to_string(),
            default: default.trim().to_string(),
        })
    }
}

/// Schema declared by an annotated entity.
///
/// # Examples
///
/// ```
/// use doc_annotate_core::EntitySchema;
///
/// let schema = EntitySchema::default()
///     .with_input("infile:file, in2")
///     .with_output("outfile:file:{{a}}, outdir:dir:{{b}}, 1");
///
/// let names: Vec<_> = schema.input_keys().into_iter().map(|k| k.name).collect();
/// assert_eq!(names, vec!["infile", "in2"]);
/// assert_eq!(schema.output_entries().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Declared input keys (`name[:type]`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<KeySpec>,
    /// Declared outputs (`name[:type[:default]]`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<KeySpec>,
    /// Declared parameter defaults; nested mappings are namespaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envs: Option<Map<String, Value>>,
}

impl EntitySchema {
    pub fn with_input(mut self, input: impl Into<KeySpec>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<KeySpec>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_envs(mut self, envs: Map<String, Value>) -> Self {
        self.envs = Some(envs);
        self
    }

    /// Declared input keys in order.
    pub fn input_keys(&self) -> Vec<InputKey> {
        self.input
            .as_ref()
            .map(|spec| spec.tokens().iter().map(|t| InputKey::parse(t)).collect())
            .unwrap_or_default()
    }

    /// Returns `true` when an output spec with at least one token is declared.
    pub fn has_output(&self) -> bool {
        self.output
            .as_ref()
            .is_some_and(|spec| !spec.tokens().is_empty())
    }

    /// Declared outputs in order, skipping entries whose name is not an
    /// identifier.
    pub fn output_entries(&self) -> Vec<OutputEntry> {
        self.output
            .as_ref()
            .map(|spec| {
                spec.tokens()
                    .iter()
                    .filter_map(|t| OutputEntry::parse(t))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Returns `true` if `s` is an identifier: a letter or underscore followed by
/// letters, digits, or underscores.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_') && chars.all(|ch| ch.is_alphanumeric() || ch == '_')
}
