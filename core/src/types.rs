//! Annotation type definitions for structured docstring modeling.
//!
//! This module defines the data model produced by the docstring parser and
//! consumed by the merge rules. The types are designed for serialization with
//! [`serde`] and keep declaration order everywhere, so an annotation can be
//! rendered back in the order its author wrote it.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Insertion-ordered string-keyed map.
///
/// Keys are unique; inserting an existing key replaces its value in place
/// and keeps its original position. Lookups are linear, which is the right
/// trade-off for the handful of entries a docstring section holds.
///
/// # Examples
///
/// ```
/// use doc_annotate_core::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.insert("b", 1);
/// map.insert("a", 2);
/// map.insert("b", 3);
///
/// assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
/// assert_eq!(map.get("b"), Some(&3));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// Inserts `value` under `key`, returning the previous value if any.
    ///
    /// An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Returns the value under `key`, appending `make()` first when absent.
    pub fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> V) -> &mut V {
        let idx = match self.position(key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key.to_string(), make()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = self.position(key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut V)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }
}

impl<V> IntoIterator for OrderedMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map with string keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = OrderedMap::new();
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

/// Value of a term attribute.
///
/// Attributes written in a docstring are either bare flags (`required`) or
/// strings (`type=int`). Schema cross-referencing may add typed values, such
/// as a parameter's declared default.
///
/// Serialized, all three forms are plain values, so reading one back turns a
/// typed `true` into [`Flag`](Self::Flag) and a typed string into
/// [`Text`](Self::Text). Equality compares the serialized value, which makes
/// those pairs equal.
///
/// # Examples
///
/// ```
/// use doc_annotate_core::AttrValue;
/// use serde_json::json;
///
/// assert_eq!(AttrValue::from(json!(true)), AttrValue::Flag);
/// assert_eq!(AttrValue::from(json!("int")), AttrValue::Text("int".into()));
/// assert_eq!(AttrValue::from(json!(3)), AttrValue::Value(json!(3)));
/// assert_eq!(AttrValue::Value(json!("int")), AttrValue::Text("int".into()));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum AttrValue {
    /// Bare attribute name with no value.
    Flag,
    /// String value written after `:` or `=`.
    Text(String),
    /// Typed value taken from a schema.
    Value(Value),
}

impl AttrValue {
    pub fn is_flag(&self) -> bool {
        matches!(self, Self::Flag)
    }

    /// Returns the string content for text values (and string-typed values).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Value(Value::String(text)) => Some(text),
            _ => None,
        }
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Flag, Self::Flag) => true,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Flag, Self::Value(value)) | (Self::Value(value), Self::Flag) => {
                *value == Value::Bool(true)
            }
            (Self::Text(text), Self::Value(value)) | (Self::Value(value), Self::Text(text)) => {
                value.as_str() == Some(text.as_str())
            }
            _ => false,
        }
    }
}

impl From<Value> for AttrValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(true) => Self::Flag,
            Value::String(text) => Self::Text(text),
            other => Self::Value(other),
        }
    }
}

impl From<AttrValue> for Value {
    fn from(value: AttrValue) -> Self {
        match value {
            AttrValue::Flag => Value::Bool(true),
            AttrValue::Text(text) => Value::String(text),
            AttrValue::Value(value) => value,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag => f.write_str("true"),
            Self::Text(text) => f.write_str(text),
            Self::Value(Value::String(text)) => f.write_str(text),
            Self::Value(value) => write!(f, "{value}"),
        }
    }
}

/// Attributes of a term, in declaration order.
pub type Attrs = OrderedMap<AttrValue>;

/// Child terms keyed by name, in declaration order.
pub type Terms = OrderedMap<Term>;

/// One documented entity: an argument, input key, output key, or list item.
///
/// The term's name is the key it is stored under in its parent [`Terms`]
/// map.
///
/// # Examples
///
/// ```
/// use doc_annotate_core::{AttrValue, Term};
///
/// let term = Term::new("Number of cores")
///     .with_attr("type", "int")
///     .with_attr("required", AttrValue::Flag)
///     .with_term("min", Term::new("Lower bound"));
///
/// assert_eq!(term.attr("type").and_then(AttrValue::as_str), Some("int"));
/// assert!(term.terms.contains_key("min"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Term {
    /// Attributes from the parenthesized list, plus schema-derived ones.
    #[serde(default)]
    pub attrs: Attrs,
    /// Help text, possibly spanning several lines.
    #[serde(default)]
    pub help: String,
    /// Nested sub-terms.
    #[serde(default)]
    pub terms: Terms,
}

impl Term {
    /// Creates a term with the given help and no attributes or children.
    pub fn new(help: impl Into<String>) -> Self {
        Self {
            help: help.into(),
            ..Self::default()
        }
    }

    /// Adds (or replaces) an attribute.
    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name, value.into());
        self
    }

    /// Adds (or replaces) a child term.
    pub fn with_term(mut self, name: &str, term: Term) -> Self {
        self.terms.insert(name, term);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }
}

/// Parsed summary section: a one-line short description and a long body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub short: String,
    pub long: String,
}

/// Parsed free-text section, one entry per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub lines: Vec<String>,
}

impl TextBlock {
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    /// Joins the lines with newlines.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Parsed result of one docstring section.
///
/// Serialized untagged: a summary is `{short, long}`, a text section is
/// `{lines}`, and an item section is a map of terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionValue {
    Summary(Summary),
    Text(TextBlock),
    Items(Terms),
}

impl SectionValue {
    pub fn as_summary(&self) -> Option<&Summary> {
        match self {
            Self::Summary(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn as_items(&self) -> Option<&Terms> {
        match self {
            Self::Items(terms) => Some(terms),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Name of the implicit first section of every docstring.
pub const SUMMARY_SECTION: &str = "Summary";

/// Full annotation of one entity: section name to parsed section, in the
/// order the sections were written.
///
/// # Examples
///
/// ```
/// use doc_annotate_core::{Annotation, SectionValue, Summary, Term, Terms};
///
/// let mut annotation = Annotation::new();
/// annotation.insert("Summary", SectionValue::Summary(Summary {
///     short: "Sort a file".into(),
///     long: String::new(),
/// }));
/// let mut envs = Terms::new();
/// envs.insert("reverse", Term::new("Sort descending"));
/// annotation.insert("Envs", SectionValue::Items(envs));
///
/// assert_eq!(annotation.summary().map(|s| s.short.as_str()), Some("Sort a file"));
/// assert!(annotation.items("Envs").unwrap().contains_key("reverse"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotation {
    sections: OrderedMap<SectionValue>,
}

impl Annotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: SectionValue) -> Option<SectionValue> {
        self.sections.insert(name, value)
    }

    pub fn section(&self, name: &str) -> Option<&SectionValue> {
        self.sections.get(name)
    }

    /// Returns the `Summary` section, if present.
    pub fn summary(&self) -> Option<&Summary> {
        self.section(SUMMARY_SECTION).and_then(SectionValue::as_summary)
    }

    pub fn items(&self, name: &str) -> Option<&Terms> {
        self.section(name).and_then(SectionValue::as_items)
    }

    pub fn text(&self, name: &str) -> Option<&TextBlock> {
        self.section(name).and_then(SectionValue::as_text)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SectionValue)> {
        self.sections.iter()
    }
}

impl FromIterator<(String, SectionValue)> for Annotation {
    fn from_iter<I: IntoIterator<Item = (String, SectionValue)>>(iter: I) -> Self {
        Self {
            sections: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Annotation {
    type Item = (String, SectionValue);
    type IntoIter = std::vec::IntoIter<(String, SectionValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.into_iter()
    }
}
