//! Built-in section kinds and their shortcut keywords.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::merge::merge_section;
use crate::SectionValue;

/// Built-in section kinds.
///
/// Each kind decides how a section body is parsed and how a derived
/// section is merged onto a base section of the same name.
///
/// # Examples
///
/// ```
/// use doc_annotate_core::SectionKind;
///
/// assert_eq!("Items".parse::<SectionKind>().unwrap(), SectionKind::Items);
/// assert_eq!(SectionKind::Envs.shortcut(), "envs");
/// assert!("table".parse::<SectionKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Short and long description at the top of a docstring.
    Summary,
    /// Free text kept line by line.
    Text,
    /// Generic list of terms.
    Items,
    /// Terms reconciled against declared input keys.
    Input,
    /// Terms reconciled against the declared output spec.
    Output,
    /// Terms reconciled against declared parameter defaults.
    Envs,
}

impl SectionKind {
    /// All kinds, in shortcut listing order.
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Summary,
        SectionKind::Input,
        SectionKind::Output,
        SectionKind::Envs,
        SectionKind::Items,
        SectionKind::Text,
    ];

    /// Returns the shortcut keyword used to register a section of this kind.
    pub fn shortcut(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Text => "text",
            Self::Items => "items",
            Self::Input => "input",
            Self::Output => "output",
            Self::Envs => "envs",
        }
    }

    /// Resolves a shortcut keyword, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidShortcut`] naming the valid keywords when `shortcut`
    /// is not one of them.
    pub fn from_shortcut(shortcut: &str) -> Result<Self, InvalidShortcut> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.shortcut().eq_ignore_ascii_case(shortcut.trim()))
            .ok_or_else(|| InvalidShortcut {
                shortcut: shortcut.to_string(),
                valid: Self::valid_shortcuts(),
            })
    }

    /// Comma-separated list of valid shortcut keywords.
    pub fn valid_shortcuts() -> String {
        Self::ALL
            .iter()
            .map(|kind| kind.shortcut())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Returns `true` for kinds whose parsed value is a term map.
    pub fn is_items(self) -> bool {
        matches!(self, Self::Items | Self::Input | Self::Output | Self::Envs)
    }

    /// Merges a derived section onto a base section using this kind's rule.
    pub fn merge(self, base: &SectionValue, derived: &SectionValue) -> SectionValue {
        merge_section(self, base, derived)
    }
}

impl FromStr for SectionKind {
    type Err = InvalidShortcut;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_shortcut(s)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shortcut())
    }
}

/// Error for an unrecognized section shortcut keyword.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid section shortcut: {shortcut}\nvalid shortcuts: {valid}")]
pub struct InvalidShortcut {
    /// The rejected keyword.
    pub shortcut: String,
    /// Comma-separated valid keywords.
    pub valid: String,
}
