//! Section registry: section names mapped to the classifier that parses them.
//!
//! Each [`Annotator`](crate::Annotator) owns its registry, so different
//! annotators can recognize different section vocabularies.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use doc_annotate_core::{SUMMARY_SECTION, SectionKind};

use crate::error::Result;
use crate::parser::SectionClassifier;

/// Sections known to a fresh registry.
const DEFAULT_SECTIONS: &[(&str, SectionKind)] = &[
    (SUMMARY_SECTION, SectionKind::Summary),
    ("Input", SectionKind::Input),
    ("Output", SectionKind::Output),
    ("Envs", SectionKind::Envs),
    ("Args", SectionKind::Items),
    ("Returns", SectionKind::Items),
    ("Raises", SectionKind::Items),
    ("Warns", SectionKind::Items),
    ("Items", SectionKind::Items),
    ("See Also", SectionKind::Text),
    ("Notes", SectionKind::Text),
    ("References", SectionKind::Text),
    ("Examples", SectionKind::Text),
    ("Todo", SectionKind::Text),
    ("Text", SectionKind::Text),
];

/// Mapping from section name to the classifier used for its body.
///
/// # Examples
///
/// ```
/// use doc_annotate::SectionRegistry;
///
/// let mut registry = SectionRegistry::default();
/// registry.register_shortcut("Options", "items").unwrap();
/// registry.unregister("Todo");
///
/// assert!(registry.contains("Options"));
/// assert!(!registry.contains("Todo"));
/// assert!(registry.register_shortcut("Bad", "bogus").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SectionRegistry {
    sections: HashMap<String, Arc<dyn SectionClassifier>>,
}

impl Default for SectionRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for (name, kind) in DEFAULT_SECTIONS {
            registry.register(*name, *kind);
        }
        registry
    }
}

impl SectionRegistry {
    /// Creates a registry with no sections at all.
    pub fn empty() -> Self {
        Self {
            sections: HashMap::new(),
        }
    }

    /// Registers (or replaces) a section.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        classifier: impl SectionClassifier + 'static,
    ) {
        self.register_shared(name, Arc::new(classifier));
    }

    pub fn register_shared(
        &mut self,
        name: impl Into<String>,
        classifier: Arc<dyn SectionClassifier>,
    ) {
        let name = name.into();
        debug!(section = %name, kind = classifier.label(), "registering section");
        self.sections.insert(name, classifier);
    }

    /// Registers a built-in kind by its shortcut keyword (`summary`,
    /// `input`, `output`, `envs`, `items`, or `text`).
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::InvalidShortcut`](crate::AnnotateError::InvalidShortcut)
    /// for an unknown keyword; the registry is left unchanged.
    pub fn register_shortcut(&mut self, name: impl Into<String>, shortcut: &str) -> Result<SectionKind> {
        let kind = SectionKind::from_shortcut(shortcut)?;
        self.register(name, kind);
        Ok(kind)
    }

    /// Removes a section. Returns `false` if it was not registered.
    pub fn unregister(&mut self, name: &str) -> bool {
        debug!(section = name, "unregistering section");
        self.sections.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SectionClassifier>> {
        self.sections.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Registered sections with their labels, sorted by name.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .sections
            .iter()
            .map(|(name, classifier)| (name.as_str(), classifier.label()))
            .collect();
        entries.sort_unstable();
        entries
    }
}
