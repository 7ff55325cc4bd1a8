//! Whole-annotation merging across an inheritance link.

use tracing::debug;

use doc_annotate_core::{Annotation, SectionKind};

use crate::registry::SectionRegistry;

/// Merges a derived entity's annotation onto its base entity's annotation.
///
/// Sections present on both sides are merged by the classifier registered
/// for the section name. Unregistered names are parsed as free text, so they
/// merge by the text rule: a non-empty derived text replaces the base text.
/// Sections present on one side only are kept. Base sections keep their order, derived-only sections follow.
///
/// # Examples
///
/// ```
/// use doc_annotate::{SectionRegistry, merge_annotations, parse_docstring};
///
/// let base = parse_docstring("Base summary\n\nArgs:\n    a: help a\n    b: help b\n")
///     .unwrap()
///     .annotation;
/// let derived = parse_docstring("\n\nArgs:\n    b: better b\n").unwrap().annotation;
///
/// let merged = merge_annotations(&base, &derived, &SectionRegistry::default());
/// let args = merged.items("Args").unwrap();
/// assert_eq!(args.get("a").unwrap().help, "help a");
/// assert_eq!(args.get("b").unwrap().help, "better b");
/// assert_eq!(merged.summary().unwrap().short, "Base summary");
/// ```
pub fn merge_annotations(
    base: &Annotation,
    derived: &Annotation,
    registry: &SectionRegistry,
) -> Annotation {
    let mut merged = base.clone();
    for (name, value) in derived.iter() {
        let next = match (base.section(name), registry.get(name)) {
            (Some(base_value), Some(classifier)) => classifier.merge(base_value, value),
            (Some(base_value), None) => {
                debug!(section = name, "section not registered, merging as text");
                SectionKind::Text.merge(base_value, value)
            }
            (None, _) => value.clone(),
        };
        merged.insert(name, next);
    }
    merged
}
