//! Annotation merging with fixed precedence rules.
//!
//! When an entity inherits documentation from a base entity, each of its
//! sections is merged onto the base section of the same name. Item sections
//! are merged term by term and attribute by attribute; summaries field by
//! field; free text is replaced wholesale.
//!
//! Every function here takes both sides by reference and builds a new value,
//! so a base annotation can be shared by any number of derived entities.
//!
//! # Example
//!
//! ```
//! use doc_annotate_core::*;
//!
//! let mut base = Terms::new();
//! base.insert("ncores", Term::new("Number of cores").with_attr("type", "int"));
//! base.insert("outdir", Term::new("Output directory"));
//!
//! let mut derived = Terms::new();
//! derived.insert("ncores", Term::new("").with_attr("choices", AttrValue::Flag));
//!
//! let merged = merge_terms(&base, &derived);
//! let ncores = merged.get("ncores").unwrap();
//! assert_eq!(ncores.help, "Number of cores");
//! assert_eq!(ncores.attrs.keys().collect::<Vec<_>>(), vec!["type", "choices"]);
//! assert!(merged.contains_key("outdir"));
//! ```

use crate::{Attrs, SectionKind, SectionValue, Summary, Term, Terms, TextBlock};

/// Unions two attribute sets; derived values win on key collision.
///
/// Base attributes keep their order; attributes only the derived side
/// declares are appended in derived order.
pub fn merge_attrs(base: &Attrs, derived: &Attrs) -> Attrs {
    let mut merged = base.clone();
    for (name, value) in derived.iter() {
        merged.insert(name, value.clone());
    }
    merged
}

/// Merges a derived term onto a base term of the same name.
///
/// The derived help wins when non-empty, attributes are unioned by
/// [`merge_attrs`], and children are merged recursively by [`merge_terms`].
pub fn merge_term(base: &Term, derived: &Term) -> Term {
    let help = if derived.help.is_empty() {
        base.help.clone()
    } else {
        derived.help.clone()
    };

    Term {
        attrs: merge_attrs(&base.attrs, &derived.attrs),
        help,
        terms: merge_terms(&base.terms, &derived.terms),
    }
}

/// Deep-merges two term maps.
///
/// Terms only in `base` are kept unchanged, terms only in `derived` are
/// appended, and terms in both are combined by [`merge_term`].
pub fn merge_terms(base: &Terms, derived: &Terms) -> Terms {
    let mut merged = base.clone();
    for (name, term) in derived.iter() {
        let next = match base.get(name) {
            Some(existing) => merge_term(existing, term),
            None => term.clone(),
        };
        merged.insert(name, next);
    }
    merged
}

/// Merges summaries field by field; non-empty derived fields win.
pub fn merge_summary(base: &Summary, derived: &Summary) -> Summary {
    let pick = |base: &str, derived: &str| {
        if derived.is_empty() {
            base.to_string()
        } else {
            derived.to_string()
        }
    };

    Summary {
        short: pick(&base.short, &derived.short),
        long: pick(&base.long, &derived.long),
    }
}

/// Replaces the base text with the derived text unless the latter is empty.
pub fn merge_text(base: &TextBlock, derived: &TextBlock) -> TextBlock {
    if derived.is_empty() {
        base.clone()
    } else {
        derived.clone()
    }
}

/// Merges two parsed sections according to `kind`.
///
/// When the two values do not have the shape `kind` expects (for example a
/// section that was re-registered with another kind between parses), the
/// derived value replaces the base value.
pub fn merge_section(kind: SectionKind, base: &SectionValue, derived: &SectionValue) -> SectionValue {
    match (base, derived) {
        (SectionValue::Summary(b), SectionValue::Summary(d)) if kind == SectionKind::Summary => {
            SectionValue::Summary(merge_summary(b, d))
        }
        (SectionValue::Text(b), SectionValue::Text(d)) if kind == SectionKind::Text => {
            SectionValue::Text(merge_text(b, d))
        }
        (SectionValue::Items(b), SectionValue::Items(d)) if kind.is_items() => {
            SectionValue::Items(merge_terms(b, d))
        }
        _ => derived.clone(),
    }
}
