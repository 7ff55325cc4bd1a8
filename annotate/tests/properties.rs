//! Property-based tests for term parsing, rendering, and merging.

use doc_annotate::{
    Annotation, AttrValue, SectionRegistry, SectionValue, Summary, Term, Terms,
    merge_annotations, parse_docstring, parse_terms, render_docstring,
};
use proptest::prelude::*;

/// Lines drawn from the characters that matter to the term grammar.
fn raw_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}: [a-z .]{0,12}",
        "[a-z]{1,6} \\([a-z]{1,3}(:[a-z0-9]{1,3})?\\): [a-z ]{0,8}",
        "    - [a-z]{1,6}: [a-z .]{0,12}",
        "    [a-z>. ]{0,16}",
        "[a-z ():;=-]{0,16}",
        Just(String::new()),
    ]
}

/// Attribute values mix in the characters the header grammar gives meaning to.
fn attr_strategy() -> impl Strategy<Value = (String, AttrValue)> {
    (
        "[a-z]{1,4}",
        prop_oneof![
            Just(AttrValue::Flag),
            "[a-z0-9]{0,5}".prop_map(AttrValue::Text),
            "[a-z0-9;():= ]{1,6}".prop_map(AttrValue::Text),
        ],
    )
}

/// True when some attribute value in the tree cannot sit inside a header.
fn has_unwritable_value(terms: &Terms) -> bool {
    terms.values().any(|term| {
        term.attrs.values().any(|value| match value.as_str() {
            Some(text) => text.contains(';') || text.contains("):") || text.trim() != text,
            None => false,
        }) || has_unwritable_value(&term.terms)
    })
}

/// Single-line help: no sentence ends, so rendering never relies on the
/// joining rules.
fn help_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-z]{1,8}( [a-z]{1,8}){0,3}"]
}

fn term_strategy() -> impl Strategy<Value = Term> {
    let leaf = (help_strategy(), prop::collection::vec(attr_strategy(), 0..3)).prop_map(
        |(help, attrs)| Term {
            attrs: attrs.into_iter().collect(),
            help,
            terms: Terms::new(),
        },
    );
    leaf.prop_recursive(3, 24, 3, |inner| {
        (
            help_strategy(),
            prop::collection::vec(attr_strategy(), 0..3),
            prop::collection::vec(("[a-z]{1,6}", inner), 1..3),
        )
            .prop_map(|(help, attrs, children)| Term {
                attrs: attrs.into_iter().collect(),
                help,
                terms: children.into_iter().collect(),
            })
    })
}

fn terms_strategy() -> impl Strategy<Value = Terms> {
    prop::collection::vec(("[a-z]{1,6}", term_strategy()), 1..5)
        .prop_map(|entries| entries.into_iter().collect())
}

fn annotation_with(args: Terms) -> Annotation {
    let mut annotation = Annotation::new();
    annotation.insert(
        "Summary",
        SectionValue::Summary(Summary {
            short: "Generated".into(),
            long: String::new(),
        }),
    );
    annotation.insert("Args", SectionValue::Items(args));
    annotation
}

proptest! {
    #[test]
    fn prop_term_parsing_is_deterministic(lines in prop::collection::vec(raw_line_strategy(), 0..12)) {
        prop_assert_eq!(parse_terms(&lines), parse_terms(&lines));
    }

    #[test]
    fn prop_rendered_docstring_parses_back(args in terms_strategy()) {
        let unwritable = has_unwritable_value(&args);
        let annotation = annotation_with(args);
        match render_docstring(&annotation) {
            Ok(rendered) => {
                prop_assert!(!unwritable, "rendered an unwritable value:\n{}", rendered);
                let reparsed = parse_docstring(&rendered).unwrap().annotation;
                prop_assert_eq!(reparsed, annotation);
            }
            Err(err) => prop_assert!(unwritable, "rejected a writable tree: {}", err),
        }
    }

    #[test]
    fn prop_merge_with_itself_is_identity(args in terms_strategy()) {
        let annotation = annotation_with(args);
        let merged = merge_annotations(&annotation, &annotation, &SectionRegistry::default());
        prop_assert_eq!(merged, annotation);
    }

    #[test]
    fn prop_merge_leaves_base_untouched(base in terms_strategy(), derived in terms_strategy()) {
        let base = annotation_with(base);
        let snapshot = base.clone();
        let first = merge_annotations(&base, &annotation_with(derived), &SectionRegistry::default());
        let second = merge_annotations(&base, &annotation_with(Terms::new()), &SectionRegistry::default());
        prop_assert_eq!(&base, &snapshot);
        prop_assert_eq!(second.items("Args"), snapshot.items("Args"));
        for name in snapshot.items("Args").unwrap().keys() {
            prop_assert!(first.items("Args").unwrap().contains_key(name));
        }
    }
}
