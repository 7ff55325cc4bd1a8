//! Output formatting for annotations.

use doc_annotate_core::{
    Annotation, AttrValue, Attrs, OrderedMap, SUMMARY_SECTION, SectionValue, Summary, Terms,
};

const INDENT: &str = "    ";

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    /// The annotation written back as a structured docstring.
    Docstring,
}

/// Formats one annotation in the requested output format.
pub fn format_annotation(annotation: &Annotation, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(annotation)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(annotation).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Docstring => render_docstring(annotation),
    }
}

/// Formats several named annotations in the requested output format.
pub fn format_annotations(
    annotations: &OrderedMap<Annotation>,
    format: OutputFormat,
) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(annotations)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => serde_yaml::to_string(annotations)
            .map_err(|e| format!("YAML serialization failed: {e}")),
        OutputFormat::Docstring => {
            let blocks = annotations
                .iter()
                .map(|(name, annotation)| {
                    render_docstring(annotation)
                        .map(|doc| format!("# {name}\n\n{doc}"))
                        .map_err(|e| format!("{name}: {e}"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(blocks.join("\n"))
        }
    }
}

/// Writes an annotation back in docstring syntax.
///
/// Parsing the result with the same registry yields the same sections,
/// terms, and string attributes. Multi-line help is written as a literal
/// (`|`) block so its line breaks survive.
///
/// # Errors
///
/// Fails, naming the section, term, and attribute, when an attribute value
/// cannot be written inside a term header: it spans lines, contains `;` or
/// `):`, or has leading or trailing whitespace.
///
/// # Examples
///
/// ```
/// use doc_annotate::{parse_docstring, render_docstring};
///
/// let doc = "Sort a file\n\nArgs:\n    key (type=str; required): Sort key\n";
/// let annotation = parse_docstring(doc).unwrap().annotation;
/// assert_eq!(
///     render_docstring(&annotation).unwrap(),
///     "Sort a file\n\nArgs:\n    key (type:str; required): Sort key\n"
/// );
/// ```
pub fn render_docstring(annotation: &Annotation) -> Result<String, String> {
    let mut blocks = Vec::with_capacity(annotation.len());
    for (name, value) in annotation.iter() {
        let mut block = String::new();
        match value {
            SectionValue::Summary(summary) if name == SUMMARY_SECTION => {
                push_summary(&mut block, summary, "");
            }
            SectionValue::Summary(summary) => {
                block.push_str(&format!("{name}:\n"));
                push_summary(&mut block, summary, INDENT);
            }
            SectionValue::Text(text) => {
                block.push_str(&format!("{name}:\n"));
                for line in &text.lines {
                    push_line(&mut block, INDENT, line);
                }
            }
            SectionValue::Items(terms) => {
                block.push_str(&format!("{name}:\n"));
                push_terms(&mut block, terms, 1, "")
                    .map_err(|e| format!("cannot render section {name}: {e}"))?;
            }
        }
        let block = block.trim_end();
        if !block.is_empty() {
            blocks.push(block.to_string());
        }
    }

    if blocks.is_empty() {
        return Ok(String::new());
    }
    let mut out = blocks.join("\n\n");
    out.push('\n');
    Ok(out)
}

fn push_line(out: &mut String, indent: &str, line: &str) {
    if !line.is_empty() {
        out.push_str(indent);
        out.push_str(line);
    }
    out.push('\n');
}

fn push_summary(out: &mut String, summary: &Summary, indent: &str) {
    push_line(out, indent, &summary.short);
    if !summary.long.is_empty() {
        out.push('\n');
        for line in summary.long.lines() {
            push_line(out, indent, line);
        }
    }
}

fn push_terms(out: &mut String, terms: &Terms, depth: usize, bullet: &str) -> Result<(), String> {
    let pad = INDENT.repeat(depth);
    let body_pad = INDENT.repeat(depth + 1);
    for (name, term) in terms.iter() {
        let attrs = render_attrs(&term.attrs).map_err(|e| format!("term {name}: {e}"))?;
        out.push_str(&format!("{pad}{bullet}{name}{attrs}:"));
        if term.help.contains('\n') || term.help == "|" {
            out.push_str(" |\n");
            for line in term.help.lines() {
                push_line(out, &body_pad, line);
            }
        } else if term.help.is_empty() {
            out.push('\n');
        } else {
            out.push_str(&format!(" {}\n", term.help));
        }
        push_terms(out, &term.terms, depth + 1, "- ")?;
    }
    Ok(())
}

fn render_attrs(attrs: &Attrs) -> Result<String, String> {
    if attrs.is_empty() {
        return Ok(String::new());
    }
    let mut clauses = Vec::with_capacity(attrs.len());
    for (name, value) in attrs.iter() {
        if value.is_flag() {
            clauses.push(name.to_string());
            continue;
        }
        let text = value.to_string();
        if let Some(problem) = header_conflict(&text) {
            return Err(format!("attribute {name} value {text:?} {problem}"));
        }
        clauses.push(format!("{name}:{text}"));
    }
    Ok(format!(" ({})", clauses.join("; ")))
}

/// Reports why `value` would not parse back from a term header unchanged.
fn header_conflict(value: &str) -> Option<&'static str> {
    if value.contains(|c: char| c == '\n' || c == '\r') {
        Some("spans several lines")
    } else if value.contains(';') {
        Some("contains ';'")
    } else if value.contains("):") {
        Some("contains '):'")
    } else if value.trim() != value {
        Some("has leading or trailing whitespace")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_docstring;
    use doc_annotate_core::{Term, TextBlock};

    #[test]
    fn test_json_output_shape() {
        let annotation = parse_docstring("Short\n\nArgs:\n    a (flag): help\n")
            .unwrap()
            .annotation;
        let json: serde_json::Value =
            serde_json::from_str(&format_annotation(&annotation, OutputFormat::Json).unwrap())
                .unwrap();
        assert_eq!(json["Summary"]["short"], "Short");
        assert_eq!(json["Args"]["a"]["attrs"]["flag"], true);
        assert_eq!(json["Args"]["a"]["help"], "help");
    }

    #[test]
    fn test_yaml_output_parses_back() {
        let annotation = parse_docstring("Short\n\nNotes:\n    one\n\n    two\n")
            .unwrap()
            .annotation;
        let yaml = format_annotation(&annotation, OutputFormat::Yaml).unwrap();
        let back: Annotation = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, annotation);
    }

    #[test]
    fn test_docstring_round_trip() {
        let doc = "\
Short summary

Long summary line.

Args:
    a (x:1; y): help a.
        Second sentence.
        - child: child help
            - grandchild:
    b: plain

Notes:
    first

    second
";
        let annotation = parse_docstring(doc).unwrap().annotation;
        let rendered = render_docstring(&annotation).unwrap();
        let reparsed = parse_docstring(&rendered).unwrap().annotation;
        assert_eq!(reparsed, annotation);
        assert!(rendered.contains("    a (x:1; y): |\n        help a.\n        Second sentence.\n"));
    }

    #[test]
    fn test_render_text_and_custom_summary() {
        let mut annotation = Annotation::new();
        annotation.insert(
            "Overview",
            SectionValue::Summary(Summary {
                short: "Brief".into(),
                long: "Longer".into(),
            }),
        );
        annotation.insert(
            "Notes",
            SectionValue::Text(TextBlock {
                lines: vec!["a".into(), String::new(), "b".into()],
            }),
        );
        let mut terms = Terms::new();
        terms.insert("n", Term::new("").with_attr("default", AttrValue::Value(serde_json::json!(3))));
        annotation.insert("Envs", SectionValue::Items(terms));

        assert_eq!(
            render_docstring(&annotation).unwrap(),
            "Overview:\n    Brief\n\n    Longer\n\nNotes:\n    a\n\n    b\n\nEnvs:\n    n (default:3):\n"
        );
    }

    #[test]
    fn test_empty_annotation_renders_nothing() {
        assert_eq!(render_docstring(&Annotation::new()).unwrap(), "");
    }

    #[test]
    fn test_format_many_docstrings() {
        let mut many = OrderedMap::new();
        many.insert("A", parse_docstring("A doc").unwrap().annotation);
        many.insert("B", parse_docstring("B doc").unwrap().annotation);
        assert_eq!(
            format_annotations(&many, OutputFormat::Docstring).unwrap(),
            "# A\n\nA doc\n\n# B\n\nB doc\n"
        );
    }

    fn envs_annotation(envs: serde_json::Value) -> Annotation {
        let serde_json::Value::Object(envs) = envs else {
            panic!("envs must be an object");
        };
        let schema = doc_annotate_core::EntitySchema::default().with_envs(envs);
        crate::parse_docstring_with(
            &crate::SectionRegistry::default(),
            "Proc",
            Some(&schema),
            "Proc\n\nEnvs:\n    label: Label\n",
        )
        .unwrap()
        .annotation
    }

    #[test]
    fn test_grammar_breaking_values_are_rejected() {
        for (value, problem) in [
            ("a;b", "contains ';'"),
            ("x (y): z", "contains '):'"),
            (" padded", "has leading or trailing whitespace"),
            ("two\nlines", "spans several lines"),
        ] {
            let annotation = envs_annotation(serde_json::json!({"label": value}));
            let err = render_docstring(&annotation).unwrap_err();
            assert!(err.contains("section Envs"), "{err}");
            assert!(err.contains("term label"), "{err}");
            assert!(err.contains("attribute default"), "{err}");
            assert!(err.contains(problem), "{err}");
            assert!(format_annotation(&annotation, OutputFormat::Docstring).is_err());
        }
    }

    #[test]
    fn test_error_names_the_entity_among_many() {
        let mut many = OrderedMap::new();
        many.insert("Fine", parse_docstring("Fine doc").unwrap().annotation);
        many.insert("Broken", envs_annotation(serde_json::json!({"sep": "a;b"})));
        let err = format_annotations(&many, OutputFormat::Docstring).unwrap_err();
        assert!(err.starts_with("Broken: cannot render section Envs: term sep"), "{err}");
    }

    #[test]
    fn test_grammar_characters_that_survive_round_trip() {
        let annotation = envs_annotation(serde_json::json!({
            "label": "f(x) = y: z",
            "ratio": "1:2",
            "empty": "",
        }));
        let rendered = render_docstring(&annotation).unwrap();
        let reparsed = parse_docstring(&rendered).unwrap().annotation;
        assert_eq!(reparsed.items("Envs"), annotation.items("Envs"));
    }

    #[test]
    fn test_schema_reconciled_annotation_survives_json_and_yaml() {
        let annotation = envs_annotation(serde_json::json!({
            "label": "text",
            "verbose": true,
            "ncores": 2,
            "keys": ["a", "b"],
            "opts": {"depth": 1.5},
        }));
        let json = format_annotation(&annotation, OutputFormat::Json).unwrap();
        assert_eq!(serde_json::from_str::<Annotation>(&json).unwrap(), annotation);
        let yaml = format_annotation(&annotation, OutputFormat::Yaml).unwrap();
        assert_eq!(serde_yaml::from_str::<Annotation>(&yaml).unwrap(), annotation);
    }
}
