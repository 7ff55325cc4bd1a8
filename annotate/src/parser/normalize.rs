//! Docstring text normalization utilities.

use doc_annotate_core::is_identifier;

/// Marker that starts an interactive example line inside help text.
pub const CODE_MARKER: &str = ">>> ";

/// Removes the longest common leading whitespace from every line.
///
/// Whitespace-only lines do not take part in the computation and come out
/// empty.
pub fn dedent<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut margin: Option<&str> = None;
    for line in lines.iter().map(AsRef::as_ref) {
        if line.trim().is_empty() {
            continue;
        }
        let indent = &line[..line.len() - line.trim_start_matches([' ', '\t']).len()];
        margin = Some(match margin {
            None => indent,
            Some(current) => common_prefix(current, indent),
        });
    }

    let cut = margin.map_or(0, str::len);
    lines
        .iter()
        .map(AsRef::as_ref)
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                line[cut..].to_string()
            }
        })
        .collect()
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..len]
}

/// Splits a raw docstring into lines with its indentation normalized.
///
/// A docstring starting with whitespace is dedented as a whole. Otherwise
/// the first line is taken to sit at column zero already (as it does right
/// after the opening quotes) and only the remaining lines are dedented.
pub fn normalize_docstring(raw: &str) -> Vec<String> {
    let raw = raw.replace("\r\n", "\n");
    if raw.starts_with([' ', '\t']) {
        let lines: Vec<&str> = raw.lines().collect();
        return dedent(&lines);
    }

    let mut lines = raw.lines();
    let Some(first) = lines.next() else {
        return Vec::new();
    };
    let rest: Vec<&str> = lines.collect();

    let mut normalized = Vec::with_capacity(rest.len() + 1);
    normalized.push(first.to_string());
    normalized.extend(dedent(&rest));
    normalized
}

/// Returns `true` if the line ends a sentence.
pub fn end_of_sentence(line: &str) -> bool {
    line.ends_with(['.', '?', '!', ':'])
}

/// Returns `true` for an interactive example line (`>>> code`).
pub fn is_code_line(line: &str) -> bool {
    line.starts_with(CODE_MARKER) || line == CODE_MARKER.trim_end()
}

/// Collapses runs of empty lines into one and drops leading and trailing
/// empty lines.
pub fn cleanup_empty_lines(lines: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        let blank = line.trim().is_empty();
        if blank && out.last().is_none_or(|prev| prev.is_empty()) {
            continue;
        }
        out.push(if blank { String::new() } else { line });
    }
    if out.last().is_some_and(String::is_empty) {
        out.pop();
    }
    out
}

/// Drops empty lines at both ends, keeping inner ones.
pub fn strip_blank_edges(mut lines: Vec<String>) -> Vec<String> {
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    let start = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());
    lines.drain(..start);
    lines
}

/// Returns `true` if `text` (a line without its trailing colon) is shaped
/// like a section header: words separated by single spaces that form an
/// identifier once the spaces are removed.
pub fn is_section_header(text: &str) -> bool {
    !text.starts_with(' ') && is_identifier(&text.replace(' ', ""))
}
