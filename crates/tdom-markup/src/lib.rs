//! Template markup scanning for tdom/htmpy Python template strings.
//!
//! The body of a template string is a micro-language: HTML-like tags, braced
//! component references (`<{Card} .../>`), and `name=value` attribute lists.
//! This crate extracts that structure and runs the purely textual checks;
//! everything that needs the enclosing Python scope lives in `tdom-python`
//! and `tdom-semantic`.
//!
//! Scanning is stateless and restartable: every entry point re-scans its
//! input from scratch, which keeps results correct under concurrent edits at
//! the cost of redundant work on small inputs.

mod checks;
mod elements;
mod scan;
mod segments;

pub use checks::check_structure;
pub use checks::StructuralError;
pub use elements::is_boolean_attribute;
pub use elements::is_content_element;
pub use elements::is_known_html_element;
pub use elements::is_void_element;
pub use elements::BOOLEAN_ATTRIBUTES;
pub use elements::CONTENT_ELEMENTS;
pub use elements::VOID_ELEMENTS;
pub use scan::scan;
pub use scan::scan_interpolations;
pub use scan::tagged_actual_value;
pub use scan::AttrValue;
pub use scan::AttributeEntry;
pub use scan::ComponentRef;
pub use scan::Interpolation;
pub use scan::TagMatch;
pub use segments::literal_segments;

use tdom_source::Span;

/// Number of characters consumed by the string prefix and opening quotes
/// before the template body starts.
///
/// Matches the quoting conventions the template convention recognizes:
/// `t"""`/`f"""` style → 4, `t"`/`f"` style → 2, bare triple quotes → 3,
/// bare quotes → 1, anything else → 0.
#[must_use]
pub fn literal_prefix_len(literal_text: &str) -> u32 {
    const TRIPLE_PREFIXED: &[&str] = &["t\"\"\"", "f\"\"\"", "t'''", "f'''"];
    const SINGLE_PREFIXED: &[&str] = &["t\"", "f\"", "t'", "f'"];
    const TRIPLE: &[&str] = &["\"\"\"", "'''"];
    const SINGLE: &[&str] = &["\"", "'"];

    if TRIPLE_PREFIXED.iter().any(|p| literal_text.starts_with(p)) {
        4
    } else if TRIPLE.iter().any(|p| literal_text.starts_with(p)) {
        3
    } else if SINGLE_PREFIXED.iter().any(|p| literal_text.starts_with(p)) {
        2
    } else if SINGLE.iter().any(|p| literal_text.starts_with(p)) {
        1
    } else {
        0
    }
}

/// Slice the template body out of a string literal token, given the prefix
/// length computed by [`literal_prefix_len`].
///
/// The closing quotes are stripped when present; an unterminated literal
/// (mid-edit) keeps its tail.
#[must_use]
pub fn literal_body(literal_text: &str, prefix_len: u32) -> (&str, Span) {
    let prefix = prefix_len as usize;
    if prefix > literal_text.len() {
        return ("", Span::new(prefix_len, 0));
    }
    let rest = &literal_text[prefix..];

    let quote_len = match prefix_len {
        4 | 3 => 3,
        2 | 1 => 1,
        _ => 0,
    };
    let closing: &str = if quote_len == 3 {
        if literal_text[..prefix].ends_with('\'') {
            "'''"
        } else {
            "\"\"\""
        }
    } else if quote_len == 1 {
        if literal_text[..prefix].ends_with('\'') {
            "'"
        } else {
            "\""
        }
    } else {
        ""
    };

    let body = if !closing.is_empty() && rest.ends_with(closing) && rest.len() >= closing.len() {
        &rest[..rest.len() - closing.len()]
    } else {
        rest
    };

    (body, Span::from_parts(prefix, body.len()))
}
