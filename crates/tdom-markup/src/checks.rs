//! Structural checks over raw template text.
//!
//! Each check is regex-driven, independent, and shares no state with the tag
//! scanner: it takes the template body plus the quoting prefix length and
//! yields zero or more [`StructuralError`]s with spans relative to the string
//! literal token (prefix included).

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tdom_source::Span;
use thiserror::Error;

use crate::elements::is_known_html_element;
use crate::elements::BOOLEAN_ATTRIBUTES;
use crate::elements::CONTENT_ELEMENTS;
use crate::elements::VOID_ELEMENTS;

#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
pub enum StructuralError {
    #[error("Void element '<{tag}>' cannot have children")]
    VoidElementWithChildren { tag: String, span: Span },

    #[error("Mismatched closing tag '</{{{closing}}}>' for component '<{{{opening}}}>'")]
    MismatchedClosingTag {
        opening: String,
        closing: String,
        span: Span,
    },

    #[error(
        "Component name must be in curly braces: '<{tag}>' should be '<{{{tag}}}>'"
    )]
    MissingComponentBraces { tag: String, span: Span },

    #[error("Interpolated content in '<{element}>' should use :safe if content is trusted")]
    UnsafeInterpolation { element: String, span: Span },

    #[error("Attribute '{attribute}' should use boolean value instead of string \"{value}\"")]
    BooleanAttributeString {
        attribute: String,
        value: String,
        span: Span,
    },

    #[error("Empty template returns empty Fragment - this may be unintentional")]
    EmptyTemplate { span: Span },
}

impl StructuralError {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            StructuralError::VoidElementWithChildren { span, .. }
            | StructuralError::MismatchedClosingTag { span, .. }
            | StructuralError::MissingComponentBraces { span, .. }
            | StructuralError::UnsafeInterpolation { span, .. }
            | StructuralError::BooleanAttributeString { span, .. }
            | StructuralError::EmptyTemplate { span } => *span,
        }
    }
}

static VOID_ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"<({})(?:\s[^>]*)?>([^<]+)<",
        VOID_ELEMENTS.join("|")
    ))
    .unwrap()
});

static PASCAL_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Z][a-zA-Z0-9]*)(?:\s[^>]*)?>").unwrap());

static OPENING_COMPONENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\{([^}]+)\}[^>]*>").unwrap());

static CLOSING_COMPONENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</\{([^}]+)\}>").unwrap());

static INTERPOLATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^}:]+)\}").unwrap());

static BOOLEAN_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"({})=["'](true|false)["']"#,
        BOOLEAN_ATTRIBUTES.join("|")
    ))
    .unwrap()
});

/// Run every structural check over one template body.
#[must_use]
pub fn check_structure(body: &str, prefix_len: u32) -> Vec<StructuralError> {
    let mut errors = Vec::new();
    check_void_elements(body, prefix_len, &mut errors);
    check_mismatched_closing_tags(body, prefix_len, &mut errors);
    check_missing_component_braces(body, prefix_len, &mut errors);
    check_content_elements(body, prefix_len, &mut errors);
    check_boolean_attributes(body, prefix_len, &mut errors);
    check_empty_template(body, prefix_len, &mut errors);
    errors
}

/// Void elements cannot have children: `<br>content<` is flagged when the
/// content is non-empty after trimming.
pub fn check_void_elements(body: &str, prefix_len: u32, errors: &mut Vec<StructuralError>) {
    for caps in VOID_ELEMENT_RE.captures_iter(body) {
        let whole = caps.get(0).expect("group 0");
        let tag = &caps[1];
        let content = caps[2].trim();
        if !content.is_empty() {
            errors.push(StructuralError::VoidElementWithChildren {
                tag: tag.to_string(),
                span: Span::from_parts(whole.start(), whole.len()).shift(prefix_len),
            });
        }
    }
}

/// Positional open/close pairing: the Nth opening component tag pairs with
/// the Nth closing tag in document order. This is a deliberate simplification
/// rather than a nested-tag matcher; each mismatched pair is reported once,
/// at the closing tag.
pub fn check_mismatched_closing_tags(
    body: &str,
    prefix_len: u32,
    errors: &mut Vec<StructuralError>,
) {
    let openings: Vec<_> = OPENING_COMPONENT_RE.captures_iter(body).collect();
    let closings: Vec<_> = CLOSING_COMPONENT_RE.captures_iter(body).collect();

    for (index, opening) in openings.iter().enumerate() {
        let Some(closing) = closings.get(index) else {
            continue;
        };
        let opening_name = opening[1].trim().to_string();
        let closing_name = closing[1].trim().to_string();
        if opening_name != closing_name {
            let whole = closing.get(0).expect("group 0");
            errors.push(StructuralError::MismatchedClosingTag {
                opening: opening_name,
                closing: closing_name,
                span: Span::from_parts(whole.start(), whole.len()).shift(prefix_len),
            });
        }
    }
}

/// A PascalCase tag without braces is a component reference the author forgot
/// to wrap — unless its lowercase form is a known HTML element.
pub fn check_missing_component_braces(
    body: &str,
    prefix_len: u32,
    errors: &mut Vec<StructuralError>,
) {
    for caps in PASCAL_TAG_RE.captures_iter(body) {
        let whole = caps.get(0).expect("group 0");
        let tag = &caps[1];
        if !is_known_html_element(tag) {
            // Span covers `<` plus the tag name.
            errors.push(StructuralError::MissingComponentBraces {
                tag: tag.to_string(),
                span: Span::from_parts(whole.start(), tag.len() + 1).shift(prefix_len),
            });
        }
    }
}

/// Interpolations inside content elements must carry `:safe`; the body is
/// matched across newlines.
pub fn check_content_elements(body: &str, prefix_len: u32, errors: &mut Vec<StructuralError>) {
    for element in CONTENT_ELEMENTS {
        let pattern = Regex::new(&format!(r"(?s)<{element}[^>]*>(.*?)</{element}>"))
            .expect("content element patterns are static");
        for caps in pattern.captures_iter(body) {
            let content = caps.get(1).expect("content group");
            for hole in INTERPOLATION_RE.find_iter(content.as_str()) {
                let start = content.start() + hole.start();
                errors.push(StructuralError::UnsafeInterpolation {
                    element: (*element).to_string(),
                    span: Span::from_parts(start, hole.len()).shift(prefix_len),
                });
            }
        }
    }
}

/// Boolean attributes given the string `"true"`/`"false"` instead of a
/// boolean expression.
pub fn check_boolean_attributes(body: &str, prefix_len: u32, errors: &mut Vec<StructuralError>) {
    for caps in BOOLEAN_ATTR_RE.captures_iter(body) {
        let whole = caps.get(0).expect("group 0");
        errors.push(StructuralError::BooleanAttributeString {
            attribute: caps[1].to_string(),
            value: caps[2].to_string(),
            span: Span::from_parts(whole.start(), whole.len()).shift(prefix_len),
        });
    }
}

/// A zero-length body is flagged once, at the position right after the
/// quoting prefix.
pub fn check_empty_template(body: &str, prefix_len: u32, errors: &mut Vec<StructuralError>) {
    if body.is_empty() {
        errors.push(StructuralError::EmptyTemplate {
            span: Span::new(prefix_len, 0),
        });
    }
}
