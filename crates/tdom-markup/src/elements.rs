//! HTML element and attribute allow-lists used by the structural checks.
//!
//! These sets are part of the observable behavior of the checks and must not
//! drift: membership decides whether a tag is flagged at all.

/// Elements that cannot have children or content.
pub const VOID_ELEMENTS: &[&str] = &[
    "br", "hr", "img", "input", "meta", "link", "area", "base", "col", "embed", "source", "track",
    "wbr",
];

/// Elements whose body is raw text/script rather than nested markup.
pub const CONTENT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Attributes that take a boolean, not the strings `"true"`/`"false"`.
pub const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "disabled",
    "checked",
    "readonly",
    "required",
    "autofocus",
    "autoplay",
    "controls",
    "default",
    "defer",
    "hidden",
    "ismap",
    "loop",
    "multiple",
    "muted",
    "novalidate",
    "open",
    "reversed",
    "selected",
    "async",
];

/// Standard HTML5 element names, excluding void and content elements
/// (those are appended by [`is_known_html_element`]).
const HTML_ELEMENTS: &[&str] = &[
    "a",
    "abbr",
    "address",
    "article",
    "aside",
    "audio",
    "b",
    "bdi",
    "bdo",
    "blockquote",
    "body",
    "button",
    "canvas",
    "caption",
    "cite",
    "code",
    "colgroup",
    "data",
    "datalist",
    "dd",
    "del",
    "details",
    "dfn",
    "dialog",
    "div",
    "dl",
    "dt",
    "em",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "head",
    "header",
    "hgroup",
    "html",
    "i",
    "iframe",
    "ins",
    "kbd",
    "label",
    "legend",
    "li",
    "main",
    "map",
    "mark",
    "menu",
    "meter",
    "nav",
    "noscript",
    "object",
    "ol",
    "optgroup",
    "option",
    "output",
    "p",
    "picture",
    "pre",
    "progress",
    "q",
    "rp",
    "rt",
    "ruby",
    "s",
    "samp",
    "section",
    "select",
    "slot",
    "small",
    "span",
    "strong",
    "sub",
    "summary",
    "sup",
    "table",
    "tbody",
    "td",
    "template",
    "tfoot",
    "th",
    "thead",
    "time",
    "tr",
    "u",
    "ul",
    "var",
    "video",
];

#[must_use]
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

#[must_use]
pub fn is_content_element(name: &str) -> bool {
    CONTENT_ELEMENTS.contains(&name)
}

#[must_use]
pub fn is_boolean_attribute(name: &str) -> bool {
    BOOLEAN_ATTRIBUTES.contains(&name)
}

/// Case-insensitive membership in the known HTML element set.
///
/// Callers pass the lowercased form of a PascalCase tag name; a hit means the
/// tag is plain HTML spelled oddly rather than a component missing braces.
#[must_use]
pub fn is_known_html_element(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    HTML_ELEMENTS.contains(&lower.as_str())
        || VOID_ELEMENTS.contains(&lower.as_str())
        || CONTENT_ELEMENTS.contains(&lower.as_str())
}
