//! The template markup scanner.
//!
//! Treats the body of a Python template string as a micro-language: HTML-like
//! tags, braced component references in tag position, and `name=value`
//! attribute lists. Scanning is regex-driven and deliberately permissive — a
//! tag with no unambiguous close extends to the end of its line so the scanner
//! stays useful on partially-typed code.
//!
//! Scanning is stateless: every call re-scans the body from scratch and two
//! scans of identical text yield identical results.

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashSet;
use serde::Serialize;
use tdom_source::Span;

/// Maximal tag-like span containing a braced reference. The trailing
/// alternative prefers an explicit `/>` close and otherwise consumes the rest
/// of the line.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*\{[^}]*\}[^/>]*(/\s*>|(?m:.*$))").unwrap());

/// A braced reference. The first occurrence inside a tag is the component
/// slot candidate.
static BRACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^}]*)\}").unwrap());

/// Attribute value shapes, tried in this order per key; the first pattern to
/// claim a key wins. The ordering is an observable tie-break.
static ATTR_BRACED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([^=}\s]+)=(\{[^"}]*\})"#).unwrap());
static ATTR_BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([^=}\s]+)=([^\s/>"{][^\s/>]*)"#).unwrap());
static ATTR_QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([^=}\s]+)="([^"]*)"#).unwrap());

/// `name=` followed by whitespace only. Disjoint from the main key map; feeds
/// the "Expression expected" diagnostic.
static ATTR_EMPTY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^=}\s]+)=(\s+)").unwrap());

static SELF_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\A/\s*>\z").unwrap());

/// A contiguous `<...>` span extracted from a template body.
///
/// All spans are relative to the template body passed to [`scan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagMatch {
    pub span: Span,
    pub text: String,
    /// The braced component slot, present only for component tags.
    pub component: Option<ComponentRef>,
    pub attributes: Vec<AttributeEntry>,
    /// Keys whose value is whitespace only ("expression expected").
    pub empty_attributes: Vec<AttributeEntry>,
    pub self_closing: bool,
}

/// The `{Name}` slot of a component tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentRef {
    /// Identifier text inside the braces, trimmed.
    pub name: String,
    /// Span of `{...}` including the braces.
    pub span: Span,
    /// Span of the trimmed identifier.
    pub name_span: Span,
}

/// One `name=value` pair inside a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeEntry {
    pub name: String,
    pub name_span: Span,
    pub value: AttrValue,
    pub value_span: Span,
    /// Span of the whole `name=value` text.
    pub span: Span,
}

/// The three recognized attribute value shapes, plus the whitespace-only
/// state that signals "expression expected".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AttrValue {
    /// `name={expr}` — raw text including the braces.
    Braced(String),
    /// `name="..."` — content without the quotes.
    Quoted(String),
    /// `name=word` — raw text.
    Bare(String),
    /// `name=` followed by whitespace.
    Empty,
}

impl AttrValue {
    /// The value rewritten as a standalone Python expression fragment.
    ///
    /// Braced values strip their braces; quoted values that wrap a brace pair
    /// strip both; anything else is a string literal (barewords get quoted).
    #[must_use]
    pub fn actual_text(&self) -> String {
        match self {
            AttrValue::Braced(raw) | AttrValue::Bare(raw) => tagged_actual_value(raw),
            AttrValue::Quoted(content) => {
                if content.starts_with('{') && content.ends_with('}') && content.len() >= 2 {
                    content[1..content.len() - 1].to_string()
                } else {
                    format!("\"{content}\"")
                }
            }
            AttrValue::Empty => String::new(),
        }
    }

    /// The embedded expression and its byte offset within the value span,
    /// when the value is an expression rather than a literal.
    #[must_use]
    pub fn expression(&self) -> Option<(&str, u32)> {
        let (raw, offset) = match self {
            AttrValue::Braced(raw) | AttrValue::Bare(raw) => (raw.as_str(), 1),
            AttrValue::Quoted(content) => (content.as_str(), 1),
            AttrValue::Empty => return None,
        };
        if raw.starts_with('{') && raw.ends_with('}') && raw.len() >= 2 {
            Some((&raw[1..raw.len() - 1], offset))
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_empty_text(&self) -> bool {
        match self {
            AttrValue::Braced(raw) | AttrValue::Bare(raw) => raw.is_empty(),
            AttrValue::Quoted(content) => content.is_empty(),
            AttrValue::Empty => true,
        }
    }
}

/// Port of the template convention for reading an attribute value as an
/// expression: `"{expr}"` and `{expr}` unwrap to `expr`, `"text"` stays a
/// string literal, a bareword becomes one.
#[must_use]
pub fn tagged_actual_value(value: &str) -> String {
    if value.starts_with("\"{") && value.ends_with("}\"") && value.len() >= 4 {
        value[2..value.len() - 2].to_string()
    } else if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        value.to_string()
    } else if value.starts_with('{') && value.ends_with('}') && value.len() >= 2 {
        value[1..value.len() - 1].to_string()
    } else {
        format!("\"{value}\"")
    }
}

/// A bare `{ident}` interpolation outside tag position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interpolation {
    pub text: String,
    pub span: Span,
    pub name_span: Span,
}

/// Scan a template body into tag matches.
///
/// Only tags carrying a braced component slot candidate are matched; plain
/// HTML tags are handled by the structural checks over raw text.
#[must_use]
pub fn scan(body: &str) -> Vec<TagMatch> {
    let mut tags = Vec::new();

    for caps in TAG_RE.captures_iter(body) {
        let whole = caps.get(0).expect("match group 0 always present");
        let tag_start = whole.start();
        let tag_text = whole.as_str();

        let closer = caps.get(1).map_or("", |m| m.as_str());
        let self_closing = SELF_CLOSE_RE.is_match(closer);

        let component = extract_component(tag_text, tag_start);
        let (attributes, empty_attributes) = extract_attributes(tag_text, tag_start);

        tags.push(TagMatch {
            span: Span::from_bounds(tag_start, whole.end()),
            text: tag_text.to_string(),
            component,
            attributes,
            empty_attributes,
            self_closing,
        });
    }

    tags
}

/// Fallback pass: bare `{ident}` interpolations not preceded by `<`.
///
/// Used by the reference adapter and the unused-variable suppression when the
/// primary pass finds no tags.
#[must_use]
pub fn scan_interpolations(body: &str) -> Vec<Interpolation> {
    let mut holes = Vec::new();
    for caps in BRACE_RE.captures_iter(body) {
        let whole = caps.get(0).expect("match group 0 always present");
        if whole.start() > 0 && body.as_bytes()[whole.start() - 1] == b'<' {
            continue;
        }
        let inner = caps.get(1).expect("brace pattern has one group");
        let (name_start, trimmed) = trim_with_offset(inner.as_str(), inner.start());
        holes.push(Interpolation {
            text: trimmed.to_string(),
            span: Span::from_bounds(whole.start(), whole.end()),
            name_span: Span::from_parts(name_start, trimmed.len()),
        });
    }
    holes
}

/// The component slot is the first braced reference whose `{` directly
/// follows `<`; a brace elsewhere in the tag (an attribute value, say) is not
/// a component.
fn extract_component(tag_text: &str, tag_start: usize) -> Option<ComponentRef> {
    let caps = BRACE_RE.captures(tag_text)?;
    let whole = caps.get(0)?;
    if whole.start() == 0 || tag_text.as_bytes()[whole.start() - 1] != b'<' {
        return None;
    }
    let inner = caps.get(1)?;
    let (name_start, trimmed) = trim_with_offset(inner.as_str(), inner.start());
    if trimmed.is_empty() {
        return None;
    }
    Some(ComponentRef {
        name: trimmed.to_string(),
        span: Span::from_bounds(tag_start + whole.start(), tag_start + whole.end()),
        name_span: Span::from_parts(tag_start + name_start, trimmed.len()),
    })
}

fn extract_attributes(tag_text: &str, tag_start: usize) -> (Vec<AttributeEntry>, Vec<AttributeEntry>) {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut attributes = Vec::new();

    let shapes: [(&Regex, fn(&str) -> AttrValue); 3] = [
        (&ATTR_BRACED_RE, |raw| AttrValue::Braced(raw.to_string())),
        (&ATTR_BARE_RE, |raw| AttrValue::Bare(raw.to_string())),
        (&ATTR_QUOTED_RE, |raw| AttrValue::Quoted(raw.to_string())),
    ];

    for (pattern, make_value) in shapes {
        for caps in pattern.captures_iter(tag_text) {
            let name = caps.get(1).expect("attribute patterns have a key group");
            if !seen.insert(name.as_str()) {
                continue;
            }
            let value = caps.get(2).expect("attribute patterns have a value group");
            attributes.push(AttributeEntry {
                name: name.as_str().to_string(),
                name_span: Span::from_bounds(tag_start + name.start(), tag_start + name.end()),
                value: make_value(value.as_str()),
                value_span: Span::from_bounds(tag_start + value.start(), tag_start + value.end()),
                span: Span::from_bounds(
                    tag_start + name.start(),
                    tag_start + caps.get(0).expect("group 0").end(),
                ),
            });
        }
    }
    attributes.sort_by_key(|attr| attr.span.start());

    let mut empty_seen: FxHashSet<&str> = FxHashSet::default();
    let mut empty_attributes = Vec::new();
    for caps in ATTR_EMPTY_RE.captures_iter(tag_text) {
        let name = caps.get(1).expect("empty pattern has a key group");
        if !empty_seen.insert(name.as_str()) {
            continue;
        }
        let value = caps.get(2).expect("empty pattern has a value group");
        empty_attributes.push(AttributeEntry {
            name: name.as_str().to_string(),
            name_span: Span::from_bounds(tag_start + name.start(), tag_start + name.end()),
            value: AttrValue::Empty,
            value_span: Span::from_bounds(tag_start + value.start(), tag_start + value.end()),
            span: Span::from_bounds(
                tag_start + name.start(),
                tag_start + caps.get(0).expect("group 0").end(),
            ),
        });
    }

    (attributes, empty_attributes)
}

fn trim_with_offset(text: &str, base: usize) -> (usize, &str) {
    let trimmed_start = text.len() - text.trim_start().len();
    (base + trimmed_start, text.trim())
}

impl TagMatch {
    /// Look up an attribute entry by key in the main key map.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeEntry> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}
