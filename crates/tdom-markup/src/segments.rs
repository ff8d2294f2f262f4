//! Literal segment extraction for language injection.
//!
//! The host renders the markup sub-language (HTML/XML) over every part of the
//! template body that is *not* an interpolation hole. Doubled braces are
//! escapes and stay literal text.

use tdom_source::Span;

/// Split a template body into the literal segments between interpolation
/// holes. Spans are body-relative; empty segments are dropped.
#[must_use]
pub fn literal_segments(body: &str) -> Vec<Span> {
    let bytes = body.as_bytes();
    let mut segments = Vec::new();
    let mut segment_start = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if i + 1 < bytes.len() && bytes[i + 1] == b'{' => {
                // Escaped brace, stays literal.
                i += 2;
            }
            b'}' if i + 1 < bytes.len() && bytes[i + 1] == b'}' => {
                i += 2;
            }
            b'{' => {
                if i > segment_start {
                    segments.push(Span::from_bounds(segment_start, i));
                }
                // Hole runs to the matching close or end of body.
                let close = body[i..].find('}').map_or(bytes.len(), |off| i + off + 1);
                segment_start = close;
                i = close;
            }
            _ => i += 1,
        }
    }

    if bytes.len() > segment_start {
        segments.push(Span::from_bounds(segment_start, bytes.len()));
    }

    segments
}
