//! Injection segment assembly.
//!
//! Hosts inject a markup language into the literal parts of a template
//! string, leaving interpolation holes to Python. The language comes from
//! the marker call (always HTML) or from a Template-protocol annotation.

use serde::Serialize;
use tdom_python::LanguageTag;
use tdom_python::ModuleModel;
use tdom_python::SourceProvider;
use tdom_python::TemplateString;
use tdom_source::Span;

/// One literal run to inject. Spans are literal-relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InjectionSegment {
    pub span: Span,
    pub language: LanguageTag,
}

/// The literal segments of `template` with their injection language, or an
/// empty list when nothing should be injected.
#[must_use]
pub fn injection_segments(
    model: &ModuleModel,
    template: &TemplateString,
    provider: &dyn SourceProvider,
) -> Vec<InjectionSegment> {
    let Some(language) = model.injection_language(template, provider) else {
        return Vec::new();
    };
    tdom_markup::literal_segments(&template.body)
        .into_iter()
        .map(|span| InjectionSegment {
            span: span.shift(template.prefix_len),
            language,
        })
        .collect()
}
