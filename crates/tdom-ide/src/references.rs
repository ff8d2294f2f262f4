//! Reference extraction for template bodies.
//!
//! Every component slot, attribute key on a resolved component, attribute
//! value identifier, and bare interpolation identifier becomes a reference
//! span pointing back at a Python declaration. Unresolved targets keep their
//! span with no target, so hosts can render them soft.

use serde::Serialize;
use tdom_python::DeclKind;
use tdom_python::Declaration;
use tdom_python::ModuleModel;
use tdom_python::SourceProvider;
use tdom_python::TemplateString;
use tdom_source::Span;

/// One navigable span inside a template string. Spans are literal-relative.
#[derive(Debug, Clone, Serialize)]
pub struct Reference {
    pub span: Span,
    pub target: Option<Declaration>,
}

/// Collect the references of one template.
#[must_use]
pub fn references(
    model: &ModuleModel,
    template: &TemplateString,
    provider: &dyn SourceProvider,
) -> Vec<Reference> {
    let prefix = template.prefix_len;
    let at = template.literal_span.start();
    let mut references = Vec::new();

    let tags = tdom_markup::scan(&template.body);
    let tag_spans: Vec<Span> = tags.iter().map(|tag| tag.span).collect();

    for tag in &tags {
        let Some(component) = &tag.component else {
            continue;
        };
        let entity = model.classify_component(&component.name, template.scope, at, provider);
        let signature = entity.signature();

        references.push(Reference {
            span: component.name_span.shift(prefix),
            target: signature
                .map(|sig| sig.declaration.clone())
                .or_else(|| model.declaration_of_name(&component.name, template.scope, at)),
        });

        for attribute in tag.attributes.iter().chain(&tag.empty_attributes) {
            // Attribute keys only navigate on resolved components.
            if let Some(signature) = signature {
                let target = signature.param(&attribute.name).map(|param| Declaration {
                    name: param.name.clone(),
                    kind: DeclKind::Parameter,
                    span: param.span,
                    module: signature.declaration.module.clone(),
                });
                references.push(Reference {
                    span: attribute.name_span.shift(prefix),
                    target,
                });
            }

            if let Some((expression, offset)) = attribute.value.expression() {
                let trimmed = expression.trim();
                if is_identifier(trimmed) {
                    let start = attribute.value_span.start() + offset;
                    references.push(Reference {
                        span: Span::new(start, trimmed.len() as u32).shift(prefix),
                        target: model.declaration_of_name(trimmed, template.scope, at),
                    });
                }
            }
        }
    }

    for interpolation in tdom_markup::scan_interpolations(&template.body) {
        // Holes inside a tag are attribute values, already covered above.
        let inside_tag = tag_spans
            .iter()
            .any(|span| span.contains_inclusive(interpolation.span.start()));
        if !inside_tag && is_identifier(&interpolation.text) {
            references.push(Reference {
                span: interpolation.name_span.shift(prefix),
                target: model.declaration_of_name(&interpolation.text, template.scope, at),
            });
        }
    }

    references.sort_by_key(|r| r.span.start());
    references
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .enumerate()
            .all(|(i, c)| c == '_' || if i == 0 { c.is_alphabetic() } else { c.is_alphanumeric() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdom_python::NullSourceProvider;

    fn fixture(source: &str) -> ModuleModel {
        ModuleModel::parse(source).expect("source should parse")
    }

    const SOURCE: &str = "\
from tdom import html

def Card(title: str): ...

def view(name: str):
    return html(t\"<{Card} title={name} />{name}\")
";

    #[test]
    fn component_attribute_and_value_references() {
        let model = fixture(SOURCE);
        let template = model.markup_templates().next().expect("template");
        let refs = references(&model, template, &NullSourceProvider);
        assert_eq!(refs.len(), 4);

        // Component slot points at the function definition.
        let component = &refs[0];
        assert!(component.target.is_some());
        assert_eq!(component.target.as_ref().unwrap().kind, DeclKind::Function);

        // Attribute key points at the parameter.
        let key = &refs[1];
        assert_eq!(key.target.as_ref().unwrap().kind, DeclKind::Parameter);
        assert_eq!(key.target.as_ref().unwrap().name, "title");

        // Value and bare interpolation point at the local binding.
        assert_eq!(refs[2].target.as_ref().unwrap().name, "name");
        assert_eq!(refs[3].target.as_ref().unwrap().name, "name");
    }

    #[test]
    fn unresolved_component_keeps_span_without_target() {
        let source = "from tdom import html\n\npage = html(t\"<{Ghost} />\")\n";
        let model = fixture(source);
        let template = model.markup_templates().next().expect("template");
        let refs = references(&model, template, &NullSourceProvider);
        assert_eq!(refs.len(), 1);
        assert!(refs[0].target.is_none());
    }

    #[test]
    fn unknown_attribute_key_has_no_target() {
        let source = "\
from tdom import html

def Card(title: str): ...

page = html(t\"<{Card} bogus=1 />\")
";
        let model = fixture(source);
        let template = model.markup_templates().next().expect("template");
        let refs = references(&model, template, &NullSourceProvider);
        let key = refs
            .iter()
            .find(|r| {
                let body_span = r.span;
                let start = (body_span.start() - template.prefix_len) as usize;
                template.body[start..].starts_with("bogus")
            })
            .expect("key reference");
        assert!(key.target.is_none());
    }

    #[test]
    fn spans_are_literal_relative() {
        let model = fixture(SOURCE);
        let template = model.markup_templates().next().expect("template");
        let refs = references(&model, template, &NullSourceProvider);
        let component = &refs[0];
        let body_start = (component.span.start() - template.prefix_len) as usize;
        assert!(template.body[body_start..].starts_with("Card"));
    }
}
