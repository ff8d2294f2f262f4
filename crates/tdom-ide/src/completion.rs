//! Completion inside template bodies.
//!
//! Two positions matter: the braced component slot right after `<`, and the
//! attribute list of a component tag. Everything else gets no candidates.

use serde::Serialize;
use tdom_python::ModuleModel;
use tdom_python::ParamKind;
use tdom_python::ResolvedEntity;
use tdom_python::SourceProvider;
use tdom_python::TemplateString;

/// Where the cursor sits within a template body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// Inside `<{...` before the closing brace.
    ComponentName { partial: String },
    /// Inside a component tag, after the slot, outside any value.
    AttributeName { partial: String, needs_eq: bool },
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    pub label: String,
    /// Text to insert; component names never carry call parens, attribute
    /// names carry a trailing `=` unless one already follows the cursor.
    pub insert_text: String,
    /// Declared type, for attribute candidates.
    pub detail: Option<String>,
    pub kind: CompletionKind,
    pub priority: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompletionKind {
    Component,
    Field,
}

const ATTRIBUTE_PRIORITY: u32 = 100;

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Classify the cursor position. `offset` is body-relative and clamped to
/// the body length.
#[must_use]
pub fn completion_context(body: &str, offset: u32) -> CompletionContext {
    let offset = (offset as usize).min(body.len());
    let before = &body[..offset];
    let Some(open) = before.rfind('<') else {
        return CompletionContext::None;
    };
    let in_tag = &before[open + 1..];
    if in_tag.contains('>') {
        return CompletionContext::None;
    }

    if let Some(slot) = in_tag.strip_prefix('{') {
        if !slot.contains('}') {
            if slot.chars().all(is_ident_char) {
                return CompletionContext::ComponentName {
                    partial: slot.to_string(),
                };
            }
            return CompletionContext::None;
        }
    } else {
        // A tag without a component slot is plain HTML; nothing to offer.
        if !in_tag.starts_with('{') {
            return CompletionContext::None;
        }
    }

    // Attribute position: not inside a value, and not mid-slot.
    let partial: String = in_tag
        .chars()
        .rev()
        .take_while(|c| is_ident_char(*c))
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let after_partial = &in_tag[..in_tag.len() - partial.len()];
    if !after_partial.ends_with(char::is_whitespace) {
        return CompletionContext::None;
    }

    // The `=` may sit past the rest of the partial word and any spaces.
    let mut rest = body[offset..]
        .chars()
        .skip_while(|c| is_ident_char(*c))
        .skip_while(|c| c.is_whitespace());
    let needs_eq = rest.next() != Some('=');

    CompletionContext::AttributeName { partial, needs_eq }
}

/// Candidates for the cursor at `offset` (body-relative) inside `template`.
#[must_use]
pub fn complete(
    model: &ModuleModel,
    template: &TemplateString,
    offset: u32,
    provider: &dyn SourceProvider,
) -> Vec<CompletionItem> {
    match completion_context(&template.body, offset) {
        CompletionContext::ComponentName { partial } => {
            component_candidates(model, template, &partial, provider)
        }
        CompletionContext::AttributeName { partial, needs_eq } => {
            attribute_candidates(model, template, offset, &partial, needs_eq, provider)
        }
        CompletionContext::None => Vec::new(),
    }
}

fn component_candidates(
    model: &ModuleModel,
    template: &TemplateString,
    partial: &str,
    provider: &dyn SourceProvider,
) -> Vec<CompletionItem> {
    let at = template.literal_span.start();
    let mut items = Vec::new();
    for binding in model.visible_bindings(template.scope) {
        if !binding.name.starts_with(partial) {
            continue;
        }
        let entity = model.classify_component(&binding.name, template.scope, at, provider);
        if !matches!(
            entity,
            ResolvedEntity::Callable(_) | ResolvedEntity::Record(_)
        ) {
            continue;
        }
        items.push(CompletionItem {
            label: binding.name.clone(),
            insert_text: binding.name.clone(),
            detail: None,
            kind: CompletionKind::Component,
            priority: 0,
        });
    }
    items.sort_by(|a, b| a.label.cmp(&b.label));
    items
}

fn attribute_candidates(
    model: &ModuleModel,
    template: &TemplateString,
    offset: u32,
    partial: &str,
    needs_eq: bool,
    provider: &dyn SourceProvider,
) -> Vec<CompletionItem> {
    let tags = tdom_markup::scan(&template.body);
    let Some(tag) = tags.iter().find(|tag| tag.span.contains_inclusive(offset)) else {
        return Vec::new();
    };
    let Some(component) = &tag.component else {
        return Vec::new();
    };
    let entity = model.classify_component(
        &component.name,
        template.scope,
        template.literal_span.start(),
        provider,
    );
    let Some(signature) = entity.signature() else {
        return Vec::new();
    };

    let mut items = Vec::new();
    for param in &signature.params {
        if matches!(param.kind, ParamKind::VarArgs | ParamKind::KwArgs) {
            continue;
        }
        if tag.has_attribute(&param.name) || !param.name.starts_with(partial) {
            continue;
        }
        let insert_text = if needs_eq {
            format!("{}=", param.name)
        } else {
            param.name.clone()
        };
        items.push(CompletionItem {
            label: param.name.clone(),
            insert_text,
            detail: Some(param.annotation.display_name().to_string()),
            kind: CompletionKind::Field,
            priority: ATTRIBUTE_PRIORITY,
        });
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdom_python::NullSourceProvider;

    #[test]
    fn component_slot_context() {
        assert_eq!(
            completion_context("<{Ca", 4),
            CompletionContext::ComponentName {
                partial: "Ca".to_string()
            }
        );
        assert_eq!(
            completion_context("<{", 2),
            CompletionContext::ComponentName {
                partial: String::new()
            }
        );
    }

    #[test]
    fn attribute_context_after_slot() {
        let body = "<{Card} ti";
        assert_eq!(
            completion_context(body, body.len() as u32),
            CompletionContext::AttributeName {
                partial: "ti".to_string(),
                needs_eq: true,
            }
        );
    }

    #[test]
    fn needs_eq_false_when_eq_follows() {
        let body = "<{Card} title=x />";
        // Cursor in the middle of `title`.
        let offset = body.find("tle").expect("offset") as u32;
        assert_eq!(
            completion_context(body, offset),
            CompletionContext::AttributeName {
                partial: "ti".to_string(),
                needs_eq: false,
            }
        );
    }

    #[test]
    fn needs_eq_false_when_eq_follows_after_space() {
        let body = "<{Card} title =x />";
        // Cursor in the middle of `title`, with a space before the `=`.
        let offset = body.find("tle").expect("offset") as u32;
        assert_eq!(
            completion_context(body, offset),
            CompletionContext::AttributeName {
                partial: "ti".to_string(),
                needs_eq: false,
            }
        );
    }

    #[test]
    fn closed_tag_is_no_context() {
        let body = "<{Card}>text";
        assert_eq!(
            completion_context(body, body.len() as u32),
            CompletionContext::None
        );
    }

    #[test]
    fn html_tag_is_no_context() {
        assert_eq!(completion_context("<di", 3), CompletionContext::None);
    }

    fn fixture(source: &str) -> (ModuleModel, usize) {
        let model = ModuleModel::parse(source).expect("source should parse");
        let index = model
            .templates()
            .iter()
            .position(|t| t.is_markup)
            .expect("markup template");
        (model, index)
    }

    const SOURCE: &str = "\
from tdom import html
from dataclasses import dataclass

@dataclass
class Card:
    title: str
    count: int = 0

def Banner(text: str): ...

helper = 1

page = html(t\"<{Card} title=x />\")
";

    #[test]
    fn component_completion_filters_to_components() {
        let (model, index) = fixture(SOURCE);
        let template = &model.templates()[index];
        // Cursor right after `<{` in the template body.
        let items = complete(&model, template, 2, &NullSourceProvider);
        let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Banner", "Card"]);
        assert!(items.iter().all(|i| i.insert_text == i.label));
        assert!(items.iter().all(|i| !i.insert_text.contains('(')));
    }

    #[test]
    fn component_completion_respects_partial() {
        let source = SOURCE.replace("<{Card} title=x />", "<{Banner} text=hi />");
        let (model, _) = fixture(&source);
        let template = model.markup_templates().next().expect("template");
        // Cursor after `<{Ba`.
        let items = complete(&model, template, 4, &NullSourceProvider);
        let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Banner"]);
    }

    #[test]
    fn attribute_completion_offers_unsupplied_params() {
        let source = SOURCE.replace("<{Card} title=x />", "<{Card} c />");
        let (model, _) = fixture(&source);
        let template = model.markup_templates().next().expect("template");
        // Cursor after the `c`.
        let offset = template.body.find(" c ").expect("offset") as u32 + 2;
        let items = complete(&model, template, offset, &NullSourceProvider);
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.label, "count");
        assert_eq!(item.insert_text, "count=");
        assert_eq!(item.detail.as_deref(), Some("int"));
        assert_eq!(item.kind, CompletionKind::Field);
        assert_eq!(item.priority, 100);
    }

    #[test]
    fn attribute_completion_skips_supplied_keys() {
        let source = SOURCE.replace("<{Card} title=x />", "<{Card} title=x  />");
        let (model, _) = fixture(&source);
        let template = model.markup_templates().next().expect("template");
        let offset = template.body.find("  />").expect("offset") as u32 + 1;
        let items = complete(&model, template, offset, &NullSourceProvider);
        let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["count"]);
    }
}
