//! Injection language lookup for template protocols.
//!
//! A `t`-string assigned to (or passed as) a `Template` protocol value gets
//! its literal segments injected with the language the protocol declares:
//!
//! ```python
//! class Template(Protocol):
//!     source: Annotated[str, Literal["html"]]
//! ```
//!
//! Markup templates found through marker calls always inject HTML.

use serde::Serialize;

use crate::model::BindingKind;
use crate::model::LangSource;
use crate::model::ModuleModel;
use crate::model::ParamKind;
use crate::model::ScopeId;
use crate::model::StringContext;
use crate::model::TemplateString;
use crate::provider::NullSourceProvider;
use crate::provider::SourceProvider;
use crate::types::PyType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LanguageTag {
    Html,
    Xml,
}

impl LanguageTag {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "html" => Some(LanguageTag::Html),
            "xml" => Some(LanguageTag::Xml),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LanguageTag::Html => "html",
            LanguageTag::Xml => "xml",
        }
    }
}

impl ModuleModel {
    /// The language to inject into a template's literal segments, or `None`
    /// when the string is not a template in an injectable position.
    #[must_use]
    pub fn injection_language(
        &self,
        template: &TemplateString,
        provider: &dyn SourceProvider,
    ) -> Option<LanguageTag> {
        if !template.is_t_string {
            return None;
        }
        if template.is_markup {
            return Some(LanguageTag::Html);
        }
        let class_name = self.protocol_class_of(template)?;
        self.class_language(&class_name, template.scope, provider)
    }

    /// The protocol class name governing this template's position, from the
    /// assignment annotation or the annotated parameter it is passed to.
    fn protocol_class_of(&self, template: &TemplateString) -> Option<String> {
        match &template.context {
            StringContext::Assign {
                annotation: Some(annotation),
                ..
            } => Some(annotation.clone()),
            StringContext::CallArg {
                callee: Some(callee),
                index,
            } => {
                if callee.contains('.') {
                    return None;
                }
                let binding = self.resolve_locally(callee, template.scope, None)?;
                let BindingKind::Function(function) = &binding.kind else {
                    return None;
                };
                let param = function
                    .params
                    .iter()
                    .filter(|p| p.kind == ParamKind::Positional)
                    .nth(*index)?;
                match &param.annotation {
                    PyType::Named(name) => Some(name.clone()),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Resolve a class name to its declared template language, following an
    /// import one hop when needed.
    fn class_language(
        &self,
        name: &str,
        scope: ScopeId,
        provider: &dyn SourceProvider,
    ) -> Option<LanguageTag> {
        let binding = self.resolve_locally(name, scope, None)?;
        match &binding.kind {
            BindingKind::Class(class) => {
                let is_protocol = class
                    .bases
                    .iter()
                    .any(|base| self.resolve_qualified(base, scope) == "typing.Protocol");
                if !is_protocol {
                    return None;
                }
                match class.source_lang.as_ref()? {
                    LangSource::Inline(tag) => Some(*tag),
                    LangSource::Ref(alias) => self.module_language_alias(alias),
                }
            }
            BindingKind::Import { module, symbol, .. } => {
                let symbol = symbol.as_deref()?;
                let source = provider.module_source(module)?;
                let target = ModuleModel::parse(&source).ok()?;
                target.class_language(symbol, 0, &NullSourceProvider)
            }
            _ => None,
        }
    }

    /// Look up a module-level `LANG = Literal["..."]` style alias.
    fn module_language_alias(&self, alias: &str) -> Option<LanguageTag> {
        let binding = self.resolve_locally(alias, 0, None)?;
        let BindingKind::Assign {
            value_literal: Some(literal),
            ..
        } = &binding.kind
        else {
            return None;
        };
        LanguageTag::from_name(literal)
    }
}
