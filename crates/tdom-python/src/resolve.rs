//! Component resolution and classification.
//!
//! A component reference like `<{Card} .../>` names a Python symbol. The
//! resolver finds its binding in the enclosing scopes and classifies it as a
//! callable component (a function), a record component (a `@dataclass`), or
//! neither. Imported symbols are followed exactly one hop through a
//! [`SourceProvider`].

use serde::Serialize;
use tdom_source::Span;

use crate::model::Binding;
use crate::model::BindingKind;
use crate::model::ModuleModel;
use crate::model::ParamDef;
use crate::model::ParamKind;
use crate::model::ScopeId;
use crate::provider::NullSourceProvider;
use crate::provider::SourceProvider;
use crate::types::PyType;

/// What a component reference resolved to.
#[derive(Debug)]
pub enum ResolvedEntity {
    /// A function; attributes map to its parameters.
    Callable(Signature),
    /// A `@dataclass`; attributes map to its fields.
    Record(Signature),
    /// Resolved, but not something that can act as a component.
    NonComponent(Declaration),
    Unresolved,
}

impl ResolvedEntity {
    /// The signature to check attributes against, when there is one.
    #[must_use]
    pub fn signature(&self) -> Option<&Signature> {
        match self {
            ResolvedEntity::Callable(sig) | ResolvedEntity::Record(sig) => Some(sig),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Signature {
    pub declaration: Declaration,
    pub params: Vec<ParamDef>,
}

impl Signature {
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamDef> {
        self.params.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn has_kwargs(&self) -> bool {
        self.params.iter().any(|p| p.kind == ParamKind::KwArgs)
    }

    /// Required parameters an attribute list must supply. `children` and
    /// star parameters are filled by the tag body, not by attributes.
    pub fn required_params(&self) -> impl Iterator<Item = &ParamDef> {
        self.params.iter().filter(|p| {
            p.required
                && p.name != "children"
                && !matches!(p.kind, ParamKind::VarArgs | ParamKind::KwArgs)
        })
    }

    #[must_use]
    pub fn has_children_param(&self) -> bool {
        self.param("children").is_some() || self.has_kwargs()
    }
}

/// Where a resolved symbol is declared, for navigation.
#[derive(Debug, Clone, Serialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    /// Span of the declaring name within its module's source.
    pub span: Span,
    /// Dotted module the declaration lives in; `None` for the current file.
    pub module: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeclKind {
    Function,
    Class,
    Variable,
    Parameter,
    Import,
}

impl ModuleModel {
    /// Resolve and classify the component named by a tag, looking up from
    /// the scope around `at` (the template's position in the file).
    #[must_use]
    pub fn classify_component(
        &self,
        name: &str,
        scope: ScopeId,
        at: u32,
        provider: &dyn SourceProvider,
    ) -> ResolvedEntity {
        let Some(binding) = self.resolve_locally(name, scope, Some(at)) else {
            return ResolvedEntity::Unresolved;
        };
        self.classify_binding(binding, scope, provider)
    }

    fn classify_binding(
        &self,
        binding: &Binding,
        scope: ScopeId,
        provider: &dyn SourceProvider,
    ) -> ResolvedEntity {
        match &binding.kind {
            BindingKind::Function(function) => ResolvedEntity::Callable(Signature {
                declaration: declaration_of(binding, DeclKind::Function),
                params: function.params.clone(),
            }),
            BindingKind::Class(class) => {
                if self.is_record(class, scope) {
                    ResolvedEntity::Record(Signature {
                        declaration: declaration_of(binding, DeclKind::Class),
                        params: class.fields.clone(),
                    })
                } else {
                    ResolvedEntity::NonComponent(declaration_of(binding, DeclKind::Class))
                }
            }
            BindingKind::Import { module, symbol, .. } => {
                self.follow_import(binding, module, symbol.as_deref(), provider)
            }
            BindingKind::Assign { .. } => {
                ResolvedEntity::NonComponent(declaration_of(binding, DeclKind::Variable))
            }
            BindingKind::Param { .. } => {
                ResolvedEntity::NonComponent(declaration_of(binding, DeclKind::Parameter))
            }
            BindingKind::Target => {
                ResolvedEntity::NonComponent(declaration_of(binding, DeclKind::Variable))
            }
        }
    }

    fn follow_import(
        &self,
        binding: &Binding,
        module: &str,
        symbol: Option<&str>,
        provider: &dyn SourceProvider,
    ) -> ResolvedEntity {
        let Some(symbol) = symbol else {
            // A whole-module import is never a component by itself.
            return ResolvedEntity::NonComponent(declaration_of(binding, DeclKind::Import));
        };
        let Some(source) = provider.module_source(module) else {
            return ResolvedEntity::Unresolved;
        };
        let Ok(target) = ModuleModel::parse(&source) else {
            tracing::debug!(module, "imported module failed to parse");
            return ResolvedEntity::Unresolved;
        };
        let end = u32::try_from(source.len()).unwrap_or(u32::MAX);
        // One hop only: imports inside the target are not followed.
        let mut entity = target.classify_component(symbol, 0, end, &NullSourceProvider);
        let module_name = Some(module.to_string());
        match &mut entity {
            ResolvedEntity::Callable(sig) | ResolvedEntity::Record(sig) => {
                sig.declaration.module = module_name;
            }
            ResolvedEntity::NonComponent(decl) => decl.module = module_name,
            ResolvedEntity::Unresolved => {}
        }
        entity
    }

    /// The declaration a plain name points at, for reference navigation.
    #[must_use]
    pub fn declaration_of_name(
        &self,
        name: &str,
        scope: ScopeId,
        at: u32,
    ) -> Option<Declaration> {
        let binding = self.resolve_locally(name, scope, Some(at))?;
        let kind = match &binding.kind {
            BindingKind::Function(_) => DeclKind::Function,
            BindingKind::Class(_) => DeclKind::Class,
            BindingKind::Import { .. } => DeclKind::Import,
            BindingKind::Param { .. } => DeclKind::Parameter,
            BindingKind::Assign { .. } | BindingKind::Target => DeclKind::Variable,
        };
        Some(declaration_of(binding, kind))
    }

    /// Infer the type of an attribute-value expression: literals by shape,
    /// plain names through their binding's annotation or assigned value.
    #[must_use]
    pub fn infer_expression_type(&self, text: &str, scope: ScopeId, at: u32) -> PyType {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return PyType::Unknown;
        }
        let Ok(parsed) = ruff_python_parser::parse_expression(trimmed) else {
            return PyType::Unknown;
        };
        let expression = parsed.into_syntax();
        if let ruff_python_ast::Expr::Name(name) = expression.body.as_ref() {
            return self.infer_name_type(name.id.as_str(), scope, at);
        }
        crate::types::literal_type(&expression.body)
    }

    fn infer_name_type(&self, name: &str, scope: ScopeId, at: u32) -> PyType {
        let Some(binding) = self.resolve_locally(name, scope, Some(at)) else {
            return PyType::Unknown;
        };
        match &binding.kind {
            BindingKind::Param { annotation } => annotation.clone(),
            BindingKind::Assign {
                annotation,
                value_type,
                ..
            } => {
                if *annotation == PyType::Unknown {
                    value_type.clone()
                } else {
                    annotation.clone()
                }
            }
            _ => PyType::Unknown,
        }
    }
}

fn declaration_of(binding: &Binding, kind: DeclKind) -> Declaration {
    Declaration {
        name: binding.name.clone(),
        kind,
        span: binding.span,
        module: None,
    }
}
