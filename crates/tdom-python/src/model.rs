//! A file-local model of one Python module.
//!
//! The model is built in a single pass over the Ruff AST and owns everything
//! it needs afterwards: a scope tree, the bindings in each scope, and every
//! template string found in a call-argument or assignment position. No AST
//! references are retained, so a model can outlive the parse.

use ruff_python_ast::visitor;
use ruff_python_ast::visitor::Visitor;
use ruff_python_ast::Decorator;
use ruff_python_ast::Expr;
use ruff_python_ast::Parameters;
use ruff_python_ast::Stmt;
use ruff_python_ast::StmtClassDef;
use ruff_python_ast::StmtFunctionDef;
use ruff_text_size::Ranged;
use ruff_text_size::TextRange;
use serde::Serialize;
use tdom_source::Span;

use crate::error::PythonError;
use crate::inject::LanguageTag;
use crate::types::annotation_type;
use crate::types::dotted_name;
use crate::types::literal_type;
use crate::types::PyType;

/// Qualified names whose calls mark their first string argument as template
/// markup.
const MARKER_FUNCTIONS: &[&str] = &["tdom.html", "tdom.h.html", "htm.htm"];

/// Decorator that turns a user function into a markup factory.
const MARKER_DECORATOR: &str = "htm.htm";

/// Return annotation that marks a user function as a markup factory.
const MARKER_RETURN_TYPE: &str = "tdom.VDOMNode";

/// Decorator that makes a class usable as a record component.
const RECORD_DECORATOR: &str = "dataclasses.dataclass";

pub type ScopeId = usize;

/// One lexical scope: the module itself or a function body. Class bodies are
/// not lookup scopes in Python and are skipped.
#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub range: Span,
    pub bindings: Vec<Binding>,
}

#[derive(Debug)]
pub struct Binding {
    pub name: String,
    /// Span of the binding's name, for navigation.
    pub span: Span,
    pub kind: BindingKind,
}

#[derive(Debug)]
pub enum BindingKind {
    Function(FunctionBinding),
    Class(ClassBinding),
    Import {
        /// Dotted path of the bound symbol, e.g. `tdom.html` for
        /// `from tdom import html`.
        qualified: String,
        /// The module the symbol lives in, for source lookup.
        module: String,
        /// The symbol within `module`; `None` for whole-module imports.
        symbol: Option<String>,
    },
    Assign {
        annotation: PyType,
        /// Raw dotted text of the annotation, when it is a plain name.
        annotation_raw: Option<String>,
        /// Raw dotted text of the value, for alias chains like
        /// `render = tdom.html`.
        value_qualname: Option<String>,
        /// String inside a `Literal["..."]` value, if that is the shape of
        /// the right-hand side.
        value_literal: Option<String>,
        value_type: PyType,
    },
    Param {
        annotation: PyType,
    },
    /// `for`/`with`/comprehension targets.
    Target,
}

#[derive(Debug)]
pub struct FunctionBinding {
    pub params: Vec<ParamDef>,
    /// Decorator names as written, unresolved.
    pub decorators: Vec<String>,
    /// Return annotation as written, when it is a plain dotted name.
    pub returns: Option<String>,
}

#[derive(Debug)]
pub struct ClassBinding {
    pub fields: Vec<ParamDef>,
    pub decorators: Vec<String>,
    /// Base class names as written, unresolved.
    pub bases: Vec<String>,
    /// Language declared by a `source: Annotated[str, Literal[...]]` field.
    pub source_lang: Option<LangSource>,
}

/// How a protocol class declares its injection language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LangSource {
    Inline(LanguageTag),
    /// Named reference to a module-level `Literal["..."]` alias.
    Ref(String),
}

/// A parameter of a callable component or a field of a record component.
#[derive(Debug, Clone, Serialize)]
pub struct ParamDef {
    pub name: String,
    pub span: Span,
    pub annotation: PyType,
    pub required: bool,
    pub kind: ParamKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParamKind {
    Positional,
    KeywordOnly,
    VarArgs,
    KwArgs,
}

/// Where a template string appears in the enclosing Python.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringContext {
    CallArg {
        /// Callee as written (`html`, `tdom.html`), when it is a plain
        /// dotted name.
        callee: Option<String>,
        /// Positional argument index.
        index: usize,
    },
    Assign {
        target: String,
        /// Raw annotation name, for `page: Template = t"..."`.
        annotation: Option<String>,
    },
}

/// One template string literal found in the module.
#[derive(Debug)]
pub struct TemplateString {
    /// Whole literal including prefix and quotes, file-relative.
    pub literal_span: Span,
    pub prefix_len: u32,
    pub body: String,
    /// File-relative span of the body.
    pub body_span: Span,
    pub scope: ScopeId,
    pub context: StringContext,
    /// Whether the literal carries a `t`/`T` prefix.
    pub is_t_string: bool,
    /// Whether the string is the first argument of a marker call and should
    /// be scanned as markup.
    pub is_markup: bool,
}

#[derive(Debug)]
pub struct ModuleModel {
    source: String,
    pub(crate) scopes: Vec<Scope>,
    templates: Vec<TemplateString>,
}

impl ModuleModel {
    /// Parse a Python module and build its model.
    ///
    /// # Errors
    ///
    /// Returns [`PythonError::Parse`] when the source does not parse; there
    /// is no partial model for broken files.
    pub fn parse(source: &str) -> Result<Self, PythonError> {
        let parsed = ruff_python_parser::parse_module(source)
            .map_err(|err| PythonError::Parse(err.to_string()))?;
        let module = parsed.into_syntax();

        let mut builder = Builder {
            source,
            scopes: vec![Scope {
                parent: None,
                range: Span::from_parts(0, source.len()),
                bindings: Vec::new(),
            }],
            current: 0,
            in_class_body: false,
            templates: Vec::new(),
        };
        builder.visit_body(&module.body);

        let mut model = ModuleModel {
            source: source.to_string(),
            scopes: builder.scopes,
            templates: builder.templates,
        };

        let markup_flags: Vec<bool> = model
            .templates
            .iter()
            .map(|template| model.is_marker_context(template))
            .collect();
        for (template, is_markup) in model.templates.iter_mut().zip(markup_flags) {
            template.is_markup = is_markup;
        }

        tracing::debug!(
            templates = model.templates.len(),
            scopes = model.scopes.len(),
            "built module model"
        );
        Ok(model)
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn templates(&self) -> &[TemplateString] {
        &self.templates
    }

    /// The templates that should be scanned as markup.
    pub fn markup_templates(&self) -> impl Iterator<Item = &TemplateString> {
        self.templates.iter().filter(|t| t.is_markup)
    }

    /// Innermost scope containing `offset`.
    #[must_use]
    pub fn scope_at(&self, offset: u32) -> ScopeId {
        let mut best = 0;
        let mut best_len = u32::MAX;
        for (id, scope) in self.scopes.iter().enumerate() {
            if scope.range.contains_inclusive(offset) && scope.range.length() < best_len {
                best = id;
                best_len = scope.range.length();
            }
        }
        best
    }

    /// All bindings visible from `scope`, innermost first, shadowed names
    /// dropped. Drives name completion.
    #[must_use]
    pub fn visible_bindings(&self, scope: ScopeId) -> Vec<&Binding> {
        let mut seen: Vec<&str> = Vec::new();
        let mut visible = Vec::new();
        let mut current = Some(scope);
        while let Some(id) = current {
            for binding in &self.scopes[id].bindings {
                if seen.contains(&binding.name.as_str()) {
                    continue;
                }
                seen.push(&binding.name);
                visible.push(binding);
            }
            current = self.scopes[id].parent;
        }
        visible
    }

    /// Resolve `name` by walking the scope chain outwards from `scope`.
    ///
    /// Within a scope the last binding at or before `before` wins; when none
    /// precede the offset the first binding of that name is used, so forward
    /// references inside a function still resolve.
    #[must_use]
    pub fn resolve_locally(
        &self,
        name: &str,
        scope: ScopeId,
        before: Option<u32>,
    ) -> Option<&Binding> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id];
            let mut first = None;
            let mut preceding = None;
            for binding in &scope.bindings {
                if binding.name != name {
                    continue;
                }
                if first.is_none() {
                    first = Some(binding);
                }
                if before.is_none_or(|offset| binding.span.start() <= offset) {
                    preceding = Some(binding);
                }
            }
            if let Some(binding) = preceding.or(first) {
                return Some(binding);
            }
            current = scope.parent;
        }
        None
    }

    /// Expand a raw dotted name through file-local imports and aliases:
    /// `html` becomes `tdom.html` under `from tdom import html`, and alias
    /// chains like `render = tdom.html` are followed a few hops.
    #[must_use]
    pub fn resolve_qualified(&self, raw: &str, scope: ScopeId) -> String {
        self.resolve_qualified_inner(raw, scope, 0)
    }

    fn resolve_qualified_inner(&self, raw: &str, scope: ScopeId, depth: u8) -> String {
        if depth > 4 {
            return raw.to_string();
        }
        let (head, rest) = match raw.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (raw, None),
        };
        let Some(binding) = self.resolve_locally(head, scope, None) else {
            return raw.to_string();
        };
        let base = match &binding.kind {
            BindingKind::Import { qualified, .. } => qualified.clone(),
            BindingKind::Assign {
                value_qualname: Some(value),
                ..
            } => self.resolve_qualified_inner(value, scope, depth + 1),
            _ => return raw.to_string(),
        };
        match rest {
            Some(rest) => format!("{base}.{rest}"),
            None => base,
        }
    }

    /// Whether the binding declared at `declaration_span` is referenced from
    /// a markup template, either as a component reference or within an
    /// interpolation expression. Each textual mention is resolved from its
    /// template's scope and must land on that exact binding, so a same-named
    /// binding in a sibling scope does not count. Used to keep
    /// unused-variable checks quiet for template-only usages.
    #[must_use]
    pub fn is_binding_used_in_templates(&self, name: &str, declaration_span: Span) -> bool {
        self.markup_templates()
            .filter(|template| template_mentions(template, name))
            .any(|template| {
                self.resolve_locally(name, template.scope, Some(template.literal_span.start()))
                    .is_some_and(|binding| binding.span == declaration_span)
            })
    }

    fn is_marker_context(&self, template: &TemplateString) -> bool {
        let StringContext::CallArg {
            callee: Some(callee),
            index: 0,
        } = &template.context
        else {
            return false;
        };
        self.is_marker_call(callee, template.scope)
    }

    /// Whether calling `callee` produces markup: a known factory, a function
    /// decorated with `@htm.htm`, or one returning a `tdom.VDOMNode`.
    #[must_use]
    pub fn is_marker_call(&self, callee: &str, scope: ScopeId) -> bool {
        let qualified = self.resolve_qualified(callee, scope);
        if MARKER_FUNCTIONS.contains(&qualified.as_str()) {
            return true;
        }
        if callee.contains('.') {
            return false;
        }
        let Some(binding) = self.resolve_locally(callee, scope, None) else {
            return false;
        };
        let BindingKind::Function(function) = &binding.kind else {
            return false;
        };
        if function
            .decorators
            .iter()
            .any(|d| self.resolve_qualified(d, scope) == MARKER_DECORATOR)
        {
            return true;
        }
        function
            .returns
            .as_deref()
            .is_some_and(|r| self.resolve_qualified(r, scope) == MARKER_RETURN_TYPE)
    }

    /// Whether a class binding is a record component (`@dataclass`).
    #[must_use]
    pub fn is_record(&self, class: &ClassBinding, scope: ScopeId) -> bool {
        class
            .decorators
            .iter()
            .any(|d| self.resolve_qualified(d, scope) == RECORD_DECORATOR)
    }
}

/// Whole-word identifier containment, so `user` does not match `username`.
fn contains_identifier(text: &str, name: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .any(|token| token == name)
}

/// Whether `name` appears in a template body, as a component reference or
/// inside an attribute or interpolation expression.
fn template_mentions(template: &TemplateString, name: &str) -> bool {
    for tag in tdom_markup::scan(&template.body) {
        if let Some(component) = &tag.component {
            if component.name == name {
                return true;
            }
        }
        for attribute in &tag.attributes {
            if let Some((expression, _)) = attribute.value.expression() {
                if contains_identifier(expression, name) {
                    return true;
                }
            }
        }
    }
    tdom_markup::scan_interpolations(&template.body)
        .into_iter()
        .any(|interpolation| contains_identifier(&interpolation.text, name))
}

struct Builder<'a> {
    source: &'a str,
    scopes: Vec<Scope>,
    current: ScopeId,
    in_class_body: bool,
    templates: Vec<TemplateString>,
}

impl Builder<'_> {
    fn span_of(range: TextRange) -> Span {
        Span::from_parts(range.start().to_usize(), range.len().to_usize())
    }

    fn bind(&mut self, name: &str, span: Span, kind: BindingKind) {
        if self.in_class_body {
            return;
        }
        self.scopes[self.current].bindings.push(Binding {
            name: name.to_string(),
            span,
            kind,
        });
    }

    fn decorator_names(decorators: &[Decorator]) -> Vec<String> {
        decorators
            .iter()
            .filter_map(|decorator| match &decorator.expression {
                Expr::Call(call) => dotted_name(&call.func),
                other => dotted_name(other),
            })
            .collect()
    }

    fn param_defs(parameters: &Parameters) -> Vec<ParamDef> {
        let mut defs = Vec::new();
        for (kind, param) in parameters
            .posonlyargs
            .iter()
            .chain(&parameters.args)
            .map(|p| (ParamKind::Positional, p))
            .chain(
                parameters
                    .kwonlyargs
                    .iter()
                    .map(|p| (ParamKind::KeywordOnly, p)),
            )
        {
            let annotation = param
                .parameter
                .annotation
                .as_deref()
                .map_or(PyType::Unknown, annotation_type);
            defs.push(ParamDef {
                name: param.parameter.name.to_string(),
                span: Self::span_of(param.parameter.name.range()),
                annotation,
                required: param.default.is_none(),
                kind,
            });
        }
        if let Some(vararg) = &parameters.vararg {
            defs.push(ParamDef {
                name: vararg.name.to_string(),
                span: Self::span_of(vararg.name.range()),
                annotation: PyType::Unknown,
                required: false,
                kind: ParamKind::VarArgs,
            });
        }
        if let Some(kwarg) = &parameters.kwarg {
            defs.push(ParamDef {
                name: kwarg.name.to_string(),
                span: Self::span_of(kwarg.name.range()),
                annotation: PyType::Unknown,
                required: false,
                kind: ParamKind::KwArgs,
            });
        }
        defs
    }

    fn enter_function(&mut self, func: &StmtFunctionDef) {
        // Decorators and defaults evaluate in the enclosing scope.
        for decorator in &func.decorator_list {
            self.visit_expr(&decorator.expression);
        }
        for param in func.parameters.posonlyargs.iter().chain(&func.parameters.args) {
            if let Some(default) = &param.default {
                self.visit_expr(default);
            }
        }

        let params = Self::param_defs(&func.parameters);
        self.bind(
            func.name.as_str(),
            Self::span_of(func.name.range()),
            BindingKind::Function(FunctionBinding {
                params: params.clone(),
                decorators: Self::decorator_names(&func.decorator_list),
                returns: func.returns.as_deref().and_then(dotted_name),
            }),
        );

        let parent = self.current;
        self.scopes.push(Scope {
            parent: Some(parent),
            range: Self::span_of(func.range()),
            bindings: params
                .iter()
                .map(|param| Binding {
                    name: param.name.clone(),
                    span: param.span,
                    kind: BindingKind::Param {
                        annotation: param.annotation.clone(),
                    },
                })
                .collect(),
        });
        self.current = self.scopes.len() - 1;

        let was_in_class = std::mem::replace(&mut self.in_class_body, false);
        self.visit_body(&func.body);
        self.in_class_body = was_in_class;
        self.current = parent;
    }

    fn enter_class(&mut self, class: &StmtClassDef) {
        for decorator in &class.decorator_list {
            self.visit_expr(&decorator.expression);
        }

        let bases = class
            .arguments
            .as_deref()
            .map(|arguments| arguments.args.iter().filter_map(dotted_name).collect())
            .unwrap_or_default();

        let mut fields = Vec::new();
        let mut source_lang = None;
        for stmt in &class.body {
            let Stmt::AnnAssign(field) = stmt else {
                continue;
            };
            let Expr::Name(target) = field.target.as_ref() else {
                continue;
            };
            if target.id.as_str() == "source" {
                if let Some(lang) = annotated_language(&field.annotation) {
                    source_lang = Some(lang);
                }
            }
            fields.push(ParamDef {
                name: target.id.as_str().to_string(),
                span: Self::span_of(target.range()),
                annotation: annotation_type(&field.annotation),
                required: field.value.is_none(),
                kind: ParamKind::Positional,
            });
        }

        self.bind(
            class.name.as_str(),
            Self::span_of(class.name.range()),
            BindingKind::Class(ClassBinding {
                fields,
                decorators: Self::decorator_names(&class.decorator_list),
                bases,
                source_lang,
            }),
        );

        let was_in_class = std::mem::replace(&mut self.in_class_body, true);
        self.visit_body(&class.body);
        self.in_class_body = was_in_class;
    }

    fn bind_targets(&mut self, target: &Expr) {
        match target {
            Expr::Name(name) => {
                self.bind(
                    name.id.as_str(),
                    Self::span_of(name.range()),
                    BindingKind::Target,
                );
            }
            Expr::Tuple(tuple) => {
                for element in &tuple.elts {
                    self.bind_targets(element);
                }
            }
            Expr::List(list) => {
                for element in &list.elts {
                    self.bind_targets(element);
                }
            }
            Expr::Starred(starred) => self.bind_targets(&starred.value),
            _ => {}
        }
    }

    fn record_template(&mut self, expr: &Expr, context: StringContext) {
        let range = expr.range();
        let literal_span = Self::span_of(range);
        let text = &self.source[range.start().to_usize()..range.end().to_usize()];
        let prefix_len = tdom_markup::literal_prefix_len(text);
        let (body, body_rel) = tdom_markup::literal_body(text, prefix_len);
        let quote_prefix = &text[..prefix_len as usize];
        self.templates.push(TemplateString {
            literal_span,
            prefix_len,
            body: body.to_string(),
            body_span: body_rel.shift(literal_span.start()),
            scope: self.current,
            context,
            is_t_string: quote_prefix.contains(['t', 'T']),
            is_markup: false,
        });
    }

    fn maybe_record_assign(&mut self, target: &Expr, value: &Expr, annotation: Option<&Expr>) {
        if !matches!(value, Expr::FString(_) | Expr::TString(_)) {
            return;
        }
        let Expr::Name(name) = target else {
            return;
        };
        self.record_template(
            value,
            StringContext::Assign {
                target: name.id.as_str().to_string(),
                annotation: annotation.and_then(dotted_name),
            },
        );
    }
}

impl<'a> Visitor<'a> for Builder<'_> {
    fn visit_stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::FunctionDef(func) => self.enter_function(func),
            Stmt::ClassDef(class) => self.enter_class(class),
            Stmt::Assign(assign) => {
                for target in &assign.targets {
                    if let Expr::Name(name) = target {
                        self.bind(
                            name.id.as_str(),
                            Self::span_of(name.range()),
                            BindingKind::Assign {
                                annotation: PyType::Unknown,
                                annotation_raw: None,
                                value_qualname: dotted_name(&assign.value),
                                value_literal: literal_subscript_string(&assign.value),
                                value_type: literal_type(&assign.value),
                            },
                        );
                    }
                    self.maybe_record_assign(target, &assign.value, None);
                }
                self.visit_expr(&assign.value);
            }
            Stmt::AnnAssign(assign) => {
                if let Expr::Name(name) = assign.target.as_ref() {
                    self.bind(
                        name.id.as_str(),
                        Self::span_of(name.range()),
                        BindingKind::Assign {
                            annotation: annotation_type(&assign.annotation),
                            annotation_raw: dotted_name(&assign.annotation),
                            value_qualname: assign.value.as_deref().and_then(dotted_name),
                            value_literal: assign
                                .value
                                .as_deref()
                                .and_then(literal_subscript_string),
                            value_type: assign
                                .value
                                .as_deref()
                                .map_or(PyType::Unknown, literal_type),
                        },
                    );
                }
                if let Some(value) = &assign.value {
                    self.maybe_record_assign(
                        &assign.target,
                        value,
                        Some(assign.annotation.as_ref()),
                    );
                    self.visit_expr(value);
                }
            }
            Stmt::Import(import) => {
                for alias in &import.names {
                    let full = alias.name.as_str();
                    match &alias.asname {
                        Some(asname) => self.bind(
                            asname.as_str(),
                            Self::span_of(asname.range()),
                            BindingKind::Import {
                                qualified: full.to_string(),
                                module: full.to_string(),
                                symbol: None,
                            },
                        ),
                        None => {
                            // `import a.b` binds `a`.
                            let top = full.split('.').next().unwrap_or(full);
                            self.bind(
                                top,
                                Self::span_of(alias.name.range()),
                                BindingKind::Import {
                                    qualified: top.to_string(),
                                    module: top.to_string(),
                                    symbol: None,
                                },
                            );
                        }
                    }
                }
            }
            Stmt::ImportFrom(import) => {
                let module = import.module.as_ref().map_or("", |m| m.as_str());
                for alias in &import.names {
                    let symbol = alias.name.as_str();
                    if symbol == "*" {
                        continue;
                    }
                    let local = alias.asname.as_ref().map_or(symbol, |a| a.as_str());
                    let span = alias
                        .asname
                        .as_ref()
                        .map_or_else(|| alias.name.range(), Ranged::range);
                    let qualified = if module.is_empty() {
                        symbol.to_string()
                    } else {
                        format!("{module}.{symbol}")
                    };
                    self.bind(
                        local,
                        Self::span_of(span),
                        BindingKind::Import {
                            qualified,
                            module: module.to_string(),
                            symbol: Some(symbol.to_string()),
                        },
                    );
                }
            }
            Stmt::For(for_stmt) => {
                self.bind_targets(&for_stmt.target);
                visitor::walk_stmt(self, stmt);
            }
            Stmt::With(with_stmt) => {
                for item in &with_stmt.items {
                    if let Some(vars) = &item.optional_vars {
                        self.bind_targets(vars);
                    }
                }
                visitor::walk_stmt(self, stmt);
            }
            _ => visitor::walk_stmt(self, stmt),
        }
    }

    fn visit_expr(&mut self, expr: &'a Expr) {
        match expr {
            Expr::Call(call) => {
                let callee = dotted_name(&call.func);
                for (index, arg) in call.arguments.args.iter().enumerate() {
                    if matches!(arg, Expr::FString(_) | Expr::TString(_)) {
                        self.record_template(
                            arg,
                            StringContext::CallArg {
                                callee: callee.clone(),
                                index,
                            },
                        );
                    }
                }
                visitor::walk_expr(self, expr);
            }
            Expr::ListComp(comp) => {
                for generator in &comp.generators {
                    self.bind_targets(&generator.target);
                }
                visitor::walk_expr(self, expr);
            }
            Expr::SetComp(comp) => {
                for generator in &comp.generators {
                    self.bind_targets(&generator.target);
                }
                visitor::walk_expr(self, expr);
            }
            Expr::DictComp(comp) => {
                for generator in &comp.generators {
                    self.bind_targets(&generator.target);
                }
                visitor::walk_expr(self, expr);
            }
            Expr::Generator(comp) => {
                for generator in &comp.generators {
                    self.bind_targets(&generator.target);
                }
                visitor::walk_expr(self, expr);
            }
            _ => visitor::walk_expr(self, expr),
        }
    }
}

/// Extract the `"html"` out of a `Literal["html"]` expression.
fn literal_subscript_string(expr: &Expr) -> Option<String> {
    let Expr::Subscript(subscript) = expr else {
        return None;
    };
    let base = dotted_name(&subscript.value)?;
    if base != "Literal" && base != "typing.Literal" {
        return None;
    }
    let Expr::StringLiteral(literal) = subscript.slice.as_ref() else {
        return None;
    };
    Some(literal.value.to_str().to_string())
}

/// Detect `Annotated[str, Literal["html"]]` (or a named language alias) on
/// the `source` field of a template protocol.
fn annotated_language(annotation: &Expr) -> Option<LangSource> {
    let Expr::Subscript(subscript) = annotation else {
        return None;
    };
    let base = dotted_name(&subscript.value)?;
    if base != "Annotated" && base != "typing.Annotated" {
        return None;
    }
    let Expr::Tuple(tuple) = subscript.slice.as_ref() else {
        return None;
    };
    let marker = tuple.elts.get(1)?;
    if let Some(literal) = literal_subscript_string(marker) {
        return LanguageTag::from_name(&literal).map(LangSource::Inline);
    }
    dotted_name(marker).map(LangSource::Ref)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(source: &str) -> ModuleModel {
        ModuleModel::parse(source).expect("source should parse")
    }

    #[test]
    fn discovers_template_in_marker_call() {
        let m = model("from tdom import html\n\npage = html(t\"<p>hi</p>\")\n");
        let templates: Vec<_> = m.markup_templates().collect();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].body, "<p>hi</p>");
        assert!(templates[0].is_t_string);
    }

    #[test]
    fn non_marker_call_is_not_markup() {
        let m = model("def other(s): ...\n\npage = other(t\"<p>hi</p>\")\n");
        assert_eq!(m.markup_templates().count(), 0);
        assert_eq!(m.templates().len(), 1);
    }

    #[test]
    fn dotted_marker_call() {
        let m = model("import tdom\n\npage = tdom.html(t\"<br/>\")\n");
        assert_eq!(m.markup_templates().count(), 1);
    }

    #[test]
    fn aliased_import_marker() {
        let m = model("from tdom import html as h\n\npage = h(t\"<br/>\")\n");
        assert_eq!(m.markup_templates().count(), 1);
    }

    #[test]
    fn assigned_alias_marker() {
        let m = model("import tdom\nrender = tdom.html\npage = render(t\"<br/>\")\n");
        assert_eq!(m.markup_templates().count(), 1);
    }

    #[test]
    fn decorated_factory_marks_calls() {
        let source = "\
from htm import htm

@htm
def render(tag, props, children):
    ...

page = render(t\"<br/>\")
";
        let m = model(source);
        assert_eq!(m.markup_templates().count(), 1);
    }

    #[test]
    fn vdom_return_type_marks_calls() {
        let source = "\
import tdom

def render(s) -> tdom.VDOMNode:
    ...

page = render(t\"<br/>\")
";
        let m = model(source);
        assert_eq!(m.markup_templates().count(), 1);
    }

    #[test]
    fn second_argument_is_not_markup() {
        let m = model("from tdom import html\n\npage = html(None, t\"<br/>\")\n");
        assert_eq!(m.markup_templates().count(), 0);
    }

    #[test]
    fn body_span_is_file_relative() {
        let source = "from tdom import html\npage = html(t\"<br/>\")\n";
        let m = model(source);
        let template = m.markup_templates().next().expect("one template");
        let start = template.body_span.start() as usize;
        let end = template.body_span.end() as usize;
        assert_eq!(&source[start..end], "<br/>");
    }

    #[test]
    fn scope_resolution_prefers_innermost() {
        let source = "\
x = 1

def outer():
    x = \"s\"
    y = x
";
        let m = model(source);
        let offset = source.find("y = x").map(|i| i as u32).expect("offset");
        let scope = m.scope_at(offset);
        let binding = m.resolve_locally("x", scope, Some(offset)).expect("binding");
        let BindingKind::Assign { value_type, .. } = &binding.kind else {
            panic!("expected assignment binding");
        };
        assert_eq!(*value_type, PyType::Str);
    }

    #[test]
    fn later_binding_wins_before_offset() {
        let source = "x = 1\nx = \"s\"\nz = x\n";
        let m = model(source);
        let offset = source.find("z =").map(|i| i as u32).expect("offset");
        let binding = m.resolve_locally("x", 0, Some(offset)).expect("binding");
        let BindingKind::Assign { value_type, .. } = &binding.kind else {
            panic!("expected assignment binding");
        };
        assert_eq!(*value_type, PyType::Str);
    }

    #[test]
    fn forward_reference_falls_back_to_first() {
        let source = "z = x\nx = 1\n";
        let m = model(source);
        assert!(m.resolve_locally("x", 0, Some(0)).is_some());
    }

    #[test]
    fn class_body_is_not_a_lookup_scope() {
        let source = "\
class C:
    attr = 1

def use():
    return attr
";
        let m = model(source);
        let offset = source.find("return attr").map(|i| i as u32).expect("offset");
        let scope = m.scope_at(offset);
        assert!(m.resolve_locally("attr", scope, Some(offset)).is_none());
    }

    #[test]
    fn dataclass_is_record() {
        let source = "\
from dataclasses import dataclass

@dataclass
class Card:
    title: str
";
        let m = model(source);
        let binding = m.resolve_locally("Card", 0, None).expect("binding");
        let BindingKind::Class(class) = &binding.kind else {
            panic!("expected class binding");
        };
        assert!(m.is_record(class, 0));
        assert_eq!(class.fields.len(), 1);
        assert_eq!(class.fields[0].annotation, PyType::Str);
        assert!(class.fields[0].required);
    }

    #[test]
    fn plain_class_is_not_record() {
        let m = model("class Widget:\n    pass\n");
        let binding = m.resolve_locally("Widget", 0, None).expect("binding");
        let BindingKind::Class(class) = &binding.kind else {
            panic!("expected class binding");
        };
        assert!(!m.is_record(class, 0));
    }

    #[test]
    fn template_usage_suppresses_unused() {
        let source = "\
from tdom import html

def view(name: str):
    greeting = \"hi\"
    return html(t\"<p>{greeting}</p>\")
";
        let m = model(source);
        let scope = m.scope_at(source.find("greeting").expect("offset") as u32);
        let greeting = m.resolve_locally("greeting", scope, None).expect("binding");
        assert!(m.is_binding_used_in_templates("greeting", greeting.span));
        let name = m.resolve_locally("name", scope, None).expect("binding");
        assert!(!m.is_binding_used_in_templates("name", name.span));
        assert!(!m.is_binding_used_in_templates("greet", Span::new(0, 0)));
    }

    #[test]
    fn same_named_binding_in_sibling_scope_stays_unused() {
        let source = "\
from tdom import html

def a():
    greeting = \"hi\"
    return html(t\"<p>{greeting}</p>\")

def b():
    greeting = \"bye\"
    return None
";
        let m = model(source);
        let scope_a = m.scope_at(source.find("greeting = \"hi\"").expect("offset") as u32);
        let scope_b = m.scope_at(source.find("greeting = \"bye\"").expect("offset") as u32);
        let used = m.resolve_locally("greeting", scope_a, None).expect("binding").span;
        let unused = m.resolve_locally("greeting", scope_b, None).expect("binding").span;
        assert_ne!(used, unused);
        assert!(m.is_binding_used_in_templates("greeting", used));
        assert!(!m.is_binding_used_in_templates("greeting", unused));
    }

    #[test]
    fn component_usage_suppresses_unused() {
        let source = "\
from tdom import html
from ui import Card

page = html(t\"<{Card} title=x />\")
";
        let m = model(source);
        let card = m.resolve_locally("Card", 0, None).expect("binding");
        assert!(m.is_binding_used_in_templates("Card", card.span));
    }

    #[test]
    fn assignment_context_records_annotation() {
        let source = "page: Template = t\"<p/>\"\n";
        let m = model(source);
        let template = &m.templates()[0];
        assert_eq!(
            template.context,
            StringContext::Assign {
                target: "page".to_string(),
                annotation: Some("Template".to_string()),
            }
        );
        assert!(!template.is_markup);
    }

    #[test]
    fn protocol_source_field_language() {
        let source = "\
from typing import Annotated, Literal, Protocol

class Template(Protocol):
    source: Annotated[str, Literal[\"html\"]]
";
        let m = model(source);
        let binding = m.resolve_locally("Template", 0, None).expect("binding");
        let BindingKind::Class(class) = &binding.kind else {
            panic!("expected class binding");
        };
        assert_eq!(class.source_lang, Some(LangSource::Inline(LanguageTag::Html)));
        assert_eq!(
            m.resolve_qualified(&class.bases[0], 0),
            "typing.Protocol"
        );
    }

    #[test]
    fn for_target_binds() {
        let source = "for item in rows:\n    pass\n";
        let m = model(source);
        assert!(m.resolve_locally("item", 0, None).is_some());
    }

    #[test]
    fn comprehension_target_binds() {
        let source = "out = [item for item in rows]\n";
        let m = model(source);
        assert!(m.resolve_locally("item", 0, None).is_some());
    }

    #[test]
    fn parse_error_is_reported() {
        assert!(ModuleModel::parse("def broken(:\n").is_err());
    }
}
