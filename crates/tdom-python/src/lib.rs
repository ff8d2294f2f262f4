//! Python-side analysis for tdom templates.
//!
//! Parses a module with Ruff's Python parser and builds an owned
//! [`ModuleModel`]: the scope tree, the bindings visible in each scope, and
//! every template string in a markup or injectable position. On top of the
//! model sit component resolution ([`ResolvedEntity`]), attribute type
//! inference, and injection-language lookup.

mod error;
mod inject;
mod model;
mod provider;
mod resolve;
mod types;

pub use error::PythonError;
pub use inject::LanguageTag;
pub use model::Binding;
pub use model::BindingKind;
pub use model::ClassBinding;
pub use model::FunctionBinding;
pub use model::LangSource;
pub use model::ModuleModel;
pub use model::ParamDef;
pub use model::ParamKind;
pub use model::Scope;
pub use model::ScopeId;
pub use model::StringContext;
pub use model::TemplateString;
pub use provider::FileSystemSourceProvider;
pub use provider::NullSourceProvider;
pub use provider::SourceProvider;
pub use resolve::DeclKind;
pub use resolve::Declaration;
pub use resolve::ResolvedEntity;
pub use resolve::Signature;
pub use types::PyType;
