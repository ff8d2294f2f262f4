//! A deliberately small model of Python types.
//!
//! Attribute checking only needs to compare an annotation against the shape
//! of a literal or an annotated local, so anything beyond the builtin
//! scalars collapses to a named nominal type or `Unknown`.

use ruff_python_ast::Expr;
use serde::Serialize;

/// The subset of Python types the attribute checker reasons about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PyType {
    Str,
    Int,
    Float,
    Bool,
    None,
    /// A nominal type referenced by (possibly dotted) name.
    Named(String),
    Unknown,
}

impl PyType {
    /// The display name used in diagnostics, matching Python spelling.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            PyType::Str => "str",
            PyType::Int => "int",
            PyType::Float => "float",
            PyType::Bool => "bool",
            PyType::None => "None",
            PyType::Named(name) => name,
            PyType::Unknown => "Unknown",
        }
    }

    /// Whether a value of type `actual` is acceptable where `self` is
    /// expected. `Unknown` on either side never mismatches, and an `int`
    /// is acceptable where a `float` is expected.
    #[must_use]
    pub fn accepts(&self, actual: &PyType) -> bool {
        if matches!(self, PyType::Unknown) || matches!(actual, PyType::Unknown) {
            return true;
        }
        if self == actual {
            return true;
        }
        matches!((self, actual), (PyType::Float, PyType::Int))
    }
}

impl std::fmt::Display for PyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Flatten a `Name` or dotted `Attribute` chain into `a.b.c` form.
#[must_use]
pub fn dotted_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Name(name) => Some(name.id.as_str().to_string()),
        Expr::Attribute(attr) => {
            let base = dotted_name(&attr.value)?;
            Some(format!("{base}.{}", attr.attr.as_str()))
        }
        _ => None,
    }
}

/// Interpret an annotation expression as a [`PyType`].
///
/// `Optional[T]`, unions and subscripts degrade to `Unknown` rather than
/// guessing; a bare name maps to a builtin scalar or a nominal type.
#[must_use]
pub fn annotation_type(expr: &Expr) -> PyType {
    match expr {
        Expr::Name(_) | Expr::Attribute(_) => match dotted_name(expr).as_deref() {
            Some("str") => PyType::Str,
            Some("int") => PyType::Int,
            Some("float") => PyType::Float,
            Some("bool") => PyType::Bool,
            Some("None") => PyType::None,
            Some(other) => PyType::Named(other.to_string()),
            None => PyType::Unknown,
        },
        Expr::NoneLiteral(_) => PyType::None,
        Expr::StringLiteral(literal) => {
            // A quoted forward reference: `x: "Card"`.
            let name = literal.value.to_str().trim();
            if name.is_empty() {
                PyType::Unknown
            } else {
                PyType::Named(name.to_string())
            }
        }
        _ => PyType::Unknown,
    }
}

/// The type of a literal expression, for inferring unannotated assignments
/// and attribute values.
#[must_use]
pub fn literal_type(expr: &Expr) -> PyType {
    match expr {
        Expr::StringLiteral(_) | Expr::FString(_) | Expr::TString(_) => PyType::Str,
        Expr::BytesLiteral(_) => PyType::Named("bytes".to_string()),
        Expr::BooleanLiteral(_) => PyType::Bool,
        Expr::NoneLiteral(_) => PyType::None,
        Expr::NumberLiteral(number) => {
            use ruff_python_ast::Number;
            match &number.value {
                Number::Int(_) => PyType::Int,
                Number::Float(_) => PyType::Float,
                Number::Complex { .. } => PyType::Named("complex".to_string()),
            }
        }
        Expr::UnaryOp(unary) => literal_type(&unary.operand),
        _ => PyType::Unknown,
    }
}
