//! Problem and rule-code types shared by the rule engine and its consumers.

use serde::Serialize;
use tdom_source::Span;

/// Stable rule codes. `E` rules are errors, `W` warnings, `I` weak warnings
/// by default; configuration can override the severity per code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RuleCode {
    /// Void element with children.
    E001,
    /// Mismatched component closing tag.
    E002,
    /// Component name missing braces.
    E003,
    /// Invalid argument name.
    E004,
    /// Expression expected after `=`.
    E005,
    /// Missing required argument.
    W001,
    /// Component does not accept children.
    W002,
    /// Attribute type mismatch.
    W003,
    /// Interpolated content in a content element without `:safe`.
    I001,
    /// Boolean attribute with a string value.
    I002,
    /// Empty template.
    I003,
}

impl RuleCode {
    pub const ALL: &'static [RuleCode] = &[
        RuleCode::E001,
        RuleCode::E002,
        RuleCode::E003,
        RuleCode::E004,
        RuleCode::E005,
        RuleCode::W001,
        RuleCode::W002,
        RuleCode::W003,
        RuleCode::I001,
        RuleCode::I002,
        RuleCode::I003,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RuleCode::E001 => "E001",
            RuleCode::E002 => "E002",
            RuleCode::E003 => "E003",
            RuleCode::E004 => "E004",
            RuleCode::E005 => "E005",
            RuleCode::W001 => "W001",
            RuleCode::W002 => "W002",
            RuleCode::W003 => "W003",
            RuleCode::I001 => "I001",
            RuleCode::I002 => "I002",
            RuleCode::I003 => "I003",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == code)
    }

    #[must_use]
    pub fn default_severity(self) -> Severity {
        match self {
            RuleCode::E001
            | RuleCode::E002
            | RuleCode::E003
            | RuleCode::E004
            | RuleCode::E005 => Severity::Error,
            RuleCode::W001 | RuleCode::W002 | RuleCode::W003 => Severity::Warning,
            RuleCode::I001 | RuleCode::I002 | RuleCode::I003 => Severity::WeakWarning,
        }
    }
}

impl std::fmt::Display for RuleCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    WeakWarning,
    Warning,
    Error,
}

impl Severity {
    /// Mapping into the renderer's levels; weak warnings render as notes.
    #[must_use]
    pub fn render_level(self) -> tdom_source::Severity {
        match self {
            Severity::Error => tdom_source::Severity::Error,
            Severity::Warning => tdom_source::Severity::Warning,
            Severity::WeakWarning => tdom_source::Severity::Info,
        }
    }
}

/// One diagnostic produced by the rule engine.
///
/// Spans are relative to the string literal when produced by
/// [`check_template`](crate::check_template) and file-relative when produced
/// by [`check_module`](crate::check_module).
#[derive(Debug, Clone, Serialize)]
pub struct Problem {
    pub code: RuleCode,
    pub message: String,
    pub severity: Severity,
    pub span: Span,
}

impl Problem {
    #[must_use]
    pub fn new(code: RuleCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            severity: code.default_severity(),
            span,
        }
    }
}
