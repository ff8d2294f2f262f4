use std::collections::HashMap;

use serde::Deserialize;

/// Severity override for a rule code. `Off` disables the rule entirely;
/// the absence of an override keeps the rule's built-in severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSeverity {
    Off,
    Error,
    Warning,
    WeakWarning,
}

/// Per-code severity configuration.
///
/// Keys are either full rule codes or prefixes; a specific code beats a
/// prefix, and a longer prefix beats a shorter one:
///
/// ```toml
/// [diagnostics.severity]
/// "I" = "off"          # silence all informational rules
/// I002 = "warning"     # except boolean-attribute strings
/// W001 = "error"       # promote missing-required-argument
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct DiagnosticsConfig {
    #[serde(default)]
    pub severity: HashMap<String, DiagnosticSeverity>,
}

impl DiagnosticsConfig {
    /// The configured override for a code, resolved most-specific-first:
    /// exact match, then longest matching prefix. `None` when the code is
    /// not configured at all.
    #[must_use]
    pub fn severity_override(&self, code: &str) -> Option<DiagnosticSeverity> {
        if let Some(&severity) = self.severity.get(code) {
            return Some(severity);
        }

        let mut best_match: Option<(&str, DiagnosticSeverity)> = None;
        for (pattern, &severity) in &self.severity {
            if code.starts_with(pattern.as_str()) {
                match best_match {
                    None => best_match = Some((pattern, severity)),
                    Some((existing, _)) => {
                        if pattern.len() > existing.len() {
                            best_match = Some((pattern, severity));
                        }
                    }
                }
            }
        }
        best_match.map(|(_, severity)| severity)
    }

    /// Whether a code should be reported at all.
    #[must_use]
    pub fn is_enabled(&self, code: &str) -> bool {
        self.severity_override(code) != Some(DiagnosticSeverity::Off)
    }

    /// Set the severity for a code or prefix, replacing any file-configured
    /// value. Used by the CLI's `--select` and `--ignore` flags.
    pub fn set_severity(&mut self, code: &str, severity: DiagnosticSeverity) {
        self.severity.insert(code.to_string(), severity);
    }
}
