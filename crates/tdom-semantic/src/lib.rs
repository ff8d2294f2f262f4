//! Diagnostic rules for tdom template strings.
//!
//! Combines the textual structural checks from `tdom-markup` with
//! component-signature checks backed by `tdom-python`, producing [`Problem`]s
//! with stable rule codes.

mod problem;
mod rules;

pub use problem::Problem;
pub use problem::RuleCode;
pub use problem::Severity;
pub use rules::check_module;
pub use rules::check_template;

use tdom_python::Declaration;
use tdom_python::ModuleModel;

/// Whether a declaration is referenced from any markup template in the
/// module. Hosts use this to suppress their unused-variable diagnostics for
/// names that only appear inside template strings. Mentions are resolved
/// from each template's scope, so a same-named binding elsewhere in the
/// file is not treated as used.
#[must_use]
pub fn is_used_in_templates(model: &ModuleModel, declaration: &Declaration) -> bool {
    // Declarations followed into other modules can never be the target of a
    // local unused-variable check.
    if declaration.module.is_some() {
        return false;
    }
    model.is_binding_used_in_templates(&declaration.name, declaration.span)
}
