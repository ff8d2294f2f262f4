//! The diagnostic rule engine.
//!
//! Structural rules come straight off the template body text; component
//! rules resolve the tag's braced reference against the enclosing Python and
//! check the attribute list against the resolved signature. Every pass
//! re-scans from scratch and fails soft: an unresolved or non-component
//! reference produces no attribute diagnostics.

use rustc_hash::FxHashSet;
use tdom_markup::check_structure;
use tdom_markup::StructuralError;
use tdom_markup::TagMatch;
use tdom_python::ModuleModel;
use tdom_python::SourceProvider;
use tdom_python::TemplateString;
use tdom_source::Span;

use crate::problem::Problem;
use crate::problem::RuleCode;

/// Run every rule over one template string. Spans are literal-relative
/// (prefix included), ready to be shifted by the literal's file offset.
#[must_use]
pub fn check_template(
    model: &ModuleModel,
    template: &TemplateString,
    provider: &dyn SourceProvider,
) -> Vec<Problem> {
    let mut problems: Vec<Problem> = check_structure(&template.body, template.prefix_len)
        .into_iter()
        .map(structural_problem)
        .collect();

    for tag in tdom_markup::scan(&template.body) {
        check_component_tag(model, template, &tag, provider, &mut problems);
    }

    problems.sort_by_key(|p| (p.span.start(), p.code.as_str()));
    problems
}

/// Run the engine over every markup template in a module. Spans are
/// file-relative.
#[must_use]
pub fn check_module(model: &ModuleModel, provider: &dyn SourceProvider) -> Vec<Problem> {
    let mut problems = Vec::new();
    for template in model.markup_templates() {
        for mut problem in check_template(model, template, provider) {
            problem.span = problem.span.shift(template.literal_span.start());
            problems.push(problem);
        }
    }
    problems.sort_by_key(|p| p.span.start());
    problems
}

fn structural_problem(error: StructuralError) -> Problem {
    let code = match &error {
        StructuralError::VoidElementWithChildren { .. } => RuleCode::E001,
        StructuralError::MismatchedClosingTag { .. } => RuleCode::E002,
        StructuralError::MissingComponentBraces { .. } => RuleCode::E003,
        StructuralError::UnsafeInterpolation { .. } => RuleCode::I001,
        StructuralError::BooleanAttributeString { .. } => RuleCode::I002,
        StructuralError::EmptyTemplate { .. } => RuleCode::I003,
    };
    Problem::new(code, error.to_string(), error.span())
}

fn check_component_tag(
    model: &ModuleModel,
    template: &TemplateString,
    tag: &TagMatch,
    provider: &dyn SourceProvider,
    problems: &mut Vec<Problem>,
) {
    let Some(component) = &tag.component else {
        return;
    };
    let entity = model.classify_component(
        &component.name,
        template.scope,
        template.literal_span.start(),
        provider,
    );
    let Some(signature) = entity.signature() else {
        // Unresolved or not a component: nothing to check against.
        tracing::trace!(component = %component.name, "skipping unresolvable component");
        return;
    };

    let prefix = template.prefix_len;
    // Keys with whitespace-only values live in the disjoint empty
    // collection and do not count as supplied.
    let supplied: FxHashSet<&str> = tag
        .attributes
        .iter()
        .map(|attr| attr.name.as_str())
        .collect();

    // W001: required parameters the attribute list does not supply.
    for param in signature.required_params() {
        if !supplied.contains(param.name.as_str()) {
            problems.push(Problem::new(
                RuleCode::W001,
                format!("missing a required argument: '{}'", param.name),
                component.name_span.shift(prefix),
            ));
        }
    }

    // W002: children provided via a paired closing tag, but no way to
    // receive them.
    let closing = format!("</{{{}}}>", component.name);
    if template.body.contains(&closing) && !signature.has_children_param() {
        problems.push(Problem::new(
            RuleCode::W002,
            format!(
                "Component '{}' doesn't accept 'children' parameter, content will be ignored",
                component.name
            ),
            component.span.shift(prefix),
        ));
    }

    for attribute in &tag.attributes {
        let Some(param) = signature.param(&attribute.name) else {
            // E004: unknown attribute name. A `**kwargs` component accepts
            // anything.
            if !signature.has_kwargs() {
                problems.push(Problem::new(
                    RuleCode::E004,
                    format!("invalid argument: '{}'", attribute.name),
                    attribute.name_span.shift(prefix),
                ));
            }
            continue;
        };

        if attribute.value.is_empty_text() {
            problems.push(expression_expected(attribute.value_span, prefix));
            continue;
        }

        // W003: compare the declared type against the value expression.
        let actual = model.infer_expression_type(
            &attribute.value.actual_text(),
            template.scope,
            template.literal_span.start(),
        );
        if !param.annotation.accepts(&actual) {
            problems.push(Problem::new(
                RuleCode::W003,
                format!(
                    "Expected type '{}', got '{}' instead",
                    param.annotation.display_name(),
                    actual.display_name()
                ),
                attribute.span.shift(prefix),
            ));
        }
    }

    // E005: `name=` followed by whitespace, when the name maps to a real
    // parameter.
    for attribute in &tag.empty_attributes {
        if signature.param(&attribute.name).is_some() {
            problems.push(expression_expected(attribute.value_span, prefix));
        }
    }
}

fn expression_expected(value_span: Span, prefix: u32) -> Problem {
    // Highlight the single character slot right after the `=`.
    let span = Span::new(value_span.start(), 1).shift(prefix);
    Problem::new(RuleCode::E005, "Expression expected", span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Severity;
    use tdom_python::NullSourceProvider;

    fn problems_for(source: &str) -> Vec<Problem> {
        let model = ModuleModel::parse(source).expect("source should parse");
        check_module(&model, &NullSourceProvider)
    }

    fn codes(problems: &[Problem]) -> Vec<RuleCode> {
        problems.iter().map(|p| p.code).collect()
    }

    const PRELUDE: &str = "from tdom import html\n\ndef Card(title: str, count: int = 0): ...\n\n";

    #[test]
    fn clean_template_has_no_problems() {
        let source = format!("{PRELUDE}page = html(t'<{{Card}} title=\"hi\" />')\n");
        assert!(problems_for(&source).is_empty());
    }

    #[test]
    fn missing_required_argument() {
        let source = format!("{PRELUDE}page = html(t\"<{{Card}} />\")\n");
        let problems = problems_for(&source);
        assert_eq!(codes(&problems), vec![RuleCode::W001]);
        assert_eq!(problems[0].message, "missing a required argument: 'title'");
        assert_eq!(problems[0].severity, Severity::Warning);
    }

    #[test]
    fn optional_argument_is_not_required() {
        let source = format!("{PRELUDE}page = html(t\"<{{Card}} title=x />\")\n");
        assert!(problems_for(&source).is_empty());
    }

    #[test]
    fn children_param_is_never_required() {
        let source = "\
from tdom import html

def Panel(children): ...

page = html(t\"<{Panel} />\")
";
        assert!(problems_for(source).is_empty());
    }

    #[test]
    fn invalid_argument_name() {
        let source = format!("{PRELUDE}page = html(t\"<{{Card}} title=x bogus=1 />\")\n");
        let problems = problems_for(&source);
        assert_eq!(codes(&problems), vec![RuleCode::E004]);
        assert_eq!(problems[0].message, "invalid argument: 'bogus'");
    }

    #[test]
    fn kwargs_component_accepts_any_argument() {
        let source = "\
from tdom import html

def Panel(**props): ...

page = html(t\"<{Panel} anything=1 />\")
";
        assert!(problems_for(source).is_empty());
    }

    #[test]
    fn expression_expected_for_empty_value() {
        let source = format!("{PRELUDE}page = html(t\"<{{Card}} title= />\")\n");
        let problems = problems_for(&source);
        assert_eq!(codes(&problems), vec![RuleCode::W001, RuleCode::E005]);
        let e005 = &problems[1];
        assert_eq!(e005.message, "Expression expected");
        assert_eq!(e005.span.length(), 1);
    }

    #[test]
    fn type_mismatch_on_bareword_for_int() {
        // A bareword reads as a string, so an int parameter mismatches.
        let source = format!("{PRELUDE}page = html(t\"<{{Card}} title=x count=three />\")\n");
        let problems = problems_for(&source);
        assert_eq!(codes(&problems), vec![RuleCode::W003]);
        assert_eq!(
            problems[0].message,
            "Expected type 'int', got 'str' instead"
        );
    }

    #[test]
    fn braced_expression_type_checks_against_binding() {
        let source = "\
from tdom import html

def Card(count: int): ...

def view(n: int, s: str):
    good = html(t\"<{Card} count={n} />\")
    bad = html(t\"<{Card} count={s} />\")
";
        let problems = problems_for(source);
        assert_eq!(codes(&problems), vec![RuleCode::W003]);
    }

    #[test]
    fn unknown_type_never_mismatches() {
        let source = format!("{PRELUDE}page = html(t\"<{{Card}} title={{mystery}} />\")\n");
        assert!(problems_for(&source).is_empty());
    }

    #[test]
    fn unresolved_component_yields_no_attribute_problems() {
        let source = "from tdom import html\n\npage = html(t\"<{Nowhere} bogus=1 />\")\n";
        assert!(problems_for(source).is_empty());
    }

    #[test]
    fn children_warning_for_paired_tag() {
        let source = format!(
            "{PRELUDE}page = html(t\"<{{Card}} title=x>body</{{Card}}>\")\n"
        );
        let problems = problems_for(&source);
        assert_eq!(codes(&problems), vec![RuleCode::W002]);
        assert_eq!(
            problems[0].message,
            "Component 'Card' doesn't accept 'children' parameter, content will be ignored"
        );
    }

    #[test]
    fn children_accepted_when_component_takes_them() {
        let source = "\
from tdom import html

def Panel(children=None): ...

page = html(t\"<{Panel}>body</{Panel}>\")
";
        assert!(problems_for(source).is_empty());
    }

    #[test]
    fn void_element_with_children_is_an_error() {
        let source =
            "from tdom import html\n\npage = html(t\"<{X} /><br>text</br>\")\n";
        let problems = problems_for(source);
        assert_eq!(codes(&problems), vec![RuleCode::E001]);
        assert_eq!(
            problems[0].message,
            "Void element '<br>' cannot have children"
        );
        assert_eq!(problems[0].severity, Severity::Error);
    }

    #[test]
    fn mismatched_closing_tag_reported_once_per_pair() {
        let source =
            "from tdom import html\n\npage = html(t\"<{A}>x</{B}>\")\n";
        let problems = problems_for(source);
        assert_eq!(codes(&problems), vec![RuleCode::E002]);
        assert_eq!(
            problems[0].message,
            "Mismatched closing tag '</{B}>' for component '<{A}>'"
        );
    }

    #[test]
    fn weak_warnings_for_boolean_and_unsafe_content() {
        let source = "\
from tdom import html

page = html(t'<{X} /><script>{data}</script><input disabled=\"true\">')
";
        let problems = problems_for(source);
        let found = codes(&problems);
        assert!(found.contains(&RuleCode::I001));
        assert!(found.contains(&RuleCode::I002));
        assert!(problems.iter().all(|p| p.severity == Severity::WeakWarning));
    }

    #[test]
    fn empty_template_is_flagged() {
        let source = "from tdom import html\n\npage = html(t\"\")\n";
        let problems = problems_for(source);
        assert_eq!(codes(&problems), vec![RuleCode::I003]);
    }

    #[test]
    fn module_spans_are_file_relative() {
        let source = format!("{PRELUDE}page = html(t\"<{{Card}} />\")\n");
        let problems = problems_for(&source);
        assert_eq!(problems.len(), 1);
        let span = problems[0].span;
        assert_eq!(
            &source[span.start() as usize..span.end() as usize],
            "Card"
        );
    }

    #[test]
    fn non_markup_strings_are_not_checked() {
        let source = "def other(s): ...\n\npage = other(t\"<br>text</br>\")\n";
        assert!(problems_for(source).is_empty());
    }
}
