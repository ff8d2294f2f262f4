use std::io::IsTerminal;
use std::io::Read as _;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use clap::Parser;
use tdom_conf::DiagnosticSeverity;
use tdom_conf::DiagnosticsConfig;
use tdom_conf::Settings;
use tdom_python::FileSystemSourceProvider;
use tdom_python::ModuleModel;
use tdom_semantic::check_module;
use tdom_semantic::Problem;
use tdom_semantic::Severity;
use tdom_source::Diagnostic;
use tdom_source::DiagnosticRenderer;

use crate::args::Args;
use crate::commands::Command;
use crate::exit::Exit;
use crate::walk::walk_python_files;

#[derive(Debug, Parser)]
pub struct Check {
    /// Files or directories to check. If omitted, checks the project root
    /// (or standard input when it is piped).
    paths: Vec<Utf8PathBuf>,

    /// Promote specific diagnostic codes to errors (e.g. W001,I002).
    #[arg(long, value_delimiter = ',')]
    select: Vec<String>,

    /// Ignore specific diagnostic codes (e.g. E004,I001).
    #[arg(long, value_delimiter = ',')]
    ignore: Vec<String>,
}

impl Command for Check {
    fn execute(&self, _args: &Args) -> Result<Exit> {
        let project_root = resolve_project_root()?;
        let settings =
            Settings::new(project_root.as_std_path()).context("Failed to load settings")?;

        let config = build_diagnostics_config(&settings, &self.select, &self.ignore);
        let fmt = pick_renderer();

        let reading_stdin = !std::io::stdin().is_terminal() && self.paths.is_empty();

        if reading_stdin {
            return check_stdin(&project_root, &settings, &config, &fmt);
        }

        let files = discover_files(&self.paths, &project_root);

        if files.is_empty() {
            return Ok(Exit::success());
        }

        let roots = import_roots(&project_root, &settings);

        let mut problem_count: usize = 0;
        let mut error_count: usize = 0;
        let mut file_count: usize = 0;

        for path in &files {
            let source = match std::fs::read_to_string(path) {
                Ok(source) => source,
                Err(e) => {
                    tracing::warn!("skipping {path}: {e}");
                    continue;
                }
            };

            let model = match ModuleModel::parse(&source) {
                Ok(model) => model,
                Err(e) => {
                    tracing::debug!("skipping {path}: {e}");
                    continue;
                }
            };

            // Imports resolve against the file's own directory first, then
            // any configured roots.
            let mut provider_roots = roots.clone();
            if let Some(parent) = path.parent() {
                provider_roots.insert(0, parent.to_owned());
            }
            let provider = FileSystemSourceProvider::new(provider_roots);

            let problems = effective_problems(check_module(&model, &provider), &config);
            if problems.is_empty() {
                continue;
            }

            file_count += 1;
            for problem in &problems {
                if problem.severity == Severity::Error {
                    error_count += 1;
                }
                let rendered = render_problem(&source, path.as_str(), problem, &fmt);
                println!("{rendered}\n");
            }
            problem_count += problems.len();
        }

        Ok(summarize(problem_count, error_count, file_count))
    }
}

fn check_stdin(
    project_root: &Utf8Path,
    settings: &Settings,
    config: &DiagnosticsConfig,
    fmt: &DiagnosticRenderer,
) -> Result<Exit> {
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .context("Failed to read stdin")?;

    let model = ModuleModel::parse(&source).context("Failed to parse stdin as Python")?;
    let provider = FileSystemSourceProvider::new(import_roots(project_root, settings));

    let problems = effective_problems(check_module(&model, &provider), config);
    if problems.is_empty() {
        return Ok(Exit::success());
    }

    let mut error_count: usize = 0;
    for problem in &problems {
        if problem.severity == Severity::Error {
            error_count += 1;
        }
        let rendered = render_problem(&source, "<stdin>.py", problem, fmt);
        println!("{rendered}\n");
    }

    Ok(summarize(problems.len(), error_count, 1))
}

fn summarize(problem_count: usize, error_count: usize, file_count: usize) -> Exit {
    if problem_count == 0 {
        return Exit::success();
    }

    let problem_word = if problem_count == 1 {
        "problem"
    } else {
        "problems"
    };
    let file_word = if file_count == 1 { "file" } else { "files" };
    let message = format!("Found {problem_count} {problem_word} in {file_count} {file_word}.");

    if error_count > 0 {
        Exit::error().with_message(message)
    } else {
        Exit::success().with_message(message)
    }
}

fn discover_files(paths: &[Utf8PathBuf], project_root: &Utf8Path) -> Vec<Utf8PathBuf> {
    if paths.is_empty() {
        return walk_python_files(&[project_root.to_owned()]);
    }

    let resolved: Vec<Utf8PathBuf> = paths
        .iter()
        .map(|p| {
            if p.is_relative() {
                project_root.join(p)
            } else {
                p.clone()
            }
        })
        .collect();
    walk_python_files(&resolved)
}

fn import_roots(project_root: &Utf8Path, settings: &Settings) -> Vec<Utf8PathBuf> {
    settings
        .python_roots
        .iter()
        .map(|root| {
            let path = Utf8PathBuf::from(root);
            if path.is_relative() {
                project_root.join(path)
            } else {
                path
            }
        })
        .collect()
}

/// Apply configured severity overrides: `off` drops the problem, any other
/// override replaces the rule's built-in severity.
fn effective_problems(problems: Vec<Problem>, config: &DiagnosticsConfig) -> Vec<Problem> {
    problems
        .into_iter()
        .filter_map(|mut problem| {
            match config.severity_override(problem.code.as_str()) {
                Some(DiagnosticSeverity::Off) => return None,
                Some(DiagnosticSeverity::Error) => problem.severity = Severity::Error,
                Some(DiagnosticSeverity::Warning) => problem.severity = Severity::Warning,
                Some(DiagnosticSeverity::WeakWarning) => problem.severity = Severity::WeakWarning,
                None => {}
            }
            Some(problem)
        })
        .collect()
}

fn render_problem(
    source: &str,
    path: &str,
    problem: &Problem,
    fmt: &DiagnosticRenderer,
) -> String {
    let diagnostic = Diagnostic::new(
        source,
        path,
        problem.code.as_str(),
        &problem.message,
        problem.severity.render_level(),
        problem.span,
        "",
    );
    fmt.render(&diagnostic)
}

fn build_diagnostics_config(
    settings: &Settings,
    select: &[String],
    ignore: &[String],
) -> DiagnosticsConfig {
    let mut config = settings.diagnostics.clone();

    for code in select {
        config.set_severity(code, DiagnosticSeverity::Error);
    }

    for code in ignore {
        config.set_severity(code, DiagnosticSeverity::Off);
    }

    config
}

fn resolve_project_root() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|_| anyhow::anyhow!("Current directory is not valid UTF-8"))
}

fn pick_renderer() -> DiagnosticRenderer {
    if std::io::stdout().is_terminal() {
        DiagnosticRenderer::styled()
    } else {
        DiagnosticRenderer::plain()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::process::Command as ProcessCommand;

    use super::*;
    use tdom_semantic::RuleCode;
    use tdom_source::Span;

    fn tdom_check_binary() -> std::path::PathBuf {
        let mut path = std::env::current_exe().unwrap();
        // test binary lives in target/debug/deps/tdom_check-HASH
        // actual binary is target/debug/tdom-check
        path.pop(); // remove the test binary name
        if path.ends_with("deps") {
            path.pop();
        }
        path.push("tdom-check");
        path
    }

    const CLEAN_MODULE: &str = "\
from tdom import html

def Card(*, title: str) -> None: ...

page = html(t'<{Card} title=\"hi\" />')
";

    const MISSING_BRACES_MODULE: &str = "\
from tdom import html

page = html(t'<Card />')
";

    const MISSING_ARGUMENT_MODULE: &str = "\
from tdom import html

def Card(*, title: str) -> None: ...

page = html(t'<{Card} />')
";

    #[test]
    fn check_clean_file_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.py"), CLEAN_MODULE).unwrap();

        let output = ProcessCommand::new(tdom_check_binary())
            .args(["check", "app.py"])
            .current_dir(dir.path())
            .output()
            .unwrap();

        assert!(
            output.status.success(),
            "Expected exit 0, got {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }

    #[test]
    fn check_missing_braces_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.py"), MISSING_BRACES_MODULE).unwrap();

        let output = ProcessCommand::new(tdom_check_binary())
            .args(["check", "app.py"])
            .current_dir(dir.path())
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            stdout.contains("E003"),
            "Expected E003 error code in output:\n{stdout}"
        );
        assert!(
            stdout.contains("curly braces"),
            "Expected braces message in output:\n{stdout}"
        );
    }

    #[test]
    fn check_warning_alone_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.py"), MISSING_ARGUMENT_MODULE).unwrap();

        let output = ProcessCommand::new(tdom_check_binary())
            .args(["check", "app.py"])
            .current_dir(dir.path())
            .output()
            .unwrap();

        assert!(
            output.status.success(),
            "Expected exit 0 for warning-only output, got {:?}\nstdout: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
        );
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            stdout.contains("W001"),
            "Expected W001 in output:\n{stdout}"
        );
    }

    #[test]
    fn check_select_promotes_warning_to_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.py"), MISSING_ARGUMENT_MODULE).unwrap();

        let output = ProcessCommand::new(tdom_check_binary())
            .args(["check", "--select", "W001", "app.py"])
            .current_dir(dir.path())
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
    }

    #[test]
    fn check_ignore_suppresses_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.py"), MISSING_BRACES_MODULE).unwrap();

        let output = ProcessCommand::new(tdom_check_binary())
            .args(["check", "--ignore", "E003", "app.py"])
            .current_dir(dir.path())
            .output()
            .unwrap();

        assert!(
            output.status.success(),
            "Expected exit 0 with --ignore E003, got {:?}\nstdout: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
        );
    }

    #[test]
    fn check_stdin_detects_errors() {
        let dir = tempfile::tempdir().unwrap();

        let mut child = ProcessCommand::new(tdom_check_binary())
            .args(["check"])
            .current_dir(dir.path())
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .unwrap();

        child
            .stdin
            .take()
            .unwrap()
            .write_all(MISSING_BRACES_MODULE.as_bytes())
            .unwrap();

        let output = child.wait_with_output().unwrap();

        assert_eq!(output.status.code(), Some(1));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            stdout.contains("E003"),
            "Expected E003 in stdin output:\n{stdout}"
        );
    }

    #[test]
    fn check_no_files_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("src");
        std::fs::create_dir_all(&empty).unwrap();

        let output = ProcessCommand::new(tdom_check_binary())
            .args(["check", "src/"])
            .current_dir(dir.path())
            .output()
            .unwrap();

        assert!(
            output.status.success(),
            "Expected exit 0 for empty dir, got {:?}",
            output.status.code(),
        );
    }

    #[test]
    fn severity_overrides_reshape_problems() {
        let mut config = DiagnosticsConfig::default();
        config.set_severity("W001", DiagnosticSeverity::Error);
        config.set_severity("I", DiagnosticSeverity::Off);

        let problems = vec![
            Problem::new(RuleCode::W001, "missing a required argument: 'x'", Span::new(0, 4)),
            Problem::new(RuleCode::I001, "unsafe", Span::new(5, 4)),
            Problem::new(RuleCode::E002, "mismatch", Span::new(10, 4)),
        ];

        let effective = effective_problems(problems, &config);
        assert_eq!(effective.len(), 2);
        assert_eq!(effective[0].severity, Severity::Error);
        assert_eq!(effective[1].code, RuleCode::E002);
    }
}
