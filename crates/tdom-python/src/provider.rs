//! Source lookup for one-level import following.
//!
//! Component references can point at symbols imported from other modules.
//! The resolver asks a [`SourceProvider`] for the text of the target module
//! and analyzes it in isolation; imports inside *that* module are not
//! followed further.

use camino::Utf8Path;
use camino::Utf8PathBuf;

pub trait SourceProvider {
    /// The source text of `module` (dotted form, e.g. `ui.cards`), or `None`
    /// when the module cannot be located.
    fn module_source(&self, module: &str) -> Option<String>;
}

/// Provider that never finds anything. Used for isolated analysis and to
/// cap import following at one hop.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSourceProvider;

impl SourceProvider for NullSourceProvider {
    fn module_source(&self, _module: &str) -> Option<String> {
        None
    }
}

/// Resolves modules against a list of filesystem roots, trying `pkg/mod.py`
/// then `pkg/mod/__init__.py` under each root in order.
#[derive(Debug, Clone)]
pub struct FileSystemSourceProvider {
    roots: Vec<Utf8PathBuf>,
}

impl FileSystemSourceProvider {
    #[must_use]
    pub fn new(roots: Vec<Utf8PathBuf>) -> Self {
        Self { roots }
    }

    fn candidates(root: &Utf8Path, module: &str) -> [Utf8PathBuf; 2] {
        let relative = module.replace('.', "/");
        [
            root.join(format!("{relative}.py")),
            root.join(relative).join("__init__.py"),
        ]
    }
}

impl SourceProvider for FileSystemSourceProvider {
    fn module_source(&self, module: &str) -> Option<String> {
        for root in &self.roots {
            for candidate in Self::candidates(root, module) {
                match std::fs::read_to_string(&candidate) {
                    Ok(source) => {
                        tracing::trace!(module, path = %candidate, "resolved module source");
                        return Some(source);
                    }
                    Err(_) => continue,
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_plain_module() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        std::fs::write(root.join("ui.py"), "x = 1\n").unwrap();

        let provider = FileSystemSourceProvider::new(vec![root]);
        assert_eq!(provider.module_source("ui").as_deref(), Some("x = 1\n"));
        assert!(provider.module_source("missing").is_none());
    }

    #[test]
    fn finds_package_init() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        std::fs::create_dir_all(root.join("ui/cards")).unwrap();
        std::fs::write(root.join("ui/cards/__init__.py"), "y = 2\n").unwrap();

        let provider = FileSystemSourceProvider::new(vec![root]);
        assert!(provider.module_source("ui.cards").is_some());
    }

    #[test]
    fn null_provider_finds_nothing() {
        assert!(NullSourceProvider.module_source("ui").is_none());
    }
}
