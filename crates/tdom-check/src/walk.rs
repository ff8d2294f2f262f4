use camino::Utf8Path;
use camino::Utf8PathBuf;
use ignore::WalkBuilder;

pub fn is_python_file(path: &Utf8Path) -> bool {
    path.extension() == Some("py")
}

/// Walk the given paths and collect Python source files.
///
/// Each entry may be a file or a directory. Files are included directly;
/// directories are walked recursively with hidden entries skipped and
/// `.gitignore` rules respected (via the `ignore` crate).
///
/// Returns a sorted, deduplicated list.
#[must_use]
pub fn walk_python_files(paths: &[Utf8PathBuf]) -> Vec<Utf8PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_python_file(path) {
                files.push(path.clone());
            }
            continue;
        }

        if !path.is_dir() {
            continue;
        }

        let walker = WalkBuilder::new(path.as_std_path())
            .standard_filters(true)
            .build();

        for entry in walker.filter_map(Result::ok) {
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let Some(utf8) = Utf8Path::from_path(entry.path()) else {
                continue;
            };
            if is_python_file(utf8) {
                files.push(utf8.to_owned());
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8(path: &std::path::Path) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(path.to_path_buf()).unwrap()
    }

    #[test]
    fn collects_python_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        std::fs::create_dir(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("pkg/b.py"), "y = 2\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip\n").unwrap();

        let files = walk_python_files(&[utf8(dir.path())]);
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension() == Some("py")));
    }

    #[test]
    fn skips_hidden_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".venv")).unwrap();
        std::fs::write(dir.path().join(".venv/site.py"), "x = 1\n").unwrap();
        std::fs::write(dir.path().join("app.py"), "y = 2\n").unwrap();

        let files = walk_python_files(&[utf8(dir.path())]);
        assert_eq!(files.len(), 1);
        assert!(files[0].as_str().ends_with("app.py"));
    }

    #[test]
    fn direct_file_path_bypasses_predicate_walk() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("single.py");
        std::fs::write(&file, "x = 1\n").unwrap();

        let files = walk_python_files(&[utf8(&file)]);
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn non_python_direct_file_is_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("readme.md");
        std::fs::write(&file, "hi\n").unwrap();

        let files = walk_python_files(&[utf8(&file)]);
        assert!(files.is_empty());
    }
}
