//! Tests for FileSelector

use super::*;
use crate::error::ResolveError;
use std::fs;
use tempfile::TempDir;

fn collect(selector: FileSelector) -> Result<Vec<CandidateFile>, SelectionError> {
    selector.select()?.collect()
}

fn relative_paths(files: &[CandidateFile]) -> Vec<&str> {
    files.iter().map(|f| f.relative_path.as_str()).collect()
}

struct AlwaysDangling;

impl SymlinkResolver for AlwaysDangling {
    fn resolve(&self, path: &Path) -> Result<PathBuf, ResolveError> {
        Err(ResolveError::DanglingSymlink(path.display().to_string()))
    }
}

#[test]
fn test_new() {
    let selector = FileSelector::new("/tmp", 1024);
    assert_eq!(selector.root, PathBuf::from("/tmp"));
    assert_eq!(selector.max_file_size, 1024);
}

#[test]
fn test_select_nonexistent_directory() {
    let result = FileSelector::new("/nonexistent/path/12345", 1024).select();
    assert!(matches!(result, Err(SelectionError::RootNotFound(_))));
}

#[test]
fn test_select_not_a_directory() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("notadir.py");
    fs::write(&file_path, "x = 1").unwrap();

    let result = FileSelector::new(&file_path, 1024).select();
    assert!(matches!(result, Err(SelectionError::NotADirectory(_))));
}

#[test]
fn test_select_empty_directory() {
    let temp_dir = TempDir::new().unwrap();
    let files = collect(FileSelector::new(temp_dir.path(), 1024)).unwrap();
    assert!(files.is_empty());
}

#[test]
fn test_select_orders_depth_first_by_name() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("pkg/sub")).unwrap();
    fs::write(root.join("z.py"), "z = 1").unwrap();
    fs::write(root.join("a.py"), "a = 1").unwrap();
    fs::write(root.join("pkg/m.py"), "m = 1").unwrap();
    fs::write(root.join("pkg/sub/b.go"), "package sub").unwrap();

    let files = collect(FileSelector::new(root, 1024)).unwrap();
    assert_eq!(
        relative_paths(&files),
        vec!["a.py", "pkg/m.py", "pkg/sub/b.go", "z.py"]
    );
    assert_eq!(files[2].language, "go");
}

#[test]
fn test_select_skips_non_source_files() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("README.md"), "# readme").unwrap();
    fs::write(root.join("logo.png"), [0x89u8, 0x50, 0x4e, 0x47, 0x00]).unwrap();
    fs::write(root.join("app.py"), "print('hi')").unwrap();

    let mut selection = FileSelector::new(root, 1024).select().unwrap();
    let files: Vec<_> = selection.by_ref().map(Result::unwrap).collect();
    assert_eq!(relative_paths(&files), vec!["app.py"]);

    let stats = selection.stats();
    assert_eq!(stats.seen, 3);
    assert_eq!(stats.selected, 1);
    assert_eq!(stats.unrecognized, 2);
}

#[test]
fn test_select_skips_git_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join(".git/hooks")).unwrap();
    fs::write(root.join(".git/hooks/pre-commit.sh"), "exit 0").unwrap();
    fs::write(root.join("main.rs"), "fn main() {}").unwrap();

    let files = collect(FileSelector::new(root, 1024)).unwrap();
    assert_eq!(relative_paths(&files), vec!["main.rs"]);
}

#[test]
fn test_select_max_file_size() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("small.py"), "x = 1").unwrap();
    fs::write(root.join("large.py"), "x = 1\n".repeat(100)).unwrap();

    let mut selection = FileSelector::new(root, 100).select().unwrap();
    let files: Vec<_> = selection.by_ref().map(Result::unwrap).collect();
    assert_eq!(relative_paths(&files), vec!["small.py"]);
    assert_eq!(files[0].size, 5);
    assert_eq!(selection.stats().oversize, 1);
}

#[test]
fn test_select_size_limit_excludes_everything() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.py"), "x = 1").unwrap();
    fs::write(temp_dir.path().join("b.py"), "y = 2").unwrap();

    let files = collect(FileSelector::new(temp_dir.path(), 1)).unwrap();
    assert!(files.is_empty());
}

#[test]
fn test_injected_resolver_failure_aborts_selection() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.py"), "x = 1").unwrap();
    fs::write(temp_dir.path().join("b.py"), "y = 2").unwrap();

    let mut selection = FileSelector::new(temp_dir.path(), 1024)
        .with_resolver(Arc::new(AlwaysDangling))
        .select()
        .unwrap();

    assert!(matches!(
        selection.next(),
        Some(Err(SelectionError::Resolve(ResolveError::DanglingSymlink(_))))
    ));
    // fused after the first failure
    assert!(selection.next().is_none());
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_aborts_selection() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("a.py"), "x = 1").unwrap();
    std::os::unix::fs::symlink(root.join("missing.py"), root.join("b.py")).unwrap();
    fs::write(root.join("c.py"), "z = 3").unwrap();

    let result = collect(FileSelector::new(root, 1024));
    assert!(matches!(
        result,
        Err(SelectionError::Resolve(ResolveError::DanglingSymlink(_)))
    ));
}

#[cfg(unix)]
#[test]
fn test_file_symlink_keeps_link_relative_path() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join("real")).unwrap();
    fs::write(root.join("real/impl.py"), "x = 1").unwrap();
    std::os::unix::fs::symlink(root.join("real/impl.py"), root.join("alias.py")).unwrap();

    let files = collect(FileSelector::new(root, 1024)).unwrap();
    assert_eq!(relative_paths(&files), vec!["alias.py", "real/impl.py"]);
    assert_eq!(
        files[0].absolute_path,
        fs::canonicalize(root.join("real/impl.py")).unwrap()
    );
}

#[cfg(unix)]
#[test]
fn test_directory_symlink_not_followed() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join("pkg")).unwrap();
    fs::write(root.join("pkg/mod.py"), "x = 1").unwrap();
    std::os::unix::fs::symlink(root.join("pkg"), root.join("loop")).unwrap();

    let files = collect(FileSelector::new(root, 1024)).unwrap();
    assert_eq!(relative_paths(&files), vec!["pkg/mod.py"]);
}
