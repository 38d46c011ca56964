use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::{Error, Result};

/// A discovered document file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Path relative to the scanned root directory.
    pub relative_path: PathBuf,
    /// Fully resolved absolute path.
    pub absolute_path: PathBuf,
    /// File size in bytes at discovery time.
    pub len: u64,
}

/// Which files under a root count as documents.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Accepted file extensions, without the dot. Empty accepts any.
    pub extensions: Vec<String>,
    /// Only keep files whose relative path matches one of these globs.
    pub include: Option<GlobSet>,
}

impl WalkOptions {
    /// Compile `patterns` into the include filter. No patterns means no
    /// filter.
    pub fn with_globs(mut self, patterns: &[String]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(self);
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                Error::Config(format!("invalid glob pattern: {e}"))
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| {
            Error::Config(format!("invalid glob pattern: {e}"))
        })?;
        self.include = Some(set);
        Ok(self)
    }
}

/// Walk a directory and discover document files in a stable order.
///
/// Skips hidden files and directories (names starting with `.`). Results are
/// sorted by relative path so repeated runs see documents in the same order.
pub fn discover_files(
    root: &Path,
    options: &WalkOptions,
) -> Result<Vec<DiscoveredFile>> {
    if !root.is_dir() {
        return Err(Error::NotFound {
            kind: "directory",
            name: root.display().to_string(),
        });
    }
    let canonical_root = root.canonicalize()?;
    let mut results = Vec::new();
    walk_dir(&canonical_root, &canonical_root, options, &mut results)?;
    results.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(results)
}

fn walk_dir(
    root: &Path,
    current: &Path,
    options: &WalkOptions,
    results: &mut Vec<DiscoveredFile>,
) -> Result<()> {
    let entries = std::fs::read_dir(current)?;

    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();

        if name.starts_with('.') {
            continue;
        }

        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            if options.recursive {
                walk_dir(root, &entry.path(), options, results)?;
            }
        } else if file_type.is_symlink() {
            let resolved = match entry.path().canonicalize() {
                Ok(p) => p,
                Err(_) => continue, // Skip broken symlinks
            };
            // Never follow links to directories (cycle prevention).
            if resolved.is_file()
                && let Some(df) =
                    make_discovered(root, &entry.path(), &resolved, options)?
            {
                results.push(df);
            }
        } else if file_type.is_file() {
            let abs = entry.path().canonicalize()?;
            if let Some(df) =
                make_discovered(root, &entry.path(), &abs, options)?
            {
                results.push(df);
            }
        }
    }

    Ok(())
}

fn is_supported(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e == ext))
}

fn make_discovered(
    root: &Path,
    entry_path: &Path,
    absolute_path: &Path,
    options: &WalkOptions,
) -> Result<Option<DiscoveredFile>> {
    if !is_supported(absolute_path, &options.extensions) {
        return Ok(None);
    }

    let relative_path = entry_path
        .strip_prefix(root)
        .unwrap_or(entry_path)
        .to_path_buf();

    if let Some(ref include) = options.include
        && !include.is_match(&relative_path)
    {
        return Ok(None);
    }

    let len = std::fs::metadata(absolute_path)?.len();

    Ok(Some(DiscoveredFile {
        relative_path,
        absolute_path: absolute_path.to_path_buf(),
        len,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_files() -> WalkOptions {
        WalkOptions {
            extensions: vec!["md".to_string(), "txt".to_string()],
            ..Default::default()
        }
    }

    fn names(files: &[DiscoveredFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.relative_path.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn discovers_md_and_txt() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("note.md"), "# Hello").unwrap();
        std::fs::write(tmp.path().join("readme.txt"), "Hello").unwrap();
        std::fs::write(tmp.path().join("image.png"), "binary").unwrap();

        let files = discover_files(tmp.path(), &text_files()).unwrap();
        assert_eq!(names(&files), vec!["note.md", "readme.txt"]);
    }

    #[test]
    fn no_extensions_accepts_everything() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.txt"), "a").unwrap();
        std::fs::write(tmp.path().join("LICENSE"), "b").unwrap();

        let files =
            discover_files(tmp.path(), &WalkOptions::default()).unwrap();
        assert_eq!(names(&files), vec!["LICENSE", "a.txt"]);
    }

    #[test]
    fn skips_hidden_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(".hidden.md"), "secret").unwrap();
        std::fs::write(tmp.path().join("visible.md"), "hello").unwrap();

        let files = discover_files(tmp.path(), &text_files()).unwrap();
        assert_eq!(names(&files), vec!["visible.md"]);
    }

    #[test]
    fn stays_at_top_level_unless_recursive() {
        let tmp = tempfile::tempdir().unwrap();
        let sub = tmp.path().join("subdir");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("deep.md"), "deep").unwrap();
        std::fs::write(tmp.path().join("top.md"), "top").unwrap();

        let files = discover_files(tmp.path(), &text_files()).unwrap();
        assert_eq!(names(&files), vec!["top.md"]);

        let recursive = WalkOptions {
            recursive: true,
            ..text_files()
        };
        let files = discover_files(tmp.path(), &recursive).unwrap();
        assert_eq!(names(&files), vec!["subdir/deep.md", "top.md"]);
    }

    #[test]
    fn skips_hidden_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let hidden = tmp.path().join(".git");
        std::fs::create_dir(&hidden).unwrap();
        std::fs::write(hidden.join("config.md"), "git config").unwrap();
        std::fs::write(tmp.path().join("notes.md"), "notes").unwrap();

        let options = WalkOptions {
            recursive: true,
            ..text_files()
        };
        let files = discover_files(tmp.path(), &options).unwrap();
        assert_eq!(names(&files), vec!["notes.md"]);
    }

    #[test]
    fn glob_filter_applies_to_relative_paths() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("essay1.txt"), "one").unwrap();
        std::fs::write(tmp.path().join("essay2.txt"), "two").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "three").unwrap();

        let options = text_files()
            .with_globs(&["essay*.txt".to_string()])
            .unwrap();
        let files = discover_files(tmp.path(), &options).unwrap();
        assert_eq!(names(&files), vec!["essay1.txt", "essay2.txt"]);
    }

    #[test]
    fn invalid_glob_is_a_config_error() {
        let result = WalkOptions::default().with_globs(&["a[".to_string()]);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn records_file_length() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("file.md"), "content").unwrap();

        let files = discover_files(tmp.path(), &text_files()).unwrap();
        assert_eq!(files[0].len, 7);
    }

    #[test]
    fn results_are_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("z.md"), "z").unwrap();
        std::fs::write(tmp.path().join("a.md"), "a").unwrap();
        std::fs::write(tmp.path().join("m.md"), "m").unwrap();

        let files = discover_files(tmp.path(), &text_files()).unwrap();
        assert_eq!(names(&files), vec!["a.md", "m.md", "z.md"]);
    }

    #[test]
    fn empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let files = discover_files(tmp.path(), &text_files()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn missing_directory_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let result =
            discover_files(&tmp.path().join("absent"), &text_files());
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }
}
