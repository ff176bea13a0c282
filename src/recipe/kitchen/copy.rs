// src/recipe/kitchen/copy.rs

//! Pattern-based file copying for the Package stage

use crate::error::{Error, Result};
use crate::recipe::format::CopyRule;
use glob::{MatchOptions, Pattern};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Copies files matching [`CopyRule`]s into a package root
///
/// Walks are sorted so repeated runs visit files in the same order. Within
/// one copier, two different sources landing on the same destination are a
/// conflict unless their contents are identical.
pub struct Copier {
    dest_root: PathBuf,
    written: HashMap<PathBuf, PathBuf>,
}

impl Copier {
    pub fn new(dest_root: &Path) -> Self {
        Self {
            dest_root: dest_root.to_path_buf(),
            written: HashMap::new(),
        }
    }

    /// Apply `rule` reading from `root`; returns destination paths
    /// relative to the package root
    pub fn apply(&mut self, rule: &CopyRule, root: &Path) -> Result<Vec<PathBuf>> {
        let pattern = Pattern::new(&rule.pattern).map_err(|e| {
            Error::ParseError(format!("Invalid copy pattern '{}': {}", rule.pattern, e))
        })?;

        let src_dir = if rule.src.is_empty() {
            root.to_path_buf()
        } else {
            root.join(&rule.src)
        };
        if !src_dir.is_dir() {
            debug!("Copy source {} does not exist, nothing to copy", src_dir.display());
            return Ok(Vec::new());
        }

        let dest_root = self.dest_root.clone();
        let walker = WalkDir::new(&src_dir)
            .sort_by_file_name()
            .into_iter()
            // Never re-collect the package being assembled
            .filter_entry(|e| !e.path().starts_with(&dest_root));

        let mut copied = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(&src_dir)
                .map_err(|e| Error::Io(std::io::Error::other(e)))?;
            let rel_str = rel.to_string_lossy().replace('\\', "/");
            if !pattern.matches_with(&rel_str, MATCH_OPTIONS) {
                continue;
            }

            let target_rel = if rule.keep_path {
                Path::new(&rule.dst).join(rel)
            } else {
                Path::new(&rule.dst).join(entry.file_name())
            };
            self.copy_file(entry.path(), &target_rel)?;
            copied.push(target_rel);
        }

        debug!(
            "Copy rule {} from {} -> {}: {} file(s)",
            rule.pattern,
            src_dir.display(),
            rule.dst,
            copied.len()
        );
        Ok(copied)
    }

    fn copy_file(&mut self, source: &Path, target_rel: &Path) -> Result<()> {
        if let Some(previous) = self.written.get(target_rel) {
            if previous == source || fs::read(previous)? == fs::read(source)? {
                return Ok(());
            }
            return Err(Error::ArtifactConflict {
                name: target_rel.to_string_lossy().to_string(),
            });
        }

        let target = self.dest_root.join(target_rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        if !(target.exists() && fs::read(&target)? == fs::read(source)?) {
            fs::copy(source, &target)?;
        }

        self.written
            .insert(target_rel.to_path_buf(), source.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::format::CopyRoot;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_keep_path_preserves_subdirs() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        write(src.path(), "inc/a.hpp", "a");
        write(src.path(), "inc/detail/b.hpp", "b");
        write(src.path(), "inc/detail/b.txt", "skip");

        let rule = CopyRule::new("*.hpp", CopyRoot::Source, "inc", "include", true);
        let copied = Copier::new(dst.path()).apply(&rule, src.path()).unwrap();

        assert_eq!(
            copied,
            vec![
                PathBuf::from("include/a.hpp"),
                PathBuf::from("include/detail/b.hpp")
            ]
        );
        assert!(dst.path().join("include/detail/b.hpp").exists());
        assert!(!dst.path().join("include/detail/b.txt").exists());
    }

    #[test]
    fn test_flatten() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        write(src.path(), "src/Release/libfoo.a", "ar");

        let rule = CopyRule::new("*.a", CopyRoot::Build, "", "lib", false);
        let copied = Copier::new(dst.path()).apply(&rule, src.path()).unwrap();
        assert_eq!(copied, vec![PathBuf::from("lib/libfoo.a")]);
        assert_eq!(fs::read_to_string(dst.path().join("lib/libfoo.a")).unwrap(), "ar");
    }

    #[test]
    fn test_flatten_conflict() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        write(src.path(), "a/libfoo.a", "one");
        write(src.path(), "b/libfoo.a", "two");

        let rule = CopyRule::new("*.a", CopyRoot::Build, "", "lib", false);
        let err = Copier::new(dst.path()).apply(&rule, src.path()).unwrap_err();
        assert!(matches!(err, Error::ArtifactConflict { .. }));
    }

    #[test]
    fn test_flatten_identical_duplicates_accepted() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        write(src.path(), "a/libfoo.a", "same");
        write(src.path(), "b/libfoo.a", "same");

        let rule = CopyRule::new("*.a", CopyRoot::Build, "", "lib", false);
        let copied = Copier::new(dst.path()).apply(&rule, src.path()).unwrap();
        assert_eq!(copied.len(), 2);
    }

    #[test]
    fn test_missing_source_dir_copies_nothing() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let rule = CopyRule::new("*.hpp", CopyRoot::Source, "nope", "include", true);
        assert!(Copier::new(dst.path()).apply(&rule, src.path()).unwrap().is_empty());
    }

    #[test]
    fn test_skips_destination_inside_source() {
        let src = TempDir::new().unwrap();
        write(src.path(), "libfoo.a", "ar");
        write(src.path(), "package/lib/libold.a", "old");

        let rule = CopyRule::new("*.a", CopyRoot::Build, "", "lib", false);
        let copied = Copier::new(&src.path().join("package"))
            .apply(&rule, src.path())
            .unwrap();
        assert_eq!(copied, vec![PathBuf::from("lib/libfoo.a")]);
    }
}
