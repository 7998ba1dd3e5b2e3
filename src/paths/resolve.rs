use std::path::{Component, Path, PathBuf};

/// Strip the `file(...)` wrapper from an expression, returning the trimmed inner value.
///
/// Values without the wrapper are treated as bare paths and returned trimmed.
pub fn file_expression_inner(expression: &str) -> &str {
    let trimmed = expression.trim();
    trimmed
        .strip_prefix("file(")
        .and_then(|rest| rest.strip_suffix(')'))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// Lexically normalise a path: unify separators to `/`, drop `.` and fold `..`.
///
/// The file system is never consulted, so symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let unified = path.to_string_lossy().replace('\\', "/");
    let mut parts: Vec<Component> = Vec::new();
    for component in Path::new(&unified).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

/// Render `target` relative to `from_dir` using forward slashes.
pub fn relative_path(from_dir: &Path, target: &Path) -> String {
    let from: Vec<Component> = from_dir.components().collect();
    let to: Vec<Component> = target.components().collect();
    let common = from
        .iter()
        .zip(&to)
        .take_while(|(left, right)| left == right)
        .count();

    let mut segments: Vec<String> = vec!["..".to_string(); from.len() - common];
    segments.extend(
        to[common..]
            .iter()
            .map(|component| component.as_os_str().to_string_lossy().into_owned()),
    );
    segments.join("/")
}

/// Resolves `file(...)` expressions against the directory of the file that contains them.
///
/// Three shapes are understood: paths relative to the containing directory, module-qualified
/// paths starting with `/` (resolved against the mods root when one is configured) and
/// folder-style references, where a directory `d` stands for `d/<name of d>.json`.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    mods_root: Option<PathBuf>,
}

impl PathResolver {
    /// Create a resolver, optionally anchoring module-qualified paths at `mods_root`.
    pub fn new(mods_root: Option<PathBuf>) -> Self {
        Self {
            mods_root: mods_root.map(|root| normalize_path(&root)),
        }
    }

    /// Root used for module-qualified expressions.
    pub fn mods_root(&self) -> Option<&Path> {
        self.mods_root.as_deref()
    }

    /// Resolve an expression lexically, without checking the file system.
    pub fn resolve(&self, expression: &str, containing_dir: &Path) -> PathBuf {
        let inner = file_expression_inner(expression).replace('\\', "/");
        let joined = match (&self.mods_root, inner.strip_prefix('/')) {
            (Some(root), Some(rest)) => root.join(rest),
            _ => {
                let candidate = Path::new(&inner);
                if candidate.is_absolute() {
                    candidate.to_path_buf()
                } else {
                    containing_dir.join(candidate)
                }
            }
        };
        normalize_path(&joined)
    }

    /// Resolve an expression to something that exists on disk.
    ///
    /// Directories holding a same-named `.json` file resolve to that file. On failure the
    /// lexically resolved path is returned in `Err` so callers can name it in a warning.
    pub fn resolve_existing(
        &self,
        expression: &str,
        containing_dir: &Path,
    ) -> Result<PathBuf, PathBuf> {
        let candidate = self.resolve(expression, containing_dir);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if candidate.is_dir() {
            return match folder_entry(&candidate) {
                Some(entry) if entry.is_file() => Ok(entry),
                _ => Ok(candidate),
            };
        }
        Err(candidate)
    }

    /// Returns `true` when `expression`, read from `containing_dir`, names `target`.
    ///
    /// Folder-style matches are accepted without touching the file system, so this works for
    /// clone destinations that have not been written yet.
    pub fn points_to(&self, expression: &str, containing_dir: &Path, target: &Path) -> bool {
        let resolved = self.resolve(expression, containing_dir);
        resolved == target || folder_entry(&resolved).is_some_and(|entry| entry == target)
    }
}

fn folder_entry(dir: &Path) -> Option<PathBuf> {
    let name = dir.file_name()?.to_str()?;
    Some(dir.join(format!("{name}.json")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn strips_wrapper_and_whitespace() {
        assert_eq!(file_expression_inner("file( apple.json )"), "apple.json");
        assert_eq!(file_expression_inner("  apple.json "), "apple.json");
    }

    #[test]
    fn normalises_separators_and_dots() {
        let normalised = normalize_path(Path::new("/mods\\food/./pies/../apple.json"));
        assert_eq!(normalised, PathBuf::from("/mods/food/apple.json"));
    }

    #[test]
    fn keeps_leading_parent_segments_on_relative_paths() {
        assert_eq!(
            normalize_path(Path::new("../a/../b")),
            PathBuf::from("../b")
        );
    }

    #[test]
    fn resolves_relative_expressions_against_containing_dir() {
        let resolver = PathResolver::default();
        let resolved = resolver.resolve("file(../icons\\pie.png)", Path::new("/mods/food/pies"));
        assert_eq!(resolved, PathBuf::from("/mods/food/icons/pie.png"));
    }

    #[test]
    fn resolves_module_qualified_expressions_against_mods_root() {
        let resolver = PathResolver::new(Some(PathBuf::from("/games/mods")));
        let resolved = resolver.resolve("file(/stonehearth/food/pie.json)", Path::new("/elsewhere"));
        assert_eq!(resolved, PathBuf::from("/games/mods/stonehearth/food/pie.json"));
    }

    #[test]
    fn absolute_expressions_pass_through_without_mods_root() {
        let resolver = PathResolver::default();
        let resolved = resolver.resolve("file(/abs/pie.json)", Path::new("/elsewhere"));
        assert_eq!(resolved, PathBuf::from("/abs/pie.json"));
    }

    #[test]
    fn folder_style_references_resolve_to_named_json() {
        let dir = tempdir().unwrap();
        let root = normalize_path(dir.path());
        fs::create_dir_all(root.join("apple_pie")).unwrap();
        fs::write(root.join("apple_pie/apple_pie.json"), "{}").unwrap();

        let resolver = PathResolver::default();
        let resolved = resolver.resolve_existing("file(apple_pie)", &root).unwrap();
        assert_eq!(resolved, root.join("apple_pie/apple_pie.json"));
        assert!(resolver.points_to("file(apple_pie)", &root, &resolved));
    }

    #[test]
    fn missing_targets_report_the_resolved_path() {
        let dir = tempdir().unwrap();
        let root = normalize_path(dir.path());
        let resolver = PathResolver::default();
        let missing = resolver.resolve_existing("file(missing.png)", &root).unwrap_err();
        assert_eq!(missing, root.join("missing.png"));
    }

    #[test]
    fn renders_relative_paths_between_directories() {
        assert_eq!(
            relative_path(Path::new("/mods/food/pies"), Path::new("/mods/food/pies/a.json")),
            "a.json"
        );
        assert_eq!(
            relative_path(Path::new("/mods/food/cakes"), Path::new("/mods/food/pies/a.json")),
            "../pies/a.json"
        );
    }
}
