use crate::error::StorageError;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Collapses `.` and `..` lexically; `..` may never climb above the relative base.
fn normalize_relative(path: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(segment) => out.push(segment),
            Component::ParentDir => {
                if !out.pop() {
                    return Err(traversal(path, "'..' escapes the sandbox"));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(traversal(path, "absolute paths are not allowed"));
            }
        }
    }

    if out.as_os_str().is_empty() {
        return Err(traversal(path, "empty path"));
    }
    Ok(out)
}

/// Joins `path` onto the canonical `root`, rejecting anything that ends up outside it.
pub(crate) fn resolve_path(root: &Path, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
    let path = path.as_ref();
    let joined = root.join(normalize_relative(path)?);

    match joined.canonicalize() {
        Ok(canonical) if canonical.starts_with(root) => Ok(canonical),
        Ok(canonical) => Err(traversal(&canonical, "symlink points outside the sandbox")),
        Err(err) if err.kind() == ErrorKind::NotFound => verify_ancestors(root, joined),
        Err(source) => Err(StorageError::Io { source, context: Some("Resolving path".into()) }),
    }
}

/// For a path that does not exist yet, canonicalizes its nearest existing ancestor so a
/// symlinked directory cannot smuggle the write elsewhere.
fn verify_ancestors(root: &Path, joined: PathBuf) -> Result<PathBuf, StorageError> {
    for ancestor in joined.ancestors().skip(1) {
        if ancestor == root {
            return Ok(joined);
        }
        if ancestor.exists() {
            return match ancestor.canonicalize() {
                Ok(canonical) if canonical.starts_with(root) => Ok(joined),
                Ok(canonical) => Err(traversal(&canonical, "parent is a symlink outside the sandbox")),
                Err(source) => {
                    Err(StorageError::Io { source, context: Some("Verifying parent".into()) })
                }
            };
        }
    }
    Err(traversal(&joined, "no ancestor inside the sandbox"))
}

fn traversal(path: &Path, reason: &'static str) -> StorageError {
    StorageError::PathTraversalAttempt {
        message: path.display().to_string().into(),
        context: Some(reason.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_inner_parent_segments() {
        let out = normalize_relative(Path::new("brand/./x/../logo.png")).unwrap();
        assert_eq!(out, PathBuf::from("brand/logo.png"));
    }

    #[test]
    fn rejects_escapes_absolute_and_empty() {
        assert!(normalize_relative(Path::new("../etc/passwd")).is_err());
        assert!(normalize_relative(Path::new("brand/../../x")).is_err());
        assert!(normalize_relative(Path::new("/etc/passwd")).is_err());
        assert!(normalize_relative(Path::new(".")).is_err());
    }
}
