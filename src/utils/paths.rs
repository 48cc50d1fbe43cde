use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Replace a leading `~` component with the home directory.
///
/// Shells leave `~` alone inside quotes or after `--source=`, so the root
/// arguments are expanded here. `~user` forms are left untouched.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };

    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(if rest.as_os_str().is_empty() {
        home
    } else {
        home.join(rest)
    })
}

/// Resolve `path` against the working directory unless it is already absolute.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined
pub fn make_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Could not read the working directory")?;
    Ok(cwd.join(path))
}

/// Whether one root lies inside the other (or both are the same directory)
///
/// Paths that cannot be canonicalized are compared as given.
#[must_use]
pub fn roots_overlap(a: &Path, b: &Path) -> bool {
    let a = a.canonicalize().unwrap_or_else(|_| a.to_path_buf());
    let b = b.canonicalize().unwrap_or_else(|_| b.to_path_buf());
    a.starts_with(&b) || b.starts_with(&a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();

        assert_eq!(
            expand_tilde(Path::new("~/antinet/1a")).unwrap(),
            home.join("antinet/1a")
        );
        assert_eq!(expand_tilde(Path::new("~")).unwrap(), home);
        assert_eq!(
            expand_tilde(Path::new("/srv/antinet")).unwrap(),
            PathBuf::from("/srv/antinet")
        );
        assert_eq!(
            expand_tilde(Path::new("~other/cards")).unwrap(),
            PathBuf::from("~other/cards")
        );
    }

    #[test]
    fn test_make_absolute() {
        let absolute = PathBuf::from("/srv/previews");
        assert_eq!(make_absolute(&absolute).unwrap(), absolute);

        let resolved = make_absolute(Path::new("cards/1a")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("cards/1a"));
    }

    #[test]
    fn test_roots_overlap() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("cards");
        let inside = source.join("previews");
        let sibling = temp.path().join("previews");
        fs::create_dir_all(&inside).unwrap();
        fs::create_dir_all(&sibling).unwrap();

        assert!(roots_overlap(&source, &inside));
        assert!(roots_overlap(&inside, &source));
        assert!(roots_overlap(&source, &source));
        assert!(!roots_overlap(&source, &sibling));
    }
}
