use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Check whether `path` names an existing regular file.
///
/// Any stat failure counts as "not a file".
#[must_use]
pub fn is_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file())
}

/// Check whether `path` names an existing directory.
#[must_use]
pub fn is_dir(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_dir())
}

/// Read a file to string, replacing invalid UTF-8 sequences with the replacement character.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_to_string_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Find the nearest file named one of `names`, starting at `start` and walking up.
///
/// `start` may itself be a file; the search then begins next to it. Names are
/// tried in order within each directory. Only the path is returned.
#[must_use]
pub fn lookup_file(start: &Path, names: &[&str]) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        for name in names {
            let candidate = dir.join(name);
            if is_file(&candidate) {
                return Some(candidate);
            }
        }
        current = dir.parent();
    }

    None
}
