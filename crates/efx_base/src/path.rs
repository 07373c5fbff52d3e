/* 📖 # How are paths normalized?

Every path handed to a storage backend is first brought into one canonical form:
- `\` is converted to `/`
- `.` and empty segments survive only as the very first segment, marking a
  relative root (`./a`) or an absolute root (`/a`)
- `..` pops the previous segment; with nothing left to pop it is dropped
- a leading `file://` or `jar:file://` scheme is kept verbatim in front

Normalization is idempotent, so normalizing twice never changes the result.
*/

use std::fmt;

/// The canonical path separator.
pub const SEPARATOR: char = '/';

/// Scheme prefixes preserved verbatim through normalization.
pub const SCHEMES: [&str; 2] = ["file://", "jar:file://"];

/// Splits a recognized scheme prefix from the rest of the path.
pub fn split_scheme(path: &str) -> (&str, &str) {
    for scheme in SCHEMES {
        if let Some(rest) = path.strip_prefix(scheme) {
            return (scheme, rest);
        }
    }
    ("", path)
}

/// Walks the segments of an unprefixed path, yielding the output stack after
/// every segment that was pushed.
pub(crate) fn fold_segments<F>(path: &str, mut on_push: F) -> Vec<String>
where
    F: FnMut(&[String]),
{
    let path = path.replace('\\', "/");
    let mut stack: Vec<String> = Vec::new();
    for part in path.split(SEPARATOR) {
        match part {
            "." | "" => {
                if stack.is_empty() {
                    stack.push(part.to_string());
                    on_push(&stack);
                }
            }
            ".." => {
                stack.pop();
            }
            _ => {
                stack.push(part.to_string());
                on_push(&stack);
            }
        }
    }
    stack
}

/// Normalizes a path into its canonical form.
///
/// ```
/// use efx_base::path::normalize;
///
/// assert_eq!(normalize("a/b/../c"), "a/c");
/// assert_eq!(normalize("C:\\a\\b"), "C:/a/b");
/// ```
pub fn normalize(path: &str) -> String {
    let (scheme, rest) = split_scheme(path);
    let stack = fold_segments(rest, |_| {});
    format!("{}{}", scheme, stack.join("/"))
}

/// Joins path segments, skipping blank ones, and normalizes the result.
pub fn join<S: AsRef<str>>(paths: &[S]) -> String {
    let mut parts = paths
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| !p.trim().is_empty());
    let Some(first) = parts.next() else {
        return String::new();
    };
    let mut joined = first.to_string();
    for part in parts {
        if !part.starts_with(SEPARATOR) && !joined.ends_with(SEPARATOR) {
            joined.push(SEPARATOR);
        }
        joined.push_str(part);
    }
    normalize(&joined)
}

/// Returns the directory portion of a path.
///
/// A path that shrinks down to a bare `file:/` keeps its root as `file://`.
pub fn directory_name(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let mut path = normalize(path);
    if let Some(idx) = path.rfind(SEPARATOR) {
        path.truncate(idx);
    }
    if path == "file:/" {
        path.push(SEPARATOR);
    }
    path
}

/// Returns the last segment of a path, optionally without its extension.
pub fn file_name(path: &str, include_extension: bool) -> String {
    if path.is_empty() {
        return String::new();
    }
    let path = normalize(path);
    let mut name = match path.rfind(SEPARATOR) {
        Some(idx) => path[idx + 1..].to_string(),
        None => path,
    };
    if !include_extension {
        if let Some(idx) = name.rfind('.') {
            name.truncate(idx);
        }
    }
    name
}

/// Returns the extension of a path including its dot.
///
/// A path without any `.` is returned unchanged.
pub fn file_extension(path: &str) -> String {
    match path.rfind('.') {
        Some(idx) => path[idx..].to_string(),
        None => path.to_string(),
    }
}

/// A path that is always held in normalized form.
///
/// # Examples
///
/// ```
/// use efx_base::FilePath;
///
/// let path = FilePath::from("./docs//guide/../readme.md");
/// assert_eq!(path.as_str(), "./docs/readme.md");
/// assert_eq!(path.parent().as_str(), "./docs");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilePath(String);

impl FilePath {
    /// Normalizes the given path.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(normalize(path.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The scheme prefix, or `""` for plain paths.
    pub fn scheme(&self) -> &str {
        split_scheme(&self.0).0
    }

    /// Appends a segment.
    pub fn join(&self, segment: impl AsRef<str>) -> Self {
        Self(join(&[self.0.as_str(), segment.as_ref()]))
    }

    /// The containing directory.
    pub fn parent(&self) -> Self {
        Self(directory_name(&self.0))
    }

    pub fn file_name(&self) -> String {
        file_name(&self.0, true)
    }

    pub fn file_stem(&self) -> String {
        file_name(&self.0, false)
    }

    pub fn extension(&self) -> String {
        file_extension(&self.0)
    }

    /// Converts to a `std::path::Path` for use with `std::fs`.
    pub fn as_path(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

impl From<&str> for FilePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FilePath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&String> for FilePath {
    fn from(s: &String) -> Self {
        Self::new(s)
    }
}

impl From<&std::path::Path> for FilePath {
    fn from(p: &std::path::Path) -> Self {
        Self::new(p.to_string_lossy())
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FilePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
