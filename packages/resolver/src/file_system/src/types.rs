use serde::Serialize;
use std::io;
use std::path::Path;

use super::util::{clean_path, normalize_separators};

/// A fully qualified path in the file system, in POSIX form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AbsoluteFsPath(String);

impl AbsoluteFsPath {
    pub fn new(path: String) -> Self {
        AbsoluteFsPath(path)
    }

    pub fn from<P: AsRef<Path>>(path: P) -> Self {
        AbsoluteFsPath(clean_path(&path.as_ref().to_string_lossy()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Append one or more `/`-separated segments and clean the result.
    ///
    /// `..` segments are applied lexically, so `join("../x")` may climb above `self`.
    pub fn join(&self, segment: &str) -> AbsoluteFsPath {
        let segment = normalize_separators(segment);
        AbsoluteFsPath(clean_path(&format!("{}/{}", self.0, segment)))
    }

    /// Same path with `.<extension>` appended to the last segment.
    pub fn with_appended_extension(&self, extension: &str) -> AbsoluteFsPath {
        AbsoluteFsPath(format!("{}.{}", self.0, extension))
    }

    /// Component-wise prefix test: `/a/src` contains `/a/src/x.ts` but not `/a/src-old/x.ts`.
    pub fn contains(&self, other: &AbsoluteFsPath) -> bool {
        let prefix = self.0.trim_end_matches('/');
        match other.0.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.is_empty(),
            None => false,
        }
    }
}

impl AsRef<str> for AbsoluteFsPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<Path> for AbsoluteFsPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl std::fmt::Display for AbsoluteFsPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single entry name returned by `readdir`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathSegment(String);

impl PathSegment {
    pub fn new(path: String) -> Self {
        PathSegment(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PathSegment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Information about an object in the FileSystem.
/// This is analogous to the `fs.Stats` class in Node.js.
#[derive(Debug, Clone, Copy)]
pub struct FileStats {
    pub is_file: bool,
    pub is_directory: bool,
}

impl FileStats {
    pub fn is_file(&self) -> bool {
        self.is_file
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }
}

/// An abstraction over the path manipulation aspects of a file-system.
pub trait PathManipulation {
    fn is_rooted(&self, path: &str) -> bool;
    fn dirname(&self, file: &str) -> String;
    fn basename(&self, file_path: &str) -> PathSegment;
    fn normalize(&self, path: &str) -> String;
    fn resolve(&self, paths: &[&str]) -> AbsoluteFsPath;
    fn pwd(&self) -> AbsoluteFsPath;
}

/// An abstraction over the read-only aspects of a file-system.
///
/// This is the only surface the resolver touches: it never creates or deletes paths.
pub trait ReadonlyFileSystem: PathManipulation {
    fn exists(&self, path: &AbsoluteFsPath) -> bool;
    fn read_file(&self, path: &AbsoluteFsPath) -> io::Result<String>;
    fn readdir(&self, path: &AbsoluteFsPath) -> io::Result<Vec<PathSegment>>;
    fn stat(&self, path: &AbsoluteFsPath) -> io::Result<FileStats>;

    /// `stat` that folds every error into "not a file".
    fn is_file(&self, path: &AbsoluteFsPath) -> bool {
        self.stat(path).map(|s| s.is_file()).unwrap_or(false)
    }

    /// `stat` that folds every error into "not a directory".
    fn is_directory(&self, path: &AbsoluteFsPath) -> bool {
        self.stat(path).map(|s| s.is_directory()).unwrap_or(false)
    }
}
