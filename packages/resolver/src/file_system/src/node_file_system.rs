use super::types::{AbsoluteFsPath, FileStats, PathManipulation, PathSegment, ReadonlyFileSystem};
use super::util::{clean_path, normalize_separators};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Path manipulation over the host's real working directory.
pub struct NodePathManipulation;

impl PathManipulation for NodePathManipulation {
    fn is_rooted(&self, path: &str) -> bool {
        let normalized = normalize_separators(path);
        Path::new(path).is_absolute()
            || normalized.starts_with('/')
            || (normalized.len() >= 2 && normalized.as_bytes()[1] == b':')
    }

    fn dirname(&self, file: &str) -> String {
        let cleaned = clean_path(file);
        match cleaned.rfind('/') {
            Some(0) => "/".to_string(),
            Some(idx) => cleaned[..idx].to_string(),
            None => ".".to_string(),
        }
    }

    fn basename(&self, file_path: &str) -> PathSegment {
        let cleaned = clean_path(file_path);
        let name = cleaned.rsplit('/').next().unwrap_or_default();
        PathSegment::new(name.to_string())
    }

    fn normalize(&self, path: &str) -> String {
        normalize_separators(path)
    }

    /// Mirrors Node's `path.resolve`: right-most rooted segment wins, otherwise
    /// the current directory is prepended. Does not require the path to exist.
    fn resolve(&self, paths: &[&str]) -> AbsoluteFsPath {
        let mut resolved = self.pwd().into_string();
        for p in paths {
            if self.is_rooted(p) {
                resolved = normalize_separators(p);
            } else {
                resolved = format!("{}/{}", resolved, normalize_separators(p));
            }
        }
        AbsoluteFsPath::new(clean_path(&resolved))
    }

    fn pwd(&self) -> AbsoluteFsPath {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        AbsoluteFsPath::new(clean_path(&cwd.to_string_lossy()))
    }
}

/// Read-only access to the real disk.
pub struct NodeFileSystem {
    base: NodePathManipulation,
}

impl NodeFileSystem {
    pub fn new() -> Self {
        Self {
            base: NodePathManipulation,
        }
    }
}

impl Default for NodeFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl PathManipulation for NodeFileSystem {
    fn is_rooted(&self, path: &str) -> bool {
        self.base.is_rooted(path)
    }

    fn dirname(&self, file: &str) -> String {
        self.base.dirname(file)
    }

    fn basename(&self, file_path: &str) -> PathSegment {
        self.base.basename(file_path)
    }

    fn normalize(&self, path: &str) -> String {
        self.base.normalize(path)
    }

    fn resolve(&self, paths: &[&str]) -> AbsoluteFsPath {
        self.base.resolve(paths)
    }

    fn pwd(&self) -> AbsoluteFsPath {
        self.base.pwd()
    }
}

impl ReadonlyFileSystem for NodeFileSystem {
    fn exists(&self, path: &AbsoluteFsPath) -> bool {
        path.as_path().exists()
    }

    fn read_file(&self, path: &AbsoluteFsPath) -> io::Result<String> {
        fs::read_to_string(path.as_path())
    }

    fn readdir(&self, path: &AbsoluteFsPath) -> io::Result<Vec<PathSegment>> {
        let entries = fs::read_dir(path.as_path())?;
        let mut result = Vec::new();
        for entry in entries {
            let entry = entry?;
            result.push(PathSegment::new(entry.file_name().to_string_lossy().to_string()));
        }
        Ok(result)
    }

    fn stat(&self, path: &AbsoluteFsPath) -> io::Result<FileStats> {
        let meta = fs::metadata(path.as_path())?;
        Ok(FileStats {
            is_file: meta.is_file(),
            is_directory: meta.is_dir(),
        })
    }
}
