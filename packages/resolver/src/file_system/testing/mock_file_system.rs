use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::file_system::src::types::{
    AbsoluteFsPath, FileStats, PathManipulation, PathSegment, ReadonlyFileSystem,
};
use crate::file_system::src::util::{clean_path, normalize_separators, split_segments};

#[derive(Clone, Debug)]
pub enum Entity {
    Folder(Box<Folder>),
    File(Vec<u8>),
}

pub type Folder = HashMap<String, Entity>;

/// In-memory POSIX file tree.
///
/// Clones share the same tree, so a test can keep a handle and mutate the
/// workspace after handing a clone to a resolver.
#[derive(Clone)]
pub struct MockFileSystem {
    cwd: Arc<Mutex<AbsoluteFsPath>>,
    file_tree: Arc<Mutex<Folder>>,
    unreadable: Arc<Mutex<HashSet<AbsoluteFsPath>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockFileSystem {
    pub fn new() -> Self {
        MockFileSystem {
            cwd: Arc::new(Mutex::new(AbsoluteFsPath::new("/".to_string()))),
            file_tree: Arc::new(Mutex::new(HashMap::new())),
            unreadable: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Write each file, creating missing parent folders along the way.
    pub fn init_with_files(&self, files: &[(&str, &str)]) {
        for (path, content) in files {
            let path = AbsoluteFsPath::new(clean_path(path));
            let parent = self.dirname(path.as_str());
            // Fails only when a parent segment is an existing file.
            if self.ensure_dir(&AbsoluteFsPath::new(parent)).is_ok() {
                let _ = self.write_file(&path, content.as_bytes());
            }
        }
    }

    pub fn set_cwd(&self, path: &AbsoluteFsPath) {
        *lock(&self.cwd) = path.clone();
    }

    /// Make `readdir` on `path` fail with `PermissionDenied`.
    pub fn deny_readdir(&self, path: &AbsoluteFsPath) {
        lock(&self.unreadable).insert(path.clone());
    }

    pub fn ensure_dir(&self, path: &AbsoluteFsPath) -> io::Result<()> {
        let mut tree = lock(&self.file_tree);
        let mut current = &mut *tree;
        for segment in split_segments(path.as_str()) {
            let next = current
                .entry(segment)
                .or_insert_with(|| Entity::Folder(Box::new(HashMap::new())));
            match next {
                Entity::Folder(map) => current = &mut **map,
                Entity::File(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::Other,
                        "Path component is not a directory",
                    ))
                }
            }
        }
        Ok(())
    }

    pub fn write_file(&self, path: &AbsoluteFsPath, data: &[u8]) -> io::Result<()> {
        let mut segments = split_segments(path.as_str());
        let file_name = segments
            .pop()
            .ok_or_else(|| io::Error::other("Cannot write to root"))?;

        let mut tree = lock(&self.file_tree);
        let mut current = &mut *tree;
        for segment in &segments {
            match current.get_mut(segment) {
                Some(Entity::Folder(map)) => current = &mut **map,
                Some(Entity::File(_)) => {
                    return Err(io::Error::other("Not a directory"))
                }
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("Directory {} not found", segment),
                    ))
                }
            }
        }

        current.insert(file_name, Entity::File(data.to_vec()));
        Ok(())
    }

    pub fn remove_deep(&self, path: &AbsoluteFsPath) -> io::Result<()> {
        let mut segments = split_segments(path.as_str());
        let Some(name) = segments.pop() else {
            lock(&self.file_tree).clear();
            return Ok(());
        };

        let mut tree = lock(&self.file_tree);
        let mut current = &mut *tree;
        for segment in &segments {
            match current.get_mut(segment) {
                Some(Entity::Folder(map)) => current = &mut **map,
                _ => return Err(io::Error::new(io::ErrorKind::NotFound, "Path not found")),
            }
        }
        current.remove(&name);
        Ok(())
    }

    // Returns a clone of the entity so the lock is not held by the caller.
    fn get_entity(&self, path: &AbsoluteFsPath) -> Option<Entity> {
        let tree = lock(&self.file_tree);
        let segments = split_segments(path.as_str());
        let mut current = &*tree;

        for (i, segment) in segments.iter().enumerate() {
            let last = i == segments.len() - 1;
            match current.get(segment) {
                Some(Entity::Folder(map)) => {
                    if last {
                        return Some(Entity::Folder(map.clone()));
                    }
                    current = &**map;
                }
                Some(Entity::File(content)) => {
                    if last {
                        return Some(Entity::File(content.clone()));
                    }
                    return None;
                }
                None => return None,
            }
        }
        Some(Entity::Folder(Box::new(tree.clone())))
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadonlyFileSystem for MockFileSystem {
    fn exists(&self, path: &AbsoluteFsPath) -> bool {
        self.get_entity(path).is_some()
    }

    fn read_file(&self, path: &AbsoluteFsPath) -> io::Result<String> {
        match self.get_entity(path) {
            Some(Entity::File(content)) => String::from_utf8(content)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Some(Entity::Folder(_)) => Err(io::Error::other("Is a directory")),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "File not found")),
        }
    }

    fn readdir(&self, path: &AbsoluteFsPath) -> io::Result<Vec<PathSegment>> {
        if lock(&self.unreadable).contains(path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied"));
        }
        match self.get_entity(path) {
            Some(Entity::Folder(map)) => {
                Ok(map.keys().map(|k| PathSegment::new(k.clone())).collect())
            }
            Some(_) => Err(io::Error::other("Not a directory")),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "Directory not found")),
        }
    }

    fn stat(&self, path: &AbsoluteFsPath) -> io::Result<FileStats> {
        match self.get_entity(path) {
            Some(Entity::File(_)) => Ok(FileStats { is_file: true, is_directory: false }),
            Some(Entity::Folder(_)) => Ok(FileStats { is_file: false, is_directory: true }),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "Path not found")),
        }
    }
}

impl PathManipulation for MockFileSystem {
    fn is_rooted(&self, path: &str) -> bool {
        normalize_separators(path).starts_with('/')
    }

    fn dirname(&self, file: &str) -> String {
        let cleaned = clean_path(file);
        match cleaned.rfind('/') {
            Some(0) | None => "/".to_string(),
            Some(idx) => cleaned[..idx].to_string(),
        }
    }

    fn basename(&self, path: &str) -> PathSegment {
        let cleaned = clean_path(path);
        PathSegment::new(cleaned.rsplit('/').next().unwrap_or_default().to_string())
    }

    fn normalize(&self, path: &str) -> String {
        normalize_separators(path)
    }

    fn resolve(&self, paths: &[&str]) -> AbsoluteFsPath {
        let mut resolved = lock(&self.cwd).as_str().to_string();
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
        lock(&self.cwd).clone()
    }
}
