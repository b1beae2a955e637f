//! Submodule discovery
//!
//! Walks `<root>/<packages_dir>/*` depth-first and admits every directory that
//! has a `src` directory. Admitted packages are searched the same way for
//! their own nested packages.

use serde::Serialize;

use crate::file_system::{AbsoluteFsPath, ReadonlyFileSystem};

pub const SRC_DIR: &str = "src";

/// One discovered package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmoduleRecord {
    pub name: String,
    pub root_path: AbsoluteFsPath,
    pub src_path: AbsoluteFsPath,
    /// 1 for packages directly under the workspace's packages directory.
    pub depth: usize,
}

/// All submodules found by one discovery pass, in depth-first order.
///
/// Names are not required to be unique; every record is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SubmoduleRegistry {
    records: Vec<SubmoduleRecord>,
}

impl SubmoduleRegistry {
    pub fn new(records: Vec<SubmoduleRecord>) -> Self {
        SubmoduleRegistry { records }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubmoduleRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record with this name in discovery order.
    pub fn find_by_name(&self, name: &str) -> Option<&SubmoduleRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }

    /// Keep only records whose name is in `allowed`. An empty list keeps everything.
    pub fn retain_names(&mut self, allowed: &[String]) {
        if allowed.is_empty() {
            return;
        }
        self.records.retain(|r| allowed.iter().any(|n| *n == r.name));
    }
}

impl<'a> IntoIterator for &'a SubmoduleRegistry {
    type Item = &'a SubmoduleRecord;
    type IntoIter = std::slice::Iter<'a, SubmoduleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Discover every submodule reachable from `root_dir`.
///
/// Never fails: an unreadable packages directory is logged and contributes no records.
pub fn discover<F>(fs: &F, root_dir: &AbsoluteFsPath, packages_dir: &str) -> SubmoduleRegistry
where
    F: ReadonlyFileSystem + ?Sized,
{
    let mut records = Vec::new();
    search_in_directory(fs, root_dir, packages_dir, 1, &mut records);
    SubmoduleRegistry::new(records)
}

fn search_in_directory<F>(
    fs: &F,
    base_dir: &AbsoluteFsPath,
    packages_dir: &str,
    depth: usize,
    records: &mut Vec<SubmoduleRecord>,
) where
    F: ReadonlyFileSystem + ?Sized,
{
    let packages_path = base_dir.join(packages_dir);
    if !fs.is_directory(&packages_path) {
        return;
    }

    let mut entries = match fs.readdir(&packages_path) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Error reading packages directory {}: {}", packages_path, e);
            return;
        }
    };
    // readdir order is platform dependent
    entries.sort();

    for entry in entries {
        let submodule_path = packages_path.join(entry.as_str());
        if !fs.is_directory(&submodule_path) {
            continue;
        }

        let src_path = submodule_path.join(SRC_DIR);
        if !fs.is_directory(&src_path) {
            log::trace!("Skipping {}: no {} directory", submodule_path, SRC_DIR);
            continue;
        }

        log::trace!("Found submodule {} at {}", entry, submodule_path);
        records.push(SubmoduleRecord {
            name: entry.as_str().to_string(),
            root_path: submodule_path.clone(),
            src_path,
            depth,
        });
        search_in_directory(fs, &submodule_path, packages_dir, depth + 1, records);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_system::testing::MockFileSystem;

    fn abs(path: &str) -> AbsoluteFsPath {
        AbsoluteFsPath::new(path.to_string())
    }

    #[test]
    fn should_return_empty_registry_without_packages_dir() {
        let fs = MockFileSystem::new();
        fs.init_with_files(&[("/ws/src/index.ts", "")]);

        let registry = discover(&fs, &abs("/ws"), "packages");
        assert!(registry.is_empty());
    }

    #[test]
    fn should_admit_only_packages_with_src() {
        let fs = MockFileSystem::new();
        fs.init_with_files(&[
            ("/ws/packages/lib/src/index.ts", ""),
            ("/ws/packages/docs/README.md", ""),
            ("/ws/packages/notes.txt", ""),
        ]);

        let registry = discover(&fs, &abs("/ws"), "packages");
        assert_eq!(registry.names(), vec!["lib"]);

        let lib = &registry.iter().next().unwrap();
        assert_eq!(lib.root_path.as_str(), "/ws/packages/lib");
        assert_eq!(lib.src_path.as_str(), "/ws/packages/lib/src");
        assert_eq!(lib.depth, 1);
    }

    #[test]
    fn should_skip_package_whose_src_is_a_file() {
        let fs = MockFileSystem::new();
        fs.init_with_files(&[("/ws/packages/broken/src", "not a dir")]);

        let registry = discover(&fs, &abs("/ws"), "packages");
        assert!(registry.is_empty());
    }

    #[test]
    fn should_visit_parent_before_children() {
        let fs = MockFileSystem::new();
        fs.init_with_files(&[
            ("/ws/packages/a/src/index.ts", ""),
            ("/ws/packages/a/packages/inner/src/index.ts", ""),
            ("/ws/packages/b/src/index.ts", ""),
        ]);

        let registry = discover(&fs, &abs("/ws"), "packages");
        assert_eq!(registry.names(), vec!["a", "inner", "b"]);
        let depths: Vec<usize> = registry.iter().map(|r| r.depth).collect();
        assert_eq!(depths, vec![1, 2, 1]);
    }

    #[test]
    fn should_keep_records_with_duplicate_names() {
        let fs = MockFileSystem::new();
        fs.init_with_files(&[
            ("/ws/packages/a/src/index.ts", ""),
            ("/ws/packages/a/packages/util/src/index.ts", ""),
            ("/ws/packages/util/src/index.ts", ""),
        ]);

        let registry = discover(&fs, &abs("/ws"), "packages");
        assert_eq!(registry.len(), 3);
        let first = registry.find_by_name("util").unwrap();
        assert_eq!(first.root_path.as_str(), "/ws/packages/a/packages/util");
    }

    #[test]
    fn should_treat_unreadable_packages_dir_as_empty() {
        let fs = MockFileSystem::new();
        fs.init_with_files(&[
            ("/ws/packages/a/src/index.ts", ""),
            ("/ws/packages/a/packages/hidden/src/index.ts", ""),
            ("/ws/packages/b/src/index.ts", ""),
        ]);
        fs.deny_readdir(&abs("/ws/packages/a/packages"));

        let registry = discover(&fs, &abs("/ws"), "packages");
        assert_eq!(registry.names(), vec!["a", "b"]);
    }

    #[test]
    fn should_honor_custom_packages_dir() {
        let fs = MockFileSystem::new();
        fs.init_with_files(&[
            ("/ws/modules/core/src/index.ts", ""),
            ("/ws/packages/ignored/src/index.ts", ""),
        ]);

        let registry = discover(&fs, &abs("/ws"), "modules");
        assert_eq!(registry.names(), vec!["core"]);
    }

    #[test]
    fn should_filter_by_allow_list() {
        let fs = MockFileSystem::new();
        fs.init_with_files(&[
            ("/ws/packages/a/src/index.ts", ""),
            ("/ws/packages/a/packages/inner/src/index.ts", ""),
            ("/ws/packages/b/src/index.ts", ""),
        ]);

        let mut registry = discover(&fs, &abs("/ws"), "packages");
        registry.retain_names(&["inner".to_string(), "b".to_string()]);
        assert_eq!(registry.names(), vec!["inner", "b"]);
    }

    #[test]
    fn should_be_idempotent() {
        let fs = MockFileSystem::new();
        fs.init_with_files(&[
            ("/ws/packages/a/src/index.ts", ""),
            ("/ws/packages/a/packages/inner/src/index.ts", ""),
            ("/ws/packages/b/src/index.ts", ""),
        ]);

        let first = discover(&fs, &abs("/ws"), "packages");
        let second = discover(&fs, &abs("/ws"), "packages");
        assert_eq!(first, second);
    }
}
