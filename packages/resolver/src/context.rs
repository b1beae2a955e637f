//! Ownership of an importing file.

use serde::Serialize;

use crate::discovery::SubmoduleRegistry;
use crate::file_system::AbsoluteFsPath;

/// The package an importing file belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OwnerContext {
    #[serde(rename_all = "camelCase")]
    Root {
        root_path: AbsoluteFsPath,
        src_path: AbsoluteFsPath,
    },
    #[serde(rename_all = "camelCase")]
    Submodule {
        name: String,
        root_path: AbsoluteFsPath,
        src_path: AbsoluteFsPath,
    },
}

impl OwnerContext {
    /// Directory `@/` imports are resolved against.
    pub fn src_path(&self) -> &AbsoluteFsPath {
        match self {
            OwnerContext::Root { src_path, .. } | OwnerContext::Submodule { src_path, .. } => {
                src_path
            }
        }
    }

    /// Directory whose own packages folder is searched first for `@name` imports.
    pub fn root_path(&self) -> &AbsoluteFsPath {
        match self {
            OwnerContext::Root { root_path, .. } | OwnerContext::Submodule { root_path, .. } => {
                root_path
            }
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            OwnerContext::Root { .. } => None,
            OwnerContext::Submodule { name, .. } => Some(name),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, OwnerContext::Root { .. })
    }
}

/// Pick the package that owns `importer`.
///
/// The root project's `src` wins outright. Otherwise the submodule with the
/// longest `src_path` containing the importer is chosen, so a package nested
/// inside another package's tree is preferred over its parent.
pub fn resolve_context(
    importer: &AbsoluteFsPath,
    workspace_root: &AbsoluteFsPath,
    root_src: &AbsoluteFsPath,
    registry: &SubmoduleRegistry,
) -> Option<OwnerContext> {
    if root_src.contains(importer) {
        return Some(OwnerContext::Root {
            root_path: workspace_root.clone(),
            src_path: root_src.clone(),
        });
    }

    registry
        .iter()
        .filter(|record| record.src_path.contains(importer))
        .max_by_key(|record| record.src_path.as_str().len())
        .map(|record| OwnerContext::Submodule {
            name: record.name.clone(),
            root_path: record.root_path.clone(),
            src_path: record.src_path.clone(),
        })
}
