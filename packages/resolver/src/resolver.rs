//! Alias resolution engine
//!
//! Entry point for the build tool's resolve hook. Every call discovers the
//! workspace (unless caching is enabled), finds the importer's owning package,
//! and dispatches on the specifier shape.

use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::{AliasOptions, DiscoveryMode};
use crate::context::{resolve_context, OwnerContext};
use crate::discovery::{discover, SubmoduleRegistry, SRC_DIR};
use crate::error::ConfigError;
use crate::file_system::{AbsoluteFsPath, ReadonlyFileSystem};
use crate::path_resolver::{resolve_file, resolve_index};
use crate::specifier::AliasSpecifier;

/// Input of the resolve hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionRequest<'a> {
    pub specifier: &'a str,
    /// Path of the file containing the import. Relative paths are taken from the current directory.
    pub importer: &'a str,
}

impl<'a> ResolutionRequest<'a> {
    pub fn new(specifier: &'a str, importer: &'a str) -> Self {
        ResolutionRequest { specifier, importer }
    }
}

/// Outcome of one resolve call.
///
/// `NotApplicable` and `NotFound` both mean "defer to the host", but the host
/// can tell "not mine" apart from "mine, but missing" for its diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "camelCase")]
pub enum Resolution {
    Resolved(AbsoluteFsPath),
    /// Not an alias this resolver handles: the specifier names no known package,
    /// or the importer belongs to no known package.
    NotApplicable,
    /// An alias with a known owning package, but no file matched.
    NotFound,
}

impl Resolution {
    fn from_lookup(path: Option<AbsoluteFsPath>) -> Self {
        path.map_or(Resolution::NotFound, Resolution::Resolved)
    }

    pub fn path(&self) -> Option<&AbsoluteFsPath> {
        match self {
            Resolution::Resolved(path) => Some(path),
            _ => None,
        }
    }

    pub fn into_path(self) -> Option<AbsoluteFsPath> {
        match self {
            Resolution::Resolved(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Resolution::Resolved(_) => "resolved",
            Resolution::NotApplicable => "notApplicable",
            Resolution::NotFound => "notFound",
        }
    }
}

pub struct AliasResolver<F: ReadonlyFileSystem> {
    fs: F,
    options: AliasOptions,
    root: AbsoluteFsPath,
    root_src: AbsoluteFsPath,
    filter: Regex,
    extensions: Vec<String>,
    cached: Mutex<Option<Arc<SubmoduleRegistry>>>,
}

impl<F: ReadonlyFileSystem> AliasResolver<F> {
    pub fn new(fs: F, options: AliasOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        let filter = Regex::new(&options.filter).map_err(|source| ConfigError::InvalidFilter {
            pattern: options.filter.clone(),
            source,
        })?;
        let root = match &options.root {
            Some(root) => fs.resolve(&[root.as_str()]),
            None => fs.pwd(),
        };
        let root_src = root.join(SRC_DIR);
        let extensions = options.normalized_extensions();

        log::debug!(
            "[{}] workspace root {}, packages dir `{}`, discovery {:?}",
            options.name,
            root,
            options.packages_dir,
            options.discovery
        );

        Ok(AliasResolver {
            fs,
            options,
            root,
            root_src,
            filter,
            extensions,
            cached: Mutex::new(None),
        })
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn options(&self) -> &AliasOptions {
        &self.options
    }

    pub fn root(&self) -> &AbsoluteFsPath {
        &self.root
    }

    pub fn file_system(&self) -> &F {
        &self.fs
    }

    /// Source of the alias filter regex, for hosts that pre-filter specifiers.
    pub fn filter_pattern(&self) -> &str {
        self.filter.as_str()
    }

    pub fn matches_filter(&self, specifier: &str) -> bool {
        self.filter.is_match(specifier)
    }

    /// Current submodule registry.
    ///
    /// In `PerCall` mode this always walks the workspace. In `Cached` mode the
    /// first walk is kept until [`invalidate`](Self::invalidate).
    pub fn registry(&self) -> Arc<SubmoduleRegistry> {
        match self.options.discovery {
            DiscoveryMode::PerCall => Arc::new(self.discover()),
            DiscoveryMode::Cached => {
                let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
                cached
                    .get_or_insert_with(|| Arc::new(self.discover()))
                    .clone()
            }
        }
    }

    /// Drop the cached registry. A no-op in `PerCall` mode.
    pub fn invalidate(&self) {
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn discover(&self) -> SubmoduleRegistry {
        let mut registry = discover(&self.fs, &self.root, &self.options.packages_dir);
        registry.retain_names(&self.options.submodules);
        log::debug!("[{}] submodules found: {:?}", self.options.name, registry.names());
        registry
    }

    pub fn context_for(&self, importer: &str) -> Option<OwnerContext> {
        let importer = self.fs.resolve(&[importer]);
        resolve_context(&importer, &self.root, &self.root_src, &self.registry())
    }

    pub fn resolve(&self, request: &ResolutionRequest<'_>) -> Resolution {
        let name = self.options.name.as_str();
        log::debug!("[{}] resolving `{}` from {}", name, request.specifier, request.importer);

        if !self.matches_filter(request.specifier) {
            return Resolution::NotApplicable;
        }
        let Some(specifier) = AliasSpecifier::parse(request.specifier) else {
            log::debug!("[{}] `{}` is not an alias specifier", name, request.specifier);
            return Resolution::NotApplicable;
        };
        if let AliasSpecifier::Submodule { name: target, .. } = specifier {
            if !self.is_allowed(target) {
                log::debug!("[{}] `{}` is not a listed submodule", name, target);
                return Resolution::NotApplicable;
            }
        }

        let registry = self.registry();
        let importer = self.fs.resolve(&[request.importer]);
        let Some(context) = resolve_context(&importer, &self.root, &self.root_src, &registry)
        else {
            log::debug!("[{}] {} belongs to no known package", name, importer);
            return Resolution::NotApplicable;
        };
        log::debug!("[{}] file context: {:?}", name, context);

        let resolution = match specifier {
            AliasSpecifier::Internal { relative } => {
                Resolution::from_lookup(self.resolve_internal(&context, relative))
            }
            AliasSpecifier::Submodule { name: target, subpath } => {
                self.resolve_submodule(&context, &registry, target, subpath)
            }
        };

        match &resolution {
            Resolution::Resolved(path) => {
                log::debug!("[{}] resolved `{}` -> {}", name, request.specifier, path);
            }
            Resolution::NotApplicable => {
                log::debug!("[{}] `{}` names no known package", name, request.specifier);
            }
            Resolution::NotFound => {
                log::debug!("[{}] failed to resolve `{}`", name, request.specifier);
            }
        }
        resolution
    }

    fn is_allowed(&self, name: &str) -> bool {
        self.options.submodules.is_empty() || self.options.submodules.iter().any(|n| n == name)
    }

    fn resolve_internal(&self, context: &OwnerContext, relative: &str) -> Option<AbsoluteFsPath> {
        let target = context.src_path().join(relative);
        log::trace!("trying internal path {}", target);
        resolve_file(&self.fs, &target, &self.extensions)
    }

    /// Package-local `packages/<name>` first, then the first registry entry with that name.
    /// A name that is neither is someone else's scoped package, e.g. `@types/node`.
    fn resolve_submodule(
        &self,
        context: &OwnerContext,
        registry: &SubmoduleRegistry,
        target: &str,
        subpath: Option<&str>,
    ) -> Resolution {
        let local = context
            .root_path()
            .join(&self.options.packages_dir)
            .join(target);
        let has_local = self.fs.is_directory(&local.join(SRC_DIR));
        if has_local {
            log::trace!("trying local package {}", local);
            if let Some(path) = self.resolve_in_package(&local, subpath) {
                return Resolution::Resolved(path);
            }
        }

        match registry.find_by_name(target) {
            Some(global) if global.root_path != local => {
                log::trace!("trying registry package {}", global.root_path);
                Resolution::from_lookup(self.resolve_in_package(&global.root_path, subpath))
            }
            Some(_) => Resolution::NotFound,
            None if has_local => Resolution::NotFound,
            None => Resolution::NotApplicable,
        }
    }

    fn resolve_in_package(
        &self,
        package_root: &AbsoluteFsPath,
        subpath: Option<&str>,
    ) -> Option<AbsoluteFsPath> {
        let src = package_root.join(SRC_DIR);
        match subpath {
            None => resolve_index(&self.fs, &src, &self.extensions),
            Some(subpath) => {
                let target = src.join(subpath);
                // `@lib/../x` must not reach outside lib's sources.
                if !src.contains(&target) || target == src {
                    return None;
                }
                resolve_file(&self.fs, &target, &self.extensions)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_system::testing::MockFileSystem;

    fn workspace() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.init_with_files(&[
            ("/ws/src/index.ts", "import { lib } from '@lib'"),
            ("/ws/src/util.ts", ""),
            ("/ws/src/function.ts", ""),
            ("/ws/packages/lib/src/index.ts", ""),
            ("/ws/packages/lib/src/util.ts", ""),
            ("/ws/packages/lib/src/helper/index.ts", ""),
            ("/ws/packages/lib/src/deep/mod.js", ""),
            ("/ws/packages/lib/packages/sub-lib/src/index.ts", ""),
            ("/ws/packages/lib/packages/sub-lib/src/axios.ts", ""),
            ("/ws/packages/js-only/src/index.js", ""),
            ("/ws/packages/empty/README.md", ""),
        ]);
        fs
    }

    fn resolver(fs: MockFileSystem) -> AliasResolver<MockFileSystem> {
        let options = AliasOptions {
            root: Some("/ws".to_string()),
            ..AliasOptions::default()
        };
        AliasResolver::new(fs, options).unwrap()
    }

    fn resolve(
        resolver: &AliasResolver<MockFileSystem>,
        specifier: &str,
        importer: &str,
    ) -> Resolution {
        resolver.resolve(&ResolutionRequest::new(specifier, importer))
    }

    fn resolved(path: &str) -> Resolution {
        Resolution::Resolved(AbsoluteFsPath::new(path.to_string()))
    }

    #[test]
    fn should_resolve_internal_import_from_root() {
        let r = resolver(workspace());
        assert_eq!(resolve(&r, "@/util", "/ws/src/index.ts"), resolved("/ws/src/util.ts"));
    }

    #[test]
    fn should_bind_internal_import_to_owning_package() {
        let r = resolver(workspace());
        assert_eq!(
            resolve(&r, "@/util", "/ws/packages/lib/src/index.ts"),
            resolved("/ws/packages/lib/src/util.ts")
        );
    }

    #[test]
    fn should_resolve_internal_directory_index() {
        let r = resolver(workspace());
        assert_eq!(
            resolve(&r, "@/helper", "/ws/packages/lib/src/index.ts"),
            resolved("/ws/packages/lib/src/helper/index.ts")
        );
    }

    #[test]
    fn should_resolve_submodule_entry() {
        let r = resolver(workspace());
        assert_eq!(
            resolve(&r, "@lib", "/ws/src/index.ts"),
            resolved("/ws/packages/lib/src/index.ts")
        );
    }

    #[test]
    fn should_fall_back_to_js_entry() {
        let r = resolver(workspace());
        assert_eq!(
            resolve(&r, "@js-only", "/ws/src/index.ts"),
            resolved("/ws/packages/js-only/src/index.js")
        );
    }

    #[test]
    fn should_resolve_nested_sibling_from_owning_package() {
        let r = resolver(workspace());
        assert_eq!(
            resolve(&r, "@sub-lib", "/ws/packages/lib/src/index.ts"),
            resolved("/ws/packages/lib/packages/sub-lib/src/index.ts")
        );
    }

    #[test]
    fn should_fall_back_to_registry_for_nested_submodule() {
        let r = resolver(workspace());
        // Root has no packages/sub-lib; the registry finds it under lib.
        assert_eq!(
            resolve(&r, "@sub-lib", "/ws/src/index.ts"),
            resolved("/ws/packages/lib/packages/sub-lib/src/index.ts")
        );
    }

    #[test]
    fn should_resolve_submodule_subpath() {
        let r = resolver(workspace());
        assert_eq!(
            resolve(&r, "@lib/deep/mod", "/ws/src/index.ts"),
            resolved("/ws/packages/lib/src/deep/mod.js")
        );
        assert_eq!(
            resolve(&r, "@sub-lib/axios", "/ws/packages/lib/src/index.ts"),
            resolved("/ws/packages/lib/packages/sub-lib/src/axios.ts")
        );
    }

    #[test]
    fn should_not_escape_package_through_subpath() {
        let r = resolver(workspace());
        assert_eq!(resolve(&r, "@lib/../../../src/util", "/ws/src/index.ts"), Resolution::NotFound);
    }

    #[test]
    fn should_report_not_found_for_missing_targets() {
        let r = resolver(workspace());
        assert_eq!(resolve(&r, "@/missing", "/ws/src/index.ts"), Resolution::NotFound);
        assert_eq!(resolve(&r, "@lib/missing", "/ws/src/index.ts"), Resolution::NotFound);
        assert_eq!(resolve(&r, "@js-only/nope", "/ws/src/index.ts"), Resolution::NotFound);
    }

    #[test]
    fn should_not_apply_to_unknown_scoped_packages() {
        let r = resolver(workspace());
        assert_eq!(resolve(&r, "@angular/core", "/ws/src/index.ts"), Resolution::NotApplicable);
        assert_eq!(resolve(&r, "@types/node", "/ws/src/index.ts"), Resolution::NotApplicable);
        assert_eq!(resolve(&r, "@nope", "/ws/src/index.ts"), Resolution::NotApplicable);
        // a directory without `src` is not a package
        assert_eq!(resolve(&r, "@empty", "/ws/src/index.ts"), Resolution::NotApplicable);
    }

    #[test]
    fn should_not_apply_outside_known_packages() {
        let r = resolver(workspace());
        assert_eq!(resolve(&r, "@/util", "/ws/scripts/build.ts"), Resolution::NotApplicable);
        assert_eq!(resolve(&r, "@lib", "/tmp/stray.ts"), Resolution::NotApplicable);
    }

    #[test]
    fn should_not_apply_to_non_alias_specifiers() {
        let r = resolver(workspace());
        assert_eq!(resolve(&r, "./util", "/ws/src/index.ts"), Resolution::NotApplicable);
        assert_eq!(resolve(&r, "lodash", "/ws/src/index.ts"), Resolution::NotApplicable);
        assert_eq!(resolve(&r, "@", "/ws/src/index.ts"), Resolution::NotApplicable);
    }

    #[test]
    fn should_respect_submodule_allow_list() {
        let options = AliasOptions {
            root: Some("/ws".to_string()),
            submodules: vec!["lib".to_string()],
            ..AliasOptions::default()
        };
        let r = AliasResolver::new(workspace(), options).unwrap();
        assert_eq!(
            resolve(&r, "@lib", "/ws/src/index.ts"),
            resolved("/ws/packages/lib/src/index.ts")
        );
        assert_eq!(resolve(&r, "@js-only", "/ws/src/index.ts"), Resolution::NotApplicable);
    }

    #[test]
    fn should_rediscover_on_every_call_by_default() {
        let fs = workspace();
        let r = resolver(fs.clone());
        assert_eq!(resolve(&r, "@late", "/ws/src/index.ts"), Resolution::NotApplicable);

        fs.init_with_files(&[("/ws/packages/late/src/index.ts", "")]);
        assert_eq!(
            resolve(&r, "@late", "/ws/src/index.ts"),
            resolved("/ws/packages/late/src/index.ts")
        );
    }

    #[test]
    fn should_keep_cached_registry_until_invalidated() {
        let fs = workspace();
        let options = AliasOptions {
            root: Some("/ws".to_string()),
            discovery: DiscoveryMode::Cached,
            ..AliasOptions::default()
        };
        let r = AliasResolver::new(fs.clone(), options).unwrap();
        assert_eq!(r.registry().len(), 3);

        fs.init_with_files(&[("/ws/packages/late/src/index.ts", "")]);
        assert_eq!(r.registry().len(), 3);
        assert_eq!(
            resolve(&r, "@/util", "/ws/packages/late/src/index.ts"),
            Resolution::NotApplicable
        );

        r.invalidate();
        assert_eq!(r.registry().len(), 4);
    }

    #[test]
    fn should_reject_invalid_filter() {
        let options = AliasOptions {
            filter: "^(@".to_string(),
            ..AliasOptions::default()
        };
        assert!(matches!(
            AliasResolver::new(MockFileSystem::new(), options),
            Err(ConfigError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn should_honor_custom_filter() {
        let options = AliasOptions {
            root: Some("/ws".to_string()),
            filter: "^@/".to_string(),
            ..AliasOptions::default()
        };
        let r = AliasResolver::new(workspace(), options).unwrap();
        assert_eq!(resolve(&r, "@lib", "/ws/src/index.ts"), Resolution::NotApplicable);
        assert_eq!(resolve(&r, "@/util", "/ws/src/index.ts"), resolved("/ws/src/util.ts"));
    }

    #[test]
    fn should_resolve_relative_root_against_cwd() {
        let fs = workspace();
        fs.set_cwd(&AbsoluteFsPath::new("/ws".to_string()));
        let r = AliasResolver::new(fs, AliasOptions::default()).unwrap();
        assert_eq!(r.root().as_str(), "/ws");
        assert_eq!(resolve(&r, "@/util", "src/index.ts"), resolved("/ws/src/util.ts"));
    }

    #[test]
    fn should_serialize_resolution_with_kind_tag() {
        let json = serde_json::to_string(&resolved("/ws/src/util.ts")).unwrap();
        assert_eq!(json, r#"{"kind":"resolved","path":"/ws/src/util.ts"}"#);
        let json = serde_json::to_string(&Resolution::NotFound).unwrap();
        assert_eq!(json, r#"{"kind":"notFound"}"#);
    }
}
