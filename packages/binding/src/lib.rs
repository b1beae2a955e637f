#![deny(clippy::all)]

//! Node.js binding for the submodule alias resolver.
//!
//! Wire it into esbuild's `onResolve` from JavaScript:
//!
//! ```js
//! const resolver = new SubmoduleAliasResolver({ packagesDir: 'packages' })
//! build.onResolve({ filter: new RegExp(resolver.filter) }, (args) => {
//!   const path = resolver.resolve(args.path, args.importer)
//!   return path ? { path } : undefined
//! })
//! ```

use napi::{Error, Result, Status};
use napi_derive::napi;

use submodule_aliases::{
    AliasOptions, AliasResolver, DiscoveryMode, NodeFileSystem, Resolution, ResolutionRequest,
};

/// Options object accepted by the constructor. Every field is optional.
#[napi(object)]
pub struct JsAliasOptions {
    pub name: Option<String>,
    pub root: Option<String>,
    pub packages_dir: Option<String>,
    pub submodules: Option<Vec<String>>,
    pub filter: Option<String>,
    pub extensions: Option<Vec<String>>,
    /// Keep the discovered registry between calls until `invalidate()`.
    pub cached: Option<bool>,
}

impl From<JsAliasOptions> for AliasOptions {
    fn from(js: JsAliasOptions) -> Self {
        let defaults = AliasOptions::default();
        AliasOptions {
            name: js.name.unwrap_or(defaults.name),
            root: js.root.or(defaults.root),
            packages_dir: js.packages_dir.unwrap_or(defaults.packages_dir),
            submodules: js.submodules.unwrap_or(defaults.submodules),
            filter: js.filter.unwrap_or(defaults.filter),
            extensions: js.extensions.unwrap_or(defaults.extensions),
            discovery: match js.cached {
                Some(true) => DiscoveryMode::Cached,
                _ => DiscoveryMode::PerCall,
            },
        }
    }
}

#[napi(object)]
pub struct JsResolution {
    /// `"resolved"`, `"notApplicable"` or `"notFound"`.
    pub kind: String,
    pub path: Option<String>,
}

impl From<Resolution> for JsResolution {
    fn from(resolution: Resolution) -> Self {
        JsResolution {
            kind: resolution.kind().to_string(),
            path: resolution.into_path().map(|p| p.into_string()),
        }
    }
}

#[napi(object)]
pub struct JsSubmodule {
    pub name: String,
    pub root_path: String,
    pub src_path: String,
    pub depth: u32,
}

#[napi]
pub struct SubmoduleAliasResolver {
    inner: AliasResolver<NodeFileSystem>,
}

#[napi]
impl SubmoduleAliasResolver {
    #[napi(constructor)]
    pub fn new(options: Option<JsAliasOptions>) -> Result<Self> {
        // Discovery warnings go to stderr; RUST_LOG raises the level.
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .try_init();
        let options = options.map(AliasOptions::from).unwrap_or_default();
        let inner = AliasResolver::new(NodeFileSystem::new(), options)
            .map_err(|e| Error::new(Status::InvalidArg, e.to_string()))?;
        Ok(SubmoduleAliasResolver { inner })
    }

    /// Plugin display name.
    #[napi(getter)]
    pub fn name(&self) -> String {
        self.inner.name().to_string()
    }

    /// Source of the alias filter regex, for `onResolve({ filter })`.
    #[napi(getter)]
    pub fn filter(&self) -> String {
        self.inner.filter_pattern().to_string()
    }

    #[napi(getter)]
    pub fn root(&self) -> String {
        self.inner.root().to_string()
    }

    /// The resolve hook: a path to claim the import, `undefined` to defer.
    #[napi]
    pub fn resolve(&self, specifier: String, importer: String) -> Option<String> {
        self.inner
            .resolve(&ResolutionRequest::new(&specifier, &importer))
            .into_path()
            .map(|p| p.into_string())
    }

    /// Like `resolve`, but tells "not an alias" apart from "alias that did not resolve".
    #[napi]
    pub fn resolve_detailed(&self, specifier: String, importer: String) -> JsResolution {
        self.inner
            .resolve(&ResolutionRequest::new(&specifier, &importer))
            .into()
    }

    #[napi]
    pub fn list_submodules(&self) -> Vec<JsSubmodule> {
        self.inner
            .registry()
            .iter()
            .map(|record| JsSubmodule {
                name: record.name.clone(),
                root_path: record.root_path.to_string(),
                src_path: record.src_path.to_string(),
                depth: u32::try_from(record.depth).unwrap_or(u32::MAX),
            })
            .collect()
    }

    /// Drop the cached registry so the next call walks the workspace again.
    #[napi]
    pub fn invalidate(&self) {
        log::debug!("[{}] registry invalidated", self.inner.name());
        self.inner.invalidate();
    }
}

#[napi]
pub fn version() -> String {
    submodule_aliases::version().to_string()
}
