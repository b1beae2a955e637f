#![deny(clippy::all)]

//! Submodule Aliases - Rust Implementation
//!
//! Resolves `@/path` and `@submodule` import aliases in a workspace of nested
//! packages, for use as a build tool resolve hook.

pub mod check;
pub mod config;
pub mod context;
pub mod discovery;
pub mod error;
pub mod file_system;
pub mod path_resolver;
pub mod resolver;
pub mod specifier;

pub use config::{AliasOptions, DiscoveryMode};
pub use context::{resolve_context, OwnerContext};
pub use discovery::{discover, SubmoduleRecord, SubmoduleRegistry};
pub use error::{CheckError, ConfigError};
pub use file_system::{AbsoluteFsPath, NodeFileSystem, ReadonlyFileSystem};
pub use path_resolver::{resolve_file, resolve_index};
pub use resolver::{AliasResolver, Resolution, ResolutionRequest};
pub use specifier::AliasSpecifier;

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
