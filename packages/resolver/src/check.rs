//! Workspace import check
//!
//! Scans source files for alias imports and runs each one through the
//! resolver, so broken aliases show up before the build does.

use glob::glob;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::path::Path;

use crate::config::AliasOptions;
use crate::error::CheckError;
use crate::file_system::{AbsoluteFsPath, ReadonlyFileSystem};
use crate::resolver::{AliasResolver, Resolution, ResolutionRequest};

// `from '@x'`, `import '@x'`, `import('@x')`, `require('@x')`
static ALIAS_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:\bfrom\s*|\bimport\s*\(?\s*|\brequire\s*\(\s*)['"](@[^'"\s]*)['"]"#)
        .expect("alias import pattern is valid")
});

const IGNORED_DIRS: &[&str] = &["node_modules", "dist", ".git"];

/// Source extensions scanned by default. `tsx` files import aliases but are never probe targets.
pub const SCAN_EXTENSIONS: &[&str] = &["ts", "tsx", "js"];

/// An alias specifier found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOccurrence {
    pub specifier: String,
    /// 1-based.
    pub line: usize,
}

pub fn extract_alias_imports(source: &str) -> Vec<ImportOccurrence> {
    source
        .lines()
        .enumerate()
        .flat_map(|(idx, line)| {
            ALIAS_IMPORT.captures_iter(line).filter_map(move |caps| {
                caps.get(1).map(|m| ImportOccurrence {
                    specifier: m.as_str().to_string(),
                    line: idx + 1,
                })
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckedImport {
    pub specifier: String,
    pub line: usize,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub files_scanned: usize,
    /// Files that could not be read, with the error message.
    pub unreadable: Vec<(AbsoluteFsPath, String)>,
    /// Alias imports per file, in scan order. Files without alias imports are omitted.
    pub imports: IndexMap<AbsoluteFsPath, Vec<CheckedImport>>,
}

impl CheckReport {
    pub fn import_count(&self) -> usize {
        self.imports.values().map(Vec::len).sum()
    }

    /// Imports that look like aliases for this workspace but did not resolve.
    pub fn not_found(&self) -> impl Iterator<Item = (&AbsoluteFsPath, &CheckedImport)> {
        self.imports.iter().flat_map(|(file, imports)| {
            imports
                .iter()
                .filter(|i| i.resolution == Resolution::NotFound)
                .map(move |i| (file, i))
        })
    }

    pub fn has_failures(&self) -> bool {
        self.not_found().next().is_some()
    }
}

/// Default scan extensions followed by any extra resolver extensions, without duplicates.
pub fn scan_extensions(options: &AliasOptions) -> Vec<String> {
    let mut extensions: Vec<String> = SCAN_EXTENSIONS.iter().map(|e| e.to_string()).collect();
    for ext in options.normalized_extensions() {
        if !extensions.contains(&ext) {
            extensions.push(ext);
        }
    }
    extensions
}

/// Source files under `dir` with one of `extensions`, sorted, skipping build and vendor dirs.
pub fn collect_source_files(
    dir: &Path,
    extensions: &[String],
) -> Result<Vec<AbsoluteFsPath>, CheckError> {
    if !dir.is_dir() {
        return Err(CheckError::NotADirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for ext in extensions {
        let pattern = dir.join(format!("**/*.{}", ext));
        let pattern_str = pattern.to_string_lossy().to_string();
        let paths = glob(&pattern_str).map_err(|source| CheckError::Pattern {
            pattern: pattern_str.clone(),
            source,
        })?;
        files.extend(
            paths
                .filter_map(Result::ok)
                .filter(|p| p.is_file())
                .filter(|p| !is_ignored(dir, p))
                .map(AbsoluteFsPath::from),
        );
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn is_ignored(dir: &Path, file: &Path) -> bool {
    let relative = file.strip_prefix(dir).unwrap_or(file);
    relative.components().any(|c| {
        let name = c.as_os_str().to_string_lossy();
        IGNORED_DIRS.iter().any(|ignored| *ignored == name)
    })
}

/// Resolve every alias import in `files`. Files are processed in parallel.
pub fn check_files<F>(resolver: &AliasResolver<F>, files: &[AbsoluteFsPath]) -> CheckReport
where
    F: ReadonlyFileSystem + Sync,
{
    let per_file: Vec<(AbsoluteFsPath, Result<Vec<CheckedImport>, String>)> = files
        .par_iter()
        .map(|file| (file.clone(), check_file(resolver, file)))
        .collect();

    let mut report = CheckReport {
        files_scanned: files.len(),
        ..CheckReport::default()
    };
    for (file, result) in per_file {
        match result {
            Ok(imports) if imports.is_empty() => {}
            Ok(imports) => {
                report.imports.insert(file, imports);
            }
            Err(message) => {
                log::warn!("Could not read {}: {}", file, message);
                report.unreadable.push((file, message));
            }
        }
    }
    report
}

fn check_file<F>(
    resolver: &AliasResolver<F>,
    file: &AbsoluteFsPath,
) -> Result<Vec<CheckedImport>, String>
where
    F: ReadonlyFileSystem,
{
    let source = resolver
        .file_system()
        .read_file(file)
        .map_err(|e| e.to_string())?;

    Ok(extract_alias_imports(&source)
        .into_iter()
        .filter(|occurrence| resolver.matches_filter(&occurrence.specifier))
        .map(|occurrence| {
            let resolution =
                resolver.resolve(&ResolutionRequest::new(&occurrence.specifier, file.as_str()));
            CheckedImport {
                specifier: occurrence.specifier,
                line: occurrence.line,
                resolution,
            }
        })
        .collect())
}
