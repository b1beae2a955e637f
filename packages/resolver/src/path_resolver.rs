//! Extension and index fallback for a candidate base path.

use smallvec::SmallVec;

use crate::file_system::{AbsoluteFsPath, ReadonlyFileSystem};

const INDEX_FILE: &str = "index";

type Candidates = SmallVec<[AbsoluteFsPath; 6]>;

/// Candidates for `base`, in the order they are tried.
///
/// With `["ts", "js"]`: `base`, `base.ts`, `base.js`, `base/index.ts`, `base/index.js`.
pub fn file_candidates(base: &AbsoluteFsPath, extensions: &[String]) -> Candidates {
    let mut candidates = Candidates::new();
    candidates.push(base.clone());
    for ext in extensions {
        candidates.push(base.with_appended_extension(ext));
    }
    candidates.extend(index_candidates(base, extensions));
    candidates
}

pub fn index_candidates(dir: &AbsoluteFsPath, extensions: &[String]) -> Candidates {
    extensions
        .iter()
        .map(|ext| dir.join(&format!("{}.{}", INDEX_FILE, ext)))
        .collect()
}

/// First candidate for `base` that is a regular file.
pub fn resolve_file<F>(
    fs: &F,
    base: &AbsoluteFsPath,
    extensions: &[String],
) -> Option<AbsoluteFsPath>
where
    F: ReadonlyFileSystem + ?Sized,
{
    first_file(fs, file_candidates(base, extensions))
}

/// First `dir/index.<ext>` that is a regular file.
pub fn resolve_index<F>(
    fs: &F,
    dir: &AbsoluteFsPath,
    extensions: &[String],
) -> Option<AbsoluteFsPath>
where
    F: ReadonlyFileSystem + ?Sized,
{
    first_file(fs, index_candidates(dir, extensions))
}

fn first_file<F>(fs: &F, candidates: Candidates) -> Option<AbsoluteFsPath>
where
    F: ReadonlyFileSystem + ?Sized,
{
    candidates.into_iter().find(|candidate| {
        let hit = fs.is_file(candidate);
        log::trace!("  {} {}", if hit { "hit " } else { "miss" }, candidate);
        hit
    })
}
