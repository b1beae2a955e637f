/// Convert Windows-style separators to POSIX separators.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Lexically normalize a path: collapse separators, drop `.` segments and apply `..`.
///
/// Drive-letter prefixes (`C:`) and the leading `/` of absolute paths are preserved.
/// `..` never climbs above the root.
pub fn clean_path(path: &str) -> String {
    let normalized = normalize_separators(path);

    let is_windows_absolute = normalized.len() >= 2 && normalized.as_bytes()[1] == b':';
    let is_unix_absolute = normalized.starts_with('/');

    let (drive_prefix, path_part) = if is_windows_absolute {
        normalized.split_at(2)
    } else {
        ("", normalized.as_str())
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in path_part.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    let joined = segments.join("/");

    if is_windows_absolute {
        format!("{}/{}", drive_prefix, joined)
    } else if is_unix_absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Split a cleaned path into its non-empty segments.
pub fn split_segments(path: &str) -> Vec<String> {
    normalize_separators(path)
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
