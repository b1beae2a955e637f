//! Classification of alias-shaped import specifiers.

/// Sigil that starts every alias specifier.
pub const ALIAS_SIGIL: char = '@';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasSpecifier<'a> {
    /// `@/<relative>`: a path inside the importer's own package.
    Internal { relative: &'a str },
    /// `@<name>` or `@<name>/<subpath>`: another package by name.
    Submodule {
        name: &'a str,
        subpath: Option<&'a str>,
    },
}

impl<'a> AliasSpecifier<'a> {
    /// Returns `None` for anything that is not a well-formed alias: no sigil,
    /// a bare `@`, an empty `@/`, or an empty name.
    pub fn parse(specifier: &'a str) -> Option<Self> {
        let rest = specifier.strip_prefix(ALIAS_SIGIL)?;

        if let Some(relative) = rest.strip_prefix('/') {
            let relative = relative.trim_start_matches('/');
            if relative.is_empty() {
                return None;
            }
            return Some(AliasSpecifier::Internal { relative });
        }

        let (name, subpath) = match rest.split_once('/') {
            Some((name, subpath)) => {
                let subpath = subpath.trim_matches('/');
                (name, (!subpath.is_empty()).then_some(subpath))
            }
            None => (rest, None),
        };

        if name.is_empty() || name == "." || name == ".." {
            return None;
        }
        Some(AliasSpecifier::Submodule { name, subpath })
    }
}
