//! File-name sanitizing and output path utilities.

use std::path::{Component, Path};

// ============================================================================
// Sanitizing
// ============================================================================

/// Make a file-name-safe slug from a component path.
///
/// Every character that is not ASCII alphanumeric becomes `-`, runs of dashes
/// collapse into one and dashes at either end are trimmed.
///
/// `composite.card` → `composite-card`
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_owned()
}

// ============================================================================
// Page Paths
// ============================================================================

/// Relative href prefix leading from a page back to the output root.
///
/// `index` → `""`, `docs/intro` → `"../"`. A non-empty `path_prefix` is used
/// as-is instead, with a trailing slash ensured.
pub fn asset_prefix(page: &Path, path_prefix: &str) -> String {
    if !path_prefix.is_empty() {
        return if path_prefix.ends_with('/') {
            path_prefix.to_owned()
        } else {
            format!("{path_prefix}/")
        };
    }

    let depth = page
        .parent()
        .map(|dir| {
            dir.components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .count()
        })
        .unwrap_or(0);
    "../".repeat(depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_dotted_path() {
        assert_eq!(sanitize_file_name("composite.card"), "composite-card");
        assert_eq!(sanitize_file_name("simple"), "simple");
    }

    #[test]
    fn test_sanitize_collapses_dashes() {
        assert_eq!(sanitize_file_name("a..b--c__d"), "a-b-c-d");
    }

    #[test]
    fn test_sanitize_trims_dashes() {
        assert_eq!(sanitize_file_name(".hidden."), "hidden");
        assert_eq!(sanitize_file_name("--x--"), "x");
    }

    #[test]
    fn test_sanitize_non_ascii() {
        assert_eq!(sanitize_file_name("héllo wörld"), "h-llo-w-rld");
    }

    #[test]
    fn test_sanitize_only_symbols() {
        assert_eq!(sanitize_file_name("..//"), "");
        assert_eq!(sanitize_file_name(""), "");
    }

    #[test]
    fn test_asset_prefix_by_depth() {
        assert_eq!(asset_prefix(Path::new("index"), ""), "");
        assert_eq!(asset_prefix(Path::new("docs/intro"), ""), "../");
        assert_eq!(asset_prefix(Path::new("a/b/c"), ""), "../../");
    }

    #[test]
    fn test_asset_prefix_configured() {
        assert_eq!(asset_prefix(Path::new("docs/intro"), "/site"), "/site/");
        assert_eq!(asset_prefix(Path::new("index"), "/site/"), "/site/");
    }
}
