//! Discovery phase: walks a workspace root for source files, honoring
//! the workspace's `include`/`exclude` filters plus the same sensible
//! default excludes (`node_modules`, `.git`, build output) a source-aware
//! walker always carries.
//!
//! Built on `ignore::WalkBuilder` plus a `globset` exclude/include pair,
//! narrowed to this workspace's single supported language family (JS/TS).

use codegraph_config::FileFilters;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

const DEFAULT_EXCLUDES: &[&str] = &[
    "**/node_modules/**",
    "**/.git/**",
    "**/dist/**",
    "**/build/**",
    "**/target/**",
    "**/.codegraph/**",
];

fn is_supported_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("js") | Some("jsx") | Some("ts") | Some("tsx")
    )
}

fn is_default_excluded(path: &Path) -> bool {
    let text = path.to_string_lossy();
    DEFAULT_EXCLUDES.iter().any(|pattern| {
        let needle = pattern.trim_start_matches("**/").trim_end_matches("/**");
        text.split('/').any(|segment| segment == needle)
    })
}

/// Walks `root` and returns every `.js`/`.jsx`/`.ts`/`.tsx` file that passes
/// both the default excludes and the workspace's own `include`/`exclude`
/// filters, respecting `.gitignore`.
pub fn discover_files(root: &Path, filters: &FileFilters) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_exclude(true)
        .ignore(true)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "discovery walker error, skipping entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || !is_supported_extension(path) || is_default_excluded(path) {
            continue;
        }
        if !filters.matches(path) {
            continue;
        }
        files.push(path.to_path_buf());
    }
    files
}
