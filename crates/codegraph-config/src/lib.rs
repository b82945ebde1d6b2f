//! Workspace configuration: the YAML shape every entry point (worker, CLI)
//! loads before handing a project to the orchestrator.

use codegraph_core::{CodeGraphError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct WorkspaceSection {
    /// Absent → single-root mode: the project path passed on the CLI is the
    /// sole root.
    #[serde(default)]
    pub roots: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct PluginLists {
    #[serde(default)]
    pub indexing: Vec<String>,
    #[serde(default)]
    pub analysis: Vec<String>,
    #[serde(default)]
    pub enrichment: Vec<String>,
    #[serde(default)]
    pub validation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ServiceSeed {
    pub name: String,
    pub path: String,
    pub entry_point: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct Config {
    #[serde(default)]
    pub workspace: WorkspaceSection,
    #[serde(default)]
    pub plugins: PluginLists,
    #[serde(default)]
    pub services: Vec<ServiceSeed>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub strict: bool,
}

impl Config {
    /// Loads from a single YAML file. Layering additional sources (env
    /// overrides, a `local.yaml`) is left to callers that need it — the
    /// `config` crate builder composes them the same way regardless of how
    /// many sources are added.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .map_err(|e| CodeGraphError::Configuration(format!("building config from {}: {e}", path.display())))?;
        settings
            .try_deserialize()
            .map_err(|e| CodeGraphError::Configuration(format!("deserializing config from {}: {e}", path.display())))
    }

    /// Resolves the configured roots against `project_path`: the roots list
    /// if set, otherwise a single implicit root at the project path itself.
    pub fn resolve_roots(&self, project_path: &Path) -> Vec<PathBuf> {
        match &self.workspace.roots {
            Some(roots) if !roots.is_empty() => roots
                .iter()
                .map(|r| {
                    let p = PathBuf::from(r);
                    if p.is_absolute() {
                        p
                    } else {
                        project_path.join(p)
                    }
                })
                .collect(),
            _ => vec![project_path.to_path_buf()],
        }
    }

    /// Validates that every root exists on disk and that root basenames are
    /// pairwise distinct. Returns the validated `root_prefix` (basename)
    /// per root, in the same order as `roots`.
    pub fn validate_roots(&self, roots: &[PathBuf]) -> Result<Vec<String>> {
        let mut prefixes = Vec::with_capacity(roots.len());
        let mut seen = std::collections::HashSet::new();

        for root in roots {
            if !root.exists() {
                return Err(CodeGraphError::Configuration(format!(
                    "workspace root does not exist: {}",
                    root.display()
                )));
            }
            let basename = root
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| CodeGraphError::Configuration(format!("root has no usable basename: {}", root.display())))?
                .to_string();
            if !seen.insert(basename.clone()) {
                return Err(CodeGraphError::Configuration(format!(
                    "duplicate root basename '{basename}' across workspace.roots"
                )));
            }
            prefixes.push(basename);
        }

        Ok(prefixes)
    }

    /// Compiles `include`/`exclude` into matchers a discovery walker can
    /// consult per candidate file. Absent `include` matches everything;
    /// `exclude` always takes priority when both match.
    pub fn compile_filters(&self) -> Result<FileFilters> {
        Ok(FileFilters {
            include: compile_globset(&self.include)?,
            exclude: compile_globset(&self.exclude)?,
        })
    }
}

fn compile_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| CodeGraphError::Configuration(format!("invalid glob '{pattern}': {e}")))?;
        builder.add(glob);
    }
    let set = builder
        .build()
        .map_err(|e| CodeGraphError::Configuration(format!("compiling globset: {e}")))?;
    Ok(Some(set))
}

pub struct FileFilters {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl FileFilters {
    pub fn matches(&self, path: &Path) -> bool {
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(path) {
                return false;
            }
        }
        match &self.include {
            Some(include) => include.is_match(path),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_single_root_defaults() {
        let file = write_yaml("strict: true\n");
        let config = Config::load_from_file(file.path()).unwrap();
        assert!(config.strict);
        assert!(config.workspace.roots.is_none());
        assert!(config.plugins.analysis.is_empty());
    }

    #[test]
    fn loads_multi_root_and_plugins() {
        let file = write_yaml(
            "workspace:\n  roots: [backend, frontend]\nplugins:\n  analysis: [JsAnalyzer]\n  enrichment: [ImportExportLinker]\n",
        );
        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.workspace.roots, Some(vec!["backend".to_string(), "frontend".to_string()]));
        assert_eq!(config.plugins.analysis, vec!["JsAnalyzer".to_string()]);
    }

    #[test]
    fn rejects_duplicate_root_basenames() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("shared");
        let b = dir.path().join("nested").join("shared");
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();

        let config = Config::default();
        let err = config.validate_roots(&[a, b]).unwrap_err();
        assert!(err.to_string().contains("duplicate root basename"));
    }

    #[test]
    fn rejects_missing_root() {
        let config = Config::default();
        let err = config.validate_roots(&[PathBuf::from("/does/not/exist/anywhere")]).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn single_root_mode_defaults_to_project_path() {
        let config = Config::default();
        let roots = config.resolve_roots(Path::new("/proj"));
        assert_eq!(roots, vec![PathBuf::from("/proj")]);
    }

    #[test]
    fn filters_exclude_takes_priority_over_include() {
        let config = Config {
            include: vec!["**/*.ts".to_string()],
            exclude: vec!["**/*.test.ts".to_string()],
            ..Config::default()
        };
        let filters = config.compile_filters().unwrap();
        assert!(filters.matches(Path::new("src/a.ts")));
        assert!(!filters.matches(Path::new("src/a.test.ts")));
        assert!(!filters.matches(Path::new("src/a.js")));
    }
}
