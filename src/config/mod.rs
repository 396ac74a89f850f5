//! Configuration loading for looper-report

mod schema;

pub use schema::{Config, SubprojectOverride, SummaryResult, DEFAULT_RESULTS_SUBDIR};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "looper-report.json";

/// A loaded config together with the folder relative paths resolve against
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub base_dir: PathBuf,
}

/// Find and load config file with extends resolution. Searches current directory then parents.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<LoadedConfig> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        };
        if path.exists() {
            Some(path)
        } else {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    } else {
        find_config_in_parents(work_dir)
    };

    match path {
        Some(path) => {
            let config = load_config_with_extends(&path, &mut HashSet::new())?;
            let base_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| work_dir.to_path_buf());
            Ok(LoadedConfig { config, base_dir })
        }
        None => Ok(LoadedConfig {
            config: Config::default(),
            base_dir: work_dir.to_path_buf(),
        }),
    }
}

/// Load a config file and resolve extends chain
fn load_config_with_extends(config_path: &Path, visited: &mut HashSet<PathBuf>) -> Result<Config> {
    // Prevent circular extends
    let canonical = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());
    if visited.contains(&canonical) {
        anyhow::bail!(
            "Circular extends detected in config: {}",
            config_path.display()
        );
    }
    visited.insert(canonical);

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config: {}", config_path.display()))?;

    if let Some(extends) = config.extends.take() {
        let base_config = resolve_extends(config_path, &extends, visited)?;
        config.merge_from(base_config);
    }

    Ok(config)
}

/// Resolve an extends reference to a config
fn resolve_extends(
    config_path: &Path,
    extends: &str,
    visited: &mut HashSet<PathBuf>,
) -> Result<Config> {
    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    let extends_path = config_dir.join(extends);

    // Ensure it has .json extension
    let extends_path = if extends_path.extension().is_none() {
        extends_path.with_extension("json")
    } else {
        extends_path
    };

    if !extends_path.exists() {
        anyhow::bail!(
            "Extended config not found: {} (referenced from {})",
            extends_path.display(),
            config_path.display()
        );
    }

    load_config_with_extends(&extends_path, visited)
}

/// Search for looper-report.json in directory and its parents
fn find_config_in_parents(mut dir: &Path) -> Option<PathBuf> {
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Build a GlobSet from sample exclude patterns
pub fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).with_context(|| format!("Invalid exclude pattern: {}", pattern))?;
        builder.add(glob);
    }
    builder.build().map_err(|e| anyhow::anyhow!("{}", e))
}

/// Starter config written by `init`
pub fn starter_config(name: &str) -> Config {
    Config {
        name: Some(name.to_string()),
        output_dir: Some(".".to_string()),
        results_subdir: Some(DEFAULT_RESULTS_SUBDIR.to_string()),
        ..Config::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = load_config(dir.path(), None).unwrap();
        assert!(loaded.config.name.is_none());
        assert_eq!(loaded.base_dir, dir.path());
    }

    #[test]
    fn test_custom_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let err = load_config(dir.path(), Some(Path::new("nope.json"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_config_found_in_parent() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), r#"{"name": "frogs"}"#).unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();

        let loaded = load_config(&nested, None).unwrap();

        assert_eq!(loaded.config.name.as_deref(), Some("frogs"));
        assert_eq!(loaded.base_dir, dir.path());
    }

    #[test]
    fn test_exclude_set() {
        let set = build_exclude_set(&["ctrl_*".to_string()]).unwrap();
        assert!(set.is_match("ctrl_1"));
        assert!(!set.is_match("frog_1"));
    }

    #[test]
    fn test_config_extends() {
        let dir = TempDir::new().unwrap();

        let base_path = dir.path().join("base.json");
        let mut base_file = fs::File::create(&base_path).unwrap();
        writeln!(
            base_file,
            r#"{{
                "name": "frogs",
                "resultsSubdir": "results",
                "exclude": ["ctrl_*"],
                "summaryResults": [{{"caption": "Sizes", "path": "{{name}}_sizes.pdf"}}]
            }}"#
        )
        .unwrap();

        let child_path = dir.path().join(CONFIG_FILENAME);
        let mut child_file = fs::File::create(&child_path).unwrap();
        writeln!(
            child_file,
            r#"{{
                "extends": "./base.json",
                "name": "toads",
                "samples": ["t1", "t2"]
            }}"#
        )
        .unwrap();

        let config = load_config(dir.path(), None).unwrap().config;

        assert_eq!(config.name.as_deref(), Some("toads"));
        assert_eq!(config.results_subdir.as_deref(), Some("results"));
        assert_eq!(config.samples, vec!["t1", "t2"]);
        assert_eq!(config.exclude, vec!["ctrl_*"]);
        assert_eq!(config.summary_results.len(), 1);
    }

    #[test]
    fn test_circular_extends_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), r#"{"extends": "./b.json"}"#).unwrap();
        fs::write(dir.path().join("b.json"), r#"{"extends": "./a.json"}"#).unwrap();

        let err = load_config(dir.path(), Some(Path::new("a.json"))).unwrap_err();

        assert!(format!("{:#}", err).contains("Circular extends"));
    }

    #[test]
    fn test_subproject_overrides() {
        let config: Config = serde_json::from_str(
            r#"{
                "name": "frogs",
                "samples": ["f1", "f2", "f3"],
                "subprojects": {
                    "small": { "samples": ["f1"], "resultsSubdir": "results_small" }
                }
            }"#,
        )
        .unwrap();

        let plain = config.clone().with_subproject_applied();
        assert_eq!(plain.samples.len(), 3);

        let small = config
            .merge_with_cli(Some("small"), None)
            .with_subproject_applied();
        assert_eq!(small.samples, vec!["f1"]);
        assert_eq!(small.results_subdir_or_default(), "results_small");
    }
}
