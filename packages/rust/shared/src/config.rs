//! Application configuration for doxbook.
//!
//! A book carries its own `doxbook.toml` at the book root. When it is absent
//! the user-level file at `~/.doxbook/doxbook.toml` is used, and failing that
//! the built-in defaults. CLI flags override whichever file was loaded.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DoxbookError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "doxbook.toml";

/// User-level config directory name under the home directory.
const CONFIG_DIR_NAME: &str = ".doxbook";

// ---------------------------------------------------------------------------
// Config structs (matching doxbook.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation settings.
    #[serde(default)]
    pub build: BuildSection,
}

/// `[build]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    /// Glob selecting the source files to document, relative to the book root.
    #[serde(default = "default_src")]
    pub src: String,

    /// Name of the generated-docs directory under the book root.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Maximum number of file reads/writes in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// What happens to the last chapter's existing articles.
    #[serde(default)]
    pub summary_policy: SummaryPolicy,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            src: default_src(),
            output_dir: default_output_dir(),
            concurrency: default_concurrency(),
            summary_policy: SummaryPolicy::default(),
        }
    }
}

fn default_src() -> String {
    "src/**/*.js".into()
}
fn default_output_dir() -> String {
    "dox".into()
}
fn default_concurrency() -> usize {
    16
}

/// How generated articles are combined with the target chapter's children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryPolicy {
    /// Drop the chapter's existing articles and use only the new ones.
    #[default]
    Replace,
    /// Keep existing articles not regenerated this run, append the new ones.
    Merge,
}

impl std::fmt::Display for SummaryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Replace => f.write_str("replace"),
            Self::Merge => f.write_str("merge"),
        }
    }
}

// ---------------------------------------------------------------------------
// Build config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime build configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Book root directory.
    pub root: PathBuf,
    /// Source glob, relative to `root` unless absolute.
    pub src: String,
    /// Output directory name under `root`; also the article path prefix.
    pub output_dir: String,
    /// Fan-out limit for file reads and writes.
    pub concurrency: usize,
    /// Summary append policy.
    pub summary_policy: SummaryPolicy,
}

impl BuildConfig {
    /// Build the runtime config for a book rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, config: &AppConfig) -> Self {
        Self {
            root: root.into(),
            src: config.build.src.clone(),
            output_dir: config.build.output_dir.clone(),
            concurrency: config.build.concurrency,
            summary_policy: config.build.summary_policy,
        }
    }

    /// Absolute (or root-relative) path of the generated-docs directory.
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }

    /// Check values that would otherwise fail halfway through a run.
    pub fn validate(&self) -> Result<()> {
        if self.src.trim().is_empty() {
            return Err(DoxbookError::config("build.src must not be empty"));
        }
        if self.concurrency == 0 {
            return Err(DoxbookError::config("build.concurrency must be at least 1"));
        }

        let mut components = Path::new(&self.output_dir).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(()),
            _ => Err(DoxbookError::config(format!(
                "build.output_dir must be a single directory name, got '{}'",
                self.output_dir
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the user config directory (`~/.doxbook/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DoxbookError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the book-level config file (`<root>/doxbook.toml`).
pub fn book_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Load the config for the book at `root`.
///
/// Prefers `<root>/doxbook.toml`, then `~/.doxbook/doxbook.toml`, then defaults.
pub fn load_config(root: &Path) -> Result<AppConfig> {
    let book_path = book_config_path(root);
    if book_path.exists() {
        return load_config_from(&book_path);
    }

    match config_dir() {
        Ok(dir) => {
            let user_path = dir.join(CONFIG_FILE_NAME);
            if user_path.exists() {
                return load_config_from(&user_path);
            }
            tracing::debug!(path = ?book_path, "no config file found, using defaults");
        }
        Err(e) => {
            tracing::debug!(error = %e, "no home directory, using defaults");
        }
    }

    Ok(AppConfig::default())
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DoxbookError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DoxbookError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default `doxbook.toml` into the book root.
/// Returns the path to the created file.
pub fn init_config(root: &Path) -> Result<PathBuf> {
    let path = book_config_path(root);
    if path.exists() {
        return Err(DoxbookError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    std::fs::create_dir_all(root).map_err(|e| DoxbookError::io(root, e))?;

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| DoxbookError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DoxbookError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("output_dir"));
        assert!(toml_str.contains("src/**/*.js"));
        assert!(toml_str.contains("replace"));
    }

    #[test]
    fn partial_section_fills_defaults() {
        let toml_str = r#"
[build]
src = "lib/*.js"
summary_policy = "merge"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.build.src, "lib/*.js");
        assert_eq!(config.build.output_dir, "dox");
        assert_eq!(config.build.concurrency, 16);
        assert_eq!(config.build.summary_policy, SummaryPolicy::Merge);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let toml_str = "[build]\nsummary_policy = \"append\"\n";
        assert!(toml::from_str::<AppConfig>(toml_str).is_err());
    }

    #[test]
    fn build_config_from_app_config() {
        let build = BuildConfig::new("/books/guide", &AppConfig::default());
        assert_eq!(build.src, "src/**/*.js");
        assert_eq!(build.concurrency, 16);
        assert_eq!(build.output_path(), PathBuf::from("/books/guide/dox"));
        assert!(build.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut build = BuildConfig::new(".", &AppConfig::default());
        build.concurrency = 0;
        assert!(build.validate().unwrap_err().to_string().contains("concurrency"));

        let mut build = BuildConfig::new(".", &AppConfig::default());
        build.output_dir = "../elsewhere".into();
        assert!(build.validate().is_err());

        build.output_dir = "a/b".into();
        assert!(build.validate().is_err());

        let mut build = BuildConfig::new(".", &AppConfig::default());
        build.src = "  ".into();
        assert!(build.validate().is_err());
    }

    #[test]
    fn book_config_takes_precedence() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[build]\nsrc = \"app/**/*.js\"\nconcurrency = 2\n",
        )
        .expect("write config");

        let config = load_config(dir.path()).expect("load");
        assert_eq!(config.build.src, "app/**/*.js");
        assert_eq!(config.build.concurrency, 2);
    }

    #[test]
    fn init_config_writes_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = init_config(dir.path()).expect("init");
        let parsed = load_config_from(&path).expect("reload");
        assert_eq!(parsed.build.output_dir, "dox");

        assert!(init_config(dir.path()).is_err());
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[build\nsrc = ").expect("write");
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("doxbook.toml"));
    }
}
