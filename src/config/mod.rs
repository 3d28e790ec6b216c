//! Pipeline configuration management for `squash.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build/     # [build] and include_dirs
//! │   ├── cache      # [cache]
//! │   ├── codecs     # [codecs.<encoder>]
//! │   └── route      # encode_to
//! ├── types/         # ConfigError, diagnostics, field paths
//! └── mod.rs         # SquashConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section          | Purpose                                           |
//! |------------------|---------------------------------------------------|
//! | top level        | silent, verbose, exclude, include_dirs, encode_to |
//! | `[build]`        | Output dir, static dir, worker count              |
//! | `[codecs.<id>]`  | Encoder parameter overrides                       |
//! | `[cache]`        | Reuse cache level and snapshot path               |

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    BuildSectionConfig, CacheConfig, CacheLevel, CodecsConfig, IncludeEntry, Route, RouteRule,
    route_for,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::cli::{Cli, RunArgs};
use crate::encoder::{MatchRule, Registry, RuleError};
use crate::log;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing squash.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SquashConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Only print errors.
    pub silent: bool,

    /// Print debug output.
    pub verbose: bool,

    /// File names matching this regex are never processed.
    pub exclude: Option<String>,

    /// Extra directories to process.
    pub include_dirs: Vec<IncludeEntry>,

    /// Routing overrides, first match wins.
    pub encode_to: Vec<RouteRule>,

    pub build: BuildSectionConfig,

    pub codecs: CodecsConfig,

    pub cache: CacheConfig,
}

impl SquashConfig {
    const EXCLUDE: FieldPath = FieldPath::new("exclude");

    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file. Without one, defaults
    /// apply and the project root is the working directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let (config_path, exists) = Self::resolve_config_path(cli)?;

        let mut config = if exists {
            Self::from_path(&config_path)?
        } else {
            crate::debug!("config"; "no {} found, using defaults", cli.config.display());
            Self::default()
        };

        let root = if exists {
            config_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        } else {
            std::env::current_dir().context("Failed to get current working directory")?
        };

        config.config_path = config_path;
        config.finalize(&root);
        Ok(config)
    }

    /// Resolve the config file path, searching upward from cwd.
    fn resolve_config_path(cli: &Cli) -> Result<(PathBuf, bool)> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        match find_config_file(&cli.config) {
            Some(path) => Ok((path, true)),
            None => Ok((cwd.join(&cli.config), false)),
        }
    }

    /// Set the root and normalize every path against it.
    pub fn finalize(&mut self, root: &Path) {
        let root = crate::utils::path::normalize_path(root);
        self.config_path = crate::utils::path::normalize_path(&self.config_path);

        self.build.normalize(&root);
        self.cache.normalize(&root);
        for entry in &mut self.include_dirs {
            entry.normalize(&root);
        }

        self.root = root;
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .map_err(ConfigError::from)
            .with_context(|| format!("in {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), toml::de::Error> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    // ========================================================================
    // CLI overrides
    // ========================================================================

    /// Apply `run` flags on top of file values.
    ///
    /// Relative CLI paths resolve against the project root like file values.
    pub fn apply_run_args(&mut self, args: &RunArgs) -> Result<()> {
        let root = self.root.clone();
        let resolve = |p: &PathBuf| crate::utils::path::resolve_path(p, &root);

        Self::update_option(&mut self.build.output, args.out.as_ref().map(resolve).as_ref());
        if let Some(dir) = &args.static_dir {
            self.build.static_dir = Some(resolve(dir));
        }
        Self::update_option(&mut self.build.workers, args.workers.as_ref());
        Self::update_option(&mut self.exclude, args.exclude.clone().map(Some).as_ref());
        Self::update_option(&mut self.cache.path, args.cache_path.as_ref().map(resolve).as_ref());

        if let Some(level) = &args.cache {
            self.cache.level = CacheLevel::parse(level).ok_or_else(|| {
                anyhow!("invalid cache level `{level}` (expected none, session or persistent)")
            })?;
        }

        for value in &args.include {
            let mut entry = IncludeEntry::parse(value);
            entry.normalize(&root);
            self.include_dirs.push(entry);
        }

        // CLI routes take precedence over file routes
        let mut routes = args
            .route
            .iter()
            .map(|value| RouteRule::parse(value).map_err(|e| anyhow!("--route: {e}")))
            .collect::<Result<Vec<_>>>()?;
        routes.append(&mut self.encode_to);
        self.encode_to = routes;

        self.build.scan_output |= args.scan_output;
        self.silent |= args.silent;
        self.verbose |= args.verbose;
        Ok(())
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // compiled views
    // ========================================================================

    /// Effective encoder registry for this run.
    pub fn registry(&self) -> Result<Registry, RuleError> {
        Registry::effective(self.codecs.iter())
    }

    pub fn routes(&self) -> Result<Vec<Route>, RuleError> {
        RouteRule::compile_all(&self.encode_to)
    }

    pub fn exclude_rule(&self) -> Result<Option<MatchRule>, RuleError> {
        self.exclude.as_deref().map(MatchRule::new).transpose()
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate the configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        if let Some(pattern) = &self.exclude
            && let Err(e) = MatchRule::new(pattern)
        {
            diag.error(Self::EXCLUDE, e.source.to_string());
        }

        RouteRule::validate_all(&self.encode_to, &mut diag);
        self.codecs.validate(&mut diag);
        self.cache.validate(&mut diag);
        self.build.validate(&mut diag);
        IncludeEntry::validate_all(&self.include_dirs, &mut diag);

        diag.print_warnings();

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse config rooted at `root`.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str, root: &Path) -> SquashConfig {
    let (mut parsed, ignored) = SquashConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed.finalize(root);
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::EncoderId;
    use serde_json::json;

    #[test]
    fn test_full_config() {
        let config = test_parse_config(
            r#"
silent = true
exclude = "\\.(webp|wp2)$"
include_dirs = ["extra", { from = "./public", to = "./compressed" }]
encode_to = [{ from = "\\.png$", to = "webp" }]

[build]
output = "out"
workers = 3

[codecs.mozjpeg]
quality = 82

[cache]
level = "persistent"
"#,
            Path::new("/site"),
        );

        assert!(config.silent);
        assert_eq!(config.build.output, PathBuf::from("/site/out"));
        assert_eq!(config.build.static_dir, Some(PathBuf::from("/site/public")));
        assert_eq!(config.build.worker_count(), 3);
        assert_eq!(config.include_dirs[0].source(), Path::new("/site/extra"));
        assert_eq!(config.cache.path, PathBuf::from("/site/.squash/cache.json"));

        let registry = config.registry().unwrap();
        assert_eq!(
            registry.spec(EncoderId::Mozjpeg).params["quality"],
            json!(82)
        );
        assert!(config.exclude_rule().unwrap().unwrap().is_match("a.WEBP"));
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (_, ignored) = SquashConfig::parse_with_ignored(
            r#"
verbos = true
[build]
ouput = "x"
"#,
        )
        .unwrap();
        assert_eq!(ignored.len(), 2);
        assert!(ignored.iter().any(|f| f.contains("ouput")));
    }

    #[test]
    fn test_run_args_override() {
        let mut config = test_parse_config(
            r#"
encode_to = [{ from = "\\.png$", to = "oxipng" }]
[cache]
level = "session"
"#,
            Path::new("/site"),
        );
        let args = RunArgs {
            out: Some("build".into()),
            include: vec!["public=compressed".into()],
            route: vec![r"\.png$=webp".into()],
            cache: Some("persistent".into()),
            workers: Some(2),
            ..Default::default()
        };
        config.apply_run_args(&args).unwrap();

        assert_eq!(config.build.output, PathBuf::from("/site/build"));
        assert_eq!(config.build.workers, 2);
        assert_eq!(config.cache.level, CacheLevel::Persistent);
        assert_eq!(
            config.include_dirs[0].destination(),
            Some(Path::new("/site/compressed"))
        );
        let routes = config.routes().unwrap();
        assert_eq!(route_for(&routes, "a.png"), Some(EncoderId::Webp));
    }

    #[test]
    fn test_bad_cache_level_rejected() {
        let mut config = SquashConfig::default();
        let args = RunArgs {
            cache: Some("forever".into()),
            ..Default::default()
        };
        assert!(config.apply_run_args(&args).is_err());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = test_parse_config(
            r#"
exclude = "("
encode_to = [{ from = "[", to = "webp" }]
[codecs.avif]
extension = ")"
"#,
            Path::new("/nonexistent-root"),
        );
        let err = config.validate().unwrap_err();
        let Some(ConfigError::Diagnostics(diag)) = err.downcast_ref::<ConfigError>() else {
            panic!("expected diagnostics");
        };
        assert_eq!(diag.errors().len(), 3);
    }
}
