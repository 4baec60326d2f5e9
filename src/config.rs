//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/bmsort/bmsort.toml`
//! 3. Explicit config file (`--config <path>`)
//! 4. Environment variables: `BMSORT_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

use crate::application::services::{SortOptions, DEFAULT_MAX_DEPTH};
use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, Collation, Collator, NodeId, DEFAULT_LOCALE};

/// Ids of the well-known top-level folders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RootsConfig {
    /// Bookmarks bar
    pub bar: String,
    /// "Other bookmarks"
    pub other: String,
    /// Mobile bookmarks
    pub synced: String,
}

impl Default for RootsConfig {
    fn default() -> Self {
        Self {
            bar: "1".into(),
            other: "2".into(),
            synced: "3".into(),
        }
    }
}

/// Raw roots config for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRootsConfig {
    pub bar: Option<String>,
    pub other: Option<String>,
    pub synced: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub bookmarks_file: Option<PathBuf>,
    pub roots: RawRootsConfig,
    pub collation: Option<Collation>,
    pub locale: Option<String>,
    pub max_depth: Option<usize>,
    pub backup: Option<bool>,
}

/// Unified configuration for bmsort.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Browser `Bookmarks` file to sort
    pub bookmarks_file: PathBuf,
    /// Collation used for title tie-breaks and folder order
    pub collation: Collation,
    /// BCP 47 locale for `collation = "locale"`
    pub locale: String,
    /// Recursion limit; deeper trees are treated as corrupt
    pub max_depth: usize,
    /// Copy the bookmarks file aside before overwriting it
    pub backup: bool,
    /// Top-level folders sorted by `sort` without arguments
    pub roots: RootsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bookmarks_file: default_bookmarks_file(),
            collation: Collation::default(),
            locale: DEFAULT_LOCALE.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            backup: true,
            roots: RootsConfig::default(),
        }
    }
}

/// Bookmarks file of the default Chrome profile on this platform.
pub fn default_bookmarks_file() -> PathBuf {
    let Some(dirs) = BaseDirs::new() else {
        return PathBuf::from("Bookmarks");
    };
    if cfg!(target_os = "windows") {
        dirs.data_local_dir()
            .join("Google/Chrome/User Data/Default/Bookmarks")
    } else if cfg!(target_os = "macos") {
        dirs.config_dir().join("Google/Chrome/Default/Bookmarks")
    } else {
        dirs.config_dir().join("google-chrome/Default/Bookmarks")
    }
}

/// Get the XDG config directory for bmsort.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "bmsort").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("bmsort.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.bookmarks_file.to_string_lossy().as_ref());
        self.bookmarks_file = PathBuf::from(expanded);
    }

    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            bookmarks_file: overlay
                .bookmarks_file
                .clone()
                .unwrap_or_else(|| self.bookmarks_file.clone()),
            collation: overlay.collation.unwrap_or(self.collation),
            locale: overlay
                .locale
                .clone()
                .unwrap_or_else(|| self.locale.clone()),
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
            backup: overlay.backup.unwrap_or(self.backup),
            roots: RootsConfig {
                bar: overlay
                    .roots
                    .bar
                    .clone()
                    .unwrap_or_else(|| self.roots.bar.clone()),
                other: overlay
                    .roots
                    .other
                    .clone()
                    .unwrap_or_else(|| self.roots.other.clone()),
                synced: overlay
                    .roots
                    .synced
                    .clone()
                    .unwrap_or_else(|| self.roots.synced.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; must exist when given
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/bmsort/bmsort.toml`
    /// 3. Explicit config file
    /// 4. Environment variables: `BMSORT_*` prefix
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply BMSORT_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("BMSORT").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("bookmarks_file") {
            settings.bookmarks_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("collation") {
            settings.collation = val
                .parse::<Collation>()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_string("locale") {
            settings.locale = val;
        }
        if let Ok(val) = config.get_int("max_depth") {
            settings.max_depth = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("max_depth must not be negative: {val}"),
            })?;
        }
        if let Ok(val) = config.get_bool("backup") {
            settings.backup = val;
        }
        if let Ok(val) = config.get_string("roots.bar") {
            settings.roots.bar = val;
        }
        if let Ok(val) = config.get_string("roots.other") {
            settings.roots.other = val;
        }
        if let Ok(val) = config.get_string("roots.synced") {
            settings.roots.synced = val;
        }

        Ok(settings)
    }

    /// Ids of the well-known top-level folders: bar, other, synced.
    pub fn named_roots(&self) -> Vec<NodeId> {
        [&self.roots.bar, &self.roots.other, &self.roots.synced]
            .into_iter()
            .map(|id| NodeId::from(id.as_str()))
            .collect()
    }

    /// Walker options for sorting `roots`.
    pub fn sort_options(&self, roots: Vec<NodeId>, dry_run: bool) -> SortOptions {
        SortOptions {
            roots,
            max_depth: self.max_depth,
            dry_run,
        }
    }

    /// Title collator selected by `collation` and `locale`.
    pub fn collator(&self) -> Result<std::sync::Arc<dyn Collator>, ApplicationError> {
        self.collation
            .collator(&self.locale)
            .map_err(|e| ApplicationError::Config {
                message: e.to_string(),
            })
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# bmsort configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/bmsort/bmsort.toml
#   Local:  file passed with --config
#   Env:    BMSORT_* environment variables (BMSORT_ROOTS__BAR for nested keys)

# Browser bookmarks file (default: Chrome default profile)
# bookmarks_file = "~/.config/chromium/Default/Bookmarks"

# Title comparison: "locale", "case-insensitive" or "code-point"
# collation = "locale"

# Locale whose rules "locale" collation follows (BCP 47 tag)
# locale = "zh-CN"

# Folders nested deeper than this abort the run
# max_depth = 256

# Copy the bookmarks file aside before writing it
# backup = true

[roots]
# Bookmarks bar
# bar = "1"
# Other bookmarks
# other = "2"
# Mobile bookmarks
# synced = "3"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load(None).expect("load defaults");
        assert!(settings
            .bookmarks_file
            .to_string_lossy()
            .ends_with("Bookmarks"));
        assert!(settings.max_depth > 0);
    }

    #[test]
    fn given_default_roots_when_created_then_bar_and_other() {
        let roots = RootsConfig::default();
        assert_eq!(roots.bar, "1");
        assert_eq!(roots.other, "2");
        assert_eq!(roots.synced, "3");
    }

    #[test]
    fn given_tilde_in_bookmarks_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            bookmarks_file: PathBuf::from("~/Bookmarks"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let path = settings.bookmarks_file.to_string_lossy();
        assert!(path.starts_with(&home), "should start with home dir: {}", path);
        assert!(!path.contains('~'), "should not contain tilde: {}", path);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_only_specified_fields_change() {
        let base = Settings::default();
        let overlay = RawSettings {
            collation: Some(Collation::CodePoint),
            roots: RawRootsConfig {
                bar: Some("10".into()),
                ..RawRootsConfig::default()
            },
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.collation, Collation::CodePoint);
        assert_eq!(merged.roots.bar, "10");
        assert_eq!(merged.roots.other, "2");
        assert_eq!(merged.roots.synced, "3");
        assert_eq!(merged.locale, DEFAULT_LOCALE);
        assert_eq!(merged.max_depth, base.max_depth);
        assert_eq!(merged.bookmarks_file, base.bookmarks_file);
    }

    #[test]
    fn given_toml_when_parsing_raw_then_kebab_case_collation_accepted() {
        let raw: RawSettings = toml::from_str(
            r#"
collation = "code-point"
max_depth = 8
backup = false
"#,
        )
        .unwrap();
        assert_eq!(raw.collation, Some(Collation::CodePoint));
        assert_eq!(raw.max_depth, Some(8));
        assert_eq!(raw.backup, Some(false));
    }

    #[test]
    fn given_settings_when_named_roots_then_bar_other_synced_in_order() {
        let settings = Settings::default();
        let options = settings.sort_options(settings.named_roots(), true);
        assert_eq!(
            options.roots,
            vec![NodeId::from("1"), NodeId::from("2"), NodeId::from("3")]
        );
        assert_eq!(options.max_depth, settings.max_depth);
        assert!(options.dry_run);
    }

    #[test]
    fn given_default_settings_when_building_collator_then_zh_locale_rules() {
        let collator = Settings::default().collator().unwrap();
        assert_eq!(collator.compare("阿里", "中国"), std::cmp::Ordering::Less);
    }

    #[test]
    fn given_bad_locale_when_building_collator_then_config_error() {
        let settings = Settings {
            locale: "not a locale!".into(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.collator(),
            Err(ApplicationError::Config { .. })
        ));
    }

    #[test]
    fn given_settings_when_serialized_then_roundtrips_through_toml() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn given_template_when_parsed_then_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.bookmarks_file.is_none());
    }
}
