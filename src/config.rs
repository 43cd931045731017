//! Tool settings module.
//!
//! Handles loading, validating, and merging `workshop.toml`. The workshop
//! itself (which lessons, when) lives in the Jekyll `_config.yml` and is
//! handled by [`crate::workshop`]; this file only controls *how* the
//! toolchain lays out and fetches content.
//!
//! ## Settings File Location
//!
//! Place `workshop.toml` in the site root, next to `_config.yml`:
//!
//! ```text
//! site/
//! ├── _config.yml        # Lessons, dates, start times
//! ├── workshop.toml      # Toolchain settings (optional)
//! ├── _includes/rsg/
//! └── collections/
//! ```
//!
//! ## Settings
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_config = "_config.yml"
//!
//! [paths]
//! includes = "_includes/rsg"            # Per-lesson setup.md + schedule.html
//! collections = "collections"           # Episode collections
//! submodules = "submodules"             # Vendored lesson repositories
//! slides = "slides"                     # Per-lesson slide decks
//! figures = "fig"                       # Shared figure directory
//! schedule = "_includes/rsg/schedule.html"
//!
//! [sources]
//! lesson_base_url = "https://github.com/Southampton-RSG-Training"
//! default_branch = "gh-pages"
//! reveal_url = "https://github.com/hakimel/reveal.js.git"
//! reveal_revision = "8a54118f43"
//!
//! [headings]
//! offset = 2
//! max_depth = 5
//! ```
//!
//! Settings files are sparse: override just the values you want. Unknown
//! keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the settings file looked up in the site root.
pub const SETTINGS_FILE: &str = "workshop.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Toolchain settings loaded from `workshop.toml`.
///
/// All fields have defaults matching the workshop template layout. Unknown
/// keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Path of the Jekyll config holding the `lessons` list, relative to the site root.
    #[serde(default = "default_site_config")]
    pub site_config: String,
    /// Directory layout of imported and generated content.
    pub paths: PathsConfig,
    /// Where lesson repositories and the presentation framework come from.
    pub sources: SourcesConfig,
    /// Setup-page heading rewriting.
    pub headings: HeadingsConfig,
}

fn default_site_config() -> String {
    "_config.yml".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_config: default_site_config(),
            paths: PathsConfig::default(),
            sources: SourcesConfig::default(),
            headings: HeadingsConfig::default(),
        }
    }
}

impl Settings {
    /// Validate settings values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.headings.max_depth == 0 || self.headings.max_depth > 6 {
            return Err(ConfigError::Validation(
                "headings.max_depth must be 1-6".into(),
            ));
        }
        let required = [
            ("site_config", &self.site_config),
            ("paths.includes", &self.paths.includes),
            ("paths.collections", &self.paths.collections),
            ("paths.submodules", &self.paths.submodules),
            ("paths.slides", &self.paths.slides),
            ("paths.figures", &self.paths.figures),
            ("paths.schedule", &self.paths.schedule),
            ("sources.lesson_base_url", &self.sources.lesson_base_url),
            ("sources.default_branch", &self.sources.default_branch),
            ("sources.reveal_url", &self.sources.reveal_url),
            ("sources.reveal_revision", &self.sources.reveal_revision),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }
}

/// Directory layout, every path relative to the site root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Holds `<lesson>-lesson/setup.md` and `<lesson>-lesson/schedule.html`.
    pub includes: String,
    /// Holds `_episodes/` and `_episodes_rmd/` collections.
    pub collections: String,
    /// Where lesson repositories are added as git submodules.
    pub submodules: String,
    /// Where per-lesson slide decks are assembled.
    pub slides: String,
    /// Shared figure directory all lessons copy into.
    pub figures: String,
    /// Combined schedule output file.
    pub schedule: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            includes: "_includes/rsg".to_string(),
            collections: "collections".to_string(),
            submodules: "submodules".to_string(),
            slides: "slides".to_string(),
            figures: "fig".to_string(),
            schedule: "_includes/rsg/schedule.html".to_string(),
        }
    }
}

impl PathsConfig {
    /// Directory holding a lesson's imported setup page and schedule fragment.
    pub fn lesson_includes(&self, root: &Path, lesson: &str) -> PathBuf {
        root.join(&self.includes).join(format!("{lesson}-lesson"))
    }

    /// Directory holding a lesson's episodes within a content collection.
    pub fn lesson_collection(&self, root: &Path, content_dir: &str, lesson: &str) -> PathBuf {
        root.join(&self.collections)
            .join(content_dir)
            .join(format!("{lesson}-lesson"))
    }
}

/// Remote sources for lessons and the shared reveal.js checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcesConfig {
    /// Base URL lesson repositories live under; `<base>/<gh-name>.git` is cloned.
    pub lesson_base_url: String,
    /// Branch used when a lesson entry has no `branch`.
    pub default_branch: String,
    /// reveal.js repository shared by every slide deck.
    pub reveal_url: String,
    /// Pinned reveal.js revision.
    pub reveal_revision: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            lesson_base_url: "https://github.com/Southampton-RSG-Training".to_string(),
            default_branch: "gh-pages".to_string(),
            reveal_url: "https://github.com/hakimel/reveal.js.git".to_string(),
            reveal_revision: "8a54118f43".to_string(),
        }
    }
}

impl SourcesConfig {
    /// Clone URL of a lesson repository.
    pub fn lesson_url(&self, lesson: &str) -> String {
        format!("{}/{lesson}.git", self.lesson_base_url.trim_end_matches('/'))
    }
}

/// Heading depth rewriting for imported setup pages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeadingsConfig {
    /// Levels added to every heading.
    pub offset: usize,
    /// Deepest heading level produced.
    pub max_depth: usize,
}

impl Default for HeadingsConfig {
    fn default() -> Self {
        Self {
            offset: 2,
            max_depth: 5,
        }
    }
}

// =============================================================================
// Settings loading, merging, and validation
// =============================================================================

/// Returns the stock default settings as a `toml::Value::Table`.
///
/// Used as the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Settings::default()).expect("default settings must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `workshop.toml` from the site root as a raw TOML value.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_raw_settings(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = root.join(SETTINGS_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_settings(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Settings, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let settings: Settings = merged.try_into()?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings for a site root, falling back to stock defaults.
pub fn load_settings(root: &Path) -> Result<Settings, ConfigError> {
    resolve_settings(stock_defaults_value(), load_raw_settings(root)?)
}

/// Returns a fully-commented stock `workshop.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Workshop Builder Settings
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Lessons, dates and start times are NOT configured here: they live in the
# `lessons` list of the Jekyll config named below.
# Unknown keys will cause an error.

# Jekyll config holding the `lessons` list
site_config = "_config.yml"

# ---------------------------------------------------------------------------
# Layout (all paths relative to the site root)
# ---------------------------------------------------------------------------
[paths]
# Per-lesson setup.md and schedule.html land in <includes>/<gh-name>-lesson/
includes = "_includes/rsg"
# Episodes land in <collections>/_episodes/ or <collections>/_episodes_rmd/
collections = "collections"
# Lesson repositories are added as git submodules here.
# WARNING: deleted and recreated by `import`.
submodules = "submodules"
# Slide decks land in <slides>/<gh-name>-lesson/
slides = "slides"
# Shared figure directory
figures = "fig"
# Combined schedule written by `schedule`
schedule = "_includes/rsg/schedule.html"

# ---------------------------------------------------------------------------
# Sources
# ---------------------------------------------------------------------------
[sources]
# Lesson repositories are cloned from <lesson_base_url>/<gh-name>.git
lesson_base_url = "https://github.com/Southampton-RSG-Training"
# Branch used when a lesson has no `branch` key
default_branch = "gh-pages"
# reveal.js checkout copied into every slide deck, pinned to a revision
reveal_url = "https://github.com/hakimel/reveal.js.git"
reveal_revision = "8a54118f43"

# ---------------------------------------------------------------------------
# Setup page headings
# ---------------------------------------------------------------------------
[headings]
# Levels added to every heading of an imported setup.md
offset = 2
# Deepest heading produced (1-6)
max_depth = 5
"##
}
