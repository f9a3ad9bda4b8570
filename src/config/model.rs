// src/config/model.rs

use serde::Deserialize;

use crate::types::{LinkPolicy, WatchOptions};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// interval_ms = 1000
/// follow_symlinks = true
///
/// [[watch]]
/// path = "/srv/data"
/// recursive = true
/// exclude = ["*.tmp", "cache/**"]
/// ```
///
/// The `[config]` section is optional; every `[[watch]]` needs at least a
/// `path`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Global behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All watches from `[[watch]]`.
    #[serde(default, rename = "watch")]
    pub watches: Vec<WatchSection>,
}

/// `[config]` section: poll cadence and forest-wide defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Milliseconds between poll cycles.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Whether directory symlinks may be followed into new watch nodes.
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Whether a followed link may point outside its watch root.
    #[serde(default)]
    pub allow_out_of_root_links: bool,

    /// Confirm mtime/size deltas with a content hash before reporting a
    /// modification.
    #[serde(default)]
    pub content_hash: bool,
}

fn default_interval_ms() -> u64 {
    1000
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            follow_symlinks: false,
            allow_out_of_root_links: false,
            content_hash: false,
        }
    }
}

/// One `[[watch]]` section.
///
/// The optional fields override the `[config]` defaults for this watch only.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Absolute path of the directory to watch.
    pub path: String,

    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Glob patterns (relative to the watch root) invisible to this watch.
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub follow_symlinks: Option<bool>,

    #[serde(default)]
    pub allow_out_of_root_links: Option<bool>,

    #[serde(default)]
    pub content_hash: Option<bool>,
}

fn default_true() -> bool {
    true
}

/// A [`RawConfigFile`] that passed validation.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub watches: Vec<WatchSection>,
}

impl ConfigFile {
    /// Construct without validating. Use `TryFrom<RawConfigFile>` instead
    /// unless the input is known-good (e.g. built by a test builder).
    pub fn new_unchecked(config: ConfigSection, watches: Vec<WatchSection>) -> Self {
        Self { config, watches }
    }

    /// Effective per-watch options: the `[config]` defaults with this
    /// section's overrides applied.
    pub fn watch_options(&self, section: &WatchSection) -> WatchOptions {
        WatchOptions {
            recursive: section.recursive,
            link_policy: LinkPolicy {
                follow_symlinks: section
                    .follow_symlinks
                    .unwrap_or(self.config.follow_symlinks),
                allow_out_of_root: section
                    .allow_out_of_root_links
                    .unwrap_or(self.config.allow_out_of_root_links),
            },
            content_hash: section.content_hash.unwrap_or(self.config.content_hash),
            exclude: section.exclude.clone(),
        }
    }
}
