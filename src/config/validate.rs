// src/config/validate.rs

use std::collections::HashSet;
use std::path::Path;

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PollwatchError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PollwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.watches))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_watches(cfg)?;
    validate_global_config(cfg)?;
    validate_watch_paths(cfg)?;
    validate_exclude_patterns(cfg)?;
    Ok(())
}

fn ensure_has_watches(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watches.is_empty() {
        return Err(PollwatchError::Config(
            "config must contain at least one [[watch]] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.interval_ms == 0 {
        return Err(PollwatchError::Config(
            "[config].interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_watch_paths(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = HashSet::new();
    for watch in &cfg.watches {
        if watch.path.trim().is_empty() {
            return Err(PollwatchError::Config(
                "[[watch]].path must not be empty".to_string(),
            ));
        }
        if !Path::new(&watch.path).is_absolute() {
            return Err(PollwatchError::Config(format!(
                "[[watch]].path must be absolute (got {:?})",
                watch.path
            )));
        }
        if !seen.insert(watch.path.as_str()) {
            return Err(PollwatchError::Config(format!(
                "duplicate [[watch]].path {:?}",
                watch.path
            )));
        }
    }
    Ok(())
}

fn validate_exclude_patterns(cfg: &RawConfigFile) -> Result<()> {
    for watch in &cfg.watches {
        for pattern in &watch.exclude {
            Glob::new(pattern).map_err(|source| PollwatchError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(toml_src).unwrap();
        ConfigFile::try_from(raw)
    }

    #[test]
    fn minimal_config_is_valid() {
        let cfg = parse(
            r#"
            [[watch]]
            path = "/srv/data"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.config.interval_ms, 1000);
        assert_eq!(cfg.watches.len(), 1);
        assert!(cfg.watches[0].recursive);
    }

    #[test]
    fn empty_config_is_rejected() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, PollwatchError::Config(_)));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = parse(
            r#"
            [config]
            interval_ms = 0

            [[watch]]
            path = "/srv/data"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PollwatchError::Config(_)));
    }

    #[test]
    fn relative_watch_path_is_rejected() {
        let err = parse(
            r#"
            [[watch]]
            path = "data"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PollwatchError::Config(_)));
    }

    #[test]
    fn duplicate_watch_path_is_rejected() {
        let err = parse(
            r#"
            [[watch]]
            path = "/srv/data"

            [[watch]]
            path = "/srv/data"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PollwatchError::Config(_)));
    }

    #[test]
    fn bad_exclude_glob_is_rejected() {
        let err = parse(
            r#"
            [[watch]]
            path = "/srv/data"
            exclude = ["a{b"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PollwatchError::Pattern { .. }));
    }

    #[test]
    fn per_watch_overrides_beat_global_defaults() {
        let cfg = parse(
            r#"
            [config]
            follow_symlinks = true
            content_hash = false

            [[watch]]
            path = "/srv/data"
            follow_symlinks = false
            content_hash = true
            "#,
        )
        .unwrap();

        let opts = cfg.watch_options(&cfg.watches[0]);
        assert!(!opts.link_policy.follow_symlinks);
        assert!(opts.content_hash);
    }
}
