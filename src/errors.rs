// src/errors.rs

//! Crate-wide error type and `Result` alias.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::WatchId;

#[derive(Error, Debug)]
pub enum PollwatchError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("watch root is not an absolute path: {0}")]
    NonAbsoluteRoot(PathBuf),

    #[error("watch root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("path is already covered by an existing watch: {0}")]
    AlreadyWatched(PathBuf),

    #[error("no watch registered with id {0}")]
    UnknownWatch(WatchId),

    #[error("cannot resolve relative directory {0} without a parent node")]
    UnresolvablePath(PathBuf),

    #[error("invalid exclude pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PollwatchError>;
