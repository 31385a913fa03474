use crate::{
    os::Platform,
    util::{
        cli::{Report, Reportable},
        home_dir, NoHomeDir,
    },
};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to get user's home directory, which is pretty weird: {0}")]
    NoHomeDir(#[from] NoHomeDir),
}

impl Reportable for Error {
    fn report(&self) -> Report {
        Report::error("Failed to initialize base environment", self)
    }
}

/// Ambient-environment accessor: host platform, home directory, and
/// variable lookup. Built once at startup and threaded into everything that
/// would otherwise reach for globals.
#[derive(Clone, Debug)]
pub struct Env {
    platform: Platform,
    home: PathBuf,
}

impl Env {
    pub fn new() -> Result<Self, Error> {
        Ok(Self {
            platform: Platform::current(),
            home: home_dir()?,
        })
    }

    /// Used by tests to pin the platform and home directory.
    pub fn custom(platform: Platform, home: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            home: home.into(),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|value| !value.is_empty())
    }
}
