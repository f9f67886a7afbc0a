use crate::config::default_config_dir;
use std::path::{Path, PathBuf};

/// Arguments shared by every action.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub config_dir: PathBuf,
}

impl GlobalArgs {
    /// Falls back to `$HOME/.darkcode` when no directory was given.
    #[must_use]
    pub fn new(config_dir: Option<&str>) -> Self {
        Self {
            config_dir: config_dir.map_or_else(default_config_dir, PathBuf::from),
        }
    }

    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}
