//! Session settings loaded from an optional TOML file.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use twenty48_system_transitions::CompletionOrder;

const DEFAULT_MAX_TURNS: usize = 10_000;

/// Settings controlling one CLI run.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) seed: Option<u64>,
    pub(crate) completion_order: CompletionOrder,
    pub(crate) max_turns: usize,
    pub(crate) verify_replay: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            completion_order: CompletionOrder::Fifo,
            max_turns: DEFAULT_MAX_TURNS,
            verify_replay: false,
        }
    }
}

/// Errors raised while loading a settings file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read settings file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Settings {
    pub(crate) fn from_toml(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
