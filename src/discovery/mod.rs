//! Discovery
//!
//! Locates auto modules and run listeners by name. Names come from factories
//! files (see [`FactoriesFile`]) aggregated across sources; a
//! [`FactoryRegistry`] turns them into values.

mod factories;
mod registry;

pub use factories::{FactoriesFile, FactoriesLoader};
pub use registry::FactoryRegistry;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key listing auto module identities
pub const AUTO_MODULE_KEY: &str = "meshestra.boot.AutoModule";

/// Key listing run listener identities
pub const RUN_LISTENER_KEY: &str = "meshestra.boot.RunListener";

/// Errors raised while discovering or instantiating factories
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Malformed factories entry in {origin} at line {line}: {message}")]
    Parse {
        origin: String,
        line: usize,
        message: String,
    },

    #[error("Unable to read factories file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No factory registered for '{name}' listed under {key}")]
    UnknownFactory { key: String, name: String },
}

impl DiscoveryError {
    pub fn parse(origin: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            origin: origin.into(),
            line,
            message: message.into(),
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn unknown_factory(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownFactory {
            key: key.into(),
            name: name.into(),
        }
    }
}
