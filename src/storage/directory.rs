//! A filesystem backed tracker.
//!
//! The [`Directory`] ties together the configuration and the request file
//! under a tracker root:
//!
//! ```text
//! <root>/.efor/config.toml
//! <root>/.efor/requests.json
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    domain::{Config, ConfigError},
    storage::{JsonFileStore, RequestStore, StoreError},
};

/// Name of the tracker's metadata directory.
pub const TRACKER_DIR: &str = ".efor";

const CONFIG_FILE: &str = "config.toml";
const REQUESTS_FILE: &str = "requests.json";

/// A tracker rooted in a directory on disk.
#[derive(Debug)]
pub struct Directory {
    /// The root of the directory the tracker lives in.
    root: PathBuf,
    config: Config,
    store: JsonFileStore,
}

impl Directory {
    /// Opens the tracker at `root`.
    ///
    /// A missing configuration file falls back to the defaults. A missing
    /// request file opens as an empty tracker.
    ///
    /// # Errors
    ///
    /// Fails if the request file exists but cannot be read or parsed.
    pub fn new(root: PathBuf) -> Result<Self, DirectoryError> {
        let config = load_config(&root);
        let store = JsonFileStore::open(requests_path(&root))?;

        Ok(Self {
            root,
            config,
            store,
        })
    }

    /// Creates the tracker layout at `root` with a default configuration.
    ///
    /// # Errors
    ///
    /// Fails if the tracker already exists or the files cannot be written.
    pub fn init(root: PathBuf) -> Result<Self, DirectoryError> {
        let tracker_dir = root.join(TRACKER_DIR);
        if tracker_dir.exists() {
            return Err(DirectoryError::AlreadyInitialised(tracker_dir));
        }

        fs::create_dir_all(&tracker_dir).map_err(|source| DirectoryError::Create {
            path: tracker_dir.clone(),
            source,
        })?;

        let config = Config::default();
        config.save(&config_path(&root))?;
        tracing::info!(root = %root.display(), "initialised tracker");

        Self::new(root)
    }

    /// The root of the tracker.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The tracker configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The request store.
    #[must_use]
    pub const fn store(&self) -> &JsonFileStore {
        &self.store
    }

    /// Mutable access to the request store.
    pub const fn store_mut(&mut self) -> &mut JsonFileStore {
        &mut self.store
    }

    /// Writes pending request changes to disk.
    ///
    /// # Errors
    ///
    /// Fails if the request file cannot be written.
    pub fn flush(&mut self) -> Result<(), DirectoryError> {
        self.store.flush()?;
        Ok(())
    }
}

fn config_path(root: &Path) -> PathBuf {
    root.join(TRACKER_DIR).join(CONFIG_FILE)
}

fn requests_path(root: &Path) -> PathBuf {
    root.join(TRACKER_DIR).join(REQUESTS_FILE)
}

fn load_config(root: &Path) -> Config {
    let path = config_path(root);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

/// Opening or initialising a tracker failed.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// `init` found an existing tracker.
    #[error("tracker already initialised (found {})", .0.display())]
    AlreadyInitialised(PathBuf),

    /// The tracker directory could not be created.
    #[error("failed to create {}: {source}", path.display())]
    Create {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The configuration could not be written.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The request file could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}
