use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
pub use taskdeck_core::NamePolicy;
use taskdeck_store_json::{DEFAULT_SAVE_FILE, JsonStore};

/// Name of the optional project configuration file.
pub const CONFIG_FILE: &str = "taskdeck.toml";

/// Top-level project configuration loaded from `taskdeck.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_save_file")]
    save_file: PathBuf,
    #[serde(default = "default_lock")]
    lock: bool,
    /// Name collision settings.
    #[serde(default)]
    pub names: NamesConfig,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            save_file: default_save_file(),
            lock: default_lock(),
            names: NamesConfig::default(),
            base_dir: PathBuf::from("."),
        }
    }
}

fn default_save_file() -> PathBuf {
    PathBuf::from(DEFAULT_SAVE_FILE)
}

const fn default_lock() -> bool {
    true
}

impl ProjectConfig {
    /// Load configuration from `workdir/taskdeck.toml`, or defaults when absent.
    ///
    /// A relative `save_file` resolves against `workdir`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn from_workdir(workdir: impl AsRef<Path>) -> Result<Self> {
        let workdir = workdir.as_ref();
        let config_path = workdir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self {
                base_dir: workdir.to_path_buf(),
                ..Self::default()
            });
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        config.validate()?;
        config.base_dir = workdir.to_path_buf();
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.save_file.as_os_str().is_empty() {
            bail!("save_file must not be empty");
        }
        if self.save_file.file_name().is_none() {
            bail!("save_file '{}' does not name a file", self.save_file.display());
        }
        Ok(())
    }

    /// Override the save file (e.g. from a command-line flag).
    #[must_use]
    pub fn with_save_file(mut self, save_file: impl Into<PathBuf>) -> Self {
        self.save_file = save_file.into();
        self
    }

    /// Resolved path of the save file.
    pub fn save_path(&self) -> PathBuf {
        if self.save_file.is_absolute() {
            self.save_file.clone()
        } else {
            self.base_dir.join(&self.save_file)
        }
    }

    /// Whether save/load take the advisory file lock.
    pub const fn lock_enabled(&self) -> bool {
        self.lock
    }

    /// Collision policy for create and rename.
    pub const fn name_policy(&self) -> NamePolicy {
        self.names.on_conflict
    }

    /// Build the JSON store described by this configuration.
    pub fn json_store(&self) -> JsonStore {
        JsonStore::open(self.save_path()).with_locking(self.lock_enabled())
    }
}

/// `[names]` block.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct NamesConfig {
    /// What create and rename do when the name is taken.
    #[serde(default)]
    pub on_conflict: NamePolicy,
}
