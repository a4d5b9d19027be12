use crate::errors::Result;
use serde::Deserialize;
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Root directory processed when nothing else is configured.
pub const DEFAULT_ROOT: &str = "bank-statement/";
/// Byte pattern searched for when nothing else is configured.
pub const DEFAULT_OLD: &[u8] = b"bank-bank-statement.html";
/// Byte pattern substituted when nothing else is configured.
pub const DEFAULT_NEW: &[u8] = b"business-bank-statement.html";
/// File name suffixes accepted when nothing else is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".html"];
/// Suffix appended to a file's path to form its staging sibling.
pub const TEMP_SUFFIX: &str = ".tmp___";

/// Workers per logical CPU. The work is I/O bound so oversubscription pays off.
pub const WORKERS_PER_CPU: usize = 8;
/// Hard ceiling on the worker pool size.
pub const MAX_WORKERS_CEILING: usize = 64;

/// Directory under the user's home that is searched for config files.
const HOME_CONFIG_DIR: &str = ".treesub";

/// Pool size derived from the machine: `min(64, cpus * 8)`.
pub fn default_max_workers() -> usize {
    (num_cpus::get().max(1) * WORKERS_PER_CPU).min(MAX_WORKERS_CEILING)
}

/// Everything a substitution run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstituteConfig {
    /// The directory tree to process.
    pub root: PathBuf,
    /// The byte pattern to search for.
    pub old: Vec<u8>,
    /// The bytes every occurrence of `old` is replaced with.
    pub new: Vec<u8>,
    /// Accepted file name suffixes, matched case-insensitively.
    pub extensions: Vec<String>,
    /// Upper bound on concurrently processed files.
    pub max_workers: usize,
    /// If `true`, occurrences are counted but nothing is written.
    pub dry_run: bool,
    /// If `true`, symbolic links are followed during discovery.
    pub follow_links: bool,
}

impl Default for SubstituteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            old: DEFAULT_OLD.to_vec(),
            new: DEFAULT_NEW.to_vec(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_workers: default_max_workers(),
            dry_run: false,
            follow_links: false,
        }
    }
}

impl SubstituteConfig {
    /// Checks the settings before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.old.is_empty() {
            return Err("old pattern must not be empty".into());
        }
        if self.extensions.is_empty() {
            return Err("at least one file extension must be configured".into());
        }
        if self.extensions.iter().any(|e| e.trim().is_empty()) {
            return Err("file extensions must not be blank".into());
        }
        if self.max_workers == 0 {
            return Err("max_workers must be at least 1".into());
        }
        Ok(())
    }
}

/// The on-disk form of a [`SubstituteConfig`]. Every key is optional and
/// only overrides what it names.
///
/// ```yaml
/// root: site/
/// old: "bank-bank-statement.html"
/// new: "business-bank-statement.html"
/// extensions: [".html", ".htm"]
/// max_workers: 16
/// dry_run: true
/// ```
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub root: Option<PathBuf>,
    pub old: Option<String>,
    pub new: Option<String>,
    pub extensions: Option<Vec<String>>,
    pub max_workers: Option<usize>,
    pub dry_run: Option<bool>,
    pub follow_links: Option<bool>,
}

impl ConfigFile {
    /// Layers the keys present in this file over `config`.
    pub fn apply_to(self, config: &mut SubstituteConfig) {
        if let Some(root) = self.root {
            config.root = root;
        }
        if let Some(old) = self.old {
            config.old = old.into_bytes();
        }
        if let Some(new) = self.new {
            config.new = new.into_bytes();
        }
        if let Some(extensions) = self.extensions {
            config.extensions = extensions;
        }
        if let Some(max_workers) = self.max_workers {
            config.max_workers = max_workers;
        }
        if let Some(dry_run) = self.dry_run {
            config.dry_run = dry_run;
        }
        if let Some(follow_links) = self.follow_links {
            config.follow_links = follow_links;
        }
    }
}

/// A utility for locating and loading configuration files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Finds the configuration file by searching in a prioritized list of locations.
    ///
    /// The search order is:
    /// 1. `config_path` as given (absolute, or relative to the current directory).
    /// 2. A path relative to `working_dir`.
    /// 3. Inside the `~/.treesub` directory.
    /// 4. Next to the executable.
    pub fn find_config(config_path: &Path, working_dir: &Path) -> Result<PathBuf> {
        if config_path.exists() {
            return Ok(config_path.to_path_buf());
        }

        let mut candidates = vec![working_dir.join(config_path)];
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(HOME_CONFIG_DIR).join(config_path));
        }
        if let Some(exe_dir) = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            candidates.push(exe_dir.join(config_path));
        }

        if let Some(found) = candidates.iter().find(|c| c.exists()) {
            return Ok(found.clone());
        }

        let tried: Vec<String> = std::iter::once(config_path.display().to_string())
            .chain(candidates.iter().map(|c| c.display().to_string()))
            .collect();

        Err(format!(
            "Config file '{}' not found. Searched in:\n  - {}",
            config_path.display(),
            tried.join("\n  - ")
        )
        .into())
    }

    /// Loads a `ConfigFile` from a YAML file.
    pub fn load(path: &Path) -> Result<ConfigFile> {
        let file = File::open(path)?;
        Ok(serde_yaml::from_reader(file)?)
    }
}
