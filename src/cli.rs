use crate::config::{ConfigLoader, SubstituteConfig};
use crate::errors::Result;
use crate::summary::SummaryFormat;
use clap::Parser;
use std::path::PathBuf;

/// Bytes-level find-and-replace across a directory tree.
///
/// With no arguments, `treesub` runs the built-in substitution over
/// `bank-statement/`. Every flag overrides the matching key of the config
/// file, which in turn overrides the built-in defaults.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "⚡ Concurrent in-place byte substitution across a directory tree",
    long_about = "treesub - replace one fixed byte pattern with another in every matching file under a directory.

Files are rewritten atomically (temporary sibling + rename) by a bounded pool of workers.
Files without the pattern are never touched.

QUICK EXAMPLES:
  treesub                                     # Built-in defaults
  treesub -d site/ -p 'old.html' -r 'new.html' -x .html,.htm
  treesub -c treesub.yaml --dry-run           # Preview with a config file
  treesub -d site/ --format json              # Machine-readable summary"
)]
pub struct Args {
    /// Path to a YAML config file. Searched as given, under the root, in
    /// `~/.treesub/` and next to the executable.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// The directory to process.
    #[arg(short = 'd', long = "dir")]
    pub root: Option<PathBuf>,

    /// The byte pattern to search for.
    #[arg(short = 'p', long = "pattern")]
    pub old: Option<String>,

    /// The bytes to put in place of every occurrence.
    #[arg(short = 'r', long = "replacement")]
    pub new: Option<String>,

    /// A comma-separated list of accepted file name suffixes (case-insensitive).
    #[arg(short = 'x', long = "ext", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// The maximum number of files processed at once.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Count what would change without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Follow symbolic links while walking the tree.
    #[arg(long)]
    pub follow_links: bool,

    /// Print each modified file and enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Show a progress bar on stderr.
    #[arg(long)]
    pub progress: bool,

    /// Summary format: `text` or `json`.
    #[arg(short = 'f', long = "format", default_value = "text")]
    pub format: String,
}

impl Args {
    pub fn summary_format(&self) -> SummaryFormat {
        SummaryFormat::from(self.format.as_str())
    }

    /// Builds the effective configuration: defaults, then the config file,
    /// then these flags.
    pub fn resolve(&self) -> Result<SubstituteConfig> {
        let mut config = SubstituteConfig::default();

        if let Some(cfg_path) = &self.config {
            let working_dir = self.root.clone().unwrap_or_else(|| config.root.clone());
            let resolved = ConfigLoader::find_config(cfg_path, &working_dir)?;
            ConfigLoader::load(&resolved)?.apply_to(&mut config);
        }

        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(old) = &self.old {
            config.old = old.as_bytes().to_vec();
        }
        if let Some(new) = &self.new {
            config.new = new.as_bytes().to_vec();
        }
        if !self.extensions.is_empty() {
            config.extensions = self.extensions.clone();
        }
        if let Some(workers) = self.workers {
            config.max_workers = workers;
        }
        config.dry_run |= self.dry_run;
        config.follow_links |= self.follow_links;

        Ok(config)
    }
}

/// Parses command-line arguments and returns the populated `Args` struct.
pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_no_flags_gives_defaults() {
        let args = Args::try_parse_from(["treesub"]).unwrap();
        assert_eq!(args.resolve().unwrap(), SubstituteConfig::default());
        assert_eq!(args.summary_format(), SummaryFormat::Text);
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::try_parse_from([
            "treesub", "-d", "site", "-p", "foo", "-r", "bar", "-x", ".htm,.HTML", "-w", "3",
            "--dry-run",
        ])
        .unwrap();
        let config = args.resolve().unwrap();

        assert_eq!(config.root, PathBuf::from("site"));
        assert_eq!(config.old, b"foo");
        assert_eq!(config.new, b"bar");
        assert_eq!(config.extensions, vec![".htm".to_string(), ".HTML".to_string()]);
        assert_eq!(config.max_workers, 3);
        assert!(config.dry_run);
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let cfg = temp_dir.path().join("treesub.yaml");
        fs::write(&cfg, "old: from-file\nnew: also-from-file\nmax_workers: 2\n").unwrap();

        let cfg_arg = cfg.to_string_lossy().to_string();
        let args =
            Args::try_parse_from(["treesub", "-c", cfg_arg.as_str(), "-r", "from-flag"]).unwrap();
        let config = args.resolve().unwrap();

        assert_eq!(config.old, b"from-file");
        assert_eq!(config.new, b"from-flag");
        assert_eq!(config.max_workers, 2);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_string_lossy().to_string();
        let args =
            Args::try_parse_from(["treesub", "-d", root.as_str(), "-c", "does-not-exist.yaml"]).unwrap();
        assert!(args.resolve().is_err());
    }
}
