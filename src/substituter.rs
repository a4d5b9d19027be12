use crate::config::SubstituteConfig;
use crate::discovery::{ExtensionFilter, discover};
use crate::errors::Result;
use crate::pool::WorkerPool;
use crate::processor::{FileProcessor, Outcome, Substitution};
use crate::reporter::Reporter;
use crate::summary::RunSummary;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// What a finished run leaves behind for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// `None` when discovery found no candidate files.
    pub summary: Option<RunSummary>,
    /// Files whose new content could not be written.
    pub failures: Vec<PathBuf>,
}

/// Runs one substitution over a directory tree: discovery, the worker pool
/// and aggregation.
pub struct Substituter {
    config: SubstituteConfig,
    filter: ExtensionFilter,
    processor: Arc<FileProcessor>,
}

impl Substituter {
    /// Validates `config` and prepares the pattern search.
    pub fn new(config: SubstituteConfig) -> Result<Self> {
        config.validate()?;
        let substitution = Substitution::new(&config.old, &config.new)?;
        let processor = Arc::new(FileProcessor::new(substitution, config.dry_run));
        let filter = ExtensionFilter::new(&config.extensions);
        Ok(Self {
            config,
            filter,
            processor,
        })
    }

    /// Candidate files under the configured root, in traversal order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        discover(&self.config.root, &self.filter, self.config.follow_links).collect()
    }

    /// Processes every candidate and reports to `reporter` as results come in.
    ///
    /// A file that fails to be written is reported and the run carries on.
    /// Only building the worker pool can fail the whole run, and that happens
    /// before any file is touched.
    pub fn run(&self, reporter: &mut dyn Reporter) -> Result<RunReport> {
        let paths = self.candidates();
        if paths.is_empty() {
            info!(root = %self.config.root.display(), "no candidate files");
            reporter.on_no_matches();
            return Ok(RunReport {
                summary: None,
                failures: Vec::new(),
            });
        }

        let pool = WorkerPool::new(self.config.max_workers)?;
        info!(
            root = %self.config.root.display(),
            candidates = paths.len(),
            workers = pool.size(),
            dry_run = self.config.dry_run,
            "starting substitution"
        );

        let mut summary = RunSummary::new(paths.len(), self.config.dry_run);
        let mut failures = Vec::new();
        reporter.on_start(paths.len());

        let processor = Arc::clone(&self.processor);
        let task = Arc::new(move |path: &Path| processor.process_file(path));

        for report in pool.run(paths, task) {
            match report.result {
                Ok(outcome) => {
                    match &outcome {
                        Outcome::Skipped(err) => reporter.on_skipped(&report.path, err),
                        Outcome::Unmatched => reporter.on_unmatched(&report.path),
                        Outcome::Replaced { occurrences } => {
                            reporter.on_replaced(&report.path, *occurrences, self.config.dry_run)
                        }
                    }
                    summary.record(&outcome);
                }
                Err(err) => {
                    summary.record_failure();
                    reporter.on_failure(&report.path, &err);
                    failures.push(report.path);
                }
            }
        }

        info!(
            changed = summary.files_changed,
            occurrences = summary.occurrences_replaced,
            failed = summary.files_failed,
            "substitution finished"
        );
        reporter.on_finish(&summary);

        Ok(RunReport {
            summary: Some(summary),
            failures,
        })
    }
}
