use crate::errors::Error;
use crate::summary::{RunSummary, SummaryFormat};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Stderr, Stdout, Write};
use std::path::Path;
use tracing::debug;

/// Receives everything a run has to say, in the order it happens.
///
/// Per-file callbacks are invoked from the single collecting thread, never
/// from a worker.
pub trait Reporter {
    /// Called once with the number of candidate files, before any file is processed.
    fn on_start(&mut self, _candidates: usize) {}
    /// A candidate could not be read and counts as unchanged.
    fn on_skipped(&mut self, _path: &Path, _error: &io::Error) {}
    /// A candidate was read and does not contain the pattern.
    fn on_unmatched(&mut self, _path: &Path) {}
    /// A candidate contained the pattern `occurrences` times.
    fn on_replaced(&mut self, _path: &Path, _occurrences: usize, _dry_run: bool) {}
    /// Writing a candidate failed.
    fn on_failure(&mut self, path: &Path, error: &Error);
    /// Discovery found no candidates; nothing else follows.
    fn on_no_matches(&mut self);
    /// All tasks have finished.
    fn on_finish(&mut self, summary: &RunSummary);
}

/// Prints a run to the terminal: one line per failed file on the error sink
/// and a single summary line on the output sink.
///
/// The sinks are stdout and stderr unless built with
/// [`with_writers`](ConsoleReporter::with_writers).
pub struct ConsoleReporter<O: Write = Stdout, E: Write = Stderr> {
    format: SummaryFormat,
    verbose: bool,
    progress: Option<ProgressBar>,
    out: O,
    err: E,
}

impl ConsoleReporter {
    pub fn new(format: SummaryFormat, verbose: bool, show_progress: bool) -> Self {
        let progress = show_progress.then(|| ProgressBar::new(0));
        Self {
            format,
            verbose,
            progress,
            out: io::stdout(),
            err: io::stderr(),
        }
    }
}

impl<O: Write, E: Write> ConsoleReporter<O, E> {
    /// A reporter writing to `out` and `err` instead of the terminal. No
    /// progress bar is drawn.
    pub fn with_writers(format: SummaryFormat, verbose: bool, out: O, err: E) -> Self {
        Self {
            format,
            verbose,
            progress: None,
            out,
            err,
        }
    }

    /// Hands back the output and error sinks.
    pub fn into_writers(self) -> (O, E) {
        (self.out, self.err)
    }

    /// Writes one line without tearing the progress bar, if there is one.
    /// Console write errors are ignored.
    fn print(&mut self, line: &str, to_err: bool) {
        let Self { progress, out, err, .. } = self;
        let mut emit = || {
            let _ = if to_err {
                writeln!(err, "{line}")
            } else {
                writeln!(out, "{line}")
            };
        };
        match progress {
            Some(pb) => pb.suspend(emit),
            None => emit(),
        }
    }

    fn tick(&self) {
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
    }
}

impl<O: Write, E: Write> Reporter for ConsoleReporter<O, E> {
    fn on_start(&mut self, candidates: usize) {
        if let Some(pb) = &self.progress {
            pb.set_length(candidates as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            {
                pb.set_style(style.progress_chars("##-"));
            }
        }
    }

    fn on_skipped(&mut self, path: &Path, error: &io::Error) {
        debug!(path = %path.display(), error = %error, "unreadable file counted as unchanged");
        self.tick();
    }

    fn on_unmatched(&mut self, _path: &Path) {
        self.tick();
    }

    fn on_replaced(&mut self, path: &Path, occurrences: usize, dry_run: bool) {
        if self.verbose {
            let prefix = if dry_run { "DRY Modified" } else { "Modified" };
            self.print(
                &format!("{prefix} {} ({occurrences} occurrence(s))", path.display()),
                false,
            );
        }
        self.tick();
    }

    fn on_failure(&mut self, path: &Path, error: &Error) {
        // The path is already on the line, so only the cause is printed.
        let cause = match error {
            Error::Processing { source, .. } => source.to_string(),
            other => other.to_string(),
        };
        self.print(&format!("⚠️ Error: {} -> {cause}", path.display()), true);
        self.tick();
    }

    fn on_no_matches(&mut self) {
        self.print("No matching files found.", false);
    }

    fn on_finish(&mut self, summary: &RunSummary) {
        if let Some(pb) = self.progress.take() {
            pb.finish_and_clear();
        }
        match self.format.render(summary) {
            Ok(line) => self.print(&line, false),
            Err(err) => {
                self.print(&format!("⚠️ Error: could not render summary -> {err}"), true);
                self.print(&summary.to_string(), false);
            }
        }
    }
}
