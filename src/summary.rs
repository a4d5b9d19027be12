use crate::processor::Outcome;
use serde::Serialize;
use std::fmt;

/// Totals for one run, built up by the collecting thread only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Number of candidate files handed to the worker pool.
    pub files_scanned: usize,
    /// Files rewritten (or that would have been, in a dry run).
    pub files_changed: usize,
    /// Occurrences of the old pattern replaced across all files.
    pub occurrences_replaced: usize,
    /// Files that could not be read and were treated as unchanged.
    pub files_skipped: usize,
    /// Files whose new content could not be written.
    pub files_failed: usize,
    pub dry_run: bool,
}

impl RunSummary {
    pub fn new(files_scanned: usize, dry_run: bool) -> Self {
        Self {
            files_scanned,
            dry_run,
            ..Self::default()
        }
    }

    /// Folds one file's outcome into the totals.
    pub fn record(&mut self, outcome: &Outcome) {
        self.files_changed += outcome.files_changed();
        self.occurrences_replaced += outcome.occurrences();
        if matches!(outcome, Outcome::Skipped(_)) {
            self.files_skipped += 1;
        }
    }

    pub fn record_failure(&mut self) {
        self.files_failed += 1;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "✅ Scanned {} files. Replaced {} occurrence(s) in {} file(s).",
            self.files_scanned, self.occurrences_replaced, self.files_changed
        )?;
        if self.dry_run {
            write!(f, " (dry run)")?;
        }
        Ok(())
    }
}

/// How the final summary line is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryFormat {
    #[default]
    Text,
    Json,
}

impl From<&str> for SummaryFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => SummaryFormat::Json,
            _ => SummaryFormat::Text,
        }
    }
}

impl SummaryFormat {
    /// Renders `summary` as a single line.
    pub fn render(&self, summary: &RunSummary) -> crate::Result<String> {
        match self {
            SummaryFormat::Text => Ok(summary.to_string()),
            SummaryFormat::Json => Ok(serde_json::to_string(summary)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_record_accumulates_outcomes() {
        let mut summary = RunSummary::new(4, false);
        summary.record(&Outcome::Replaced { occurrences: 2 });
        summary.record(&Outcome::Replaced { occurrences: 3 });
        summary.record(&Outcome::Unmatched);
        summary.record(&Outcome::Skipped(io::Error::from(io::ErrorKind::NotFound)));

        assert_eq!(summary.files_scanned, 4);
        assert_eq!(summary.files_changed, 2);
        assert_eq!(summary.occurrences_replaced, 5);
        assert_eq!(summary.files_skipped, 1);
        assert_eq!(summary.files_failed, 0);
    }

    #[test]
    fn test_text_line() {
        let mut summary = RunSummary::new(2, false);
        summary.record(&Outcome::Replaced { occurrences: 2 });
        assert_eq!(
            summary.to_string(),
            "✅ Scanned 2 files. Replaced 2 occurrence(s) in 1 file(s)."
        );

        let dry = RunSummary::new(1, true);
        assert!(dry.to_string().ends_with("(dry run)"));
    }

    #[test]
    fn test_json_line() {
        let summary = RunSummary::new(3, true);
        let line = SummaryFormat::Json.render(&summary).unwrap();
        assert!(!line.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["files_scanned"], 3);
        assert_eq!(value["dry_run"], true);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(SummaryFormat::from("JSON"), SummaryFormat::Json);
        assert_eq!(SummaryFormat::from("text"), SummaryFormat::Text);
        assert_eq!(SummaryFormat::from("anything"), SummaryFormat::Text);
    }
}
