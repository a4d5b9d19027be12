use crate::errors::{Error, Result};
use crate::staging::StagedFile;
use aho_corasick::{AhoCorasick, MatchKind};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// A fixed byte pattern and the bytes that replace it.
///
/// Matching is leftmost and non-overlapping, scanning left to right, which is
/// the usual substring-replace contract.
#[derive(Debug, Clone)]
pub struct Substitution {
    finder: AhoCorasick,
    replacement: Vec<u8>,
}

impl Substitution {
    /// Compiles `old` for searching. `old` must not be empty.
    pub fn new(old: &[u8], new: &[u8]) -> Result<Self> {
        if old.is_empty() {
            return Err("old pattern must not be empty".into());
        }
        let finder = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostFirst)
            .build([old])?;
        Ok(Self {
            finder,
            replacement: new.to_vec(),
        })
    }

    /// Number of non-overlapping occurrences of the old pattern in `haystack`.
    pub fn count(&self, haystack: &[u8]) -> usize {
        self.finder.find_iter(haystack).count()
    }

    /// `haystack` with every occurrence of the old pattern replaced.
    pub fn replace_all(&self, haystack: &[u8]) -> Vec<u8> {
        self.finder
            .replace_all_bytes(haystack, &[self.replacement.as_slice()])
    }
}

/// What happened to one file.
#[derive(Debug)]
pub enum Outcome {
    /// The file could not be read. Treated as zero changes.
    Skipped(io::Error),
    /// The file was read and does not contain the old pattern.
    Unmatched,
    /// The file contained the pattern and was (or in a dry run, would have
    /// been) rewritten.
    Replaced { occurrences: usize },
}

impl Outcome {
    /// `1` if the file was changed, else `0`.
    pub fn files_changed(&self) -> usize {
        match self {
            Outcome::Replaced { .. } => 1,
            _ => 0,
        }
    }

    pub fn occurrences(&self) -> usize {
        match self {
            Outcome::Replaced { occurrences } => *occurrences,
            _ => 0,
        }
    }
}

/// Applies a [`Substitution`] to single files.
///
/// Shared read-only between worker threads; every call owns its own buffers.
#[derive(Debug, Clone)]
pub struct FileProcessor {
    substitution: Substitution,
    dry_run: bool,
}

impl FileProcessor {
    pub fn new(substitution: Substitution, dry_run: bool) -> Self {
        Self {
            substitution,
            dry_run,
        }
    }

    /// Processes one file.
    ///
    /// 1. The whole file is read. A read failure is not an error: the file
    ///    comes back as [`Outcome::Skipped`].
    /// 2. A file without the pattern is left completely alone, no temporary
    ///    file included.
    /// 3. Otherwise the new content is staged next to the file and renamed
    ///    over it, unless this is a dry run.
    ///
    /// `Err` is returned only when writing the new content fails. The staged
    /// file is gone by the time the error reaches the caller.
    pub fn process_file(&self, path: &Path) -> Result<Outcome> {
        let content = match fs::read(path) {
            Ok(content) => content,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "skipping unreadable file");
                return Ok(Outcome::Skipped(err));
            }
        };

        let occurrences = self.substitution.count(&content);
        if occurrences == 0 {
            return Ok(Outcome::Unmatched);
        }

        if !self.dry_run {
            let new_content = self.substitution.replace_all(&content);
            drop(content);
            write_atomically(path, &new_content).map_err(|err| Error::processing(path, err))?;
        }

        Ok(Outcome::Replaced { occurrences })
    }
}

fn write_atomically(path: &Path, content: &[u8]) -> Result<()> {
    let mut staged = StagedFile::create(path)?;
    staged.write_all(content)?;
    staged.copy_permissions()?;
    staged.commit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::staging_path;
    use tempfile::TempDir;

    const OLD: &[u8] = b"bank-bank-statement.html";
    const NEW: &[u8] = b"business-bank-statement.html";

    fn processor(dry_run: bool) -> FileProcessor {
        FileProcessor::new(Substitution::new(OLD, NEW).unwrap(), dry_run)
    }

    #[test]
    fn test_count_is_non_overlapping() {
        let sub = Substitution::new(b"aa", b"b").unwrap();
        assert_eq!(sub.count(b"aaaa"), 2);
        assert_eq!(sub.count(b"aaa"), 1);
        assert_eq!(sub.replace_all(b"aaa"), b"ba");
    }

    #[test]
    fn test_empty_old_pattern_rejected() {
        assert!(Substitution::new(b"", b"x").is_err());
    }

    #[test]
    fn test_replaces_every_occurrence() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.html");
        fs::write(
            &path,
            "xbank-bank-statement.htmlybank-bank-statement.htmlz",
        )
        .unwrap();

        let outcome = processor(false).process_file(&path).unwrap();

        assert_eq!(outcome.files_changed(), 1);
        assert_eq!(outcome.occurrences(), 2);
        assert_eq!(
            fs::read(&path).unwrap(),
            b"xbusiness-bank-statement.htmlybusiness-bank-statement.htmlz"
        );
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_unmatched_file_is_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.html");
        fs::write(&path, "nothing to see").unwrap();
        let before = fs::metadata(&path).unwrap().modified().unwrap();

        let outcome = processor(false).process_file(&path).unwrap();

        assert!(matches!(outcome, Outcome::Unmatched));
        assert_eq!(outcome.files_changed(), 0);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
        assert_eq!(fs::read(&path).unwrap(), b"nothing to see");
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let outcome = processor(false)
            .process_file(&temp_dir.path().join("gone.html"))
            .unwrap();

        assert!(matches!(outcome, Outcome::Skipped(_)));
        assert_eq!(outcome.files_changed(), 0);
        assert_eq!(outcome.occurrences(), 0);
    }

    #[test]
    fn test_dry_run_counts_without_writing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.html");
        let content = "bank-bank-statement.html bank-bank-statement.html";
        fs::write(&path, content).unwrap();
        let before = fs::metadata(&path).unwrap().modified().unwrap();

        let outcome = processor(true).process_file(&path).unwrap();

        assert_eq!(outcome.occurrences(), 2);
        assert_eq!(outcome.files_changed(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
    }

    #[test]
    fn test_write_failure_is_reported_and_cleaned_up() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.html");
        fs::write(&path, "bank-bank-statement.html").unwrap();
        fs::create_dir(staging_path(&path)).unwrap();

        let err = processor(false).process_file(&path).unwrap_err();

        match err {
            Error::Processing { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fs::read(&path).unwrap(), b"bank-bank-statement.html");
    }

    #[test]
    fn test_second_pass_finds_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.html");
        fs::write(&path, "bank-bank-statement.html").unwrap();

        let processor = processor(false);
        assert_eq!(processor.process_file(&path).unwrap().occurrences(), 1);
        assert!(matches!(
            processor.process_file(&path).unwrap(),
            Outcome::Unmatched
        ));
    }
}
