use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Decides whether a file name is a candidate for substitution.
///
/// A name qualifies when its lowercase form ends with one of the configured
/// suffixes. Suffixes are lowercased once up front and used as given
/// otherwise, so `".html"` and `"html"` are different filters.
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    suffixes: Vec<String>,
}

impl ExtensionFilter {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            suffixes: suffixes
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn matches(&self, file_name: &OsStr) -> bool {
        let name = file_name.to_string_lossy().to_lowercase();
        self.suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
    }
}

/// Lazily walks `root` and yields every regular file whose name passes `filter`.
///
/// Traversal errors (missing root, unreadable directories, link loops when
/// `follow_links` is set) are logged and skipped. A root that cannot be read
/// therefore yields nothing at all. Without `follow_links`, symbolic links are
/// neither descended into nor yielded.
pub fn discover<'a>(
    root: &Path,
    filter: &'a ExtensionFilter,
    follow_links: bool,
) -> impl Iterator<Item = PathBuf> + use<'a> {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(follow_links)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(error = %err, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && filter.matches(entry.file_name()))
        .map(walkdir::DirEntry::into_path)
}
