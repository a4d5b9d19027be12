use crate::config::TEMP_SUFFIX;
use crate::errors::Result;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

/// Returns the staging sibling of `target`: the same path with
/// [`TEMP_SUFFIX`] appended to the file name.
pub fn staging_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// New content for `target`, parked in a sibling file until it is committed.
///
/// The temporary file is removed when a `StagedFile` is dropped without a
/// successful [`commit`](StagedFile::commit), whatever the reason. The only
/// way the staging path outlives this value is by being renamed over the
/// target.
pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    /// Creates the staging sibling of `target`.
    ///
    /// Fails if something already occupies the staging path; an unknown file
    /// is never clobbered.
    pub fn create(target: &Path) -> Result<Self> {
        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let file_name = target
            .file_name()
            .ok_or_else(|| format!("Could not get file name for {}", target.display()))?;

        let temp = Builder::new()
            .prefix(file_name)
            .suffix(TEMP_SUFFIX)
            .rand_bytes(0)
            .tempfile_in(parent)?;
        debug!(path = %temp.path().display(), "staged temporary file");

        Ok(Self {
            temp,
            target: target.to_path_buf(),
        })
    }

    /// Path of the temporary file.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Writes `content` to the temporary file and syncs it to disk.
    pub fn write_all(&mut self, content: &[u8]) -> Result<()> {
        self.temp.write_all(content)?;
        self.temp.flush()?;
        self.temp.as_file().sync_all()?;
        Ok(())
    }

    /// Copies the permissions of the target onto the temporary file so the
    /// rename does not change them.
    pub fn copy_permissions(&self) -> Result<()> {
        let perms = fs::metadata(&self.target)?.permissions();
        fs::set_permissions(self.temp.path(), perms)?;
        Ok(())
    }

    /// Atomically renames the temporary file over the target.
    ///
    /// On failure the temporary file is removed before the error is returned.
    pub fn commit(self) -> Result<()> {
        // Taking only the io::Error drops the NamedTempFile, which deletes it.
        self.temp.persist(&self.target).map_err(|err| err.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_staging_path_appends_suffix() {
        assert_eq!(
            staging_path(Path::new("site/a.html")),
            PathBuf::from("site/a.html.tmp___")
        );
    }

    #[test]
    fn test_commit_replaces_target() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("a.html");
        fs::write(&target, "old").unwrap();

        let mut staged = StagedFile::create(&target).unwrap();
        assert_eq!(staged.path(), staging_path(&target));
        staged.write_all(b"new").unwrap();
        staged.copy_permissions().unwrap();
        staged.commit().unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
        assert!(!staging_path(&target).exists());
    }

    #[test]
    fn test_drop_without_commit_removes_temp() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("a.html");
        fs::write(&target, "old").unwrap();

        {
            let mut staged = StagedFile::create(&target).unwrap();
            staged.write_all(b"half-written").unwrap();
            assert!(staging_path(&target).exists());
        }

        assert!(!staging_path(&target).exists());
        assert_eq!(fs::read(&target).unwrap(), b"old");
    }

    #[test]
    fn test_occupied_staging_path_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("a.html");
        fs::write(&target, "old").unwrap();
        fs::write(staging_path(&target), "someone else's").unwrap();

        assert!(StagedFile::create(&target).is_err());
        assert_eq!(fs::read(staging_path(&target)).unwrap(), b"someone else's");
    }

    #[cfg(unix)]
    #[test]
    fn test_commit_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("run.html");
        fs::write(&target, "old").unwrap();
        fs::set_permissions(&target, fs::Permissions::from_mode(0o640)).unwrap();

        let mut staged = StagedFile::create(&target).unwrap();
        staged.write_all(b"new").unwrap();
        staged.copy_permissions().unwrap();
        staged.commit().unwrap();

        let mode = fs::metadata(&target).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }
}
