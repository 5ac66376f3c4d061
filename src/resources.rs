use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::error::{fs_error, IntoSubproseError, Result, SubproseError};

/// Output file that only appears at its destination once committed.
///
/// Writes go to a temporary file in the destination directory. `commit`
/// renames it into place; dropping without committing removes it, so an
/// aborted stage never leaves a partial output behind.
#[derive(Debug)]
pub struct StagedFile {
    writer: Option<BufWriter<NamedTempFile>>,
    destination: PathBuf,
}

impl StagedFile {
    /// Stage a new file for `destination`
    pub fn create(destination: impl Into<PathBuf>) -> Result<Self> {
        let destination = destination.into();
        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let temp = tempfile::Builder::new()
            .prefix(".subprose-")
            .suffix(".partial")
            .tempfile_in(&dir)
            .with_path(&dir)?;

        debug!("Staging {:?} at {:?}", destination, temp.path());
        Ok(Self {
            writer: Some(BufWriter::new(temp)),
            destination,
        })
    }

    /// Final path of the file once committed
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Flush and move the staged file to its destination
    pub fn commit(mut self) -> Result<PathBuf> {
        let writer = self.writer.take().ok_or_else(|| SubproseError::Processing {
            message: format!("Staged file for {:?} already released", self.destination),
        })?;

        let temp = writer
            .into_inner()
            .map_err(|e| fs_error(e.into_error(), self.destination.clone()))?;
        temp.persist(&self.destination)
            .map_err(|e| fs_error(e.error, self.destination.clone()))?;

        debug!("Committed {:?}", self.destination);
        Ok(self.destination.clone())
    }
}

impl Write for StagedFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.writer.as_mut() {
            Some(writer) => writer.write(buf),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "staged file already released",
            )),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.writer.is_some() {
            warn!("Discarding uncommitted output for {:?}", self.destination);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_commit_moves_content_into_place() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("talk.lines");

        let mut staged = StagedFile::create(&path).unwrap();
        writeln!(staged, "hello there. ").unwrap();
        assert!(!path.exists());

        let committed = staged.commit().unwrap();
        assert_eq!(committed, path);
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello there. \n");
    }

    #[test]
    fn test_drop_without_commit_leaves_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("talk.lines");

        {
            let mut staged = StagedFile::create(&path).unwrap();
            writeln!(staged, "partial").unwrap();
        }

        assert!(!path.exists());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_commit_replaces_existing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("talk.txt");
        fs::write(&path, "old").unwrap();

        let mut staged = StagedFile::create(&path).unwrap();
        write!(staged, "new").unwrap();
        staged.commit().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing").join("talk.txt");

        assert!(matches!(
            StagedFile::create(&path),
            Err(SubproseError::FileSystem { .. })
        ));
    }
}
