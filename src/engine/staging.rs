use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::files::remove_if_exists;

/// Job-local copies of the input and output documents.
///
/// Both files are removed when the value is cleaned up or dropped, whichever
/// comes first. Removal failures are logged, never returned.
#[derive(Debug)]
pub struct StagedFiles {
    input: PathBuf,
    output: PathBuf,
    cleaned: bool,
}

impl StagedFiles {
    /// Copy `source` into `work_dir` under a name unique to `job_id` and
    /// reserve a matching output path.
    pub fn stage(source: &Path, work_dir: &Path, job_id: Uuid) -> io::Result<Self> {
        fs::create_dir_all(work_dir)?;
        let staged = Self {
            input: work_dir.join(format!("{}-input.pdf", job_id)),
            output: work_dir.join(format!("{}-output.pdf", job_id)),
            cleaned: false,
        };
        // On failure `staged` drops here and removes any partial copy
        fs::copy(source, &staged.input)?;
        log::debug!("Staged {} as {}", source.display(), staged.input.display());
        Ok(staged)
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;
        for path in [&self.input, &self.output] {
            if let Err(e) = remove_if_exists(path) {
                log::warn!("Could not remove staged file {}: {}", path.display(), e);
            }
        }
    }
}

impl Drop for StagedFiles {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_copies_and_cleanup_removes() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("doc.pdf");
        fs::write(&source, b"%PDF-1.4 fake").unwrap();
        let work = dir.path().join("work");

        let mut staged = StagedFiles::stage(&source, &work, Uuid::new_v4()).unwrap();
        assert_eq!(fs::read(staged.input()).unwrap(), b"%PDF-1.4 fake");
        assert!(!staged.output().exists());

        fs::write(staged.output(), b"engine output").unwrap();
        staged.cleanup();

        assert!(!staged.input().exists());
        assert!(!staged.output().exists());
        assert!(source.exists());
    }

    #[test]
    fn test_drop_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("doc.pdf");
        fs::write(&source, b"data").unwrap();

        let input = {
            let staged = StagedFiles::stage(&source, dir.path(), Uuid::new_v4()).unwrap();
            staged.input().to_path_buf()
        };
        assert!(!input.exists());
    }

    #[test]
    fn test_missing_source_fails_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("work");
        let result = StagedFiles::stage(&dir.path().join("missing.pdf"), &work, Uuid::new_v4());
        assert!(result.is_err());
        assert_eq!(fs::read_dir(&work).unwrap().count(), 0);
    }
}
