use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::ControllerError;
use crate::files::{file_size, move_file, remove_if_exists};
use crate::model::{CompressionReport, CompressionRequest, JobProgress, JobResult};

use super::job::{CompressionJob, JobHandle};

/// Runs at most one compression job at a time and owns the preview
/// decision that follows it: keep the output, discard it, or retry.
pub struct JobController {
    settings: Settings,
    active: Option<JobHandle>,
    produced: Option<PathBuf>,
}

impl JobController {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            active: None,
            produced: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Start a job for `request`. Rejected while another job is still running.
    pub fn start(&mut self, request: CompressionRequest) -> Result<&JobHandle, ControllerError> {
        if let Some(active) = &self.active {
            if !active.state().is_terminal() {
                return Err(ControllerError::JobInProgress {
                    output: active.output().to_path_buf(),
                });
            }
        }

        let handle = CompressionJob::new(request, self.settings.clone()).spawn()?;
        log::debug!("Started job {}", handle.id());
        Ok(self.active.insert(handle))
    }

    /// The most recently started job, running or finished
    pub fn active(&self) -> Option<&JobHandle> {
        self.active.as_ref()
    }

    pub fn cancel(&self) -> Result<(), ControllerError> {
        let active = self.active.as_ref().ok_or(ControllerError::NoJob)?;
        active.cancel();
        Ok(())
    }

    /// Wait for the active job. A successful output is remembered so it can
    /// later be accepted or discarded.
    pub fn wait<F>(&mut self, on_progress: F) -> Result<JobResult, ControllerError>
    where
        F: FnMut(JobProgress),
    {
        let active = self.active.as_mut().ok_or(ControllerError::NoJob)?;
        let result = active.wait_with(on_progress);
        if result.is_success() {
            self.produced = Some(active.output().to_path_buf());
        }
        Ok(result)
    }

    /// Start `request` and wait for it
    pub fn run<F>(
        &mut self,
        request: CompressionRequest,
        on_progress: F,
    ) -> Result<JobResult, ControllerError>
    where
        F: FnMut(JobProgress),
    {
        self.start(request)?;
        self.wait(on_progress)
    }

    /// Drop the previous output and run again with new settings
    pub fn retry(&mut self, request: CompressionRequest) -> Result<&JobHandle, ControllerError> {
        self.discard()?;
        self.start(request)
    }

    /// Remove the output of the last successful job. Files this controller
    /// did not write are never touched.
    pub fn discard(&mut self) -> Result<(), ControllerError> {
        if let Some(path) = self.produced.take() {
            if remove_if_exists(&path)? {
                log::info!("Discarded {}", path.display());
            }
        }
        Ok(())
    }

    /// Keep the last output, optionally under a different name.
    /// Returns where the output now lives.
    pub fn accept(&mut self, destination: Option<&Path>) -> Result<PathBuf, ControllerError> {
        let produced = self.produced.take().ok_or(ControllerError::NoJob)?;
        match destination {
            Some(target) if target != produced => {
                if let Err(e) = move_file(&produced, target) {
                    self.produced = Some(produced);
                    return Err(e.into());
                }
                log::info!("Saved {} as {}", produced.display(), target.display());
                Ok(target.to_path_buf())
            }
            _ => Ok(produced),
        }
    }

    /// Sizes before and after the last successful job
    pub fn report(&self) -> Result<CompressionReport, ControllerError> {
        let produced = self.produced.as_deref().ok_or(ControllerError::NoJob)?;
        let active = self.active.as_ref().ok_or(ControllerError::NoJob)?;
        let original = file_size(active.request().input())?.unwrap_or(0);
        let compressed = file_size(produced)?.unwrap_or(0);
        Ok(CompressionReport::new(original, compressed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_without_job() {
        let controller = JobController::new(Settings::default());
        assert!(matches!(controller.cancel(), Err(ControllerError::NoJob)));
    }

    #[test]
    fn test_accept_without_output() {
        let mut controller = JobController::new(Settings::default());
        assert!(matches!(controller.accept(None), Err(ControllerError::NoJob)));
    }

    #[test]
    fn test_discard_leaves_foreign_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("existing.pdf");
        std::fs::write(&existing, b"keep me").unwrap();

        let mut controller = JobController::new(Settings::default());
        controller.discard().unwrap();
        assert!(existing.exists());
    }

    #[test]
    fn test_failed_job_produces_nothing_to_accept() {
        let dir = tempfile::tempdir().unwrap();
        let request = CompressionRequest::new(
            dir.path().join("missing.pdf"),
            dir.path().join("out.pdf"),
            150,
            50,
        )
        .unwrap();
        let mut controller =
            JobController::new(Settings::default().with_work_dir(dir.path().join("work")));

        let result = controller.run(request, |_| {}).unwrap();
        assert!(matches!(result, JobResult::Failure(_)));
        assert!(matches!(controller.report(), Err(ControllerError::NoJob)));
        assert!(matches!(controller.accept(None), Err(ControllerError::NoJob)));
    }
}
