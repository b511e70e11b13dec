//! One engine invocation, end to end.
//!
//! A [`CompressionJob`] walks `Pending -> Staging -> Running` and ends in
//! exactly one of `Succeeded`, `Failed` or `Cancelled`. Everything it observes
//! is reported as [`JobEvent`]s on a channel; the last event of every run is
//! `JobEvent::Finished`.

use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use uuid::Uuid;

use super::command::build_command;
use super::process::EngineProcess;
use super::staging::StagedFiles;
use crate::config::Settings;
use crate::error::JobError;
use crate::files::{file_size, move_file};
use crate::model::{
    CompressionRequest, JobEvent, JobProgress, JobResult, JobState, ProgressSignal,
    ProgressTracker,
};
use crate::parser::classify;
use crate::pdf::count_pages;

/// State visible from outside the worker
#[derive(Debug)]
struct Shared {
    state: JobState,
    result: Option<JobResult>,
}

pub struct CompressionJob {
    id: Uuid,
    request: CompressionRequest,
    settings: Settings,
    shared: Arc<Mutex<Shared>>,
    cancel: Arc<AtomicBool>,
}

impl CompressionJob {
    pub fn new(request: CompressionRequest, settings: Settings) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            settings,
            shared: Arc::new(Mutex::new(Shared {
                state: JobState::Pending,
                result: None,
            })),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> &CompressionRequest {
        &self.request
    }

    pub fn state(&self) -> JobState {
        self.shared.lock().state
    }

    /// Run the job on its own worker thread
    pub fn spawn(self) -> io::Result<JobHandle> {
        let (tx, rx) = unbounded();
        let handle = JobHandle {
            id: self.id,
            request: self.request.clone(),
            events: rx,
            shared: Arc::clone(&self.shared),
            cancel: CancelToken {
                id: self.id,
                flag: Arc::clone(&self.cancel),
                shared: Arc::clone(&self.shared),
            },
            worker: None,
        };

        let worker = thread::Builder::new()
            .name(format!("compress-{}", self.id.simple()))
            .spawn(move || {
                self.run(&tx);
            })?;

        Ok(JobHandle {
            worker: Some(worker),
            ..handle
        })
    }

    /// Run the job on the current thread, reporting to `events`.
    /// Returns the same result that is sent as `JobEvent::Finished`.
    pub fn run(&self, events: &Sender<JobEvent>) -> JobResult {
        log::info!(
            "Job {}: compressing {} at {} dpi",
            self.id,
            self.request.input().display(),
            self.request.resolution_dpi()
        );

        let result = match self.execute(events) {
            Ok(()) => JobResult::Success,
            Err(JobError::Cancelled) => JobResult::Cancelled,
            Err(e) => JobResult::Failure(e.to_string()),
        };

        match &result {
            JobResult::Success => log::info!(
                "Job {}: wrote {}",
                self.id,
                self.request.output().display()
            ),
            JobResult::Failure(detail) => log::warn!("Job {} failed: {}", self.id, detail),
            JobResult::Cancelled => log::info!("Job {} cancelled", self.id),
        }

        {
            let mut shared = self.shared.lock();
            shared.state = result.terminal_state();
            shared.result = Some(result.clone());
        }
        let _ = events.send(JobEvent::State(result.terminal_state()));
        let _ = events.send(JobEvent::Finished(result.clone()));
        result
    }

    fn execute(&self, events: &Sender<JobEvent>) -> Result<(), JobError> {
        if self.cancel_requested() {
            return Err(JobError::Cancelled);
        }

        self.transition(JobState::Staging, events);
        let mut staged = StagedFiles::stage(
            self.request.input(),
            &self.settings.work_dir,
            self.id,
        )
        .map_err(JobError::Staging)?;

        let outcome = self.run_engine(&staged, events);
        staged.cleanup();
        outcome
    }

    fn run_engine(&self, staged: &StagedFiles, events: &Sender<JobEvent>) -> Result<(), JobError> {
        let mut tracker = ProgressTracker::seeded(count_pages(staged.input()));
        if tracker.known_total() > 0 {
            let _ = events.send(JobEvent::Progress(tracker.current()));
        }
        // Staging and page counting can take a while on large inputs
        if self.cancel_requested() {
            return Err(JobError::Cancelled);
        }

        let engine = &self.settings.engine;
        let command = build_command(
            engine,
            self.request.resolution_dpi(),
            staged.input(),
            staged.output(),
        );
        log::debug!("Job {}: {:?}", self.id, command);

        let mut process = EngineProcess::spawn(command, self.settings.grace_period).map_err(
            |source| JobError::EngineLaunch {
                program: engine.program.display().to_string(),
                source,
            },
        )?;
        log::debug!("Job {}: engine pid {}", self.id, process.id());
        self.transition(JobState::Running, events);

        let mut output = OutputLog::new(self.settings.tail_lines);
        let status = loop {
            if self.cancel_requested() {
                if let Err(e) = process.terminate() {
                    log::warn!("Job {}: could not stop engine: {}", self.id, e);
                }
                return Err(JobError::Cancelled);
            }

            match process.lines().recv_timeout(self.settings.poll_interval) {
                Ok(line) => {
                    output.record(line, &mut tracker, events);
                    continue;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    // Both streams closed; only the exit is left to wait for
                    if let Some(status) = process.try_wait()? {
                        break status;
                    }
                    thread::sleep(self.settings.poll_interval);
                    continue;
                }
            }

            if let Some(status) = process.try_wait()? {
                break status;
            }
        };

        // Lines still buffered in the pipes after exit
        let deadline = Instant::now() + self.settings.grace_period;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match process.lines().recv_timeout(remaining) {
                Ok(line) => output.record(line, &mut tracker, events),
                Err(_) => break,
            }
        }
        log::debug!("Job {}: engine exited with {}", self.id, status);

        if !status.success() {
            return Err(JobError::EngineExit {
                code: status.code(),
                tail: output.into_tail(),
            });
        }
        match file_size(staged.output())? {
            None => return Err(JobError::OutputMissing),
            Some(0) => return Err(JobError::OutputEmpty),
            Some(_) => {}
        }

        let destination = self.request.output();
        move_file(staged.output(), destination).map_err(|source| JobError::Publish {
            path: destination.to_path_buf(),
            source,
        })?;

        if let Some(progress) = tracker.complete() {
            let _ = events.send(JobEvent::Progress(progress));
        }
        Ok(())
    }

    fn cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn transition(&self, state: JobState, events: &Sender<JobEvent>) {
        log::debug!("Job {}: {:?}", self.id, state);
        self.shared.lock().state = state;
        let _ = events.send(JobEvent::State(state));
    }
}

/// Classifies engine lines and keeps the last few for failure reports
struct OutputLog {
    tail: VecDeque<String>,
    capacity: usize,
}

impl OutputLog {
    fn new(capacity: usize) -> Self {
        Self {
            tail: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn record(&mut self, line: String, tracker: &mut ProgressTracker, events: &Sender<JobEvent>) {
        log::trace!("engine: {}", line);

        let signal = classify(&line, tracker.known_total());
        if let Some(progress) = tracker.apply(signal) {
            let _ = events.send(JobEvent::Progress(progress));
        } else if signal == ProgressSignal::NoSignal && !line.trim().is_empty() {
            log::debug!("engine (no progress): {}", line);
        }

        if self.capacity == 0 {
            return;
        }
        if self.tail.len() == self.capacity {
            self.tail.pop_front();
        }
        self.tail.push_back(line);
    }

    fn into_tail(self) -> Vec<String> {
        self.tail.into()
    }
}

/// Cloneable request to stop one job
#[derive(Debug, Clone)]
pub struct CancelToken {
    id: Uuid,
    flag: Arc<AtomicBool>,
    shared: Arc<Mutex<Shared>>,
}

impl CancelToken {
    /// Returns false when the job had already finished and the request was
    /// ignored.
    pub fn cancel(&self) -> bool {
        let state = self.shared.lock().state;
        if state.is_terminal() {
            log::debug!("Job {} already {:?}, ignoring cancel", self.id, state);
            return false;
        }
        self.flag.store(true, Ordering::SeqCst);
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Caller's side of a running [`CompressionJob`]
pub struct JobHandle {
    id: Uuid,
    request: CompressionRequest,
    events: Receiver<JobEvent>,
    shared: Arc<Mutex<Shared>>,
    cancel: CancelToken,
    worker: Option<JoinHandle<()>>,
}

impl JobHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> &CompressionRequest {
        &self.request
    }

    pub fn output(&self) -> &Path {
        self.request.output()
    }

    pub fn state(&self) -> JobState {
        self.shared.lock().state
    }

    /// The terminal result, once the job has produced one
    pub fn result(&self) -> Option<JobResult> {
        self.shared.lock().result.clone()
    }

    /// Event stream for subscribers that want every state change
    pub fn events(&self) -> &Receiver<JobEvent> {
        &self.events
    }

    /// Ask the job to stop at its next poll. Has no effect once the job has
    /// reached a terminal state.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A cancel handle that can outlive the borrow of this handle, e.g. for
    /// a signal handler
    pub fn canceller(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Block until the job finishes, passing progress events to `on_progress`
    pub fn wait_with<F>(&mut self, mut on_progress: F) -> JobResult
    where
        F: FnMut(JobProgress),
    {
        let result = loop {
            match self.events.recv() {
                Ok(JobEvent::Progress(progress)) => on_progress(progress),
                Ok(JobEvent::State(_)) => {}
                Ok(JobEvent::Finished(result)) => break result,
                // Channel closed: the result was consumed elsewhere or the worker died
                Err(_) => break self.result().unwrap_or_else(|| self.worker_lost()),
            }
        };

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Job {} worker panicked", self.id);
            }
        }
        result
    }

    pub fn wait(&mut self) -> JobResult {
        self.wait_with(|_| {})
    }

    fn worker_lost(&self) -> JobResult {
        let result = JobResult::Failure("job worker stopped without reporting a result".into());
        let mut shared = self.shared.lock();
        shared.state = JobState::Failed;
        shared.result = Some(result.clone());
        result
    }
}
