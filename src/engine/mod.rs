//! Running the external compression engine as a cancellable background job.

pub mod command;
pub mod controller;
pub mod job;
pub mod process;
pub mod staging;

pub use command::{build_command, engine_args};
pub use controller::JobController;
pub use job::{CancelToken, CompressionJob, JobHandle};
pub use process::EngineProcess;
pub use staging::StagedFiles;
