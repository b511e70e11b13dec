use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Resolution {0} dpi is outside the supported range {min}-{max}", min = crate::config::MIN_DPI, max = crate::config::MAX_DPI)]
    InvalidResolution(u32),

    #[error("Quality {0} is outside the supported range {min}-{max}", min = crate::config::MIN_QUALITY, max = crate::config::MAX_QUALITY)]
    InvalidQuality(u8),

    #[error("Output path must differ from the input path: {0}")]
    OutputIsInput(PathBuf),
}

/// Failures of a single compression job.
///
/// The `Display` text is what ends up in [`crate::model::JobResult::Failure`].
#[derive(Error, Debug)]
pub enum JobError {
    #[error("staging failed: {0}")]
    Staging(#[source] std::io::Error),

    #[error("could not launch engine '{program}': {source}")]
    EngineLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("engine exited with {}{}", describe_code(.code), describe_tail(.tail))]
    EngineExit { code: Option<i32>, tail: Vec<String> },

    #[error("output not created")]
    OutputMissing,

    #[error("output empty")]
    OutputEmpty,

    #[error("could not write output to {path}: {source}")]
    Publish {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cancelled")]
    Cancelled,
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

fn describe_tail(tail: &[String]) -> String {
    if tail.is_empty() {
        String::new()
    } else {
        format!(": {}", tail.join(" | "))
    }
}

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Document has {0} page(s); at least 2 are needed to split")]
    InsufficientPages(u32),

    #[error("Cannot split into {parts} parts: {reason}")]
    InvalidPartCount { parts: u32, reason: String },

    #[error("Failed to parse PDF: {0}")]
    Parse(#[from] lopdf::Error),

    #[error("Failed to write part: {0}")]
    Io(#[from] std::io::Error),

    #[error("Refusing to overwrite existing file: {0}")]
    NameCollision(PathBuf),
}

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("A job writing to {} is still running", .output.display())]
    JobInProgress { output: PathBuf },

    #[error("No compression job has been started")]
    NoJob,

    #[error("Request rejected: {0}")]
    Request(#[from] RequestError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
