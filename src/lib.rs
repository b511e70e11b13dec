//! Compress PDF documents through an external Ghostscript-style engine and
//! split the results into size-bounded parts.
//!
//! A [`CompressionJob`] runs the engine in the background and reports page
//! progress parsed from its output. [`JobController`] keeps one job at a time
//! and handles the keep/discard/retry decision afterwards.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use pdf_squash::{CompressionRequest, JobController, Settings, SizeBoundedSplitter};
//!
//! let request = CompressionRequest::new("scan.pdf", "scan_compressed.pdf", 150, 50).unwrap();
//! let mut controller = JobController::new(Settings::default());
//! let result = controller
//!     .run(request, |p| eprintln!("page {}/{}", p.current_page, p.total_pages))
//!     .unwrap();
//!
//! if result.is_success() {
//!     let parts = SizeBoundedSplitter::new(5 * 1024 * 1024)
//!         .split(Path::new("scan_compressed.pdf"), &std::env::temp_dir())
//!         .unwrap();
//!     println!("{} parts", parts.len());
//! }
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod files;
pub mod model;
pub mod parser;
pub mod pdf;

pub use config::Settings;
pub use engine::{CancelToken, CompressionJob, JobController, JobHandle};
pub use error::{ControllerError, JobError, RequestError, SplitError};
pub use model::{
    CompressionReport, CompressionRequest, JobEvent, JobProgress, JobResult, JobState, SplitPart,
};
pub use parser::classify;
pub use pdf::{split_into_equal_parts, SizeBoundedSplitter};
