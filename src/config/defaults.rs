use std::time::Duration;

/// Lowest downsampling resolution the engine is asked for, in dpi
pub const MIN_DPI: u32 = 10;

/// Highest downsampling resolution, in dpi
pub const MAX_DPI: u32 = 600;

/// Resolution used when neither a preset nor `--dpi` is given
pub const DEFAULT_DPI: u32 = 150;

pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;
pub const DEFAULT_QUALITY: u8 = 50;

/// How long the worker waits for an output line before re-checking
/// the cancellation flag and the child's exit status
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Time between SIGTERM and a forced kill
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(500);

/// Number of trailing engine lines kept for failure details
pub const DEFAULT_TAIL_LINES: usize = 10;

/// Greedy stop threshold as a fraction of the part budget (4.5 of 5 units)
pub const DEFAULT_SPLIT_MARGIN: f64 = 0.9;

/// Appended to the input's file stem to name the compressed output
pub const COMPRESSED_SUFFIX: &str = "_compressed";

/// Environment variable that overrides the engine executable
pub const ENGINE_ENV_VAR: &str = "PDF_SQUASH_ENGINE";

#[cfg(windows)]
pub const DEFAULT_ENGINE: &str = "gswin64c";

#[cfg(not(windows))]
pub const DEFAULT_ENGINE: &str = "gs";
