use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Args;

use super::defaults::*;

/// The external rasterization engine and how to invoke it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub program: PathBuf,
    /// Arguments placed before the compression arguments, e.g. when the
    /// engine is reached through a wrapper executable
    pub leading_args: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_ENGINE),
            leading_args: Vec::new(),
        }
    }
}

impl EngineSettings {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// Runtime settings for compression jobs
#[derive(Debug, Clone)]
pub struct Settings {
    pub engine: EngineSettings,

    /// Directory holding staged inputs and outputs while a job runs
    pub work_dir: PathBuf,

    pub poll_interval: Duration,
    pub grace_period: Duration,
    pub tail_lines: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            work_dir: std::env::temp_dir(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            grace_period: DEFAULT_GRACE_PERIOD,
            tail_lines: DEFAULT_TAIL_LINES,
        }
    }
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_args(args: &Args) -> Self {
        let mut settings = Self::default();

        if let Some(ref engine) = args.engine {
            settings.engine = EngineSettings::new(engine.clone());
        }
        if let Some(ref dir) = args.work_dir {
            settings.work_dir = dir.clone();
        }

        settings
    }

    pub fn with_engine(mut self, engine: EngineSettings) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults_use_platform_engine() {
        let settings = Settings::default();
        assert_eq!(settings.engine.program, PathBuf::from(DEFAULT_ENGINE));
        assert!(settings.engine.leading_args.is_empty());
        assert_eq!(settings.tail_lines, DEFAULT_TAIL_LINES);
    }

    #[test]
    fn test_from_args_overrides_engine_and_work_dir() {
        let args = Args::parse_from([
            "pdf-squash",
            "in.pdf",
            "--engine",
            "/opt/gs/bin/gs",
            "--work-dir",
            "/var/tmp/squash",
        ]);
        let settings = Settings::from_args(&args);
        assert_eq!(settings.engine.program, PathBuf::from("/opt/gs/bin/gs"));
        assert_eq!(settings.work_dir, PathBuf::from("/var/tmp/squash"));
    }
}
