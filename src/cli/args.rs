use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{COMPRESSED_SUFFIX, DEFAULT_DPI, DEFAULT_QUALITY, ENGINE_ENV_VAR};

#[derive(Parser, Debug)]
#[command(name = "pdf-squash")]
#[command(
    author,
    version,
    about = "Compress a PDF through Ghostscript and optionally split it into size-bounded parts"
)]
pub struct Args {
    /// Input PDF file path
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output PDF file path (defaults to <input>_compressed.pdf)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Compression preset
    #[arg(short, long, value_enum)]
    pub preset: Option<Preset>,

    /// Image downsampling resolution in dpi (overrides the preset)
    #[arg(long, value_parser = clap::value_parser!(u32).range(10..=600))]
    pub dpi: Option<u32>,

    /// Quality hint 1-100 (overrides the preset; advisory only)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Engine executable
    #[arg(long, env = ENGINE_ENV_VAR)]
    pub engine: Option<PathBuf>,

    /// Directory for staged job files (defaults to the system temp dir)
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Split the result into parts no larger than this size (e.g. "5", "5MB", "800KB")
    #[arg(short = 's', long, value_parser = parse_size, conflicts_with = "parts")]
    pub split_size: Option<u64>,

    /// Split the result into this many parts of equal page count
    #[arg(long, value_parser = clap::value_parser!(u32).range(2..))]
    pub parts: Option<u32>,

    /// Split even when the result already fits the size budget
    #[arg(long)]
    pub split_anyway: bool,

    /// Overwrite existing part files
    #[arg(short, long)]
    pub force: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Compression presets offered by the tool
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// 300 dpi, quality 85
    Low,
    /// 200 dpi, quality 70
    Medium,
    /// 150 dpi, quality 50
    High,
    /// 100 dpi, quality 40
    Ultra,
    /// 72 dpi, quality 30
    Extreme,
}

impl Preset {
    /// (dpi, quality) for this preset
    pub fn parameters(&self) -> (u32, u8) {
        match self {
            Preset::Low => (300, 85),
            Preset::Medium => (200, 70),
            Preset::High => (150, 50),
            Preset::Ultra => (100, 40),
            Preset::Extreme => (72, 30),
        }
    }
}

impl Args {
    /// Get the output path, defaulting to `<stem>_compressed.pdf` beside the input
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| compressed_output_path(&self.input))
    }

    /// Resolve (dpi, quality): explicit values win over the preset, which wins
    /// over the defaults
    pub fn resolution(&self) -> (u32, u8) {
        let (preset_dpi, preset_quality) = self
            .preset
            .map(|p| p.parameters())
            .unwrap_or((DEFAULT_DPI, DEFAULT_QUALITY));
        (
            self.dpi.unwrap_or(preset_dpi),
            self.quality.unwrap_or(preset_quality),
        )
    }
}

/// `report.pdf` -> `report_compressed.pdf`
pub fn compressed_output_path(input: &std::path::Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}{}.pdf", stem, COMPRESSED_SUFFIX))
}

/// Parse a size specification into bytes. A bare number is megabytes.
pub fn parse_size(spec: &str) -> Result<u64, String> {
    let spec = spec.trim();
    let split_at = spec
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(spec.len());
    let (number, unit) = spec.split_at(split_at);

    let value: f64 = number
        .parse()
        .map_err(|_| format!("Invalid size: {}", spec))?;

    let multiplier: f64 = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "M" | "MB" => 1024.0 * 1024.0,
        "K" | "KB" => 1024.0,
        "G" | "GB" => 1024.0 * 1024.0 * 1024.0,
        "B" => 1.0,
        other => return Err(format!("Unknown size unit: {}", other)),
    };

    let bytes = (value * multiplier).round();
    if bytes < 1.0 {
        return Err(format!("Size must be positive: {}", spec));
    }
    Ok(bytes as u64)
}
