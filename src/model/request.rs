use std::path::{Path, PathBuf};

use crate::config::{MAX_DPI, MAX_QUALITY, MIN_DPI, MIN_QUALITY};
use crate::error::RequestError;

/// One compression action. Fields are private so a request cannot change
/// once a job has taken it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionRequest {
    input: PathBuf,
    output: PathBuf,
    resolution_dpi: u32,
    quality: u8,
}

impl CompressionRequest {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        resolution_dpi: u32,
        quality: u8,
    ) -> Result<Self, RequestError> {
        let input = input.into();
        let output = output.into();

        if !(MIN_DPI..=MAX_DPI).contains(&resolution_dpi) {
            return Err(RequestError::InvalidResolution(resolution_dpi));
        }
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(RequestError::InvalidQuality(quality));
        }
        if same_file(&input, &output) {
            return Err(RequestError::OutputIsInput(output));
        }

        Ok(Self {
            input,
            output,
            resolution_dpi,
            quality,
        })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn resolution_dpi(&self) -> u32 {
        self.resolution_dpi
    }

    /// Advisory quality hint; the pdfwrite device does not honour it directly
    pub fn quality(&self) -> u8 {
        self.quality
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    // The output usually does not exist yet, so compare canonical parents
    let canonical = |p: &Path| -> Option<PathBuf> {
        let parent = match p.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Some(parent.canonicalize().ok()?.join(p.file_name()?))
    };
    match (canonical(a), canonical(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request() {
        let req = CompressionRequest::new("in.pdf", "out.pdf", 150, 50).unwrap();
        assert_eq!(req.input(), Path::new("in.pdf"));
        assert_eq!(req.output(), Path::new("out.pdf"));
        assert_eq!(req.resolution_dpi(), 150);
        assert_eq!(req.quality(), 50);
    }

    #[test]
    fn test_resolution_bounds_inclusive() {
        assert!(CompressionRequest::new("in.pdf", "out.pdf", 10, 50).is_ok());
        assert!(CompressionRequest::new("in.pdf", "out.pdf", 600, 50).is_ok());
        assert!(matches!(
            CompressionRequest::new("in.pdf", "out.pdf", 9, 50),
            Err(RequestError::InvalidResolution(9))
        ));
        assert!(matches!(
            CompressionRequest::new("in.pdf", "out.pdf", 601, 50),
            Err(RequestError::InvalidResolution(601))
        ));
    }

    #[test]
    fn test_quality_bounds() {
        assert!(matches!(
            CompressionRequest::new("in.pdf", "out.pdf", 150, 0),
            Err(RequestError::InvalidQuality(0))
        ));
        assert!(matches!(
            CompressionRequest::new("in.pdf", "out.pdf", 150, 101),
            Err(RequestError::InvalidQuality(101))
        ));
    }

    #[test]
    fn test_output_must_differ_from_input() {
        assert!(matches!(
            CompressionRequest::new("doc.pdf", "doc.pdf", 150, 50),
            Err(RequestError::OutputIsInput(_))
        ));
        assert!(matches!(
            CompressionRequest::new("doc.pdf", "./doc.pdf", 150, 50),
            Err(RequestError::OutputIsInput(_))
        ));
    }
}
