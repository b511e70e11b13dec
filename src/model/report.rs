/// Size comparison between an input document and its compressed output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionReport {
    pub original_bytes: u64,
    pub compressed_bytes: u64,
}

impl CompressionReport {
    pub fn new(original_bytes: u64, compressed_bytes: u64) -> Self {
        Self {
            original_bytes,
            compressed_bytes,
        }
    }

    /// Percentage saved; negative when the output grew, 0 for an empty original
    pub fn reduction_percent(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.compressed_bytes as f64 / self.original_bytes as f64) * 100.0
    }

    pub fn is_smaller(&self) -> bool {
        self.compressed_bytes < self.original_bytes
    }
}

/// Human-readable size: MB from one megabyte up, KB below
pub fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    let mb = kb / 1024.0;
    if mb >= 1.0 {
        format!("{:.2} MB", mb)
    } else {
        format!("{:.2} KB", kb)
    }
}
