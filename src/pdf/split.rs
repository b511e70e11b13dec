//! Partitioning a document into consecutive page ranges.
//!
//! Parts are written to a caller-supplied working directory under neutral,
//! run-unique names. Giving them their final `<stem>_<n>.pdf` names is a
//! separate step ([`persist_parts`]) so that name collisions stay a caller
//! decision.

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::Document;
use uuid::Uuid;

use super::pages::extract_page_range;
use crate::config::DEFAULT_SPLIT_MARGIN;
use crate::error::SplitError;
use crate::files::{move_file, remove_if_exists};
use crate::model::{BudgetCheck, CollisionPolicy, SplitPart};

/// Splits a document into the fewest consecutive parts that each stay under
/// a byte budget.
#[derive(Debug, Clone, Copy)]
pub struct SizeBoundedSplitter {
    budget: u64,
    margin: f64,
}

impl SizeBoundedSplitter {
    pub fn new(budget_bytes: u64) -> Self {
        Self {
            budget: budget_bytes,
            margin: DEFAULT_SPLIT_MARGIN,
        }
    }

    /// Fraction of the budget at which the greedy pass stops adding pages.
    /// Values above 1.0 let the greedy pass overshoot and leave the
    /// correction to the shrinking pass.
    pub fn with_margin(mut self, margin: f64) -> Self {
        if margin.is_finite() && margin > 0.0 {
            self.margin = margin;
        }
        self
    }

    fn threshold(&self) -> u64 {
        (self.budget as f64 * self.margin) as u64
    }

    /// Split the document at `input`, writing parts into `work_dir`.
    ///
    /// Every part is at most `budget` bytes on disk, except a part holding a
    /// single page that is larger than the budget on its own; that part is
    /// accepted as is.
    pub fn split(&self, input: &Path, work_dir: &Path) -> Result<Vec<SplitPart>, SplitError> {
        let doc = Document::load(input)?;
        let total = doc.get_pages().len() as u32;
        if total < 2 {
            return Err(SplitError::InsufficientPages(total));
        }

        fs::create_dir_all(work_dir)?;
        let run_id = Uuid::new_v4();
        let mut written = PartFiles::default();
        let threshold = self.threshold();
        log::info!(
            "Splitting {} ({} pages) into parts of at most {} bytes",
            input.display(),
            total,
            self.budget
        );

        let mut parts = Vec::new();
        let mut start = 1;
        while start <= total {
            // Greedy pass: grow the part while it stays under the threshold
            let mut end = start;
            let mut bytes = extract_page_range(&doc, start, end)?;
            if bytes.len() as u64 <= threshold {
                while end < total {
                    let candidate = extract_page_range(&doc, start, end + 1)?;
                    if candidate.len() as u64 > threshold {
                        break;
                    }
                    end += 1;
                    bytes = candidate;
                }
            }

            // Seal, then shrink one page at a time while the file is over budget
            let path = work_dir.join(format!("{}-part-{}.pdf", run_id, parts.len() + 1));
            written.track(&path);
            let mut size = write_part(&path, &bytes)?;
            while size > self.budget && end > start {
                end -= 1;
                log::debug!(
                    "Part {} over budget ({} > {}), retrying with pages {}-{}",
                    parts.len() + 1,
                    size,
                    self.budget,
                    start,
                    end
                );
                let bytes = extract_page_range(&doc, start, end)?;
                size = write_part(&path, &bytes)?;
            }
            if size > self.budget {
                log::warn!(
                    "Page {} alone is {} bytes, over the {} byte budget; keeping it as its own part",
                    start,
                    size,
                    self.budget
                );
            }

            log::info!("Part {}: pages {}-{} ({} bytes)", parts.len() + 1, start, end, size);
            parts.push(SplitPart {
                path,
                page_range_start: start,
                page_range_end: end,
                byte_size: size,
            });
            start = end + 1;
        }

        written.keep();
        Ok(parts)
    }
}

/// Part files written by one split run. Unless kept, they are removed when
/// the run bails out, since the caller never learns their paths.
#[derive(Debug, Default)]
struct PartFiles {
    paths: Vec<PathBuf>,
    kept: bool,
}

impl PartFiles {
    fn track(&mut self, path: &Path) {
        self.paths.push(path.to_path_buf());
    }

    fn keep(mut self) {
        self.kept = true;
    }
}

impl Drop for PartFiles {
    fn drop(&mut self) {
        if self.kept {
            return;
        }
        for path in &self.paths {
            if let Err(e) = remove_if_exists(path) {
                log::warn!("Could not remove partial part {}: {}", path.display(), e);
            }
        }
    }
}

fn write_part(path: &Path, bytes: &[u8]) -> Result<u64, SplitError> {
    fs::write(path, bytes)?;
    Ok(fs::metadata(path)?.len())
}

/// Compare the document size against a budget.
///
/// A document that already fits may still be split; the caller decides.
pub fn check_budget(path: &Path, budget_bytes: u64) -> Result<BudgetCheck, SplitError> {
    let byte_size = fs::metadata(path)?.len();
    if byte_size <= budget_bytes {
        Ok(BudgetCheck::AlreadyFits { byte_size })
    } else {
        Ok(BudgetCheck::NeedsSplit { byte_size })
    }
}

/// Split into `parts` consecutive ranges of (nearly) equal page count.
/// Earlier parts take one extra page when the pages do not divide evenly.
pub fn split_into_equal_parts(
    input: &Path,
    parts: u32,
    work_dir: &Path,
) -> Result<Vec<SplitPart>, SplitError> {
    let doc = Document::load(input)?;
    let total = doc.get_pages().len() as u32;
    if total < 2 {
        return Err(SplitError::InsufficientPages(total));
    }
    if parts < 2 {
        return Err(SplitError::InvalidPartCount {
            parts,
            reason: "need at least 2 parts".to_string(),
        });
    }
    if parts > total {
        return Err(SplitError::InvalidPartCount {
            parts,
            reason: format!("document only has {} pages", total),
        });
    }

    fs::create_dir_all(work_dir)?;
    let run_id = Uuid::new_v4();
    let mut written = PartFiles::default();
    let base = total / parts;
    let extra = total % parts;

    let mut result = Vec::with_capacity(parts as usize);
    let mut start = 1;
    for index in 0..parts {
        let len = base + u32::from(index < extra);
        let end = start + len - 1;
        let path = work_dir.join(format!("{}-part-{}.pdf", run_id, index + 1));
        let bytes = extract_page_range(&doc, start, end)?;
        written.track(&path);
        let byte_size = write_part(&path, &bytes)?;
        result.push(SplitPart {
            path,
            page_range_start: start,
            page_range_end: end,
            byte_size,
        });
        start = end + 1;
    }

    written.keep();
    Ok(result)
}

/// `out/report.pdf`, 2 -> `out/report_2.pdf`
pub fn part_file_name(base: &Path, index: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "part".to_string());
    let name = match base.extension() {
        Some(ext) => format!("{}_{}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}_{}", stem, index),
    };
    base.with_file_name(name)
}

/// Move parts to their final names derived from `base`.
///
/// With [`CollisionPolicy::Fail`] every target is checked before anything is
/// moved, so a collision leaves all parts where they were.
pub fn persist_parts(
    parts: &[SplitPart],
    base: &Path,
    policy: CollisionPolicy,
) -> Result<Vec<SplitPart>, SplitError> {
    let targets: Vec<PathBuf> = (1..=parts.len())
        .map(|index| part_file_name(base, index))
        .collect();

    if policy == CollisionPolicy::Fail {
        if let Some(existing) = targets.iter().find(|t| t.exists()) {
            return Err(SplitError::NameCollision(existing.clone()));
        }
    }

    let mut persisted = Vec::with_capacity(parts.len());
    for (part, target) in parts.iter().zip(targets) {
        move_file(&part.path, &target)?;
        persisted.push(SplitPart {
            path: target,
            ..part.clone()
        });
    }
    Ok(persisted)
}
