//! Page-level document operations on top of lopdf.

use std::path::Path;

use lopdf::Document;

use crate::error::SplitError;

/// Number of pages in the document at `path`.
///
/// Returns 0 when the document cannot be read or parsed; callers treat 0 as
/// "total unknown", not as an empty document.
pub fn count_pages(path: impl AsRef<Path>) -> u32 {
    let path = path.as_ref();
    match Document::load(path) {
        Ok(doc) => doc.get_pages().len() as u32,
        Err(e) => {
            log::debug!("Could not count pages of {}: {}", path.display(), e);
            0
        }
    }
}

/// Serialize pages `first..=last` (1-based) of `doc` as a standalone PDF.
///
/// The document is cloned, every other page is deleted, unreferenced objects
/// are pruned and the remaining streams compressed before saving.
pub fn extract_page_range(doc: &Document, first: u32, last: u32) -> Result<Vec<u8>, SplitError> {
    let total = doc.get_pages().len() as u32;

    let mut part = doc.clone();
    // Highest page first so earlier page numbers stay valid
    let unwanted: Vec<u32> = (1..=total)
        .rev()
        .filter(|&page| page < first || page > last)
        .collect();
    if !unwanted.is_empty() {
        part.delete_pages(&unwanted);
    }

    part.prune_objects();
    part.compress();

    let mut buffer = Vec::new();
    part.save_to(&mut buffer)?;
    Ok(buffer)
}
