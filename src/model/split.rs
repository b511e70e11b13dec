use std::path::PathBuf;

/// One contiguous page range written as its own document.
/// Page numbers are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPart {
    pub path: PathBuf,
    pub page_range_start: u32,
    pub page_range_end: u32,
    pub byte_size: u64,
}

impl SplitPart {
    pub fn page_count(&self) -> u32 {
        self.page_range_end + 1 - self.page_range_start
    }

    pub fn is_single_page(&self) -> bool {
        self.page_range_start == self.page_range_end
    }
}

/// Whether a document needs splitting for a given budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetCheck {
    /// The whole document is already within budget; splitting is optional
    AlreadyFits { byte_size: u64 },
    NeedsSplit { byte_size: u64 },
}

/// What to do when a persisted part name already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    #[default]
    Fail,
    Overwrite,
}
