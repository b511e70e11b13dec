//! Document-level operations: page counting and size-bounded splitting.

pub mod pages;
pub mod split;

#[cfg(test)]
pub(crate) mod test_support;

pub use pages::{count_pages, extract_page_range};
pub use split::{
    check_budget, part_file_name, persist_parts, split_into_equal_parts, SizeBoundedSplitter,
};
