use std::fmt;

/// What a single line of engine output says about progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressSignal {
    TotalPages(u32),
    CurrentPage(u32),
    NoSignal,
}

/// Page progress of one job run. `total_pages == 0` means the total is unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobProgress {
    pub current_page: u32,
    pub total_pages: u32,
}

impl JobProgress {
    /// Completed fraction in `0.0..=1.0`, or `None` while the total is unknown
    pub fn fraction(&self) -> Option<f32> {
        if self.total_pages == 0 {
            None
        } else {
            Some((self.current_page as f32 / self.total_pages as f32).min(1.0))
        }
    }
}

/// `page 3/12 (25%)`, or `page 3` while the total is unknown
impl fmt::Display for JobProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fraction() {
            Some(fraction) => write!(
                f,
                "page {}/{} ({:.0}%)",
                self.current_page,
                self.total_pages,
                fraction * 100.0
            ),
            None => write!(f, "page {}", self.current_page),
        }
    }
}

/// Folds classified lines into a [`JobProgress`], keeping `current_page`
/// non-decreasing and `total_pages` from shrinking once known.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    progress: JobProgress,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a page count obtained before the engine runs
    pub fn seeded(total_pages: u32) -> Self {
        Self {
            progress: JobProgress {
                current_page: 0,
                total_pages,
            },
        }
    }

    pub fn current(&self) -> JobProgress {
        self.progress
    }

    pub fn known_total(&self) -> u32 {
        self.progress.total_pages
    }

    /// Apply a signal; returns the new progress only when it changed
    pub fn apply(&mut self, signal: ProgressSignal) -> Option<JobProgress> {
        match signal {
            ProgressSignal::TotalPages(total) if total > self.progress.total_pages => {
                // Pages already seen before the total was announced still count
                self.progress.total_pages = total.max(self.progress.current_page);
            }
            ProgressSignal::CurrentPage(page) if page > self.progress.current_page => {
                self.progress.current_page = page;
            }
            _ => return None,
        }
        Some(self.progress)
    }

    /// Mark the run complete. Returns the final event when the total is known
    /// and has not been reported yet.
    pub fn complete(&mut self) -> Option<JobProgress> {
        let total = self.progress.total_pages;
        if total == 0 || self.progress.current_page == total {
            return None;
        }
        self.progress.current_page = total;
        Some(self.progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_page_never_decreases() {
        let mut tracker = ProgressTracker::new();
        assert!(tracker.apply(ProgressSignal::CurrentPage(3)).is_some());
        assert_eq!(tracker.apply(ProgressSignal::CurrentPage(2)), None);
        assert_eq!(tracker.apply(ProgressSignal::CurrentPage(3)), None);
        assert_eq!(tracker.current().current_page, 3);
    }

    #[test]
    fn test_total_only_grows() {
        let mut tracker = ProgressTracker::seeded(10);
        assert_eq!(tracker.apply(ProgressSignal::TotalPages(8)), None);
        let progress = tracker.apply(ProgressSignal::TotalPages(12)).unwrap();
        assert_eq!(progress.total_pages, 12);
    }

    #[test]
    fn test_late_total_never_below_current() {
        let mut tracker = ProgressTracker::new();
        tracker.apply(ProgressSignal::CurrentPage(7));
        let progress = tracker.apply(ProgressSignal::TotalPages(5)).unwrap();
        assert_eq!(progress, JobProgress { current_page: 7, total_pages: 7 });
        assert_eq!(tracker.complete(), None);
    }

    #[test]
    fn test_no_signal_is_ignored() {
        let mut tracker = ProgressTracker::seeded(4);
        assert_eq!(tracker.apply(ProgressSignal::NoSignal), None);
        assert_eq!(tracker.current(), JobProgress { current_page: 0, total_pages: 4 });
    }

    #[test]
    fn test_complete_reports_final_page() {
        let mut tracker = ProgressTracker::seeded(5);
        tracker.apply(ProgressSignal::CurrentPage(4));
        assert_eq!(
            tracker.complete(),
            Some(JobProgress { current_page: 5, total_pages: 5 })
        );
        assert_eq!(tracker.complete(), None);
    }

    #[test]
    fn test_complete_with_unknown_total() {
        let mut tracker = ProgressTracker::new();
        tracker.apply(ProgressSignal::CurrentPage(7));
        assert_eq!(tracker.complete(), None);
    }

    #[test]
    fn test_display_without_total() {
        let progress = JobProgress {
            current_page: 1,
            total_pages: 0,
        };
        assert_eq!(progress.to_string(), "page 1");
    }

    #[test]
    fn test_display_with_total() {
        let progress = JobProgress {
            current_page: 3,
            total_pages: 12,
        };
        assert_eq!(progress.to_string(), "page 3/12 (25%)");
    }

    #[test]
    fn test_fraction() {
        assert_eq!(JobProgress::default().fraction(), None);
        let half = JobProgress { current_page: 2, total_pages: 4 };
        assert_eq!(half.fraction(), Some(0.5));
    }
}
