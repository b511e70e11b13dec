pub mod job;
pub mod progress;
pub mod report;
pub mod request;
pub mod split;

pub use job::{JobEvent, JobResult, JobState};
pub use progress::{JobProgress, ProgressSignal, ProgressTracker};
pub use report::{format_size, CompressionReport};
pub use request::CompressionRequest;
pub use split::{BudgetCheck, CollisionPolicy, SplitPart};
