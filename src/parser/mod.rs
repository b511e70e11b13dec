pub mod progress;

pub use progress::classify;
