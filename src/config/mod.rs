mod defaults;
mod settings;

pub use defaults::*;
pub use settings::{EngineSettings, Settings};
