pub mod args;

pub use args::{compressed_output_path, parse_size, Args, Preset};
