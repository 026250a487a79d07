mod files;
pub mod progress;
mod time;

// Export utility functions
pub use self::files::{create_dirs, default_output_dir};
pub use self::time::{format_duration, parse_minutes};
