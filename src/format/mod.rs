//! Batch formatting with the external formatter binary.

pub mod batch;
pub mod runner;
pub mod style;

pub use batch::{batch_count, batches};
pub use runner::{
    DEFAULT_FORMATTER, DEFAULT_STYLE_PATH, FormatReport, FormatterOptions,
    check_formatter_installed, format_in_batches,
};
pub use style::write_style_file;
