pub mod cli;
pub mod deid;
pub mod dicom;
pub mod image;
pub mod display;
pub mod display_metadata;
pub mod types;
pub mod viewport;

// Re-export commonly used functions
pub use display_metadata::print_metadata;
