//! Data module - wildfire log loading and normalization

mod loader;
mod processor;
pub mod schema;

pub use loader::{FireLoader, FireTable, LoaderConfig, LoaderError};
pub use processor::{split_alert, title_case, DataProcessor, ProcessorError};
