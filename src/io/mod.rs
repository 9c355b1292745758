pub mod catalog;
pub mod progress;
pub mod report;
pub mod source;

pub use catalog::{parse_catalog, parse_catalog_str, write_catalog};
pub use progress::{parse_progress, parse_progress_str, progress_to_string, write_progress, ProgressImport};
pub use report::{GameReport, StatisticsReport, TierReport};
pub use source::{load_catalog, open_source, CatalogSource, FileSource, HttpSource};
