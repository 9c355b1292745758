pub mod settings;

pub use settings::{AppSettings, CatalogSettings, ExportSettings, Settings, TierSettings, TuiSettings};
