pub mod models;
pub mod config;
pub mod store;
pub mod tiers;
pub mod io;
pub mod session;
pub mod search;
pub mod selection;
pub mod tui;

pub use models::{Catalog, GameRecord, PlayStatus, TrackerError, Result};
pub use config::Settings;
pub use session::{Session, Snapshot};
pub use tiers::{TierTable, Tier, Statistics};
