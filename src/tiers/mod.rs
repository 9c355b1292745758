pub mod bands;
pub mod classifier;
pub mod stats;
pub mod reclassify;

pub use bands::{Direction, Severity, TierBand, TierTable};
pub use classifier::{classify, RankedGame, Tier};
pub use stats::{aggregate, aggregate_catalog, Statistics};
pub use reclassify::{Reclassification, ReclassificationEngine, RatingObserver};
