use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::io::{progress_to_string, ProgressImport, StatisticsReport};
use crate::models::{parse_rating_input, round_rating, validate_rating, Catalog, GameRecord, PlayStatus, Result, TrackerError};
use crate::store::{PlayStateStore, StoreListener};
use crate::tiers::{
    aggregate, aggregate_catalog, classify, Direction, RatingObserver, Reclassification, ReclassificationEngine,
    Statistics, Tier, TierTable,
};

/// Derived views of the store at one revision.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub revision: u64,
    pub tiers: Vec<Tier>,
    pub stats: Statistics,
}

impl Snapshot {
    /// Rated games in tier order, i.e. rank order.
    pub fn ranked_ids(&self) -> Vec<&str> {
        self.tiers
            .iter()
            .flat_map(|tier| tier.games.iter().map(|g| g.game.id.as_str()))
            .collect()
    }

    /// Tier key currently holding `game_id`.
    pub fn tier_of(&self, game_id: &str) -> Option<&str> {
        self.tiers
            .iter()
            .find(|tier| tier.games.iter().any(|g| g.game.id == game_id))
            .map(|tier| tier.key.as_str())
    }
}

/// Owns the catalog and play state for one user session.
///
/// Every mutation goes through here and rebuilds the snapshot before
/// returning, so tiers and statistics never lag behind the store.
pub struct Session {
    catalog: Catalog,
    store: PlayStateStore,
    table: TierTable,
    engine: ReclassificationEngine,
    snapshot: Snapshot,
}

impl Session {
    pub fn new(catalog: Catalog, table: TierTable) -> Self {
        let mut session = Self {
            catalog,
            store: PlayStateStore::new(),
            table,
            engine: ReclassificationEngine::new(),
            snapshot: Snapshot::default(),
        };
        session.refresh();
        session
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &PlayStateStore {
        &self.store
    }

    pub fn tier_table(&self) -> &TierTable {
        &self.table
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Catalog entry for `game_id`, or `UnknownGame`.
    pub fn game(&self, game_id: &str) -> Result<&GameRecord> {
        self.catalog
            .get(game_id)
            .ok_or_else(|| TrackerError::UnknownGame(game_id.to_string()))
    }

    pub fn status(&self, game_id: &str) -> PlayStatus {
        self.store.get_status(game_id)
    }

    pub fn subscribe(&mut self, listener: StoreListener) {
        self.store.subscribe(listener);
    }

    pub fn on_rating_change(&mut self, observer: Box<dyn RatingObserver>) {
        self.engine.subscribe(observer);
    }

    pub fn set_status(&mut self, game_id: &str, status: PlayStatus) -> Result<()> {
        if let PlayStatus::PlayedRated(value) = status {
            validate_rating(value)?;
        }
        self.store.set_status(game_id, status);
        self.refresh();
        Ok(())
    }

    /// Records a typed rating. Out-of-range or non-numeric input is
    /// rejected and nothing changes.
    pub fn enter_rating(&mut self, game_id: &str, input: &str) -> Result<f64> {
        let value = parse_rating_input(input)?;
        self.store.set_status(game_id, PlayStatus::PlayedRated(value));
        self.refresh();
        Ok(value)
    }

    pub fn rate(&mut self, game_id: &str, value: f64) -> Result<f64> {
        let value = round_rating(validate_rating(value)?);
        self.store.set_status(game_id, PlayStatus::PlayedRated(value));
        self.refresh();
        Ok(value)
    }

    pub fn mark_played(&mut self, game_id: &str) {
        self.store.set_status(game_id, PlayStatus::PlayedNoRating);
        self.refresh();
    }

    pub fn mark_unplayed(&mut self, game_id: &str) {
        self.store.set_status(game_id, PlayStatus::Unplayed);
        self.refresh();
    }

    /// Merges a recovered progress file. Derived views are rebuilt once,
    /// after the whole merge.
    pub fn import_progress(&mut self, import: ProgressImport) -> usize {
        let unknown = import
            .entries
            .iter()
            .filter(|(id, _)| !self.catalog.contains(id))
            .count();
        if unknown > 0 {
            warn!("{} imported entries refer to games outside the catalog", unknown);
        }

        let applied = self.store.bulk_import(import.entries);
        self.refresh();
        info!("Recovered {} statuses ({} rows skipped)", applied, import.skipped);
        applied
    }

    pub fn reclassify(&mut self, game_id: &str, target_key: &str) -> Result<Reclassification> {
        let outcome = self
            .engine
            .reclassify(&mut self.store, &self.table, game_id, target_key)?;
        self.refresh();
        Ok(outcome)
    }

    /// Moves a rated game one band up or down.
    pub fn shift_tier(&mut self, game_id: &str, direction: Direction) -> Result<Option<Reclassification>> {
        let rating = self
            .store
            .get_status(game_id)
            .rating()
            .ok_or_else(|| TrackerError::NotRated(game_id.to_string()))?;

        // A rating outside every band moves to the nearest band in that direction
        let bands = self.table.bands();
        let target = match (self.table.band_for(rating), direction) {
            (Some(current), _) => self.table.neighbour(&current.key, direction),
            (None, Direction::Up) => bands.iter().rev().find(|band| band.min > rating),
            (None, Direction::Down) => bands.iter().find(|band| band.max < rating),
        };

        match target.map(|band| band.key.clone()) {
            Some(key) => self.reclassify(game_id, &key).map(Some),
            None => Ok(None),
        }
    }

    pub fn export_ratings_csv(&self) -> Result<String> {
        progress_to_string(&self.store.to_export_rows(&self.catalog))
    }

    /// Progress file contents, including statuses for games outside the
    /// catalog.
    pub fn progress_csv(&self) -> Result<String> {
        progress_to_string(&self.store.to_progress_rows(&self.catalog))
    }

    /// The report summary counts catalog games only, so it agrees with the
    /// tier list it accompanies.
    pub fn statistics_report(&self, site_base_url: &str, export_date: DateTime<Utc>) -> Result<StatisticsReport> {
        let summary = aggregate_catalog(&self.catalog, &self.store);
        StatisticsReport::build(&self.snapshot.tiers, summary, site_base_url, export_date)
    }

    pub fn export_statistics_json(&self, site_base_url: &str, export_date: DateTime<Utc>) -> Result<String> {
        self.statistics_report(site_base_url, export_date)?.to_json()
    }

    pub fn export_statistics_csv(&self, site_base_url: &str, export_date: DateTime<Utc>) -> Result<String> {
        self.statistics_report(site_base_url, export_date)?.to_csv()
    }

    fn refresh(&mut self) {
        self.snapshot = Snapshot {
            revision: self.store.revision(),
            tiers: classify(&self.catalog, &self.store, &self.table),
            stats: aggregate(&self.store),
        };
    }
}
