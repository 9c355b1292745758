use tracing::info;

use crate::models::{PlayStatus, Result, TrackerError};
use crate::store::PlayStateStore;
use super::bands::TierTable;

/// Receives `(game id, new rating)` whenever a tier move commits.
#[cfg_attr(test, mockall::automock)]
pub trait RatingObserver {
    fn rating_changed(&self, game_id: &str, new_rating: f64);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reclassification {
    /// The game already sits in the target tier.
    Unchanged { tier: String },
    Moved {
        from: Option<String>,
        to: String,
        old_rating: f64,
        new_rating: f64,
    },
}

/// Moves rated games between tiers by rewriting their rating to the
/// target band's lower bound.
#[derive(Default)]
pub struct ReclassificationEngine {
    observers: Vec<Box<dyn RatingObserver>>,
}

impl ReclassificationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn RatingObserver>) {
        self.observers.push(observer);
    }

    pub fn reclassify(
        &self,
        store: &mut PlayStateStore,
        table: &TierTable,
        game_id: &str,
        target_key: &str,
    ) -> Result<Reclassification> {
        let target = table
            .get(target_key)
            .ok_or_else(|| TrackerError::UnknownTier(target_key.to_string()))?;

        let old_rating = store
            .get_status(game_id)
            .rating()
            .ok_or_else(|| TrackerError::NotRated(game_id.to_string()))?;

        let current = table.band_for(old_rating);
        if current.map(|band| band.key.as_str()) == Some(target.key.as_str()) {
            return Ok(Reclassification::Unchanged {
                tier: target.key.clone(),
            });
        }

        let new_rating = target.entry_rating();
        store.set_status(game_id, PlayStatus::PlayedRated(new_rating));

        info!(
            "Moved game {} to {} ({} -> {})",
            game_id, target.label, old_rating, new_rating
        );

        for observer in &self.observers {
            observer.rating_changed(game_id, new_rating);
        }

        Ok(Reclassification::Moved {
            from: current.map(|band| band.key.clone()),
            to: target.key.clone(),
            old_rating,
            new_rating,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Catalog, GameRecord};
    use crate::tiers::classify;
    use mockall::predicate::eq;

    fn rated_store(id: &str, rating: f64) -> PlayStateStore {
        let mut store = PlayStateStore::new();
        store.set_status(id, PlayStatus::PlayedRated(rating));
        store
    }

    #[test]
    fn test_move_rewrites_rating_to_band_minimum() {
        let table = TierTable::default();
        let mut store = rated_store("g", 6.2);
        let engine = ReclassificationEngine::new();

        let outcome = engine.reclassify(&mut store, &table, "g", "8.0-8.4").unwrap();

        assert_eq!(
            outcome,
            Reclassification::Moved {
                from: Some("6.0-6.4".to_string()),
                to: "8.0-8.4".to_string(),
                old_rating: 6.2,
                new_rating: 8.0,
            }
        );
        assert_eq!(store.get_status("g"), PlayStatus::PlayedRated(8.0));

        let catalog = Catalog::new(vec![GameRecord::new("g", "Game")]);
        let tiers = classify(&catalog, &store, &table);
        assert_eq!(tiers.len(), 1);
        assert_eq!(tiers[0].key, "8.0-8.4");
    }

    #[test]
    fn test_same_tier_is_a_no_op() {
        let table = TierTable::default();
        let mut store = rated_store("g", 6.2);
        let revision = store.revision();

        let mut observer = MockRatingObserver::new();
        observer.expect_rating_changed().never();
        let mut engine = ReclassificationEngine::new();
        engine.subscribe(Box::new(observer));

        let outcome = engine.reclassify(&mut store, &table, "g", "6.0-6.4").unwrap();

        assert_eq!(outcome, Reclassification::Unchanged { tier: "6.0-6.4".to_string() });
        assert_eq!(store.get_status("g"), PlayStatus::PlayedRated(6.2));
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_observer_is_notified_once() {
        let table = TierTable::default();
        let mut store = rated_store("g", 4.1);

        let mut observer = MockRatingObserver::new();
        observer
            .expect_rating_changed()
            .with(eq("g"), eq(10.0))
            .times(1)
            .return_const(());
        let mut engine = ReclassificationEngine::new();
        engine.subscribe(Box::new(observer));

        engine.reclassify(&mut store, &table, "g", "10.0").unwrap();
    }

    #[test]
    fn test_unrated_game_is_rejected() {
        let table = TierTable::default();
        let mut store = PlayStateStore::new();
        store.set_status("played", PlayStatus::PlayedNoRating);
        let engine = ReclassificationEngine::new();

        assert!(matches!(
            engine.reclassify(&mut store, &table, "played", "8.0-8.4"),
            Err(TrackerError::NotRated(_))
        ));
        assert!(matches!(
            engine.reclassify(&mut store, &table, "missing", "8.0-8.4"),
            Err(TrackerError::NotRated(_))
        ));
        assert_eq!(store.get_status("played"), PlayStatus::PlayedNoRating);
    }

    #[test]
    fn test_unknown_tier_is_rejected() {
        let table = TierTable::default();
        let mut store = rated_store("g", 5.0);
        let engine = ReclassificationEngine::new();

        assert!(matches!(
            engine.reclassify(&mut store, &table, "g", "11-12"),
            Err(TrackerError::UnknownTier(_))
        ));
    }

    #[test]
    fn test_out_of_range_rating_can_be_moved_back_in() {
        let table = TierTable::default();
        let mut store = rated_store("g", 12.0);
        let engine = ReclassificationEngine::new();

        let outcome = engine.reclassify(&mut store, &table, "g", "0-2.9").unwrap();

        assert!(matches!(outcome, Reclassification::Moved { from: None, new_rating, .. } if new_rating == 0.0));
    }
}
