use serde::{Deserialize, Serialize};

use crate::models::{round_rating, Catalog, PlayStatus};
use crate::store::PlayStateStore;

/// Summary figures shown above the tier list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_rated: usize,
    pub total_played: usize,
    /// Mean rating to one decimal, `0.0` when nothing is rated.
    pub average_rating: f64,
    /// Highest rating, `0.0` when nothing is rated.
    pub top_rating: f64,
}

/// Figures over every stored status, including ids outside the catalog.
pub fn aggregate(store: &PlayStateStore) -> Statistics {
    summarize(store.statuses().copied())
}

/// Figures over catalog games only, matching what the tier list can show.
pub fn aggregate_catalog(catalog: &Catalog, store: &PlayStateStore) -> Statistics {
    summarize(catalog.iter().map(|game| store.get_status(&game.id)))
}

fn summarize(statuses: impl Iterator<Item = PlayStatus>) -> Statistics {
    let mut ratings = Vec::new();
    let mut total_played = 0;
    for status in statuses {
        if status.is_played() {
            total_played += 1;
        }
        if let Some(rating) = status.rating() {
            ratings.push(rating);
        }
    }

    if ratings.is_empty() {
        return Statistics {
            total_played,
            ..Statistics::default()
        };
    }

    let sum: f64 = ratings.iter().sum();
    let top = ratings.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Statistics {
        total_rated: ratings.len(),
        total_played,
        average_rating: round_rating(sum / ratings.len() as f64),
        top_rating: top,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GameRecord;

    #[test]
    fn test_empty_store_uses_zero_sentinels() {
        let stats = aggregate(&PlayStateStore::new());

        assert_eq!(stats, Statistics::default());
        assert!(!stats.average_rating.is_nan());
    }

    #[test]
    fn test_average_of_seven_eight_nine() {
        let mut store = PlayStateStore::new();
        store.set_status("a", PlayStatus::PlayedRated(7.0));
        store.set_status("b", PlayStatus::PlayedRated(8.0));
        store.set_status("c", PlayStatus::PlayedRated(9.0));

        let stats = aggregate(&store);
        assert_eq!(stats.total_rated, 3);
        assert_eq!(stats.average_rating, 8.0);
        assert_eq!(stats.top_rating, 9.0);
    }

    #[test]
    fn test_played_counts_rated_and_unrated_plays() {
        let mut store = PlayStateStore::new();
        store.set_status("a", PlayStatus::PlayedRated(6.5));
        store.set_status("b", PlayStatus::PlayedNoRating);
        store.set_status("c", PlayStatus::Unplayed);
        store.set_status("d", PlayStatus::PlayedNoRating);

        let stats = aggregate(&store);
        assert_eq!(stats.total_rated, 1);
        assert_eq!(stats.total_played, 3);
        assert_eq!(stats.average_rating, 6.5);
        assert_eq!(stats.top_rating, 6.5);
    }

    #[test]
    fn test_average_is_rounded_to_one_decimal() {
        let mut store = PlayStateStore::new();
        store.set_status("a", PlayStatus::PlayedRated(7.0));
        store.set_status("b", PlayStatus::PlayedRated(7.5));
        store.set_status("c", PlayStatus::PlayedRated(8.0));
        store.set_status("d", PlayStatus::PlayedRated(8.2));

        // 30.7 / 4 = 7.675
        assert_eq!(aggregate(&store).average_rating, 7.7);
    }

    #[test]
    fn test_catalog_statistics_ignore_unknown_ids() {
        let catalog = Catalog::new(vec![GameRecord::new("1", "Azul"), GameRecord::new("2", "Brass")]);
        let mut store = PlayStateStore::new();
        store.set_status("1", PlayStatus::PlayedRated(6.0));
        store.set_status("2", PlayStatus::PlayedNoRating);
        store.set_status("999", PlayStatus::PlayedRated(10.0));

        let everything = aggregate(&store);
        assert_eq!(everything.total_rated, 2);
        assert_eq!(everything.top_rating, 10.0);

        let listed = aggregate_catalog(&catalog, &store);
        assert_eq!(listed.total_rated, 1);
        assert_eq!(listed.total_played, 2);
        assert_eq!(listed.average_rating, 6.0);
        assert_eq!(listed.top_rating, 6.0);
    }
}
