use std::cmp::Ordering;
use serde::Serialize;
use tracing::debug;

use crate::models::{Catalog, GameRecord};
use crate::store::PlayStateStore;
use super::bands::{Severity, TierTable};

/// A rated game together with its overall position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedGame {
    pub rank: usize,
    pub rating: f64,
    pub game: GameRecord,
}

/// One non-empty band of the tier list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tier {
    pub key: String,
    pub label: String,
    pub range: String,
    pub min: f64,
    pub max: f64,
    pub midpoint: f64,
    pub severity: Severity,
    pub games: Vec<RankedGame>,
}

/// Groups every rated catalog game into its band.
///
/// Games are ranked 1..N by rating, highest first, with catalog order
/// breaking ties. Tiers come back highest band first, and bands with no
/// members are left out. A rating that no band contains still takes its
/// rank but appears in no tier.
pub fn classify(catalog: &Catalog, store: &PlayStateStore, table: &TierTable) -> Vec<Tier> {
    let mut rated: Vec<(&GameRecord, f64)> = catalog
        .iter()
        .filter_map(|game| store.get_status(&game.id).rating().map(|rating| (game, rating)))
        .collect();

    // sort_by is stable, so equal ratings keep catalog order. partial_cmp
    // treats -0.0 and 0.0 as equal, total_cmp would not.
    rated.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let mut members: Vec<Vec<RankedGame>> = vec![Vec::new(); table.len()];

    for (index, (game, rating)) in rated.into_iter().enumerate() {
        let ranked = RankedGame {
            rank: index + 1,
            rating,
            game: game.clone(),
        };

        match table.bands().iter().position(|band| band.contains(rating)) {
            Some(slot) => members[slot].push(ranked),
            None => debug!("Rating {} for game {} is outside every tier", rating, game.id),
        }
    }

    table
        .bands()
        .iter()
        .zip(members)
        .filter(|(_, games)| !games.is_empty())
        .map(|(band, games)| Tier {
            key: band.key.clone(),
            label: band.label.clone(),
            range: band.range_label(),
            min: band.min,
            max: band.max,
            midpoint: band.midpoint(),
            severity: band.severity(),
            games,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlayStatus;

    fn catalog(ids: &[&str]) -> Catalog {
        Catalog::new(ids.iter().map(|id| GameRecord::new(*id, format!("Game {}", id))))
    }

    #[test]
    fn test_ten_and_nine_point_nine_split() {
        let catalog = catalog(&["1", "2", "3"]);
        let mut store = PlayStateStore::new();
        store.set_status("2", PlayStatus::PlayedRated(10.0));
        store.set_status("3", PlayStatus::PlayedRated(9.9));

        let tiers = classify(&catalog, &store, &TierTable::default());

        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].key, "10.0");
        assert_eq!(tiers[0].games.len(), 1);
        assert_eq!(tiers[0].games[0].game.id, "2");
        assert_eq!(tiers[0].games[0].rank, 1);
        assert_eq!(tiers[1].key, "9.5-9.9");
        assert_eq!(tiers[1].games[0].game.id, "3");
        assert_eq!(tiers[1].games[0].rank, 2);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = catalog(&["a", "b", "c", "d"]);
        let mut store = PlayStateStore::new();
        store.set_status("d", PlayStatus::PlayedRated(7.0));
        store.set_status("b", PlayStatus::PlayedRated(7.0));
        store.set_status("c", PlayStatus::PlayedRated(8.0));
        store.set_status("a", PlayStatus::PlayedRated(7.0));

        let tiers = classify(&catalog, &store, &TierTable::default());
        let order: Vec<(&str, usize)> = tiers
            .iter()
            .flat_map(|tier| tier.games.iter())
            .map(|g| (g.game.id.as_str(), g.rank))
            .collect();

        assert_eq!(order, vec![("c", 1), ("a", 2), ("b", 3), ("d", 4)]);
    }

    #[test]
    fn test_only_rated_games_are_ranked() {
        let catalog = catalog(&["1", "2", "3", "4"]);
        let mut store = PlayStateStore::new();
        store.set_status("1", PlayStatus::Unplayed);
        store.set_status("2", PlayStatus::PlayedNoRating);
        store.set_status("3", PlayStatus::PlayedRated(5.2));

        let tiers = classify(&catalog, &store, &TierTable::default());

        assert_eq!(tiers.len(), 1);
        assert_eq!(tiers[0].key, "5.0-5.4");
        assert_eq!(tiers[0].games.len(), 1);
        assert_eq!(tiers[0].games[0].rank, 1);
    }

    #[test]
    fn test_out_of_range_ratings_are_dropped_silently() {
        let catalog = catalog(&["1", "2", "3", "4"]);
        let mut store = PlayStateStore::new();
        store.set_status("1", PlayStatus::PlayedRated(11.0));
        store.set_status("2", PlayStatus::PlayedRated(-2.0));
        store.set_status("3", PlayStatus::PlayedRated(9.95));
        store.set_status("4", PlayStatus::PlayedRated(6.0));

        let tiers = classify(&catalog, &store, &TierTable::default());
        let members: Vec<&str> = tiers
            .iter()
            .flat_map(|tier| tier.games.iter())
            .map(|g| g.game.id.as_str())
            .collect();

        assert_eq!(members, vec!["4"]);
        assert_eq!(tiers[0].key, "6.0-6.4");
    }

    #[test]
    fn test_store_entries_outside_catalog_are_ignored() {
        let catalog = catalog(&["1"]);
        let mut store = PlayStateStore::new();
        store.set_status("ghost", PlayStatus::PlayedRated(8.0));

        assert!(classify(&catalog, &store, &TierTable::default()).is_empty());
    }

    #[test]
    fn test_every_rated_game_lands_in_containing_tier() {
        let ids: Vec<String> = (0..=100).map(|i| i.to_string()).collect();
        let catalog = Catalog::new(ids.iter().map(|id| GameRecord::new(id.as_str(), id.as_str())));
        let mut store = PlayStateStore::new();
        for (i, id) in ids.iter().enumerate() {
            store.set_status(id, PlayStatus::PlayedRated(i as f64 / 10.0));
        }

        let tiers = classify(&catalog, &store, &TierTable::default());
        let mut ranks: Vec<usize> = Vec::new();
        for tier in &tiers {
            for member in &tier.games {
                assert!(member.rating >= tier.min && member.rating <= tier.max);
                ranks.push(member.rank);
            }
        }

        ranks.sort_unstable();
        assert_eq!(ranks, (1..=101).collect::<Vec<_>>());
        assert_eq!(tiers.len(), 16);
    }

    #[test]
    fn test_negative_zero_ties_with_zero_in_catalog_order() {
        let catalog = catalog(&["1", "2"]);
        let mut store = PlayStateStore::new();
        store.set_status("1", PlayStatus::PlayedRated(-0.0));
        store.set_status("2", PlayStatus::PlayedRated(0.0));

        let tiers = classify(&catalog, &store, &TierTable::default());
        let ranked: Vec<(&str, usize)> = tiers[0]
            .games
            .iter()
            .map(|g| (g.game.id.as_str(), g.rank))
            .collect();

        assert_eq!(ranked, vec![("1", 1), ("2", 2)]);
    }
}
