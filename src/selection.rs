//! Builds a smaller catalog out of a full ranking dump.
//!
//! For each popularity metric the best games are taken separately for older
//! and recent releases, so recent games with fewer votes still make it in.

use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{Catalog, GameRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    BayesAverage,
    Average,
    UsersRated,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::BayesAverage, Metric::Average, Metric::UsersRated];

    /// Missing values count as zero.
    pub fn value(&self, game: &GameRecord) -> f64 {
        match self {
            Metric::BayesAverage => game.bayes_average.unwrap_or(0.0),
            Metric::Average => game.average.unwrap_or(0.0),
            Metric::UsersRated => game.users_rated.unwrap_or(0) as f64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionCriteria {
    /// Games per metric published before `recent_year`.
    pub top: usize,
    /// Games per metric published in or after `recent_year`.
    pub top_recent: usize,
    pub recent_year: i32,
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            top: 500,
            top_recent: 1000,
            recent_year: 2020,
        }
    }
}

fn top_ids<'a>(catalog: &'a Catalog, metric: Metric, criteria: &SelectionCriteria) -> HashSet<&'a str> {
    let mut sorted: Vec<&GameRecord> = catalog.iter().collect();
    sorted.sort_by(|a, b| metric.value(b).total_cmp(&metric.value(a)));

    let is_recent = |game: &GameRecord| game.year.unwrap_or(0) >= criteria.recent_year;

    let older = sorted.iter().filter(|game| !is_recent(game)).take(criteria.top);
    let recent = sorted.iter().filter(|game| is_recent(game)).take(criteria.top_recent);

    older.chain(recent).map(|game| game.id.as_str()).collect()
}

/// Union of the per-metric selections, in original catalog order.
pub fn select_games(catalog: &Catalog, criteria: &SelectionCriteria) -> Catalog {
    let selected: HashSet<&str> = Metric::ALL
        .iter()
        .flat_map(|metric| top_ids(catalog, *metric, criteria))
        .collect();

    let result = Catalog::new(
        catalog
            .iter()
            .filter(|game| selected.contains(game.id.as_str()))
            .cloned(),
    )
    .with_columns(catalog.columns().to_vec());

    info!(
        "Selected {} of {} games (top {}, top {} from {} on)",
        result.len(),
        catalog.len(),
        criteria.top,
        criteria.top_recent,
        criteria.recent_year
    );
    result
}
