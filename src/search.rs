use crate::models::{Catalog, GameRecord};

pub const DEFAULT_RESULT_LIMIT: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    /// Catalog position, for jumping straight to the game.
    pub position: usize,
    pub score: u32,
    pub game: &'a GameRecord,
}

/// How well `game` matches an already lower-cased, trimmed query.
pub fn match_score(game: &GameRecord, query: &str) -> u32 {
    let name = game.name.to_lowercase();

    if name == query {
        return 100;
    }
    if name.starts_with(query) {
        return 90;
    }
    if name.contains(query) {
        return 70;
    }
    if game.year.is_some_and(|year| year.to_string() == query) {
        return 60;
    }

    // Every query character appears in the name, in order
    let mut wanted = query.chars().peekable();
    for c in name.chars() {
        if wanted.peek() == Some(&c) {
            wanted.next();
        }
    }
    if wanted.peek().is_none() {
        return 40;
    }

    0
}

/// Best matches first; equally good matches keep catalog order.
pub fn search<'a>(catalog: &'a Catalog, query: &str, limit: usize) -> Vec<SearchHit<'a>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit> = catalog
        .iter()
        .enumerate()
        .map(|(position, game)| SearchHit {
            position,
            score: match_score(game, &query),
            game,
        })
        .filter(|hit| hit.score > 0)
        .collect();

    hits.sort_by(|a, b| b.score.cmp(&a.score));
    hits.truncate(limit);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            GameRecord::new("1", "Terraforming Mars").with_year(2016),
            GameRecord::new("2", "Mars Open").with_year(2020),
            GameRecord::new("3", "Mars").with_year(2016),
            GameRecord::new("4", "Spirit Island").with_year(2017),
            GameRecord::new("5", "Massive Darkness").with_year(2017),
        ])
    }

    #[test]
    fn test_scores() {
        let game = GameRecord::new("1", "Spirit Island").with_year(2017);
        assert_eq!(match_score(&game, "spirit island"), 100);
        assert_eq!(match_score(&game, "spir"), 90);
        assert_eq!(match_score(&game, "island"), 70);
        assert_eq!(match_score(&game, "2017"), 60);
        assert_eq!(match_score(&game, "sisl"), 40);
        assert_eq!(match_score(&game, "xyz"), 0);
    }

    #[test]
    fn test_search_orders_by_score() {
        let catalog = catalog();
        let ids: Vec<&str> = search(&catalog, "  MARS ", 8).iter().map(|h| h.game.id.as_str()).collect();

        assert_eq!(ids, vec!["3", "2", "1", "5"]);
    }

    #[test]
    fn test_search_limit_and_empty_query() {
        let catalog = catalog();
        assert_eq!(search(&catalog, "a", 2).len(), 2);
        assert!(search(&catalog, "   ", 8).is_empty());
        assert_eq!(search(&catalog, "2016", 8)[0].position, 0);
    }
}
