use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// One row of the game catalog.
///
/// Only `id`, `name` and `year` mean anything to the tracker; the remaining
/// fields are carried through to exports untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GameRecord {
    pub id: String,
    pub name: String,
    pub year: Option<i32>,

    // External ranking metadata
    pub rank: Option<u32>,
    pub average: Option<f64>,
    pub bayes_average: Option<f64>,
    pub users_rated: Option<u64>,

    // Links
    pub url: Option<String>,
    pub thumbnail: Option<String>,
    pub image_url: Option<String>,

    /// Columns the catalog carries that have no dedicated field.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl GameRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// `"Name (Year)"`, or just the name when the year is unknown.
    pub fn display_title(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.name, year),
            None => self.name.clone(),
        }
    }

    /// Absolute link to the game's page, joining the catalog's relative URL
    /// onto `base_url`.
    pub fn page_url(&self, base_url: &str) -> Option<String> {
        self.url.as_ref().map(|path| {
            if path.starts_with("http://") || path.starts_with("https://") {
                path.clone()
            } else {
                format!("{}{}", base_url.trim_end_matches('/'), path)
            }
        })
    }
}

/// Ordered, read-only list of games with lookup by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    games: Vec<GameRecord>,
    index: HashMap<String, usize>,
    /// Header of the file the catalog was read from, in file order.
    columns: Vec<String>,
}

impl Catalog {
    /// Builds a catalog, keeping the first record for any repeated id.
    pub fn new(records: impl IntoIterator<Item = GameRecord>) -> Self {
        let mut games = Vec::new();
        let mut index = HashMap::new();

        for record in records {
            if index.contains_key(&record.id) {
                warn!("Duplicate game id {} ({}) ignored", record.id, record.name);
                continue;
            }
            index.insert(record.id.clone(), games.len());
            games.push(record);
        }

        Self {
            games,
            index,
            columns: Vec::new(),
        }
    }

    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    /// Source column order, empty when the catalog was built in memory.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn get(&self, id: &str) -> Option<&GameRecord> {
        self.index.get(id).map(|&i| &self.games[i])
    }

    /// Catalog position of `id`, used as the rank tie-breaker.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn at(&self, position: usize) -> Option<&GameRecord> {
        self.games.get(position)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameRecord> {
        self.games.iter()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}
