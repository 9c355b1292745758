use std::collections::HashMap;
use std::fmt;
use serde::Serialize;
use tracing::debug;

use crate::models::{Catalog, PlayStatus};

/// Notification sent to store listeners after a mutation has been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreChange {
    StatusSet { game_id: String, status: PlayStatus },
    Imported { applied: usize },
}

pub type StoreListener = Box<dyn Fn(&StoreChange)>;

/// One line of the progress export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Played")]
    pub played: String,
}

/// Authoritative `game id -> PlayStatus` mapping for the session.
///
/// The store is permissive: it accepts any status for any id, including ids
/// that are not in the current catalog. Range checks on typed ratings happen
/// before a value gets here.
#[derive(Default)]
pub struct PlayStateStore {
    statuses: HashMap<String, PlayStatus>,
    revision: u64,
    listeners: Vec<StoreListener>,
}

impl fmt::Debug for PlayStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayStateStore")
            .field("statuses", &self.statuses)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl PlayStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener that is called after every mutation.
    pub fn subscribe(&mut self, listener: StoreListener) {
        self.listeners.push(listener);
    }

    /// Replaces the status for `game_id`. Setting `Unrated` drops the entry.
    pub fn set_status(&mut self, game_id: &str, status: PlayStatus) {
        match status {
            PlayStatus::Unrated => {
                self.statuses.remove(game_id);
            }
            status => {
                self.statuses.insert(game_id.to_string(), status);
            }
        }
        self.revision += 1;

        self.notify(&StoreChange::StatusSet {
            game_id: game_id.to_string(),
            status,
        });
    }

    pub fn get_status(&self, game_id: &str) -> PlayStatus {
        self.statuses.get(game_id).copied().unwrap_or_default()
    }

    /// Merges many entries in one step. Listeners hear about the import only
    /// once every entry has been applied.
    pub fn bulk_import<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (String, PlayStatus)>,
    {
        let mut applied = 0;
        for (game_id, status) in entries {
            match status {
                PlayStatus::Unrated => {
                    self.statuses.remove(&game_id);
                }
                status => {
                    self.statuses.insert(game_id, status);
                }
            }
            applied += 1;
        }
        self.revision += 1;
        debug!("Imported {} play statuses", applied);

        self.notify(&StoreChange::Imported { applied });
        applied
    }

    /// One row per catalog game, in catalog order, whether or not the game
    /// was ever touched.
    pub fn to_export_rows(&self, catalog: &Catalog) -> Vec<ExportRow> {
        catalog
            .iter()
            .map(|game| ExportRow {
                id: game.id.clone(),
                name: game.name.clone(),
                played: self.get_status(&game.id).to_played_field(),
            })
            .collect()
    }

    /// Rows for rewriting a progress file: the catalog rows followed by
    /// entries for ids outside the catalog, sorted by id, so statuses for
    /// games the catalog no longer lists survive the rewrite.
    pub fn to_progress_rows(&self, catalog: &Catalog) -> Vec<ExportRow> {
        let mut rows = self.to_export_rows(catalog);

        let mut orphans: Vec<(&str, &PlayStatus)> = self
            .entries()
            .filter(|(id, _)| !catalog.contains(id))
            .collect();
        orphans.sort_by(|a, b| a.0.cmp(b.0));

        rows.extend(orphans.into_iter().map(|(id, status)| ExportRow {
            id: id.to_string(),
            name: String::new(),
            played: status.to_played_field(),
        }));
        rows
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &PlayStatus)> {
        self.statuses.iter().map(|(id, status)| (id.as_str(), status))
    }

    pub fn statuses(&self) -> impl Iterator<Item = &PlayStatus> {
        self.statuses.values()
    }

    /// Counts mutations; derived views compare it to detect staleness.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    fn notify(&self, change: &StoreChange) {
        for listener in &self.listeners {
            listener(change);
        }
    }
}
