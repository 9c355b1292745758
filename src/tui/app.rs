use std::fs;
use chrono::Utc;
use tracing::{info, warn};

use crate::config::ExportSettings;
use crate::models::{GameRecord, PlayStatus, TrackerError};
use crate::search::{search, SearchHit, DEFAULT_RESULT_LIMIT};
use crate::session::Session;
use crate::tiers::{Direction, Reclassification};

const MAX_RATING_INPUT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Rating,
    Search,
    Jump,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Tracker,
    Statistics,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportKind {
    Ratings,
    StatisticsJson,
    StatisticsCsv,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

pub struct App {
    pub session: Session,
    pub export: ExportSettings,
    pub current_screen: Screen,
    pub input_mode: InputMode,
    /// Catalog position of the game on the tracker screen.
    pub current: usize,
    pub rating_input: String,
    pub search_query: String,
    pub search_selected: usize,
    pub jump_input: String,
    /// Index into the rank order on the statistics screen.
    pub selected_rank: usize,
    pub status_message: Option<StatusMessage>,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: Session, export: ExportSettings) -> Self {
        Self {
            session,
            export,
            current_screen: Screen::Tracker,
            input_mode: InputMode::Rating,
            current: 0,
            rating_input: String::new(),
            search_query: String::new(),
            search_selected: 0,
            jump_input: String::new(),
            selected_rank: 0,
            status_message: None,
            should_quit: false,
        }
    }

    pub fn current_game(&self) -> Option<&GameRecord> {
        self.session.catalog().at(self.current)
    }

    pub fn current_status(&self) -> PlayStatus {
        self.current_game()
            .map(|game| self.session.status(&game.id))
            .unwrap_or_default()
    }

    pub fn game_count(&self) -> usize {
        self.session.catalog().len()
    }

    pub fn set_info(&mut self, message: impl Into<String>) {
        self.status_message = Some(StatusMessage::Info(message.into()));
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status_message = Some(StatusMessage::Error(message.into()));
    }

    // Tracker screen

    /// Accepts digits while the input is short enough and a single dot.
    pub fn push_rating_char(&mut self, c: char) {
        if c.is_ascii_digit() && self.rating_input.len() < MAX_RATING_INPUT {
            self.rating_input.push(c);
        } else if c == '.' && !self.rating_input.contains('.') {
            if self.rating_input.is_empty() {
                self.rating_input.push('0');
            }
            self.rating_input.push('.');
        }
    }

    /// Records the typed rating, or "played" when nothing was typed.
    pub fn commit_rating(&mut self) {
        let Some(id) = self.current_game().map(|game| game.id.clone()) else {
            return;
        };

        if self.rating_input.trim().is_empty() {
            self.session.mark_played(&id);
            self.set_info("Marked as played");
        } else {
            match self.session.enter_rating(&id, &self.rating_input) {
                Ok(value) => self.set_info(format!("Rated {}", value)),
                Err(e) => {
                    warn!("Rejected rating input {:?}: {}", self.rating_input, e);
                    self.set_error(e.to_string());
                    return;
                }
            }
        }

        self.rating_input.clear();
        self.next_game();
    }

    /// Deletes the last typed character, or marks the game unplayed when
    /// there is nothing to delete.
    pub fn backspace(&mut self) {
        if self.rating_input.pop().is_some() {
            return;
        }
        let Some(id) = self.current_game().map(|game| game.id.clone()) else {
            return;
        };
        self.session.mark_unplayed(&id);
        self.set_info("Marked as not played");
        self.next_game();
    }

    pub fn next_game(&mut self) {
        if self.current + 1 < self.game_count() {
            self.current += 1;
        }
        self.rating_input.clear();
    }

    pub fn previous_game(&mut self) {
        self.current = self.current.saturating_sub(1);
        self.rating_input.clear();
    }

    pub fn open_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.search_query.clear();
        self.search_selected = 0;
    }

    pub fn search_results(&self) -> Vec<SearchHit<'_>> {
        search(self.session.catalog(), &self.search_query, DEFAULT_RESULT_LIMIT)
    }

    pub fn search_push(&mut self, c: char) {
        self.search_query.push(c);
        self.search_selected = 0;
    }

    pub fn search_pop(&mut self) {
        self.search_query.pop();
        self.search_selected = 0;
    }

    pub fn search_move(&mut self, up: bool) {
        let count = self.search_results().len();
        if up {
            self.search_selected = self.search_selected.saturating_sub(1);
        } else if self.search_selected + 1 < count {
            self.search_selected += 1;
        }
    }

    pub fn confirm_search(&mut self) {
        let target = self
            .search_results()
            .get(self.search_selected)
            .map(|hit| hit.position);
        match target {
            Some(position) => {
                self.current = position;
                self.rating_input.clear();
                self.close_input();
            }
            None => self.set_error("No matching game"),
        }
    }

    pub fn open_jump(&mut self) {
        self.input_mode = InputMode::Jump;
        self.jump_input.clear();
    }

    pub fn jump_push(&mut self, c: char) {
        if c.is_ascii_digit() {
            self.jump_input.push(c);
        }
    }

    /// Jumps to a 1-based position. Out-of-range positions are refused.
    pub fn confirm_jump(&mut self) {
        let count = self.game_count();
        match self.jump_input.parse::<usize>() {
            Ok(n) if n >= 1 && n <= count => {
                self.current = n - 1;
                self.rating_input.clear();
                self.close_input();
            }
            _ => self.set_error(format!("Enter a number between 1 and {}", count)),
        }
    }

    pub fn close_input(&mut self) {
        self.input_mode = InputMode::Rating;
    }

    // Statistics screen

    pub fn show_statistics(&mut self) {
        self.current_screen = Screen::Statistics;
        self.clamp_selection();
    }

    pub fn back_to_tracker(&mut self) {
        self.current_screen = Screen::Tracker;
    }

    pub fn selected_game_id(&self) -> Option<String> {
        self.session
            .snapshot()
            .ranked_ids()
            .get(self.selected_rank)
            .map(|id| id.to_string())
    }

    pub fn move_selection_up(&mut self) {
        self.selected_rank = self.selected_rank.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        let count = self.session.snapshot().ranked_ids().len();
        if self.selected_rank + 1 < count {
            self.selected_rank += 1;
        }
    }

    /// Moves the selected game one tier and keeps it selected.
    pub fn shift_selected(&mut self, direction: Direction) {
        let Some(id) = self.selected_game_id() else {
            return;
        };

        match self.session.shift_tier(&id, direction) {
            Ok(Some(Reclassification::Moved { to, new_rating, .. })) => {
                self.set_info(format!("Moved to {} ({})", to, new_rating));
            }
            Ok(Some(Reclassification::Unchanged { .. })) | Ok(None) => {
                self.set_info("Already at the edge of the tier list");
            }
            Err(e) => self.set_error(e.to_string()),
        }

        if let Some(rank) = self
            .session
            .snapshot()
            .ranked_ids()
            .iter()
            .position(|ranked| *ranked == id)
        {
            self.selected_rank = rank;
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let count = self.session.snapshot().ranked_ids().len();
        self.selected_rank = self.selected_rank.min(count.saturating_sub(1));
    }

    // Exports

    pub fn export(&mut self, kind: ExportKind) {
        match self.write_export(kind) {
            Ok(path) => {
                info!("Exported {}", path);
                self.set_info(format!("Saved {}", path));
            }
            Err(TrackerError::NothingToExport) => self.set_error("Nothing rated yet, nothing to export"),
            Err(e) => self.set_error(format!("Export failed: {}", e)),
        }
    }

    fn write_export(&self, kind: ExportKind) -> crate::Result<String> {
        let now = Utc::now();
        let stamp = now.format("%Y-%m-%d");
        let base_url = &self.export.site_base_url;

        let (file_name, contents) = match kind {
            ExportKind::Ratings => (self.export.ratings_file.clone(), self.session.export_ratings_csv()?),
            ExportKind::StatisticsJson => (
                format!("{}_{}.json", self.export.statistics_prefix, stamp),
                self.session.export_statistics_json(base_url, now)?,
            ),
            ExportKind::StatisticsCsv => (
                format!("{}_{}.csv", self.export.statistics_prefix, stamp),
                self.session.export_statistics_csv(base_url, now)?,
            ),
        };

        let path = self.export.path_for(&file_name);
        fs::write(&path, contents)?;
        Ok(path.display().to_string())
    }
}
