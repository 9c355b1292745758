use serde::{Deserialize, Serialize};

use super::{Result, TrackerError};

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;

/// What the user has recorded about a single game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "status", content = "rating", rename_all = "snake_case")]
pub enum PlayStatus {
    /// Nothing recorded yet.
    #[default]
    Unrated,
    Unplayed,
    PlayedNoRating,
    PlayedRated(f64),
}

impl PlayStatus {
    pub fn rating(&self) -> Option<f64> {
        match self {
            PlayStatus::PlayedRated(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_played(&self) -> bool {
        matches!(self, PlayStatus::PlayedNoRating | PlayStatus::PlayedRated(_))
    }

    pub fn is_rated(&self) -> bool {
        matches!(self, PlayStatus::PlayedRated(_))
    }

    /// Encoding used by the `Played` column of progress files.
    pub fn to_played_field(&self) -> String {
        match self {
            PlayStatus::Unrated => String::new(),
            PlayStatus::Unplayed => "No".to_string(),
            PlayStatus::PlayedNoRating => "Yes".to_string(),
            PlayStatus::PlayedRated(value) => value.to_string(),
        }
    }

    /// Decodes a `Played` column value. Empty and unrecognised values
    /// yield `None` so the caller leaves the existing status alone.
    pub fn from_played_field(field: &str) -> Option<Self> {
        match field.trim() {
            "" => None,
            "No" => Some(PlayStatus::Unplayed),
            "Yes" => Some(PlayStatus::PlayedNoRating),
            other => other
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                // "-0" reads as negative zero; store it as plain zero
                .map(|value| PlayStatus::PlayedRated(value + 0.0)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            PlayStatus::Unrated => "Not recorded".to_string(),
            PlayStatus::Unplayed => "Not played".to_string(),
            PlayStatus::PlayedNoRating => "Played".to_string(),
            PlayStatus::PlayedRated(value) => format!("Played, your rating: {}", value),
        }
    }
}

/// Rounds to one decimal place, the precision ratings are stored at.
pub fn round_rating(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn validate_rating(value: f64) -> Result<f64> {
    if !value.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&value) {
        return Err(TrackerError::InvalidRating(value));
    }
    Ok(value)
}

/// Parses what the user typed as a rating: must be a number in `[0, 10]`,
/// stored rounded to one decimal.
pub fn parse_rating_input(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| TrackerError::UnparseableRating(trimmed.to_string()))?;

    validate_rating(value).map(round_rating)
}
