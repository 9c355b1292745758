use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{round_rating, Result, TrackerError, MAX_RATING, MIN_RATING};

/// A closed rating range `[min, max]` with a display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierBand {
    pub key: String,
    pub label: String,
    pub min: f64,
    pub max: f64,
}

impl TierBand {
    pub fn new(key: &str, label: &str, min: f64, max: f64) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            min,
            max,
        }
    }

    pub fn contains(&self, rating: f64) -> bool {
        rating >= self.min && rating <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        self.min + (self.max - self.min) / 2.0
    }

    /// `"10"` for a single-value band, `"9.5-9.9"` otherwise.
    pub fn range_label(&self) -> String {
        if self.min == self.max {
            format!("{}", self.min)
        } else {
            format!("{}-{}", self.min, self.max)
        }
    }

    /// Rating a game receives when it is moved into this band.
    pub fn entry_rating(&self) -> f64 {
        round_rating(self.min)
    }

    pub fn severity(&self) -> Severity {
        Severity::from_rating(self.midpoint())
    }
}

/// Coarse colour class for a rating, shared by every tier view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Outstanding, // 9-10
    Great,       // 8-8.9
    Good,        // 7-7.9
    Fair,        // 6-6.9
    Weak,        // 5-5.9
    Poor,        // below 5
}

impl Severity {
    pub fn from_rating(rating: f64) -> Self {
        match rating {
            r if r >= 9.0 => Severity::Outstanding,
            r if r >= 8.0 => Severity::Great,
            r if r >= 7.0 => Severity::Good,
            r if r >= 6.0 => Severity::Fair,
            r if r >= 5.0 => Severity::Weak,
            _ => Severity::Poor,
        }
    }

    pub fn hex_color(&self) -> &'static str {
        match self {
            Severity::Outstanding => "#10b981",
            Severity::Great => "#3b82f6",
            Severity::Good => "#8b5cf6",
            Severity::Fair => "#f59e0b",
            Severity::Weak => "#ef4444",
            Severity::Poor => "#6b7280",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Ordered, non-overlapping set of bands, highest first.
#[derive(Debug, Clone, PartialEq)]
pub struct TierTable {
    bands: Vec<TierBand>,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            bands: Self::default_bands(),
        }
    }
}

impl TierTable {
    pub fn new(bands: Vec<TierBand>) -> Result<Self> {
        Self::validate(&bands)?;
        Ok(Self { bands })
    }

    pub fn default_bands() -> Vec<TierBand> {
        vec![
            TierBand::new("10.0", "S+ Tier", 10.0, 10.0),
            TierBand::new("9.5-9.9", "S Tier", 9.5, 9.9),
            TierBand::new("9.0-9.4", "S- Tier", 9.0, 9.4),
            TierBand::new("8.5-8.9", "A+ Tier", 8.5, 8.9),
            TierBand::new("8.0-8.4", "A Tier", 8.0, 8.4),
            TierBand::new("7.5-7.9", "A- Tier", 7.5, 7.9),
            TierBand::new("7.0-7.4", "B+ Tier", 7.0, 7.4),
            TierBand::new("6.5-6.9", "B Tier", 6.5, 6.9),
            TierBand::new("6.0-6.4", "B- Tier", 6.0, 6.4),
            TierBand::new("5.5-5.9", "C+ Tier", 5.5, 5.9),
            TierBand::new("5.0-5.4", "C Tier", 5.0, 5.4),
            TierBand::new("4.5-4.9", "C- Tier", 4.5, 4.9),
            TierBand::new("4.0-4.4", "D+ Tier", 4.0, 4.4),
            TierBand::new("3.5-3.9", "D Tier", 3.5, 3.9),
            TierBand::new("3.0-3.4", "D- Tier", 3.0, 3.4),
            TierBand::new("0-2.9", "F Tier", 0.0, 2.9),
        ]
    }

    fn validate(bands: &[TierBand]) -> Result<()> {
        if bands.is_empty() {
            return Err(TrackerError::InvalidTierTable("no bands defined".to_string()));
        }

        let mut keys = HashSet::new();
        for band in bands {
            if band.key.trim().is_empty() {
                return Err(TrackerError::InvalidTierTable(format!(
                    "band {:?} has an empty key",
                    band.label
                )));
            }
            if !keys.insert(band.key.as_str()) {
                return Err(TrackerError::InvalidTierTable(format!(
                    "duplicate band key {}",
                    band.key
                )));
            }
            if !band.min.is_finite() || !band.max.is_finite() || band.min > band.max {
                return Err(TrackerError::InvalidTierTable(format!(
                    "band {} has an empty range [{}, {}]",
                    band.key, band.min, band.max
                )));
            }
            if band.min < MIN_RATING || band.max > MAX_RATING {
                return Err(TrackerError::InvalidTierTable(format!(
                    "band {} lies outside [{}, {}]",
                    band.key, MIN_RATING, MAX_RATING
                )));
            }
            // A game moved into the band must classify back into it
            if !band.contains(band.entry_rating()) {
                return Err(TrackerError::InvalidTierTable(format!(
                    "band {} does not contain its own entry rating {}",
                    band.key,
                    band.entry_rating()
                )));
            }
        }

        for pair in bands.windows(2) {
            let (higher, lower) = (&pair[0], &pair[1]);
            if lower.max >= higher.min {
                return Err(TrackerError::InvalidTierTable(format!(
                    "band {} overlaps or is not below band {}",
                    lower.key, higher.key
                )));
            }
        }

        Ok(())
    }

    /// First band, scanning high to low, whose range contains `rating`.
    pub fn band_for(&self, rating: f64) -> Option<&TierBand> {
        self.bands.iter().find(|band| band.contains(rating))
    }

    pub fn get(&self, key: &str) -> Option<&TierBand> {
        self.bands.iter().find(|band| band.key == key)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.bands.iter().position(|band| band.key == key)
    }

    /// The band directly above or below `key`, if there is one.
    pub fn neighbour(&self, key: &str, direction: Direction) -> Option<&TierBand> {
        let position = self.position(key)?;
        match direction {
            Direction::Up => position.checked_sub(1).and_then(|p| self.bands.get(p)),
            Direction::Down => self.bands.get(position + 1),
        }
    }

    pub fn bands(&self) -> &[TierBand] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        let bands = TierTable::default_bands();
        assert_eq!(bands.len(), 16);
        assert!(TierTable::new(bands).is_ok());
    }

    #[test]
    fn test_ten_is_its_own_band() {
        let table = TierTable::default();
        assert_eq!(table.band_for(10.0).unwrap().key, "10.0");
        assert_eq!(table.band_for(9.9).unwrap().key, "9.5-9.9");
        assert_eq!(table.band_for(9.5).unwrap().key, "9.5-9.9");
        assert_eq!(table.band_for(0.0).unwrap().key, "0-2.9");
        assert_eq!(table.band_for(2.9).unwrap().key, "0-2.9");
    }

    #[test]
    fn test_values_outside_any_band() {
        let table = TierTable::default();
        assert!(table.band_for(-0.5).is_none());
        assert!(table.band_for(10.5).is_none());
        assert!(table.band_for(9.95).is_none());
        assert!(table.band_for(f64::NAN).is_none());
    }

    #[test]
    fn test_range_label_and_midpoint() {
        let table = TierTable::default();
        let top = table.get("10.0").unwrap();
        let a = table.get("8.0-8.4").unwrap();
        let f = table.get("0-2.9").unwrap();

        assert_eq!(top.range_label(), "10");
        assert_eq!(a.range_label(), "8-8.4");
        assert_eq!(f.range_label(), "0-2.9");
        assert!((a.midpoint() - 8.2).abs() < 1e-9);
        assert_eq!(top.severity(), Severity::Outstanding);
        assert_eq!(f.severity(), Severity::Poor);
    }

    #[test]
    fn test_neighbours() {
        let table = TierTable::default();
        assert_eq!(table.neighbour("9.5-9.9", Direction::Up).unwrap().key, "10.0");
        assert_eq!(table.neighbour("9.5-9.9", Direction::Down).unwrap().key, "9.0-9.4");
        assert!(table.neighbour("10.0", Direction::Up).is_none());
        assert!(table.neighbour("0-2.9", Direction::Down).is_none());
        assert!(table.neighbour("nope", Direction::Up).is_none());
    }

    #[test]
    fn test_rejects_overlapping_bands() {
        let result = TierTable::new(vec![
            TierBand::new("high", "High", 5.0, 10.0),
            TierBand::new("low", "Low", 0.0, 5.0),
        ]);
        assert!(matches!(result, Err(TrackerError::InvalidTierTable(_))));
    }

    #[test]
    fn test_rejects_out_of_scale_and_unordered_bands() {
        assert!(TierTable::new(vec![TierBand::new("x", "X", 5.0, 11.0)]).is_err());
        assert!(TierTable::new(vec![TierBand::new("x", "X", 6.0, 5.0)]).is_err());
        assert!(TierTable::new(vec![]).is_err());
        assert!(TierTable::new(vec![
            TierBand::new("low", "Low", 0.0, 4.9),
            TierBand::new("high", "High", 5.0, 10.0),
        ])
        .is_err());
        assert!(TierTable::new(vec![
            TierBand::new("same", "A", 5.0, 10.0),
            TierBand::new("same", "B", 0.0, 4.9),
        ])
        .is_err());
    }

    #[test]
    fn test_rejects_band_missing_its_entry_rating() {
        // 2.95 rounds to 3.0 which lies above the band
        let result = TierTable::new(vec![TierBand::new("odd", "Odd", 2.95, 2.99)]);
        assert!(result.is_err());
    }
}
