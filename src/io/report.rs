use std::io::Write;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;

use crate::models::{Result, TrackerError};
use crate::tiers::{Statistics, Tier};

/// Snapshot of the tier list for sharing. Not meant to be read back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsReport {
    pub export_date: DateTime<Utc>,
    pub summary: Statistics,
    pub tier_list: Vec<TierReport>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierReport {
    pub tier_key: String,
    pub tier_label: String,
    pub tier_range: String,
    pub game_count: usize,
    pub games: Vec<GameReport>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameReport {
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub year: Option<i32>,
    pub student_rating: f64,
    pub bgg_rank: Option<u32>,
    pub bgg_average: Option<f64>,
    pub bgg_bayes_average: Option<f64>,
    pub users_rated: Option<u64>,
    pub url: Option<String>,
    pub thumbnail: Option<String>,
    pub image_url: Option<String>,
}

impl StatisticsReport {
    /// Fails with `NothingToExport` when no game made it into a tier.
    pub fn build(
        tiers: &[Tier],
        summary: Statistics,
        site_base_url: &str,
        export_date: DateTime<Utc>,
    ) -> Result<Self> {
        if tiers.is_empty() {
            return Err(TrackerError::NothingToExport);
        }

        let tier_list = tiers
            .iter()
            .map(|tier| TierReport {
                tier_key: tier.key.clone(),
                tier_label: tier.label.clone(),
                tier_range: tier.range.clone(),
                game_count: tier.games.len(),
                games: tier
                    .games
                    .iter()
                    .map(|member| GameReport {
                        rank: member.rank,
                        id: member.game.id.clone(),
                        name: member.game.name.clone(),
                        year: member.game.year,
                        student_rating: member.rating,
                        bgg_rank: member.game.rank,
                        bgg_average: member.game.average,
                        bgg_bayes_average: member.game.bayes_average,
                        users_rated: member.game.users_rated,
                        url: member.game.page_url(site_base_url),
                        thumbnail: member.game.thumbnail.clone(),
                        image_url: member.game.image_url.clone(),
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            export_date,
            summary,
            tier_list,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Flat `Rank,Name,...` table, one line per rated game in rank order.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = WriterBuilder::new().from_writer(writer);
        csv.write_record([
            "Rank",
            "Name",
            "Year",
            "Rating",
            "Tier",
            "BGG Rank",
            "BGG Average",
            "BGG Bayes Average",
            "Users Rated",
            "URL",
        ])?;

        let mut rows: Vec<(&TierReport, &GameReport)> = self
            .tier_list
            .iter()
            .flat_map(|tier| tier.games.iter().map(move |game| (tier, game)))
            .collect();
        rows.sort_by_key(|(_, game)| game.rank);

        fn opt<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(ToString::to_string).unwrap_or_default()
        }

        for (tier, game) in rows {
            csv.write_record([
                game.rank.to_string(),
                game.name.clone(),
                opt(&game.year),
                game.student_rating.to_string(),
                tier.tier_label.clone(),
                opt(&game.bgg_rank),
                opt(&game.bgg_average),
                opt(&game.bgg_bayes_average),
                opt(&game.users_rated),
                opt(&game.url),
            ])?;
        }

        csv.flush()?;
        Ok(())
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut out = Vec::new();
        self.write_csv(&mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}
