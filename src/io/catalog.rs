use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use tracing::{debug, info, warn};

use crate::models::{Catalog, GameRecord, Result, TrackerError};

pub const COL_ID: &str = "ID";
pub const COL_NAME: &str = "Name";
pub const COL_YEAR: &str = "Year";
pub const COL_RANK: &str = "Rank";
pub const COL_AVERAGE: &str = "Average";
pub const COL_BAYES_AVERAGE: &str = "Bayes average";
pub const COL_USERS_RATED: &str = "Users rated";
pub const COL_URL: &str = "URL";
pub const COL_THUMBNAIL: &str = "Thumbnail";
pub const COL_IMAGE_URL: &str = "ImageURL";

const KNOWN_COLUMNS: [&str; 10] = [
    COL_ID,
    COL_NAME,
    COL_YEAR,
    COL_RANK,
    COL_AVERAGE,
    COL_BAYES_AVERAGE,
    COL_USERS_RATED,
    COL_URL,
    COL_THUMBNAIL,
    COL_IMAGE_URL,
];

/// Maps header names to column positions.
pub(crate) struct HeaderIndex {
    names: Vec<String>,
}

impl HeaderIndex {
    pub(crate) fn new(headers: &StringRecord) -> Self {
        let names = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        Self { names }
    }

    pub(crate) fn position(&self, column: &str) -> Option<usize> {
        self.names.iter().position(|name| name == column)
    }

    pub(crate) fn require(&self, column: &'static str) -> Result<usize> {
        self.position(column).ok_or(TrackerError::MissingColumn(column))
    }

    /// Non-empty value of `column` in `record`.
    pub(crate) fn field<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        self.position(column)
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Reads a catalog from CSV text with a header row.
///
/// Rows without an `ID` or `Name` are dropped. Fields that fail to parse are
/// treated as absent rather than failing the row.
pub fn parse_catalog<R: Read>(reader: R) -> Result<Catalog> {
    let mut csv = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = HeaderIndex::new(csv.headers()?);
    headers.require(COL_ID)?;
    headers.require(COL_NAME)?;

    let extra_columns: Vec<(usize, String)> = headers
        .names
        .iter()
        .enumerate()
        .filter(|(_, name)| !name.is_empty() && !KNOWN_COLUMNS.contains(&name.as_str()))
        .map(|(i, name)| (i, name.clone()))
        .collect();

    let mut records = Vec::new();
    let mut dropped = 0;

    for (line, result) in csv.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable catalog row {}: {}", line + 2, e);
                dropped += 1;
                continue;
            }
        };

        let (Some(id), Some(name)) = (
            headers.field(&record, COL_ID),
            headers.field(&record, COL_NAME),
        ) else {
            debug!("Catalog row {} has no ID or Name", line + 2);
            dropped += 1;
            continue;
        };

        let parse = |column: &str| headers.field(&record, column);

        let mut extra = BTreeMap::new();
        for (i, column) in &extra_columns {
            if let Some(value) = record.get(*i).filter(|v| !v.is_empty()) {
                extra.insert(column.clone(), value.to_string());
            }
        }

        records.push(GameRecord {
            id: id.to_string(),
            name: name.to_string(),
            year: parse(COL_YEAR).and_then(|v| v.parse().ok()),
            rank: parse(COL_RANK).and_then(|v| v.parse().ok()),
            average: parse(COL_AVERAGE).and_then(|v| v.parse().ok()),
            bayes_average: parse(COL_BAYES_AVERAGE).and_then(|v| v.parse().ok()),
            users_rated: parse(COL_USERS_RATED).and_then(|v| v.parse().ok()),
            url: parse(COL_URL).map(str::to_string),
            thumbnail: parse(COL_THUMBNAIL).map(str::to_string),
            image_url: parse(COL_IMAGE_URL).map(str::to_string),
            extra,
        });
    }

    let columns = headers.names.iter().filter(|name| !name.is_empty()).cloned().collect();
    let catalog = Catalog::new(records).with_columns(columns);
    info!("Loaded {} games ({} rows dropped)", catalog.len(), dropped);
    Ok(catalog)
}

pub fn parse_catalog_str(text: &str) -> Result<Catalog> {
    parse_catalog(text.as_bytes())
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn column_value(game: &GameRecord, column: &str) -> String {
    match column {
        COL_ID => game.id.clone(),
        COL_NAME => game.name.clone(),
        COL_YEAR => opt(&game.year),
        COL_RANK => opt(&game.rank),
        COL_AVERAGE => opt(&game.average),
        COL_BAYES_AVERAGE => opt(&game.bayes_average),
        COL_USERS_RATED => opt(&game.users_rated),
        COL_URL => opt(&game.url),
        COL_THUMBNAIL => opt(&game.thumbnail),
        COL_IMAGE_URL => opt(&game.image_url),
        other => game.extra.get(other).cloned().unwrap_or_default(),
    }
}

/// Writes a catalog back out. A catalog read from a file keeps that file's
/// columns and their order; one built in memory gets the standard columns
/// followed by any extra columns the records carry.
pub fn write_catalog<W: Write>(catalog: &Catalog, writer: W) -> Result<()> {
    let header: Vec<&str> = if catalog.columns().is_empty() {
        let extra_columns: BTreeSet<&str> = catalog
            .iter()
            .flat_map(|game| game.extra.keys().map(String::as_str))
            .collect();
        KNOWN_COLUMNS.iter().copied().chain(extra_columns).collect()
    } else {
        catalog.columns().iter().map(String::as_str).collect()
    };

    let mut csv = WriterBuilder::new().from_writer(writer);
    csv.write_record(&header)?;

    for game in catalog.iter() {
        csv.write_record(header.iter().map(|column| column_value(game, column)))?;
    }

    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
ID,Name,Year,Rank,Average,Bayes average,Users rated,URL,Thumbnail,ImageURL,Designer
224517,Brass: Birmingham,2018,1,8.6,8.4,45000,/boardgame/224517/brass-birmingham,thumb.jpg,image.jpg,Wallace

161936,\"Pandemic Legacy: Season 1\",2015,2,8.5,8.3,50000,/boardgame/161936,t.jpg,i.jpg,
,No Id,2000,,,,,,,,
999,,2000,,,,,,,,
342942,Ark Nova,unknown,3,n/a,8.2,30000,,,,
";

    #[test]
    fn test_parse_catalog_keeps_valid_rows_in_order() {
        let catalog = parse_catalog_str(SAMPLE).unwrap();

        let ids: Vec<&str> = catalog.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["224517", "161936", "342942"]);

        let brass = catalog.get("224517").unwrap();
        assert_eq!(brass.name, "Brass: Birmingham");
        assert_eq!(brass.year, Some(2018));
        assert_eq!(brass.rank, Some(1));
        assert_eq!(brass.users_rated, Some(45000));
        assert_eq!(brass.extra.get("Designer").map(String::as_str), Some("Wallace"));
    }

    #[test]
    fn test_bad_fields_become_absent() {
        let catalog = parse_catalog_str(SAMPLE).unwrap();
        let ark = catalog.get("342942").unwrap();

        assert_eq!(ark.year, None);
        assert_eq!(ark.average, None);
        assert_eq!(ark.bayes_average, Some(8.2));
        assert_eq!(ark.url, None);
    }

    #[test]
    fn test_missing_required_column() {
        let result = parse_catalog_str("Name,Year\nAzul,2017\n");
        assert!(matches!(result, Err(TrackerError::MissingColumn("ID"))));
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let catalog = parse_catalog_str("\u{feff}ID,Name\n1,Azul\n").unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_write_catalog_round_trips() {
        let catalog = parse_catalog_str(SAMPLE).unwrap();
        let mut out = Vec::new();
        write_catalog(&catalog, &mut out).unwrap();

        let reread = parse_catalog(out.as_slice()).unwrap();
        assert_eq!(reread.games(), catalog.games());
    }

    #[test]
    fn test_write_catalog_keeps_source_column_order() {
        let catalog = parse_catalog_str("Name,Designer,ID,Year\nAzul,Kiesling,1,2017\nBrass,Wallace,2,2018\n").unwrap();
        let mut out = Vec::new();
        write_catalog(&catalog, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Name,Designer,ID,Year\nAzul,Kiesling,1,2017\nBrass,Wallace,2,2018\n");
    }
}
