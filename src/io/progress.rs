use std::io::{Read, Write};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use tracing::{debug, info};

use crate::models::{PlayStatus, Result};
use crate::store::ExportRow;
use super::catalog::{HeaderIndex, COL_ID, COL_NAME};

pub const COL_PLAYED: &str = "Played";

/// Statuses recovered from a progress file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressImport {
    pub entries: Vec<(String, PlayStatus)>,
    /// Rows with no id or an unrecognised `Played` value.
    pub skipped: usize,
}

/// Reads an `ID,Played` progress file. Unknown ids are kept; rows whose
/// `Played` value is empty or unrecognised are counted and skipped.
pub fn parse_progress<R: Read>(reader: R) -> Result<ProgressImport> {
    let mut csv = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = HeaderIndex::new(csv.headers()?);
    headers.require(COL_ID)?;
    headers.require(COL_PLAYED)?;

    let mut import = ProgressImport::default();

    for result in csv.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping unreadable progress row: {}", e);
                import.skipped += 1;
                continue;
            }
        };

        let status = headers
            .field(&record, COL_PLAYED)
            .and_then(PlayStatus::from_played_field);

        match (headers.field(&record, COL_ID), status) {
            (Some(id), Some(status)) => import.entries.push((id.to_string(), status)),
            (id, _) => {
                debug!("Ignoring progress row for {:?}", id);
                import.skipped += 1;
            }
        }
    }

    info!(
        "Read {} progress entries ({} skipped)",
        import.entries.len(),
        import.skipped
    );
    Ok(import)
}

pub fn parse_progress_str(text: &str) -> Result<ProgressImport> {
    parse_progress(text.as_bytes())
}

/// Writes `ID,Name,Played` rows with standard CSV quoting.
pub fn write_progress<W: Write>(rows: &[ExportRow], writer: W) -> Result<()> {
    let mut csv = WriterBuilder::new().from_writer(writer);

    csv.write_record([COL_ID, COL_NAME, COL_PLAYED])?;
    for row in rows {
        csv.write_record([row.id.as_str(), row.name.as_str(), row.played.as_str()])?;
    }

    csv.flush()?;
    Ok(())
}

pub fn progress_to_string(rows: &[ExportRow]) -> Result<String> {
    let mut out = Vec::new();
    write_progress(rows, &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrackerError;

    #[test]
    fn test_parse_progress_values() {
        let import = parse_progress_str(
            "ID,Name,Played\n1,Azul,Yes\n2,Brass,No\n3,Catan,7.5\n4,Dune,\n5,Eclipse,maybe\n,Nameless,Yes\n",
        )
        .unwrap();

        assert_eq!(
            import.entries,
            vec![
                ("1".to_string(), PlayStatus::PlayedNoRating),
                ("2".to_string(), PlayStatus::Unplayed),
                ("3".to_string(), PlayStatus::PlayedRated(7.5)),
            ]
        );
        assert_eq!(import.skipped, 3);
    }

    #[test]
    fn test_name_column_is_optional() {
        let import = parse_progress_str("ID,Played\n10,8\n").unwrap();
        assert_eq!(import.entries, vec![("10".to_string(), PlayStatus::PlayedRated(8.0))]);
    }

    #[test]
    fn test_played_column_is_required() {
        assert!(matches!(
            parse_progress_str("ID,Name\n1,Azul\n"),
            Err(TrackerError::MissingColumn("Played"))
        ));
    }

    #[test]
    fn test_write_quotes_awkward_names() {
        let rows = vec![
            ExportRow { id: "1".into(), name: "Twilight Imperium, 4th Ed".into(), played: "9".into() },
            ExportRow { id: "2".into(), name: "The \"Game\"".into(), played: "No".into() },
            ExportRow { id: "3".into(), name: "Line\nBreak".into(), played: "".into() },
        ];

        let text = progress_to_string(&rows).unwrap();
        assert!(text.starts_with("ID,Name,Played"));
        assert!(text.contains("1,\"Twilight Imperium, 4th Ed\",9"));
        assert!(text.contains("2,\"The \"\"Game\"\"\",No"));
        assert!(text.contains("3,\"Line\nBreak\","));
    }
}
