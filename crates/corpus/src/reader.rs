use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::{debug, warn};

use crate::{CorpusError, PlayerRecord, RawPlayerRow};

/// Read untyped rows from a CSV stream with a header line.
///
/// Cells are trimmed; unknown columns (such as a leading position column) are ignored.
pub fn read_player_rows<R: Read>(reader: R) -> Result<Vec<RawPlayerRow>, CorpusError> {
    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for row in csv.deserialize::<RawPlayerRow>() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Read and validate every row of the table at `path`.
///
/// The first invalid row aborts the read with [`CorpusError::Row`].
pub fn read_player_records(path: impl AsRef<Path>) -> Result<Vec<PlayerRecord>, CorpusError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CorpusError::InputNotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let rows = read_player_rows(file)?;
    if rows.is_empty() {
        warn!(path = %path.display(), "stats table has no data rows");
    }
    let records = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| PlayerRecord::try_from(row).map_err(|e| e.at_row(i + 1)))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(path = %path.display(), records = records.len(), "stats_table_read");
    Ok(records)
}
