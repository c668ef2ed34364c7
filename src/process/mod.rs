// src/process/mod.rs
pub mod date_parser;
pub mod raw_table;
pub mod utils;

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{debug, info, instrument, warn};

use crate::error::PrepError;
use crate::persist::write_atomically;
pub use raw_table::RawTable;

/// Sub-directory of the source directory that receives normalized files.
pub const DATA_DIR_NAME: &str = "data_csv";

/// Reformat every date cell of `table` in place.
///
/// Only columns named by `date_field_index(headers)` are touched, and
/// within them only cells longer than the placeholder length. Returns the
/// number of cells rewritten.
pub fn normalize_table(table: &mut RawTable) -> Result<usize, PrepError> {
    let date_cols = date_parser::date_field_index(&table.headers);
    if date_cols.is_empty() {
        return Ok(0);
    }
    debug!(table = %table.name, ?date_cols, "date columns");

    let mut rewritten = 0;
    for (idx, row) in table.rows.iter_mut().enumerate() {
        for &col in &date_cols {
            let Some(cell) = row.get_mut(col) else {
                continue;
            };
            if !date_parser::needs_reparse(cell.as_str()) {
                continue;
            }
            match date_parser::reformat_dmy(cell.as_str()) {
                Some(iso) => {
                    *cell = iso;
                    rewritten += 1;
                }
                None => {
                    return Err(PrepError::BadDate {
                        table: table.name.clone(),
                        // 1-based, counting the header as row 1
                        row: idx + 2,
                        column: table.headers[col].clone(),
                        value: cell.clone(),
                    })
                }
            }
        }
    }
    Ok(rewritten)
}

/// Load one extract, normalize it and write `<dest_dir>/<name>.csv`.
#[instrument(level = "info", skip(src, dest_dir), fields(src = %src.as_ref().display()))]
pub fn normalize_file<P: AsRef<Path>, Q: AsRef<Path>>(
    name: &str,
    src: P,
    dest_dir: Q,
) -> Result<PathBuf> {
    let start = Instant::now();
    let mut table = RawTable::load(name, src.as_ref())?;
    if table.headers.is_empty() && table.rows.is_empty() {
        warn!("source file is empty");
    }
    debug!(header = ?table.headers, rows = table.rows.len(), "read");

    let rewritten = normalize_table(&mut table)?;

    let out = dest_dir.as_ref().join(format!("{}.csv", name));
    write_atomically(&out, |w| table.write_csv(w))
        .with_context(|| format!("writing {:?}", out))?;

    info!(
        rows = table.rows.len(),
        dates = rewritten,
        elapsed = ?start.elapsed(),
        path = %out.display(),
        "exported"
    );
    Ok(out)
}

/// Normalize every `*.txt` extract in `source_dir` into `dest_dir`.
///
/// `dest_dir` must not exist yet: it is created here and nowhere else, and
/// an existing one aborts the run before anything is written. Tables are
/// processed in parallel; the returned paths are in table-name order.
#[instrument(level = "info", skip(source_dir, dest_dir), fields(src = %source_dir.as_ref().display()))]
pub fn normalize_dir<P: AsRef<Path>, Q: AsRef<Path>>(source_dir: P, dest_dir: Q) -> Result<Vec<PathBuf>> {
    let source_dir = source_dir.as_ref();
    let dest_dir = dest_dir.as_ref();

    if !source_dir.is_dir() {
        return Err(PrepError::SourceMissing(source_dir.to_path_buf()).into());
    }
    if dest_dir.exists() {
        return Err(PrepError::DestinationExists(dest_dir.to_path_buf()).into());
    }

    let sources = utils::list_tables(source_dir, "txt")?;
    info!(tables = sources.len(), "found source extracts");

    fs::create_dir(dest_dir).with_context(|| format!("creating {:?}", dest_dir))?;

    sources
        .par_iter()
        .map(|(name, path)| normalize_file(name, path, dest_dir))
        .collect()
}

/// `normalize_dir(source_dir, source_dir/data_csv)`
pub fn normalize_source<P: AsRef<Path>>(source_dir: P) -> Result<Vec<PathBuf>> {
    let source_dir = source_dir.as_ref();
    normalize_dir(source_dir, source_dir.join(DATA_DIR_NAME))
}
