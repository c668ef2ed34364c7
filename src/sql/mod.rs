// src/sql/mod.rs
pub mod statement;

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{debug, info, instrument};

use crate::error::PrepError;
use crate::persist::write_atomically;
use crate::process::{utils::list_tables, DATA_DIR_NAME};
use crate::schema::{metadata_path, read_metadata, METADATA_DIR_NAME};
pub use statement::{map_sql_type, StatementBlock, SAMPLE_LIMIT};

/// Output sub-directory of a project.
pub const OUTPUT_DIR_NAME: &str = "create-tables";
/// File name of the consolidated script.
pub const SCRIPT_FILE_NAME: &str = "create-tables.sql";

/// Build the statement block for every normalized CSV in `data_dir`.
///
/// Each table's schema is read from `<metadata_dir>/<table>-<version>.csv`.
/// Tables are processed in parallel; blocks come back sorted by table name.
#[instrument(level = "info", skip(data_dir, metadata_dir), fields(data = %data_dir.display()))]
pub fn build_blocks(data_dir: &Path, metadata_dir: &Path, version: &str) -> Result<Vec<StatementBlock>> {
    let tables = list_tables(data_dir, "csv")?;
    if tables.is_empty() {
        return Err(PrepError::NoDataFiles(data_dir.to_path_buf()).into());
    }
    info!(tables = tables.len(), "found normalized data files");

    tables
        .par_iter()
        .map(|(name, data_path)| -> Result<StatementBlock> {
            let schema = read_metadata(name, metadata_path(metadata_dir, name, version))?;
            let data_path = fs::canonicalize(data_path)
                .with_context(|| format!("resolving {:?}", data_path))?;
            let block = StatementBlock::build(&schema, &data_path)?;
            debug!(table = %name, columns = schema.columns.len(), "built statements");
            Ok(block)
        })
        .collect()
}

/// Write `blocks` to `path` in order, one block per paragraph.
///
/// The file only appears once every block has been written.
pub fn write_script(blocks: &[StatementBlock], path: &Path) -> Result<()> {
    write_atomically(path, |out| {
        for (idx, block) in blocks.iter().enumerate() {
            if idx > 0 {
                writeln!(out)?;
            }
            write!(out, "{}", block)?;
        }
        Ok(())
    })
    .with_context(|| format!("writing SQL script {:?}", path))
}

/// Generate `<project>/create-tables/create-tables.sql` from
/// `<project>/data_csv` and `<project>/metadata_csv`.
#[instrument(level = "info", skip(project_dir), fields(project = %project_dir.as_ref().display()))]
pub fn generate_sql<P: AsRef<Path>>(project_dir: P, version: &str) -> Result<PathBuf> {
    let start = Instant::now();
    let project_dir = project_dir.as_ref();
    let data_dir = project_dir.join(DATA_DIR_NAME);
    let metadata_dir = project_dir.join(METADATA_DIR_NAME);

    let blocks = build_blocks(&data_dir, &metadata_dir, version)?;

    let out_dir = project_dir.join(OUTPUT_DIR_NAME);
    fs::create_dir_all(&out_dir).with_context(|| format!("creating {:?}", out_dir))?;
    let out = out_dir.join(SCRIPT_FILE_NAME);
    write_script(&blocks, &out)?;

    info!(tables = blocks.len(), path = %out.display(), elapsed = ?start.elapsed(), "wrote SQL script");
    Ok(out)
}
