use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

use super::{Catalog, TableSchema};
use crate::persist::write_atomically;

/// Default output directory for metadata files.
pub const METADATA_DIR_NAME: &str = "metadata_csv";

/// `<dir>/<table>-<version>.csv`
pub fn metadata_path(dir: &Path, table_name: &str, version: &str) -> PathBuf {
    dir.join(format!("{}-{}.csv", table_name, version))
}

/// Write the metadata file for one table.
///
/// - `table`: schema whose `kind` picks the header layout
/// - `dir`: destination directory (must exist)
/// - `version`: catalog tag appended to the file name
///
/// The file is replaced atomically, so re-running over an unchanged
/// catalog yields byte-identical output.
#[instrument(level = "debug", skip(table, dir), fields(table = %table.name))]
pub fn write_metadata<P: AsRef<Path>>(table: &TableSchema, dir: P, version: &str) -> Result<PathBuf> {
    let path = metadata_path(dir.as_ref(), &table.name, version);

    write_atomically(&path, |out| {
        let mut wtr = WriterBuilder::new().from_writer(out);
        wtr.write_record(table.kind.header())?;
        for col in &table.columns {
            wtr.write_record(col.metadata_row(table.kind))?;
        }
        wtr.flush()?;
        Ok(())
    })
    .with_context(|| format!("writing metadata for {}", table.name))?;

    Ok(path)
}

/// Emit one metadata file per catalog table into `dir`, creating it if needed.
#[instrument(level = "info", skip(catalog, dir), fields(version = %catalog.version, dir = %dir.as_ref().display()))]
pub fn emit_catalog<P: AsRef<Path>>(catalog: &Catalog, dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("creating metadata directory {:?}", dir))?;

    let mut written = Vec::with_capacity(catalog.tables.len());
    for table in &catalog.tables {
        let path = write_metadata(table, dir, &catalog.version)?;
        info!(table = %table.name, columns = table.columns.len(), path = %path.display(), "wrote metadata");
        written.push(path);
    }
    Ok(written)
}
