use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;
use tracing::{debug, instrument};

use super::{ColumnSpec, TableKind, TableSchema};
use crate::error::PrepError;

/// Parse a metadata file back into a `TableSchema`.
///
/// The layout is recovered from the header row. Every data row must carry
/// a field name and a type; a short or blank row fails for the whole table
/// rather than shifting names against types.
#[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_metadata<P: AsRef<Path>>(table_name: &str, path: P) -> Result<TableSchema> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PrepError::MissingMetadata {
            table: table_name.to_string(),
            path: path.to_path_buf(),
        }
        .into());
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {:?}", path))?;

    let header = rdr
        .headers()
        .with_context(|| format!("reading header of {:?}", path))?
        .clone();
    let kind = TableKind::from_header(&header.iter().collect::<Vec<_>>()).ok_or_else(|| {
        PrepError::mismatch(
            table_name,
            format!("unrecognised metadata header {:?}", header.iter().collect::<Vec<_>>()),
        )
    })?;

    let mut columns = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error in {:?} at row {}", path, idx + 1))?;
        columns.push(column_from_record(table_name, kind, idx + 1, &record)?);
    }

    let table = TableSchema {
        name: table_name.to_string(),
        kind,
        columns,
    };
    table.validate()?;
    debug!(?kind, columns = table.columns.len(), "read metadata");
    Ok(table)
}

fn column_from_record(
    table: &str,
    kind: TableKind,
    row: usize,
    record: &StringRecord,
) -> Result<ColumnSpec, PrepError> {
    let width = kind.header().len();
    if record.len() != width {
        return Err(PrepError::mismatch(
            table,
            format!(
                "metadata row {} has {} cells, expected {} (field name/type count mismatch)",
                row,
                record.len(),
                width
            ),
        ));
    }

    let cell = |i: usize| record.get(i).unwrap_or("");
    let opt = |i: usize| Some(cell(i)).filter(|s| !s.is_empty()).map(str::to_string);

    let col = match kind {
        TableKind::Standard => ColumnSpec {
            label: opt(0),
            field_name: cell(1).to_string(),
            ty: cell(2).to_string(),
            format: opt(3),
            mapping: opt(4),
            description: opt(5),
        },
        TableKind::Dictionary => ColumnSpec {
            label: None,
            field_name: cell(0).to_string(),
            ty: cell(1).to_string(),
            format: opt(2),
            mapping: opt(3),
            description: opt(4),
        },
        TableKind::Lookup => ColumnSpec::new(cell(0), cell(1)),
    };
    Ok(col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{emit_catalog, metadata_path, Catalog};
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn builtin_catalog_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let catalog = Catalog::builtin()?;
        emit_catalog(&catalog, dir.path())?;

        for table in &catalog.tables {
            let path = metadata_path(dir.path(), &table.name, &catalog.version);
            let back = read_metadata(&table.name, &path)?;
            assert_eq!(&back, table, "{}", table.name);
        }
        Ok(())
    }

    #[test]
    fn missing_type_cell_is_a_mismatch() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("Region-v1.csv");
        fs::write(
            &path,
            "Field name,Type\nregionid,INTEGER\nDescription,TEXT\nname,TEXT\ncode,TEXT\nextra\n",
        )?;
        let err = read_metadata("Region", &path).unwrap_err();
        match err.downcast_ref::<PrepError>() {
            Some(PrepError::SchemaMismatch { table, reason }) => {
                assert_eq!(table, "Region");
                assert!(reason.contains("row 5"), "{reason}");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn blank_type_is_a_mismatch() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("Region-v1.csv");
        fs::write(&path, "Field name,Type\nregionid,INTEGER\nDescription,\n")?;
        let err = read_metadata("Region", &path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepError>(),
            Some(PrepError::SchemaMismatch { .. })
        ));
        Ok(())
    }

    #[test]
    fn missing_file_names_the_table() {
        let err = read_metadata("Staff", Path::new("/nonexistent/Staff-v1.csv")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepError>(),
            Some(PrepError::MissingMetadata { table, .. }) if table == "Staff"
        ));
        assert!(err.to_string().contains("Staff"));
    }

    #[test]
    fn unknown_header_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("X-v1.csv");
        fs::write(&path, "Name,Kind\na,TEXT\n")?;
        assert!(read_metadata("X", &path).is_err());
        Ok(())
    }
}
