// src/schema/types.rs

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::PrepError;

/// Which metadata layout a table is described with.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    /// Clinical tables: human label + field name + type + descriptive cells.
    #[default]
    Standard,
    /// Medical/product dictionaries: the field name sits in "Column name".
    Dictionary,
    /// Small code → description lookups: field name and type only.
    Lookup,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [TableKind::Standard, TableKind::Dictionary, TableKind::Lookup];

    /// Header row of the metadata file for this kind.
    pub fn header(self) -> &'static [&'static str] {
        match self {
            TableKind::Standard => &[
                "Column name",
                "Field name",
                "Type",
                "Format",
                "Mapping",
                "Description",
            ],
            TableKind::Dictionary => &["Column name", "Type", "Format", "Mapping", "Description"],
            TableKind::Lookup => &["Field name", "Type"],
        }
    }

    /// Recover the kind from a metadata header row.
    pub fn from_header<S: AsRef<str>>(header: &[S]) -> Option<TableKind> {
        TableKind::ALL.into_iter().find(|kind| {
            let expected = kind.header();
            expected.len() == header.len()
                && expected
                    .iter()
                    .zip(header)
                    .all(|(e, h)| *e == h.as_ref().trim())
        })
    }
}

/// One column of a table, name and type kept together.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Hash)]
pub struct ColumnSpec {
    pub field_name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ColumnSpec {
    pub fn new(field_name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            ty: ty.into(),
            label: None,
            format: None,
            mapping: None,
            description: None,
        }
    }

    /// Cells of this column's metadata row, laid out for `kind`.
    pub fn metadata_row(&self, kind: TableKind) -> Vec<&str> {
        fn opt(v: &Option<String>) -> &str {
            v.as_deref().unwrap_or("")
        }
        match kind {
            TableKind::Standard => vec![
                opt(&self.label),
                self.field_name.as_str(),
                self.ty.as_str(),
                opt(&self.format),
                opt(&self.mapping),
                opt(&self.description),
            ],
            TableKind::Dictionary => vec![
                self.field_name.as_str(),
                self.ty.as_str(),
                opt(&self.format),
                opt(&self.mapping),
                opt(&self.description),
            ],
            TableKind::Lookup => vec![self.field_name.as_str(), self.ty.as_str()],
        }
    }
}

/// A catalog table: its name, layout and ordered columns.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct TableSchema {
    pub name: String,
    #[serde(default)]
    pub kind: TableKind,
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// Reject tables no SQL can be generated from.
    pub fn validate(&self) -> Result<(), PrepError> {
        if self.name.trim().is_empty() {
            return Err(PrepError::mismatch(&self.name, "table name is empty"));
        }
        if self.columns.is_empty() {
            return Err(PrepError::mismatch(&self.name, "table has no columns"));
        }
        let mut seen = HashSet::with_capacity(self.columns.len());
        for (idx, col) in self.columns.iter().enumerate() {
            if col.field_name.trim().is_empty() {
                return Err(PrepError::mismatch(
                    &self.name,
                    format!("column {} has no field name", idx + 1),
                ));
            }
            if col.ty.trim().is_empty() {
                return Err(PrepError::mismatch(
                    &self.name,
                    format!("column `{}` has no type", col.field_name),
                ));
            }
            if !seen.insert(col.field_name.as_str()) {
                return Err(PrepError::mismatch(
                    &self.name,
                    format!("duplicate field name `{}`", col.field_name),
                ));
            }
        }
        Ok(())
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.field_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_header() {
        for kind in TableKind::ALL {
            assert_eq!(TableKind::from_header(kind.header()), Some(kind));
        }
        assert_eq!(TableKind::from_header(&["Field name"]), None);
        assert_eq!(TableKind::from_header(&["Type", "Field name"]), None);
    }

    #[test]
    fn metadata_row_matches_header_width() {
        let col = ColumnSpec::new("patid", "TEXT");
        for kind in TableKind::ALL {
            assert_eq!(col.metadata_row(kind).len(), kind.header().len());
        }
    }

    #[test]
    fn validate_flags_missing_type_and_duplicates() {
        let mut t = TableSchema {
            name: "Patient".into(),
            kind: TableKind::Lookup,
            columns: vec![ColumnSpec::new("patid", "TEXT"), ColumnSpec::new("yob", "")],
        };
        let err = t.validate().unwrap_err().to_string();
        assert!(err.contains("Patient") && err.contains("yob"), "{err}");

        t.columns[1] = ColumnSpec::new("patid", "INTEGER");
        let err = t.validate().unwrap_err().to_string();
        assert!(err.contains("duplicate"), "{err}");

        t.columns.clear();
        assert!(t.validate().is_err());
    }
}
