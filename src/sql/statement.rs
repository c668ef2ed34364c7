// src/sql/statement.rs

use std::{fmt, path::Path};

use crate::error::PrepError;
use crate::schema::TableSchema;

/// Rows returned by the post-load sanity query.
pub const SAMPLE_LIMIT: usize = 5;

/// Map a catalog type token onto the target engine's vocabulary.
///
/// `INTEGER` becomes `INT`; every other token passes through unchanged.
pub fn map_sql_type(ty: &str) -> &str {
    match ty {
        "INTEGER" => "INT",
        other => other,
    }
}

/// Join items with `sep`, no separator after the last one.
fn join_separated<I, S>(items: I, sep: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (idx, item) in items.into_iter().enumerate() {
        if idx > 0 {
            out.push_str(sep);
        }
        out.push_str(item.as_ref());
    }
    out
}

/// DROP / CREATE / COPY / SELECT for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementBlock {
    pub table: String,
    pub drop: String,
    pub create: String,
    pub copy: String,
    pub select: String,
}

impl StatementBlock {
    /// Build the block for `schema`, loading from the CSV at `data_path`.
    pub fn build(schema: &TableSchema, data_path: &Path) -> Result<Self, PrepError> {
        schema.validate()?;
        let name = &schema.name;

        let column_defs = join_separated(
            schema
                .columns
                .iter()
                .map(|c| format!("{} {}", c.field_name, map_sql_type(&c.ty))),
            ", ",
        );
        let field_list = join_separated(schema.field_names(), ", ");
        let path = data_path.display().to_string().replace('\'', "''");

        Ok(Self {
            table: name.clone(),
            drop: format!("DROP TABLE IF EXISTS {};", name),
            create: format!("CREATE TABLE {} ({});", name, column_defs),
            copy: format!(
                "COPY {}({}) FROM '{}' WITH (FORMAT 'csv', DELIMITER ',', HEADER, QUOTE '\"');",
                name, field_list, path
            ),
            select: format!("SELECT * FROM {} LIMIT {};", name, SAMPLE_LIMIT),
        })
    }

    pub fn statements(&self) -> [&str; 4] {
        [
            self.drop.as_str(),
            self.create.as_str(),
            self.copy.as_str(),
            self.select.as_str(),
        ]
    }
}

impl fmt::Display for StatementBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in self.statements() {
            writeln!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnSpec, TableKind};

    fn schema(cols: &[(&str, &str)]) -> TableSchema {
        TableSchema {
            name: "Practice".into(),
            kind: TableKind::Standard,
            columns: cols.iter().map(|(n, t)| ColumnSpec::new(*n, *t)).collect(),
        }
    }

    #[test]
    fn integer_is_the_only_rewrite() {
        assert_eq!(map_sql_type("INTEGER"), "INT");
        for t in ["TEXT", "NUMERIC", "DATE", "DECIMAL", "INT", "integer", "BIGINTEGER"] {
            assert_eq!(map_sql_type(t), t);
        }
    }

    #[test]
    fn join_has_no_trailing_separator() {
        assert_eq!(join_separated(["a"], ", "), "a");
        assert_eq!(join_separated(["a", "b", "c"], ", "), "a, b, c");
        assert_eq!(join_separated(Vec::<String>::new(), ", "), "");
    }

    #[test]
    fn builds_full_block() {
        let s = schema(&[("pracid", "INTEGER"), ("lcd", "DATE"), ("region", "INTEGER")]);
        let b = StatementBlock::build(&s, Path::new("/proj/data_csv/Practice.csv")).unwrap();
        assert_eq!(b.drop, "DROP TABLE IF EXISTS Practice;");
        assert_eq!(b.create, "CREATE TABLE Practice (pracid INT, lcd DATE, region INT);");
        assert_eq!(
            b.copy,
            "COPY Practice(pracid, lcd, region) FROM '/proj/data_csv/Practice.csv' \
             WITH (FORMAT 'csv', DELIMITER ',', HEADER, QUOTE '\"');"
        );
        assert_eq!(b.select, "SELECT * FROM Practice LIMIT 5;");
        assert_eq!(
            b.to_string().lines().collect::<Vec<_>>(),
            b.statements()
        );
    }

    #[test]
    fn create_never_ends_with_a_comma() {
        for n in 1..=20 {
            let cols: Vec<(String, String)> =
                (0..n).map(|i| (format!("c{}", i), "TEXT".to_string())).collect();
            let refs: Vec<(&str, &str)> = cols.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
            let b = StatementBlock::build(&schema(&refs), Path::new("x.csv")).unwrap();
            assert!(!b.create.contains(",)") && !b.create.contains(", )"), "{}", b.create);
            assert_eq!(b.create.matches(',').count(), n - 1);
            assert!(!b.copy.contains(",)") && !b.copy.contains(", )"));
        }
    }

    #[test]
    fn empty_schema_is_refused() {
        assert!(StatementBlock::build(&schema(&[]), Path::new("x.csv")).is_err());
    }

    #[test]
    fn quotes_in_path_are_escaped() {
        let s = schema(&[("a", "TEXT")]);
        let b = StatementBlock::build(&s, Path::new("/o'brien/Practice.csv")).unwrap();
        assert!(b.copy.contains("'/o''brien/Practice.csv'"));
    }
}
