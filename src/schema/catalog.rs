// src/schema/catalog.rs

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path};
use tracing::{debug, instrument};

use super::types::TableSchema;

/// Catalog shipped with the binary: CPRD Aurum data specification v2.9.
const BUILTIN_CATALOG: &str = include_str!("../../assets/catalog-v2p9.yaml");

/// A versioned set of table schemas, in authoring order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Catalog {
    /// Suffix used in metadata file names, e.g. `v2p9`.
    pub version: String,
    pub tables: Vec<TableSchema>,
}

impl Catalog {
    /// The embedded default catalog.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_CATALOG).context("parsing built-in catalog")
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog file; `.json` is read as JSON, anything else as YAML.
    #[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        let is_json = path
            .extension()
            .and_then(|s| s.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        let catalog = if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
        .with_context(|| format!("parsing catalog {:?}", path))?;
        debug!(
            version = %catalog.version,
            tables = catalog.tables.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version.trim();
        if version.is_empty() {
            bail!("catalog version is empty");
        }
        if version.contains(['/', '\\']) {
            bail!("catalog version `{}` must not contain a path separator", version);
        }
        let mut names = HashSet::with_capacity(self.tables.len());
        for table in &self.tables {
            table.validate()?;
            if !names.insert(table.name.as_str()) {
                return Err(anyhow!("table `{}` is defined twice", table.name));
            }
        }
        Ok(())
    }
}
