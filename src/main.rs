use anyhow::Result;
use aurum_prep::{
    process,
    schema::{self, Catalog},
    sql,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Turn CPRD Aurum extracts into CSVs plus the SQL that loads them"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write one `<table>-<version>.csv` metadata file per catalog table.
    EmitMetadata {
        /// Catalog file (.yaml/.yml or .json); defaults to the built-in one.
        #[arg(long)]
        catalog: Option<PathBuf>,
        #[arg(long, default_value = schema::METADATA_DIR_NAME)]
        out_dir: PathBuf,
    },
    /// Convert `<source_dir>/*.txt` into `<source_dir>/data_csv/*.csv`.
    NormalizeData { source_dir: PathBuf },
    /// Write `<project_dir>/create-tables/create-tables.sql`.
    GenerateSql {
        project_dir: PathBuf,
        catalog_version: String,
    },
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) dispatch ─────────────────────────────────────────────────
    match Args::parse().command {
        Command::EmitMetadata { catalog, out_dir } => {
            let catalog = match catalog {
                Some(path) => Catalog::from_path(&path)?,
                None => Catalog::builtin()?,
            };
            let written = schema::emit_catalog(&catalog, &out_dir)?;
            info!(files = written.len(), dir = %out_dir.display(), "metadata done");
        }
        Command::NormalizeData { source_dir } => {
            let written = process::normalize_source(&source_dir)?;
            info!(files = written.len(), "normalization done");
        }
        Command::GenerateSql {
            project_dir,
            catalog_version,
        } => {
            let out = sql::generate_sql(&project_dir, &catalog_version)?;
            info!(path = %out.display(), "SQL done");
        }
    }
    Ok(())
}
