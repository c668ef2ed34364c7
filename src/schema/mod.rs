pub mod catalog;
pub mod read;
pub mod types;
pub mod write;

pub use catalog::Catalog;
pub use read::read_metadata;
pub use types::{ColumnSpec, TableKind, TableSchema};
pub use write::{emit_catalog, metadata_path, write_metadata, METADATA_DIR_NAME};
