pub mod error;
pub mod persist;
pub mod process;
pub mod schema;
pub mod sql;

pub use error::PrepError;
