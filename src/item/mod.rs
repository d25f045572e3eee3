#[cfg(feature = "logger")]
/// This module provides a logger item writer, useful for dry runs.
pub mod logger;

#[cfg(feature = "csv")]
/// This module provides a CSV item reader.
pub mod csv;

#[cfg(feature = "rdbc-sqlite")]
/// This module provides SQLite item reader and writer implementations.
pub mod rdbc;
