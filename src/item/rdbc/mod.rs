use sqlx::{Database, query_builder::Separated};
use tokio::runtime::{Handle, RuntimeFlavor};

/// This module contains the SQLite reader implementation.
pub mod sqlite_reader;

/// This module contains the SQLite writer implementation.
pub mod sqlite_writer;

/// Trait for binding item data to database query parameters.
///
/// Generic over the SQLx database type so that a binder written for one item
/// type states which backend it targets.
///
/// # Type Parameters
///
/// * `O` - The item type to bind
/// * `DB` - The SQLx database type (e.g. `Sqlite`)
///
/// # Examples
///
/// ```no_run
/// use people_batch::item::rdbc::DatabaseItemBinder;
/// use sqlx::{query_builder::Separated, Sqlite};
///
/// struct User {
///     id: i32,
///     name: String,
/// }
///
/// struct UserBinder;
/// impl DatabaseItemBinder<User, Sqlite> for UserBinder {
///     fn bind(&self, item: &User, mut query_builder: Separated<Sqlite, &str>) {
///         query_builder.push_bind(item.id);
///         query_builder.push_bind(item.name.clone());
///     }
/// }
/// ```
pub trait DatabaseItemBinder<O, DB: Database> {
    /// Binds the values of `item`, in column order, to one row of the insert.
    fn bind(&self, item: &O, query_builder: Separated<DB, &str>);
}

/// Handle of the ambient tokio runtime, which must be able to block in place.
fn blocking_handle() -> Result<Handle, String> {
    let handle = Handle::try_current().map_err(|e| e.to_string())?;
    if handle.runtime_flavor() == RuntimeFlavor::CurrentThread {
        return Err("a multi-thread tokio runtime is required".to_string());
    }
    Ok(handle)
}

pub use sqlite_reader::{RowMapper, SqliteItemReader};
pub use sqlite_writer::SqliteItemWriter;
