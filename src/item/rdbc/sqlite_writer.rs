use sqlx::{Pool, QueryBuilder, Sqlite};

use crate::BatchError;
use crate::core::item::{ItemWriter, ItemWriterResult};
use crate::item::rdbc::{DatabaseItemBinder, blocking_handle};

// SQLITE_MAX_VARIABLE_NUMBER since SQLite 3.32
const BIND_LIMIT: usize = 32766;

/// A writer inserting items into a SQLite table using SQLx.
///
/// Every call to `write` runs in its own transaction: the slice is inserted
/// with multi-row `INSERT INTO <table> (<columns>) VALUES (..), (..)`
/// statements, split so that none exceeds the bind parameter limit, and is
/// committed at the end. Any failure rolls the whole slice back.
///
/// The writer is synchronous. It drives SQLx on the ambient tokio runtime,
/// which must be a multi-thread runtime.
pub struct SqliteItemWriter<'a, O> {
    pool: Option<&'a Pool<Sqlite>>,
    table: Option<&'a str>,
    columns: Vec<&'a str>,
    item_binder: Option<&'a dyn DatabaseItemBinder<O, Sqlite>>,
}

impl<O> Default for SqliteItemWriter<'_, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, O> SqliteItemWriter<'a, O> {
    /// Creates an unconfigured writer; set the pool, table, columns and binder
    /// before use.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use people_batch::item::rdbc::sqlite_writer::SqliteItemWriter;
    /// use people_batch::item::rdbc::DatabaseItemBinder;
    /// use sqlx::{SqlitePool, query_builder::Separated, Sqlite};
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
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = SqlitePool::connect("sqlite://database.db").await?;
    /// let binder = UserBinder;
    ///
    /// let writer = SqliteItemWriter::<User>::new()
    ///     .pool(&pool)
    ///     .table("users")
    ///     .add_column("id")
    ///     .add_column("name")
    ///     .item_binder(&binder);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new() -> Self {
        Self {
            pool: None,
            table: None,
            columns: Vec::new(),
            item_binder: None,
        }
    }

    pub fn pool(mut self, pool: &'a Pool<Sqlite>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn table(mut self, table: &'a str) -> Self {
        self.table = Some(table);
        self
    }

    /// Adds a column; columns are bound in the order they are added.
    pub fn add_column(mut self, column: &'a str) -> Self {
        self.columns.push(column);
        self
    }

    pub fn item_binder(mut self, item_binder: &'a dyn DatabaseItemBinder<O, Sqlite>) -> Self {
        self.item_binder = Some(item_binder);
        self
    }

    fn insert_statement<'q>(
        &self,
        table: &str,
        binder: &dyn DatabaseItemBinder<O, Sqlite>,
        items: &[O],
    ) -> QueryBuilder<'q, Sqlite> {
        let mut query_builder = QueryBuilder::new("INSERT INTO ");
        query_builder.push(table);
        query_builder.push(" (");
        query_builder.push(self.columns.join(", "));
        query_builder.push(") ");
        query_builder.push_values(items, |row, item| binder.bind(item, row));
        query_builder
    }
}

impl<O> ItemWriter<O> for SqliteItemWriter<'_, O> {
    /// Inserts `items` in a single transaction.
    ///
    /// # Errors
    ///
    /// `BatchError::ItemWriter` when the writer is not fully configured, when
    /// no multi-thread tokio runtime is available, or when SQLite rejects the statement
    /// (missing table, constraint violation, ...). Nothing is persisted then.
    fn write(&self, items: &[O]) -> ItemWriterResult {
        if items.is_empty() {
            return Ok(());
        }

        let missing =
            |what: &str| BatchError::ItemWriter(format!("SqliteItemWriter: {} is required", what));
        let pool = self.pool.ok_or_else(|| missing("pool"))?;
        let table = self.table.ok_or_else(|| missing("table"))?;
        let binder = self.item_binder.ok_or_else(|| missing("item binder"))?;
        if self.columns.is_empty() {
            return Err(missing("one or more columns"));
        }

        let handle = blocking_handle()
            .map_err(|e| BatchError::ItemWriter(format!("SQLite write failed: {}", e)))?;
        let rows_per_statement = (BIND_LIMIT / self.columns.len()).max(1);

        let result = tokio::task::block_in_place(|| {
            handle.block_on(async {
                let mut transaction = pool.begin().await?;
                for rows in items.chunks(rows_per_statement) {
                    let mut query_builder = self.insert_statement(table, binder, rows);
                    query_builder.build().execute(&mut *transaction).await?;
                }
                transaction.commit().await?;
                Ok::<(), sqlx::Error>(())
            })
        });

        match result {
            Ok(()) => {
                log::debug!(
                    "Successfully wrote {} items to SQLite table {}",
                    items.len(),
                    table
                );
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to write items to SQLite table {}: {}", table, e);
                Err(BatchError::ItemWriter(format!("SQLite write failed: {}", e)))
            }
        }
    }
}
