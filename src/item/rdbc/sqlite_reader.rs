use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
};

use sqlx::{Pool, QueryBuilder, Sqlite, sqlite::SqliteRow};

use crate::{
    BatchError,
    core::item::{ItemReader, ItemReaderResult},
};

use super::blocking_handle;

/// Maps one result row to an item.
pub trait RowMapper<T> {
    fn map_row(&self, row: &SqliteRow) -> Result<T, sqlx::Error>;
}

/// Reads the rows of a query, one item at a time.
///
/// With a page size the query is re-issued with `LIMIT`/`OFFSET` each time the
/// buffer runs dry; without one the whole result is fetched on the first read.
/// The query must not end with its own `LIMIT` clause when paging.
pub struct SqliteItemReader<'a, T> {
    pool: &'a Pool<Sqlite>,
    query: &'a str,
    page_size: Option<usize>,
    offset: Cell<usize>,
    exhausted: Cell<bool>,
    row_mapper: &'a dyn RowMapper<T>,
    buffer: RefCell<VecDeque<T>>,
}

impl<'a, T> SqliteItemReader<'a, T> {
    fn new(
        pool: &'a Pool<Sqlite>,
        query: &'a str,
        page_size: Option<usize>,
        row_mapper: &'a dyn RowMapper<T>,
    ) -> Self {
        Self {
            pool,
            query,
            page_size,
            offset: Cell::new(0),
            exhausted: Cell::new(false),
            row_mapper,
            buffer: RefCell::new(VecDeque::with_capacity(page_size.unwrap_or(0))),
        }
    }

    fn read_page(&self) -> Result<(), BatchError> {
        let mut query_builder = QueryBuilder::<Sqlite>::new(self.query);

        if let Some(page_size) = self.page_size {
            query_builder.push(" LIMIT ");
            query_builder.push_bind(page_size as i64);
            query_builder.push(" OFFSET ");
            query_builder.push_bind(self.offset.get() as i64);
        }

        let handle = blocking_handle()
            .map_err(|e| BatchError::ItemReader(format!("SQLite read failed: {}", e)))?;
        let rows = tokio::task::block_in_place(|| {
            handle.block_on(async { query_builder.build().fetch_all(self.pool).await })
        })
        .map_err(|e| BatchError::ItemReader(format!("SQLite read failed: {}", e)))?;

        self.offset.set(self.offset.get() + rows.len());
        self.exhausted.set(match self.page_size {
            Some(page_size) => rows.len() < page_size,
            None => true,
        });

        let mut buffer = self.buffer.borrow_mut();
        for row in &rows {
            let item = self
                .row_mapper
                .map_row(row)
                .map_err(|e| BatchError::ItemReader(format!("unable to map row: {}", e)))?;
            buffer.push_back(item);
        }

        Ok(())
    }
}

impl<T> ItemReader<T> for SqliteItemReader<'_, T> {
    fn read(&self) -> ItemReaderResult<T> {
        let needs_page = self.buffer.borrow().is_empty() && !self.exhausted.get();
        if needs_page {
            self.read_page()?;
        }

        Ok(self.buffer.borrow_mut().pop_front())
    }
}

pub struct SqliteItemReaderBuilder<'a, T> {
    pool: Option<&'a Pool<Sqlite>>,
    query: Option<&'a str>,
    page_size: Option<usize>,
    row_mapper: Option<&'a dyn RowMapper<T>>,
}

impl<T> Default for SqliteItemReaderBuilder<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> SqliteItemReaderBuilder<'a, T> {
    pub fn new() -> Self {
        Self {
            pool: None,
            query: None,
            page_size: None,
            row_mapper: None,
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn query(mut self, query: &'a str) -> Self {
        self.query = Some(query);
        self
    }

    pub fn pool(mut self, pool: &'a Pool<Sqlite>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn row_mapper(mut self, row_mapper: &'a dyn RowMapper<T>) -> Self {
        self.row_mapper = Some(row_mapper);
        self
    }

    pub fn build(self) -> Result<SqliteItemReader<'a, T>, BatchError> {
        let missing = |what: &str| {
            BatchError::Configuration(format!("SqliteItemReader: {} is required", what))
        };

        if self.page_size == Some(0) {
            return Err(BatchError::Configuration(
                "SqliteItemReader: page size must be greater than 0".to_string(),
            ));
        }

        Ok(SqliteItemReader::new(
            self.pool.ok_or_else(|| missing("pool"))?,
            self.query.ok_or_else(|| missing("query"))?,
            self.page_size,
            self.row_mapper.ok_or_else(|| missing("row mapper"))?,
        ))
    }
}
