use std::str::FromStr;

use sqlx::{
    Row, Sqlite, SqlitePool,
    query_builder::Separated,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
};

use crate::{
    BatchError,
    item::rdbc::{DatabaseItemBinder, RowMapper},
};

use super::Person;

/// Binds a person as `(first_name, last_name)`.
#[derive(Default)]
pub struct PersonBinder;

impl DatabaseItemBinder<Person, Sqlite> for PersonBinder {
    fn bind(&self, item: &Person, mut query_builder: Separated<Sqlite, &str>) {
        query_builder.push_bind(item.first_name().to_owned());
        query_builder.push_bind(item.last_name().to_owned());
    }
}

/// Maps the first two columns of a row to a person.
#[derive(Default)]
pub struct PersonRowMapper;

impl RowMapper<Person> for PersonRowMapper {
    fn map_row(&self, row: &SqliteRow) -> Result<Person, sqlx::Error> {
        let first_name: String = row.try_get(0)?;
        let last_name: String = row.try_get(1)?;
        Ok(Person::new(first_name, last_name))
    }
}

/// Opens a single-connection pool, creating the database file if needed.
///
/// One connection is all a sequential job needs, and it keeps `sqlite::memory:`
/// databases alive and shared between the writer and the report.
pub async fn connect(database_url: &str) -> Result<SqlitePool, BatchError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| BatchError::Database(format!("invalid database url {}: {}", database_url, e)))?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| BatchError::Database(format!("unable to connect to {}: {}", database_url, e)))
}

/// Creates the people table when it does not exist yet.
///
/// `table` and `columns` must be plain identifiers, see
/// [`ImportJobConfig::validate`](crate::config::ImportJobConfig::validate).
pub async fn init_schema(
    pool: &SqlitePool,
    table: &str,
    columns: &[String],
) -> Result<(), BatchError> {
    let column_definitions: Vec<String> = columns
        .iter()
        .map(|column| format!("{} VARCHAR(20)", column))
        .collect();
    let statement = format!(
        "CREATE TABLE IF NOT EXISTS {} (person_id INTEGER PRIMARY KEY AUTOINCREMENT, {})",
        table,
        column_definitions.join(", ")
    );

    sqlx::query(&statement)
        .execute(pool)
        .await
        .map_err(|e| BatchError::Database(format!("unable to create table {}: {}", table, e)))?;

    log::info!("Table {} is ready", table);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        core::item::ItemWriter,
        item::rdbc::sqlite_writer::SqliteItemWriter,
        people::Person,
    };

    use super::{PersonBinder, connect, init_schema};

    #[tokio::test(flavor = "multi_thread")]
    async fn binder_writes_names_in_column_order() {
        let pool = connect("sqlite::memory:").await.unwrap();
        let columns = vec!["first_name".to_string(), "last_name".to_string()];
        init_schema(&pool, "people", &columns).await.unwrap();
        init_schema(&pool, "people", &columns).await.unwrap();

        let binder = PersonBinder;
        let writer = SqliteItemWriter::<Person>::new()
            .pool(&pool)
            .table("people")
            .add_column("first_name")
            .add_column("last_name")
            .item_binder(&binder);

        writer.write(&[Person::new("JOHN", "DOE")]).unwrap();

        let row: (String, String) = sqlx::query_as("SELECT first_name, last_name FROM people")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row, ("JOHN".to_string(), "DOE".to_string()));
    }

    #[tokio::test]
    async fn unreachable_database_is_a_database_error() {
        let result = connect("sqlite:///no/such/directory/people.db").await;

        assert!(matches!(result, Err(crate::BatchError::Database(_))));
    }
}
