#![allow(dead_code)]

mod mocks;

pub use mocks::MockPersonWriter;

use std::io::Write;

use people_batch::{
    config::ImportJobConfig,
    people::{connect, init_schema},
};
use sqlx::SqlitePool;
use tempfile::NamedTempFile;

/// Writes `lines` to a temporary CSV file, one per line.
pub fn input_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("unable to create input file");
    for line in lines {
        writeln!(file, "{}", line).expect("unable to write input file");
    }
    file
}

pub fn config(input: &NamedTempFile, chunk_size: usize) -> ImportJobConfig {
    let _ = env_logger::builder().is_test(true).try_init();

    ImportJobConfig::default()
        .with_input_path(input.path())
        .with_database_url("sqlite::memory:")
        .with_chunk_size(chunk_size)
}

/// In-memory database holding an empty people table.
pub async fn people_pool(config: &ImportJobConfig) -> SqlitePool {
    let pool = connect(&config.database_url)
        .await
        .expect("unable to open database");
    init_schema(&pool, &config.table, &config.columns)
        .await
        .expect("unable to create table");
    pool
}

pub async fn stored_people(pool: &SqlitePool) -> Vec<(String, String)> {
    sqlx::query_as("SELECT first_name, last_name FROM people ORDER BY person_id")
        .fetch_all(pool)
        .await
        .expect("unable to read people")
}

pub fn people(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(first, last)| (first.to_string(), last.to_string()))
        .collect()
}
