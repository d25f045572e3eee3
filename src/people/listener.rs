use log::{error, info};
use sqlx::SqlitePool;

use crate::{
    BatchError,
    core::{
        item::ItemReader,
        job::{BatchStatus, JobExecution},
        listener::JobExecutionListener,
    },
    item::rdbc::sqlite_reader::SqliteItemReaderBuilder,
};

use super::{Person, PersonRowMapper};

const REPORT_PAGE_SIZE: usize = 100;

/// Reports the content of the people table once the import completed.
pub struct JobCompletionNotificationListener<'a> {
    pool: &'a SqlitePool,
    query: String,
}

impl<'a> JobCompletionNotificationListener<'a> {
    pub fn new(pool: &'a SqlitePool, table: &str, columns: &[String]) -> Self {
        Self {
            pool,
            query: format!("SELECT {} FROM {} ORDER BY rowid", columns.join(", "), table),
        }
    }

    /// Reads back every person stored in the table.
    pub fn verify_results(&self) -> Result<Vec<Person>, BatchError> {
        let row_mapper = PersonRowMapper;
        let reader = SqliteItemReaderBuilder::<Person>::new()
            .pool(self.pool)
            .query(&self.query)
            .page_size(REPORT_PAGE_SIZE)
            .row_mapper(&row_mapper)
            .build()?;

        let mut persons = Vec::new();
        while let Some(person) = reader.read()? {
            persons.push(person);
        }
        Ok(persons)
    }
}

impl JobExecutionListener for JobCompletionNotificationListener<'_> {
    fn before_job(&self, job_execution: &JobExecution) {
        info!("JOB READY! {} is about to start", job_execution.get_name());
        info!("Results will be read with: {}", self.query);
    }

    fn after_job(&self, job_execution: &JobExecution) {
        if job_execution.get_status() != BatchStatus::Completed {
            return;
        }

        info!("JOB FINISHED! Time to verify the results");

        match self.verify_results() {
            Ok(persons) => persons
                .iter()
                .for_each(|person| info!("Found <{}> in the database.", person)),
            Err(err) => error!("Unable to verify the results: {}", err),
        }
    }
}
