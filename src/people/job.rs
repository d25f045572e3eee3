use sqlx::SqlitePool;

use crate::{
    BatchError,
    config::ImportJobConfig,
    core::{
        item::ItemWriter,
        job::{Job, JobBuilder, JobExecution},
        listener::JobHooks,
        step::StepBuilder,
    },
    item::{csv::csv_reader::CsvItemReaderBuilder, rdbc::sqlite_writer::SqliteItemWriter},
};

use super::{JobCompletionNotificationListener, Person, PersonBinder, PersonItemProcessor};

/// Imports the configured CSV file into the people table.
///
/// `JobCompletionNotificationListener` is registered after the callbacks
/// already in `hooks`, so it runs last; it logs every stored person once the
/// job completed.
///
/// # Returns
/// - `Ok(JobExecution)` with status `COMPLETED`
/// - `Err(BatchError)` with the error that made the job fail; chunks committed
///   before it stay in the table
pub fn import_people(
    config: &ImportJobConfig,
    pool: &SqlitePool,
    hooks: JobHooks<'_>,
) -> Result<JobExecution, BatchError> {
    let binder = PersonBinder;
    let mut writer = SqliteItemWriter::<Person>::new()
        .pool(pool)
        .table(&config.table)
        .item_binder(&binder);
    for column in &config.columns {
        writer = writer.add_column(column);
    }

    let listener = JobCompletionNotificationListener::new(pool, &config.table, &config.columns);
    let hooks = hooks.listener(&listener);

    run_import(config, &writer, &hooks)
}

/// Runs the import job against any writer.
pub fn run_import(
    config: &ImportJobConfig,
    writer: &dyn ItemWriter<Person>,
    hooks: &JobHooks<'_>,
) -> Result<JobExecution, BatchError> {
    config.validate()?;

    let reader = CsvItemReaderBuilder::new()
        .delimiter(config.delimiter_byte()?)
        .has_headers(config.has_headers)
        .field_names(&config.field_names)
        .from_path(&config.input_path)?;

    let processor = PersonItemProcessor;

    let step = StepBuilder::new(&config.step_name)
        .chunk::<Person, Person>(config.chunk_size)
        .reader(&reader)
        .processor(&processor)
        .writer(writer)
        .build()?;

    let job = JobBuilder::new()
        .name(config.job_name.clone())
        .start(&step)
        .build();

    job.run_with(hooks)
}
