mod common;

use std::cell::{Cell, RefCell};

use mockall::Sequence;

use people_batch::{
    BatchError,
    core::{job::BatchStatus, listener::JobHooks, step::StepStatus},
    people::{Person, import_people, run_import},
};

use common::{MockPersonWriter, config, input_file, people, people_pool, stored_people};

#[tokio::test(flavor = "multi_thread")]
async fn malformed_line_fails_the_job_before_anything_is_written() {
    let input = input_file(&["john,doe", "jane,roe", "broken", "jim,poe"]);
    let config = config(&input, 10);
    let pool = people_pool(&config).await;
    let final_status = Cell::new(None);

    let hooks = JobHooks::new().after_job(|job| final_status.set(Some(job.get_status())));
    let result = import_people(&config, &pool, hooks);

    match result {
        Err(BatchError::ItemReader(msg)) => assert!(msg.contains("line 3"), "{}", msg),
        other => panic!("expected a read error, got {:?}", other.map(|e| e.get_status())),
    }
    assert_eq!(final_status.get(), Some(BatchStatus::Failed));
    assert!(stored_people(&pool).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_line_keeps_previously_committed_chunks() {
    let input = input_file(&["a,a", "b,b", "c,c", "broken", "e,e"]);
    let config = config(&input, 2);
    let pool = people_pool(&config).await;
    let aborted = RefCell::new(Vec::new());

    let hooks = JobHooks::new().on_chunk_error(|chunk, _| {
        aborted
            .borrow_mut()
            .push((chunk.chunk_number, chunk.item_count))
    });
    let result = import_people(&config, &pool, hooks);

    assert!(matches!(result, Err(BatchError::ItemReader(_))));
    assert_eq!(aborted.into_inner(), vec![(2, 1)]);
    assert_eq!(stored_people(&pool).await, people(&[("A", "A"), ("B", "B")]));
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_name_is_a_transform_error() {
    let input = input_file(&["john,doe", "jane,"]);
    let config = config(&input, 10);
    let pool = people_pool(&config).await;

    let result = import_people(&config, &pool, JobHooks::new());

    match result {
        Err(BatchError::ItemProcessor(msg)) => assert!(msg.contains("lastName")),
        other => panic!("expected a processor error, got {:?}", other.map(|e| e.get_status())),
    }
    assert!(stored_people(&pool).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_chunk_is_rolled_back_and_earlier_chunks_stay() {
    let input = input_file(&["a,a", "b,b", "c,boom", "d,d", "e,e"]);
    let mut config = config(&input, 2);
    config.table = "guarded_people".to_string();

    let pool = people_batch::people::connect(&config.database_url)
        .await
        .expect("unable to open database");
    sqlx::query(
        "CREATE TABLE guarded_people (
            person_id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name VARCHAR(20),
            last_name VARCHAR(20) CHECK (last_name <> 'BOOM')
        )",
    )
    .execute(&pool)
    .await
    .expect("unable to create table");

    let result = import_people(&config, &pool, JobHooks::new());

    assert!(matches!(result, Err(BatchError::ItemWriter(ref msg)) if msg.contains("CHECK")));

    let stored: Vec<(String, String)> =
        sqlx::query_as("SELECT first_name, last_name FROM guarded_people ORDER BY person_id")
            .fetch_all(&pool)
            .await
            .expect("unable to read people");
    assert_eq!(stored, people(&[("A", "A"), ("B", "B")]));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_table_fails_the_job() {
    let input = input_file(&["john,doe"]);
    let config = config(&input, 10);
    let pool = people_batch::people::connect(&config.database_url)
        .await
        .expect("unable to open database");

    let result = import_people(&config, &pool, JobHooks::new());

    assert!(matches!(result, Err(BatchError::ItemWriter(_))));
}

#[test]
fn writer_failure_stops_reading() {
    let input = input_file(&["a,a", "b,b", "c,c", "d,d", "e,e"]);
    let config = config(&input, 2);

    let mut writer = MockPersonWriter::default();
    writer
        .expect_write()
        .withf(|items| items.to_vec() == vec![Person::new("A", "A"), Person::new("B", "B")])
        .times(1)
        .returning(|_| Err(BatchError::ItemWriter("sink unavailable".to_string())));

    let step_outcome = RefCell::new(None);
    let hooks = JobHooks::new().after_job(|job| {
        let step = &job.get_step_executions()[0];
        step_outcome.replace(Some((
            job.get_status(),
            step.status,
            step.read_count,
            step.write_error_count,
            step.commit_count,
        )));
    });

    let result = run_import(&config, &writer, &hooks);
    drop(hooks);

    assert!(matches!(result, Err(BatchError::ItemWriter(_))));
    assert_eq!(
        step_outcome.into_inner(),
        Some((BatchStatus::Failed, StepStatus::WriteError, 2, 2, 0))
    );
}

#[test]
fn every_chunk_reaches_the_writer_in_order() {
    let input = input_file(&["a,a", "b,b", "c,c"]);
    let config = config(&input, 2);
    let mut sequence = Sequence::new();

    let mut writer = MockPersonWriter::default();
    writer
        .expect_write()
        .withf(|items| items.to_vec() == vec![Person::new("A", "A"), Person::new("B", "B")])
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(()));
    writer
        .expect_write()
        .withf(|items| items.to_vec() == vec![Person::new("C", "C")])
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(()));

    let execution = run_import(&config, &writer, &JobHooks::new()).expect("job should complete");

    assert_eq!(execution.get_status(), BatchStatus::Completed);
    assert_eq!(execution.get_step_executions()[0].commit_count, 2);
}

#[test]
fn failing_first_record_of_a_chunk_reports_the_chunk_error() {
    let input = input_file(&["a,a", "b,"]);
    let config = config(&input, 1);
    let events = RefCell::new(Vec::new());

    let mut writer = MockPersonWriter::default();
    writer.expect_write().times(1).returning(|_| Ok(()));

    let hooks = JobHooks::new()
        .before_chunk(|chunk| events.borrow_mut().push(format!("open {}", chunk.chunk_number)))
        .after_chunk(|chunk| events.borrow_mut().push(format!("commit {}", chunk.chunk_number)))
        .on_chunk_error(|chunk, _| {
            events
                .borrow_mut()
                .push(format!("error {}", chunk.chunk_number))
        });

    let result = run_import(&config, &writer, &hooks);
    drop(hooks);

    assert!(matches!(result, Err(BatchError::ItemProcessor(_))));
    assert_eq!(
        events.into_inner(),
        vec!["open 1", "commit 1", "open 2", "error 2"]
    );
}

#[tokio::test]
async fn current_thread_runtime_fails_the_job_instead_of_panicking() {
    let input = input_file(&["john,doe"]);
    let config = config(&input, 10);
    let pool = people_pool(&config).await;

    let result = import_people(&config, &pool, JobHooks::new());

    assert!(
        matches!(result, Err(BatchError::ItemWriter(ref msg)) if msg.contains("multi-thread"))
    );
    assert!(stored_people(&pool).await.is_empty());
}

#[test]
fn missing_input_file_is_an_error() {
    let config = people_batch::config::ImportJobConfig::default()
        .with_input_path("does/not/exist.csv");
    let writer = MockPersonWriter::default();

    let result = run_import(&config, &writer, &JobHooks::new());

    assert!(matches!(result, Err(BatchError::ItemReader(_))));
}

#[test]
fn zero_chunk_size_is_a_configuration_error() {
    let input = input_file(&["john,doe"]);
    let config = config(&input, 0);
    let writer = MockPersonWriter::default();

    let result = run_import(&config, &writer, &JobHooks::new());

    assert!(matches!(result, Err(BatchError::Configuration(_))));
}
