use std::{
    fmt,
    time::{Duration, Instant},
};

use log::{error, info, warn};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    listener::JobHooks,
    step::{Step, StepExecution},
};

/// Type alias for job execution results.
///
/// A `JobResult` is a `Result` that contains either:
/// - A successful `JobExecution` with execution details
/// - The `BatchError` that made the job fail
type JobResult<T> = Result<T, BatchError>;

/// Lifecycle status of a job run.
///
/// A run starts as `Starting`, becomes `Running` once the `before_job` hooks
/// returned, and ends as `Completed` or `Failed`. Terminal statuses never
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Starting,
    Running,
    Completed,
    Failed,
}

impl BatchStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchStatus::Completed | BatchStatus::Failed)
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            BatchStatus::Starting => "STARTING",
            BatchStatus::Running => "RUNNING",
            BatchStatus::Completed => "COMPLETED",
            BatchStatus::Failed => "FAILED",
        };
        f.write_str(status)
    }
}

/// Represents a job that can be executed.
///
/// A job is a container for a sequence of steps executed in order. It reports
/// its progress through a `JobExecution` and the hooks it is run with.
///
/// # Example Usage
///
/// ```rust,no_run,compile_fail
/// use people_batch::core::job::{Job, JobBuilder};
/// use people_batch::core::step::StepBuilder;
///
/// let step = StepBuilder::new("import")
///     .chunk::<Person, Person>(10)
///     .reader(&some_reader)
///     .processor(&some_processor)
///     .writer(&some_writer)
///     .build()?;
///
/// let job = JobBuilder::new()
///     .name("importUserJob".to_string())
///     .start(&step)
///     .build();
///
/// let result = job.run();
/// ```
pub trait Job {
    /// Runs the job without hooks.
    ///
    /// # Returns
    /// - `Ok(JobExecution)` when every step completed
    /// - `Err(BatchError)` with the first error raised by a step
    fn run(&self) -> JobResult<JobExecution> {
        self.run_with(&JobHooks::new())
    }

    /// Runs the job, invoking `hooks` at each state transition.
    fn run_with(&self, hooks: &JobHooks<'_>) -> JobResult<JobExecution>;
}

/// Execution details of one job run.
#[derive(Debug)]
pub struct JobExecution {
    id: Uuid,
    name: String,
    status: BatchStatus,
    /// The time when the job started executing
    pub start: Instant,
    /// The time when the job finished executing
    pub end: Instant,
    /// The total duration of the job execution
    pub duration: Duration,
    step_executions: Vec<StepExecution>,
}

impl JobExecution {
    fn new(id: Uuid, name: &str) -> Self {
        let now = Instant::now();
        Self {
            id,
            name: name.to_owned(),
            status: BatchStatus::Starting,
            start: now,
            end: now,
            duration: Duration::ZERO,
            step_executions: Vec::new(),
        }
    }

    pub fn get_id(&self) -> Uuid {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_status(&self) -> BatchStatus {
        self.status
    }

    pub fn get_step_executions(&self) -> &[StepExecution] {
        &self.step_executions
    }

    /// Moves the run to `status`, unless it already reached a terminal one.
    fn set_status(&mut self, status: BatchStatus) {
        if self.status.is_terminal() {
            warn!(
                "Job {} is already {}, ignoring transition to {}",
                self.name, self.status, status
            );
            return;
        }
        self.status = status;
    }

    fn finish(&mut self, status: BatchStatus) {
        self.set_status(status);
        self.end = Instant::now();
        self.duration = self.start.elapsed();
    }
}

/// A configured job, ready to be run.
///
/// Steps are executed in the order they were added to the `JobBuilder`.
pub struct JobInstance<'a> {
    id: Uuid,
    name: String,
    steps: Vec<&'a dyn Step>,
}

impl JobInstance<'_> {
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

impl Job for JobInstance<'_> {
    fn run_with(&self, hooks: &JobHooks<'_>) -> JobResult<JobExecution> {
        let mut execution = JobExecution::new(self.id, &self.name);

        info!("Start of job: {}, id: {}", self.name, self.id);

        hooks.fire_before_job(&execution);
        execution.set_status(BatchStatus::Running);

        let mut failure = None;
        for step in &self.steps {
            let mut step_execution = StepExecution::new(step.get_name());
            let result = step.execute(&mut step_execution, hooks);
            execution.step_executions.push(step_execution);

            if let Err(err) = result {
                error!("Step {} of job {} failed: {}", step.get_name(), self.name, err);
                failure = Some(err);
                break;
            }
        }

        let status = if failure.is_some() {
            BatchStatus::Failed
        } else {
            BatchStatus::Completed
        };
        execution.finish(status);

        hooks.fire_after_job(&execution);

        info!(
            "End of job: {}, id: {}, status: {}",
            self.name, self.id, execution.status
        );

        match failure {
            Some(err) => Err(err),
            None => Ok(execution),
        }
    }
}

/// Builder for creating a job instance.
///
/// If no name is given, a random one is generated.
///
/// # Example
///
/// ```rust,no_run,compile_fail
/// use people_batch::core::job::JobBuilder;
///
/// let job = JobBuilder::new()
///     .name("import-customers".to_string())
///     .start(&read_step)
///     .next(&write_step)
///     .build();
/// ```
#[derive(Default)]
pub struct JobBuilder<'a> {
    name: Option<String>,
    steps: Vec<&'a dyn Step>,
}

impl<'a> JobBuilder<'a> {
    pub fn new() -> Self {
        Self {
            name: None,
            steps: Vec::new(),
        }
    }

    pub fn name(mut self, name: String) -> JobBuilder<'a> {
        self.name = Some(name);
        self
    }

    /// Sets the first step of the job.
    ///
    /// Identical to `next()`, reads better for the first step.
    pub fn start(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    pub fn next(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    pub fn build(self) -> JobInstance<'a> {
        JobInstance {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_else(build_name),
            steps: self.steps,
        }
    }
}
