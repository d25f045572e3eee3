use crate::BatchError;

use super::job::JobExecution;

/// Describes the chunk a hook is fired for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkContext {
    /// Name of the step owning the chunk
    pub step_name: String,
    /// 1-based position of the chunk in the step
    pub chunk_number: usize,
    /// Items handed to the writer (0 before the commit)
    pub item_count: usize,
}

/// Callbacks invoked at the start and at the end of a job.
///
/// Both methods default to no-ops so that a listener only overrides what it
/// needs. `after_job` is called exactly once per run, whatever the outcome.
pub trait JobExecutionListener {
    fn before_job(&self, _job_execution: &JobExecution) {}

    fn after_job(&self, _job_execution: &JobExecution) {}
}

type JobHook<'a> = Box<dyn Fn(&JobExecution) + 'a>;
type ChunkHook<'a> = Box<dyn Fn(&ChunkContext) + 'a>;
type ChunkErrorHook<'a> = Box<dyn Fn(&ChunkContext, &BatchError) + 'a>;

/// Function values invoked synchronously by a job run.
///
/// Several functions can be registered for the same event; they are called in
/// registration order.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use people_batch::core::listener::JobHooks;
///
/// let chunks = Cell::new(0);
/// let hooks = JobHooks::new()
///     .before_job(|execution| println!("starting {}", execution.get_name()))
///     .after_chunk(|_| chunks.set(chunks.get() + 1));
/// # drop(hooks);
/// ```
#[derive(Default)]
pub struct JobHooks<'a> {
    before_job: Vec<JobHook<'a>>,
    after_job: Vec<JobHook<'a>>,
    before_chunk: Vec<ChunkHook<'a>>,
    after_chunk: Vec<ChunkHook<'a>>,
    chunk_error: Vec<ChunkErrorHook<'a>>,
}

impl<'a> JobHooks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before_job(mut self, hook: impl Fn(&JobExecution) + 'a) -> Self {
        self.before_job.push(Box::new(hook));
        self
    }

    pub fn after_job(mut self, hook: impl Fn(&JobExecution) + 'a) -> Self {
        self.after_job.push(Box::new(hook));
        self
    }

    /// Called when a chunk receives its first record.
    pub fn before_chunk(mut self, hook: impl Fn(&ChunkContext) + 'a) -> Self {
        self.before_chunk.push(Box::new(hook));
        self
    }

    /// Called once the chunk has been committed by the writer.
    pub fn after_chunk(mut self, hook: impl Fn(&ChunkContext) + 'a) -> Self {
        self.after_chunk.push(Box::new(hook));
        self
    }

    /// Called when the chunk under construction is abandoned.
    pub fn on_chunk_error(mut self, hook: impl Fn(&ChunkContext, &BatchError) + 'a) -> Self {
        self.chunk_error.push(Box::new(hook));
        self
    }

    /// Registers both callbacks of a `JobExecutionListener`.
    pub fn listener(self, listener: &'a dyn JobExecutionListener) -> Self {
        self.before_job(move |execution| listener.before_job(execution))
            .after_job(move |execution| listener.after_job(execution))
    }

    pub(crate) fn fire_before_job(&self, job_execution: &JobExecution) {
        self.before_job.iter().for_each(|hook| hook(job_execution));
    }

    pub(crate) fn fire_after_job(&self, job_execution: &JobExecution) {
        self.after_job.iter().for_each(|hook| hook(job_execution));
    }

    pub(crate) fn fire_before_chunk(&self, context: &ChunkContext) {
        self.before_chunk.iter().for_each(|hook| hook(context));
    }

    pub(crate) fn fire_after_chunk(&self, context: &ChunkContext) {
        self.after_chunk.iter().for_each(|hook| hook(context));
    }

    pub(crate) fn fire_chunk_error(&self, context: &ChunkContext, error: &BatchError) {
        self.chunk_error.iter().for_each(|hook| hook(context, error));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::{ChunkContext, JobHooks};
    use crate::BatchError;

    fn context(chunk_number: usize) -> ChunkContext {
        ChunkContext {
            step_name: "step1".to_string(),
            chunk_number,
            item_count: 0,
        }
    }

    #[test]
    fn chunk_hooks_run_in_registration_order() {
        let calls = RefCell::new(Vec::new());

        let hooks = JobHooks::new()
            .before_chunk(|ctx| calls.borrow_mut().push(format!("first {}", ctx.chunk_number)))
            .before_chunk(|ctx| calls.borrow_mut().push(format!("second {}", ctx.chunk_number)))
            .on_chunk_error(|ctx, err| {
                calls
                    .borrow_mut()
                    .push(format!("error {} {}", ctx.chunk_number, err))
            });

        hooks.fire_before_chunk(&context(1));
        hooks.fire_after_chunk(&context(1));
        hooks.fire_chunk_error(&context(2), &BatchError::ItemWriter("boom".to_string()));
        drop(hooks);

        assert_eq!(
            calls.into_inner(),
            vec!["first 1", "second 1", "error 2 ItemWriter from: boom"]
        );
    }
}
