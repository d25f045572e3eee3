use std::{
    marker::PhantomData,
    time::{Duration, Instant},
};

use log::{debug, error, info};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    chunk::Chunk,
    item::{ItemProcessor, ItemReader, ItemWriter},
    listener::{ChunkContext, JobHooks},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Starting,
    Started,
    Success,
    ReadError,
    ProcessorError,
    WriteError,
}

/// Progress and outcome of one step execution.
#[derive(Debug)]
pub struct StepExecution {
    /// Unique identifier for this step execution
    pub id: Uuid,
    pub name: String,
    pub status: StepStatus,
    pub start_time: Instant,
    pub end_time: Instant,
    pub duration: Duration,
    /// Number of items successfully read
    pub read_count: usize,
    /// Number of items the processor filtered out
    pub filter_count: usize,
    /// Number of items successfully written
    pub write_count: usize,
    /// Number of chunks committed
    pub commit_count: usize,
    pub read_error_count: usize,
    pub process_error_count: usize,
    /// Number of items lost with a chunk the writer rejected
    pub write_error_count: usize,
}

impl StepExecution {
    pub fn new(name: &str) -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            status: StepStatus::Starting,
            start_time: now,
            end_time: now,
            duration: Duration::ZERO,
            read_count: 0,
            filter_count: 0,
            write_count: 0,
            commit_count: 0,
            read_error_count: 0,
            process_error_count: 0,
            write_error_count: 0,
        }
    }
}

pub trait Step {
    /// Executes the step, recording progress in `step_execution`.
    ///
    /// # Returns
    /// - `Ok(())`: the step completed successfully
    /// - `Err(BatchError)`: the first error that stopped the step
    fn execute(
        &self,
        step_execution: &mut StepExecution,
        hooks: &JobHooks<'_>,
    ) -> Result<(), BatchError>;

    fn get_name(&self) -> &str;
}

/// Reads, processes and writes items, committing every `chunk_size` records.
///
/// Items flow one at a time from the reader through the processor into the
/// current chunk. A full chunk is handed to the writer before the next record
/// is read. The first error aborts the chunk under construction and the step;
/// chunks committed before it stay committed.
pub struct ChunkOrientedStep<'a, I, O> {
    name: String,
    reader: &'a dyn ItemReader<I>,
    processor: &'a dyn ItemProcessor<I, O>,
    writer: &'a dyn ItemWriter<O>,
    chunk_size: usize,
}

impl<I, O> Step for ChunkOrientedStep<'_, I, O> {
    fn execute(
        &self,
        step_execution: &mut StepExecution,
        hooks: &JobHooks<'_>,
    ) -> Result<(), BatchError> {
        let start_time = Instant::now();
        step_execution.start_time = start_time;
        step_execution.status = StepStatus::Started;

        info!(
            "Start of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        let mut result = self
            .writer
            .open()
            .and_then(|()| self.process_chunks(step_execution, hooks));

        if let Err(err) = self.writer.close() {
            error!("Unable to close writer of step {}: {}", self.name, err);
            result = result.and(Err(err));
        }

        step_execution.status = match &result {
            Ok(()) => StepStatus::Success,
            Err(BatchError::ItemReader(_)) => StepStatus::ReadError,
            Err(BatchError::ItemProcessor(_)) => StepStatus::ProcessorError,
            Err(_) => StepStatus::WriteError,
        };
        step_execution.end_time = Instant::now();
        step_execution.duration = start_time.elapsed();

        info!(
            "End of step: {}, id: {}, status: {:?}, read: {}, written: {}",
            step_execution.name,
            step_execution.id,
            step_execution.status,
            step_execution.read_count,
            step_execution.write_count
        );

        result
    }

    fn get_name(&self) -> &str {
        &self.name
    }
}

impl<I, O> ChunkOrientedStep<'_, I, O> {
    fn process_chunks(
        &self,
        step_execution: &mut StepExecution,
        hooks: &JobHooks<'_>,
    ) -> Result<(), BatchError> {
        let mut chunk = Chunk::new(self.chunk_size);

        loop {
            match self.next_item(step_execution, &mut chunk, hooks) {
                Ok(true) => {
                    if chunk.is_full() {
                        self.write_chunk(step_execution, &mut chunk, hooks)?;
                    }
                }
                Ok(false) => {
                    debug!("End of input for step {}", self.name);
                    if !chunk.is_empty() {
                        self.write_chunk(step_execution, &mut chunk, hooks)?;
                    }
                    return Ok(());
                }
                Err(err) => {
                    if chunk.is_open() {
                        let context = self.chunk_context(step_execution, chunk.get_items().len());
                        hooks.fire_chunk_error(&context, &err);
                        chunk.clear();
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Reads and processes one record into `chunk`.
    ///
    /// Returns `Ok(false)` once the reader is exhausted.
    fn next_item(
        &self,
        step_execution: &mut StepExecution,
        chunk: &mut Chunk<O>,
        hooks: &JobHooks<'_>,
    ) -> Result<bool, BatchError> {
        let item = match self.reader.read() {
            Ok(Some(item)) => item,
            Ok(None) => return Ok(false),
            Err(err) => {
                step_execution.read_error_count += 1;
                error!("Error occurred during read item: {}", err);
                return Err(err);
            }
        };
        step_execution.read_count += 1;

        if !chunk.is_open() {
            chunk.open();
            debug!("Start of chunk {}", step_execution.commit_count + 1);
            hooks.fire_before_chunk(&self.chunk_context(step_execution, 0));
        }

        match self.processor.process(&item) {
            Ok(processed) => {
                if processed.is_none() {
                    step_execution.filter_count += 1;
                }
                chunk.add_item(processed);
                Ok(true)
            }
            Err(err) => {
                step_execution.process_error_count += 1;
                error!("Error occurred during process item: {}", err);
                Err(err)
            }
        }
    }

    fn write_chunk(
        &self,
        step_execution: &mut StepExecution,
        chunk: &mut Chunk<O>,
        hooks: &JobHooks<'_>,
    ) -> Result<(), BatchError> {
        let items = chunk.take();
        let context = self.chunk_context(step_execution, items.len());

        debug!(
            "Writing chunk {} of step {}: {} items",
            context.chunk_number,
            self.name,
            items.len()
        );

        let result = if items.is_empty() {
            Ok(())
        } else {
            self.writer.write(&items).and_then(|()| self.writer.flush())
        };

        match result {
            Ok(()) => {
                step_execution.write_count += items.len();
                step_execution.commit_count += 1;
                hooks.fire_after_chunk(&context);
                Ok(())
            }
            Err(err) => {
                step_execution.write_error_count += items.len();
                error!("ItemWriter error: {}", err);
                hooks.fire_chunk_error(&context, &err);
                Err(err)
            }
        }
    }

    fn chunk_context(&self, step_execution: &StepExecution, item_count: usize) -> ChunkContext {
        ChunkContext {
            step_name: self.name.clone(),
            chunk_number: step_execution.commit_count + 1,
            item_count,
        }
    }
}

/// Entry point for building steps.
///
/// ```rust,no_run,compile_fail
/// let step = StepBuilder::new("step1")
///     .chunk::<Person, Person>(10)
///     .reader(&reader)
///     .processor(&processor)
///     .writer(&writer)
///     .build()?;
/// ```
pub struct StepBuilder {
    name: String,
}

impl StepBuilder {
    /// Creates a step builder; an empty name is replaced by a generated one.
    pub fn new(name: &str) -> Self {
        let name = if name.is_empty() {
            build_name()
        } else {
            name.to_owned()
        };
        Self { name }
    }

    /// Switches to a chunk-oriented step committing every `chunk_size` items.
    pub fn chunk<'a, I, O>(self, chunk_size: usize) -> ChunkOrientedStepBuilder<'a, I, O> {
        ChunkOrientedStepBuilder {
            name: self.name,
            reader: None,
            processor: None,
            writer: None,
            chunk_size,
            _marker: PhantomData,
        }
    }
}

pub struct ChunkOrientedStepBuilder<'a, I, O> {
    name: String,
    reader: Option<&'a dyn ItemReader<I>>,
    processor: Option<&'a dyn ItemProcessor<I, O>>,
    writer: Option<&'a dyn ItemWriter<O>>,
    chunk_size: usize,
    _marker: PhantomData<(I, O)>,
}

impl<'a, I, O> ChunkOrientedStepBuilder<'a, I, O> {
    pub fn reader(mut self, reader: &'a dyn ItemReader<I>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn processor(mut self, processor: &'a dyn ItemProcessor<I, O>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn writer(mut self, writer: &'a dyn ItemWriter<O>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn build(self) -> Result<ChunkOrientedStep<'a, I, O>, BatchError> {
        if self.chunk_size == 0 {
            return Err(BatchError::Configuration(format!(
                "step {}: chunk size must be greater than 0",
                self.name
            )));
        }

        let missing = |component: &str| {
            BatchError::Configuration(format!("step {}: {} is required", self.name, component))
        };

        Ok(ChunkOrientedStep {
            reader: self.reader.ok_or_else(|| missing("reader"))?,
            processor: self.processor.ok_or_else(|| missing("processor"))?,
            writer: self.writer.ok_or_else(|| missing("writer"))?,
            chunk_size: self.chunk_size,
            name: self.name.clone(),
        })
    }
}
