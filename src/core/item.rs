use crate::error::BatchError;

/// Result of a read: `Ok(None)` marks the end of the input.
pub type ItemReaderResult<I> = Result<Option<I>, BatchError>;

/// Result of a transformation: `Ok(None)` means the item is filtered out.
pub type ItemProcessorResult<O> = Result<Option<O>, BatchError>;

pub type ItemWriterResult = Result<(), BatchError>;

/// Retrieves input for a step, one item at a time.
///
/// Readers keep their cursor behind interior mutability so that a step can
/// hold them through a shared reference.
pub trait ItemReader<I> {
    /// Reads the next item.
    ///
    /// # Returns
    /// - `Ok(Some(item))` when an item was read
    /// - `Ok(None)` when the input is exhausted
    /// - `Err(BatchError::ItemReader(_))` when the next record is malformed
    fn read(&self) -> ItemReaderResult<I>;
}

/// Business logic applied to each item between the reader and the writer.
///
/// Implementations must not keep state across items.
pub trait ItemProcessor<I, O> {
    fn process(&self, item: &I) -> ItemProcessorResult<O>;
}

/// Output of a step, one chunk at a time.
///
/// A call to `write` is a unit of work: either every item of the slice is
/// persisted or none is.
pub trait ItemWriter<O> {
    fn write(&self, items: &[O]) -> ItemWriterResult;

    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }

    fn open(&self) -> ItemWriterResult {
        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        Ok(())
    }
}
