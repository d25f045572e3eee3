use thiserror::Error;

#[derive(Error, Debug)]
/// Batch error
///
/// Reader, processor and writer errors are fatal for the chunk being built and
/// for the job that owns it. A failed job hands the first one back unchanged.
pub enum BatchError {
    /// A record could not be read or mapped from the source.
    #[error("ItemReader from: {0}")]
    ItemReader(String),

    /// A record could not be transformed.
    #[error("ItemProcessor from: {0}")]
    ItemProcessor(String),

    /// A chunk could not be persisted to the sink.
    #[error("ItemWriter from: {0}")]
    ItemWriter(String),

    /// A builder or a job configuration is incomplete or invalid.
    #[error("Configuration: {0}")]
    Configuration(String),

    /// Connection or schema setup failure, outside of any chunk.
    #[error("Database: {0}")]
    Database(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
