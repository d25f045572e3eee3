use std::fmt::Display;

use log::info;

use crate::core::item::{ItemWriter, ItemWriterResult};

/// Writer logging every record instead of persisting it.
///
/// Useful to dry-run a job against real input without touching the sink.
#[derive(Default)]
pub struct LoggerWriter {}

impl<T> ItemWriter<T> for LoggerWriter
where
    T: Display,
{
    fn write(&self, items: &[T]) -> ItemWriterResult {
        items.iter().for_each(|item| info!("Record: <{}>", item));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::item::ItemWriter;

    use super::LoggerWriter;

    #[test]
    fn logging_never_fails() {
        let writer = LoggerWriter::default();

        assert!(writer.write(&["JOHN", "JANE"]).is_ok());
        assert!(ItemWriter::<&str>::write(&writer, &[]).is_ok());
    }
}
