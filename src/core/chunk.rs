/// Items accumulated by a step between two commits.
///
/// Capacity counts every item that went through the processor, including the
/// ones it filtered out, so a chunk always spans `capacity` input records
/// (except the last one).
#[derive(Debug)]
pub struct Chunk<O> {
    items: Vec<O>,
    processed: usize,
    capacity: usize,
    /// Set once a record has been read into the chunk, before it is processed
    open: bool,
}

impl<O> Chunk<O> {
    pub fn new(capacity: usize) -> Chunk<O> {
        Chunk {
            items: Vec::with_capacity(capacity),
            processed: 0,
            capacity,
            open: false,
        }
    }

    /// Adds the outcome of processing one input record.
    pub fn add_item(&mut self, processed_item: Option<O>) {
        if let Some(item) = processed_item {
            self.items.push(item);
        }
        self.processed += 1;
    }

    pub fn is_full(&self) -> bool {
        self.processed >= self.capacity
    }

    /// True while no input record has been accounted to this chunk.
    pub fn is_empty(&self) -> bool {
        self.processed == 0
    }

    /// Marks the chunk as started; it stays open until taken or cleared.
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn get_items(&self) -> &[O] {
        &self.items
    }

    /// Hands the buffered items over and resets the chunk.
    pub fn take(&mut self) -> Vec<O> {
        self.processed = 0;
        self.open = false;
        std::mem::replace(&mut self.items, Vec::with_capacity(self.capacity))
    }

    pub fn clear(&mut self) {
        self.processed = 0;
        self.open = false;
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::Chunk;

    #[test]
    fn chunk_is_full_once_capacity_items_are_processed() {
        let mut chunk = Chunk::new(2);
        assert!(chunk.is_empty());

        chunk.add_item(Some("a"));
        assert!(!chunk.is_full());

        chunk.add_item(Some("b"));
        assert!(chunk.is_full());
        assert_eq!(chunk.get_items(), &["a", "b"]);
    }

    #[test]
    fn chunk_stays_open_until_taken() {
        let mut chunk: Chunk<&str> = Chunk::new(2);
        chunk.open();

        assert!(chunk.is_open());
        assert!(chunk.is_empty());

        chunk.add_item(Some("a"));
        assert_eq!(chunk.take(), vec!["a"]);
        assert!(!chunk.is_open());

        chunk.open();
        chunk.clear();
        assert!(!chunk.is_open());
    }

    #[test]
    fn filtered_items_count_toward_capacity() {
        let mut chunk: Chunk<&str> = Chunk::new(2);
        chunk.add_item(None);
        chunk.add_item(Some("b"));

        assert!(chunk.is_full());
        assert_eq!(chunk.get_items().len(), 1);
    }

    #[test]
    fn take_returns_items_and_resets() {
        let mut chunk = Chunk::new(3);
        chunk.add_item(Some(1));
        chunk.add_item(Some(2));

        let items = chunk.take();

        assert_eq!(items, vec![1, 2]);
        assert!(chunk.is_empty());
        assert!(chunk.get_items().is_empty());

        chunk.add_item(Some(3));
        chunk.clear();
        assert!(chunk.is_empty());
    }
}
