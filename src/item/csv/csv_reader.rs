use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Terminator, Trim};
use serde::de::DeserializeOwned;
use std::{
    cell::{Cell, RefCell},
    fs::File,
    io::Read,
    path::Path,
};

use crate::{
    core::item::{ItemReader, ItemReaderResult},
    error::BatchError,
};

/// A CSV item reader that implements the `ItemReader` trait.
///
/// Each line is deserialized into `T` with serde. When field names are
/// configured, fields are mapped by name (the names play the role of a header
/// row) and every line must carry exactly that many fields. Otherwise fields
/// are mapped by position.
///
/// The reader counts the records it consumed; see [`CsvItemReader::position`].
/// A reader built with a start offset silently skips that many records before
/// returning the first one, which allows resuming an interrupted import.
///
/// # Examples
///
/// ```
/// use people_batch::item::csv::csv_reader::CsvItemReaderBuilder;
/// use people_batch::core::item::ItemReader;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Person {
///     first_name: String,
///     last_name: String,
/// }
///
/// let data = "Jill,Doe\nJoe,Doe\n";
///
/// let reader = CsvItemReaderBuilder::new()
///     .field_names(&["firstName", "lastName"])
///     .from_reader(data.as_bytes());
///
/// let person: Person = reader.read().unwrap().unwrap();
/// assert_eq!(person.first_name, "Jill");
/// assert_eq!(person.last_name, "Doe");
///
/// let person: Person = reader.read().unwrap().unwrap();
/// assert_eq!(person.first_name, "Joe");
///
/// assert!(ItemReader::<Person>::read(&reader).unwrap().is_none());
/// ```
pub struct CsvItemReader<R> {
    /// Uses `RefCell` so records can be pulled through `&self`.
    records: RefCell<StringRecordsIntoIter<R>>,
    /// Names used for by-name mapping and field count checks
    headers: Option<StringRecord>,
    /// Records consumed so far, skipped ones included
    position: Cell<u64>,
    start_offset: u64,
}

impl<R: Read> CsvItemReader<R> {
    fn new(rdr: csv::Reader<R>, headers: Option<StringRecord>, start_offset: u64) -> Self {
        Self {
            records: RefCell::new(rdr.into_records()),
            headers,
            position: Cell::new(0),
            start_offset,
        }
    }

    /// Number of records consumed from the source so far.
    ///
    /// Passing this value as `start_offset` to a new reader over the same
    /// source resumes right after the last consumed record.
    pub fn position(&self) -> u64 {
        self.position.get()
    }

    fn next_record(&self) -> Result<Option<StringRecord>, BatchError> {
        let mut records = self.records.borrow_mut();

        while self.position.get() < self.start_offset {
            match records.next() {
                Some(Ok(_)) => self.position.set(self.position.get() + 1),
                Some(Err(error)) => return Err(BatchError::ItemReader(error.to_string())),
                None => return Ok(None),
            }
        }

        match records.next() {
            Some(Ok(record)) => {
                self.position.set(self.position.get() + 1);
                Ok(Some(record))
            }
            Some(Err(error)) => {
                self.position.set(self.position.get() + 1);
                Err(BatchError::ItemReader(error.to_string()))
            }
            None => Ok(None),
        }
    }
}

impl<R: Read, T: DeserializeOwned> ItemReader<T> for CsvItemReader<R> {
    /// Reads the next item from the CSV source.
    ///
    /// # Returns
    /// - `Ok(Some(record))` if a record is successfully read
    /// - `Ok(None)` if there are no more records to read
    /// - `Err(BatchError::ItemReader(_))` if the line has the wrong number of
    ///   fields or cannot be deserialized; the message names the line
    fn read(&self) -> ItemReaderResult<T> {
        let Some(record) = self.next_record()? else {
            return Ok(None);
        };

        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or_else(|| self.position.get());

        if let Some(headers) = &self.headers {
            if record.len() != headers.len() {
                return Err(BatchError::ItemReader(format!(
                    "line {}: expected {} fields but found {}",
                    line,
                    headers.len(),
                    record.len()
                )));
            }
        }

        record
            .deserialize(self.headers.as_ref())
            .map(Some)
            .map_err(|error| BatchError::ItemReader(format!("line {}: {}", line, error)))
    }
}

/// A builder for configuring CSV item reading.
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Terminator: CRLF (accepts `\n`, `\r` and `\r\n`)
/// - Headers: disabled
/// - Field names: none (positional mapping)
/// - Start offset: 0
/// - Trimming: all fields trimmed
#[derive(Default)]
pub struct CsvItemReaderBuilder {
    delimiter: u8,
    terminator: Terminator,
    has_headers: bool,
    field_names: Option<Vec<String>>,
    start_offset: u64,
}

impl CsvItemReaderBuilder {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            terminator: Terminator::CRLF,
            has_headers: false,
            field_names: None,
            start_offset: 0,
        }
    }

    /// Sets the delimiter character for the CSV parsing.
    ///
    /// ```
    /// use people_batch::item::csv::csv_reader::CsvItemReaderBuilder;
    ///
    /// let builder = CsvItemReaderBuilder::new().delimiter(b';');
    /// ```
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    /// Sets whether the first row holds column names.
    ///
    /// The header row is never returned as an item. Its names are used for
    /// by-name mapping unless `field_names` is also set.
    pub fn has_headers(mut self, yes: bool) -> Self {
        self.has_headers = yes;
        self
    }

    /// Names the fields of every line, in order.
    ///
    /// Lines are then deserialized by name and must contain exactly
    /// `names.len()` fields.
    pub fn field_names<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.field_names = Some(names.iter().map(|name| name.as_ref().to_owned()).collect());
        self
    }

    /// Skips the first `offset` records (header excluded).
    pub fn start_offset(mut self, offset: u64) -> Self {
        self.start_offset = offset;
        self
    }

    fn reader_builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .trim(Trim::All)
            .delimiter(self.delimiter)
            .terminator(self.terminator)
            .has_headers(self.has_headers)
            // field counts are checked against the configured names instead
            .flexible(true);
        builder
    }

    fn headers<R: Read>(&self, rdr: &mut csv::Reader<R>) -> Option<StringRecord> {
        match &self.field_names {
            Some(names) => Some(StringRecord::from(names.clone())),
            None if self.has_headers => rdr.headers().ok().cloned(),
            None => None,
        }
    }

    /// Creates a `CsvItemReader` from any source implementing `Read`.
    ///
    /// ```
    /// use people_batch::item::csv::csv_reader::CsvItemReaderBuilder;
    /// use std::io::Cursor;
    ///
    /// let reader = CsvItemReaderBuilder::new()
    ///     .from_reader(Cursor::new("john,doe\njane,roe"));
    /// assert_eq!(reader.position(), 0);
    /// ```
    pub fn from_reader<R: Read>(self, rdr: R) -> CsvItemReader<R> {
        let mut rdr = self.reader_builder().from_reader(rdr);
        let headers = self.headers(&mut rdr);

        CsvItemReader::new(rdr, headers, self.start_offset)
    }

    /// Creates a `CsvItemReader` from a file path.
    ///
    /// # Errors
    /// Returns `BatchError::ItemReader` when the file cannot be opened.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<CsvItemReader<File>, BatchError> {
        let path = path.as_ref();
        let mut rdr = self.reader_builder().from_path(path).map_err(|error| {
            BatchError::ItemReader(format!("unable to open {}: {}", path.display(), error))
        })?;
        let headers = self.headers(&mut rdr);

        Ok(CsvItemReader::new(rdr, headers, self.start_offset))
    }
}
