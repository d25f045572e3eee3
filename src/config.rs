//! Configuration of the people import job.
//!
//! Replaces a declarative job definition with a plain value object that can be
//! built in code, loaded from a JSON file, and overridden from the command
//! line.

use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::BatchError;

/// Everything needed to build and run the import job.
///
/// Missing keys in a JSON file fall back to [`ImportJobConfig::default`].
///
/// ```
/// use people_batch::config::ImportJobConfig;
///
/// let config: ImportJobConfig =
///     serde_json::from_str(r#"{ "chunkSize": 2, "databaseUrl": "sqlite::memory:" }"#).unwrap();
///
/// assert_eq!(config.chunk_size, 2);
/// assert_eq!(config.table, "people");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportJobConfig {
    pub job_name: String,
    pub step_name: String,
    pub input_path: PathBuf,
    /// Single ASCII character separating fields
    pub delimiter: char,
    pub has_headers: bool,
    /// Names of the fields of every line, in order
    pub field_names: Vec<String>,
    /// Number of records committed together
    pub chunk_size: usize,
    pub database_url: String,
    pub table: String,
    /// Columns receiving the first and last name, in that order
    pub columns: Vec<String>,
    /// Create the table when it does not exist
    pub init_schema: bool,
}

impl Default for ImportJobConfig {
    fn default() -> Self {
        Self {
            job_name: "importUserJob".to_string(),
            step_name: "step1".to_string(),
            input_path: PathBuf::from("data/sample-data.csv"),
            delimiter: ',',
            has_headers: false,
            field_names: vec!["firstName".to_string(), "lastName".to_string()],
            chunk_size: 10,
            database_url: "sqlite://people.db".to_string(),
            table: "people".to_string(),
            columns: vec!["first_name".to_string(), "last_name".to_string()],
            init_schema: false,
        }
    }
}

impl ImportJobConfig {
    /// Loads a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, BatchError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|error| {
            BatchError::Configuration(format!(
                "invalid configuration {}: {}",
                path.display(),
                error
            ))
        })
    }

    pub fn with_input_path<P: Into<PathBuf>>(mut self, input_path: P) -> Self {
        self.input_path = input_path.into();
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.database_url = database_url.into();
        self
    }

    pub fn with_init_schema(mut self, init_schema: bool) -> Self {
        self.init_schema = init_schema;
        self
    }

    /// The delimiter as the byte expected by the CSV reader.
    pub fn delimiter_byte(&self) -> Result<u8, BatchError> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                BatchError::Configuration(format!(
                    "delimiter {:?} is not a single ASCII character",
                    self.delimiter
                ))
            })
    }

    pub fn validate(&self) -> Result<(), BatchError> {
        if self.chunk_size == 0 {
            return Err(BatchError::Configuration(
                "chunk size must be greater than 0".to_string(),
            ));
        }
        if self.field_names.len() != 2 {
            return Err(BatchError::Configuration(format!(
                "expected 2 field names, got {}",
                self.field_names.len()
            )));
        }
        if self.columns.len() != 2 {
            return Err(BatchError::Configuration(format!(
                "expected 2 columns, got {}",
                self.columns.len()
            )));
        }
        let identifiers = std::iter::once(&self.table).chain(self.columns.iter());
        for identifier in identifiers {
            if !is_identifier(identifier) {
                return Err(BatchError::Configuration(format!(
                    "{:?} is not a valid SQL identifier",
                    identifier
                )));
            }
        }
        self.delimiter_byte()?;
        Ok(())
    }
}

/// Table and column names are pasted into SQL, so only plain identifiers pass.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::BatchError;

    use super::ImportJobConfig;

    #[test]
    fn defaults_describe_the_people_import() {
        let config = ImportJobConfig::default();

        assert_eq!(config.job_name, "importUserJob");
        assert_eq!(config.chunk_size, 10);
        assert_eq!(config.field_names, vec!["firstName", "lastName"]);
        assert_eq!(config.columns, vec!["first_name", "last_name"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_camel_case_json_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r#"{{ "inputPath": "in.csv", "delimiter": ";", "chunkSize": 3, "table": "persons" }}"#
        )?;

        let config = ImportJobConfig::from_json_file(file.path())?;

        assert_eq!(config.input_path.to_str(), Some("in.csv"));
        assert_eq!(config.delimiter_byte()?, b';');
        assert_eq!(config.chunk_size, 3);
        assert_eq!(config.table, "persons");
        assert_eq!(config.step_name, "step1");
        Ok(())
    }

    #[test]
    fn malformed_json_is_a_configuration_error() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "{{ chunkSize: ")?;

        let result = ImportJobConfig::from_json_file(file.path());

        assert!(matches!(result, Err(BatchError::Configuration(_))));
        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = ImportJobConfig::from_json_file("does/not/exist.json");

        assert!(matches!(result, Err(BatchError::Io(_))));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let zero_chunk = ImportJobConfig::default().with_chunk_size(0);
        assert!(matches!(zero_chunk.validate(), Err(BatchError::Configuration(_))));

        let injected_table = ImportJobConfig {
            table: "people; DROP TABLE people".to_string(),
            ..ImportJobConfig::default()
        };
        assert!(injected_table.validate().is_err());

        let one_column = ImportJobConfig {
            columns: vec!["first_name".to_string()],
            ..ImportJobConfig::default()
        };
        assert!(one_column.validate().is_err());

        let wide_delimiter = ImportJobConfig {
            delimiter: '§',
            ..ImportJobConfig::default()
        };
        assert!(wide_delimiter.validate().is_err());
    }
}
