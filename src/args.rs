use std::path::PathBuf;

use clap::Parser;
use people_batch::{BatchError, config::ImportJobConfig};

/// Import people from a CSV file into a SQLite table, upper-casing their names.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON job configuration; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// CSV file with one `firstName,lastName` per line
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// SQLite database receiving the rows, e.g. sqlite://people.db
    #[arg(short, long)]
    pub database_url: Option<String>,

    /// Number of records committed together
    #[arg(short = 'n', long)]
    pub chunk_size: Option<usize>,

    /// Create the people table if it does not exist
    #[arg(long)]
    pub init_schema: bool,

    /// Log the transformed records instead of writing them
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Resolves the job configuration: defaults, then the file, then flags.
    pub fn job_config(&self) -> Result<ImportJobConfig, BatchError> {
        let mut config = match &self.config {
            Some(path) => ImportJobConfig::from_json_file(path)?,
            None => ImportJobConfig::default(),
        };

        if let Some(input) = &self.input {
            config = config.with_input_path(input);
        }
        if let Some(database_url) = &self.database_url {
            config = config.with_database_url(database_url);
        }
        if let Some(chunk_size) = self.chunk_size {
            config = config.with_chunk_size(chunk_size);
        }
        if self.init_schema {
            config = config.with_init_schema(true);
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "people-import",
            "--input",
            "other.csv",
            "-n",
            "3",
            "--init-schema",
        ]);

        let config = args.job_config().unwrap();

        assert_eq!(config.input_path.to_str(), Some("other.csv"));
        assert_eq!(config.chunk_size, 3);
        assert!(config.init_schema);
        assert_eq!(config.database_url, "sqlite://people.db");
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let args = Args::parse_from(["people-import", "--chunk-size", "0"]);

        assert!(args.job_config().is_err());
    }
}
