//! CSV support for reading delimited text.
//!
//! The reader deserializes each line into a Rust struct with serde, mapping
//! fields by position or by configured names, and implements the core
//! `ItemReader` trait so it can feed a chunk-oriented step.
//!
//! # Features
//!
//! - Read CSV data with or without a header row
//! - Map headerless lines by name through `field_names`
//! - Custom delimiters and terminators
//! - Resume from a record offset
//!
//! # Example
//!
//! ```
//! use people_batch::item::csv::csv_reader::CsvItemReaderBuilder;
//! use people_batch::core::item::ItemReader;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize, PartialEq)]
//! struct City {
//!     city: String,
//!     country: String,
//!     pop: u32,
//! }
//!
//! let csv_data = "\
//! city,country,pop
//! Boston,United States,4628910
//! Concord,United States,42695
//! ";
//!
//! let reader = CsvItemReaderBuilder::new()
//!     .has_headers(true)
//!     .from_reader(csv_data.as_bytes());
//!
//! let mut cities: Vec<City> = Vec::new();
//! while let Some(city) = reader.read().unwrap() {
//!     cities.push(city);
//! }
//!
//! assert_eq!(cities.len(), 2);
//! assert_eq!(cities[0].city, "Boston");
//! assert_eq!(cities[1].pop, 42695);
//! ```

/// A module providing facilities for reading CSV data records.
pub mod csv_reader;
