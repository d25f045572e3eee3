//! The people import: CSV lines `firstName,lastName` are upper-cased and
//! inserted into a SQL table, ten at a time by default.

mod job;
mod listener;
mod person;
mod processor;
mod repository;

pub use job::{import_people, run_import};
pub use listener::JobCompletionNotificationListener;
pub use person::Person;
pub use processor::PersonItemProcessor;
pub use repository::{connect, init_schema, PersonBinder, PersonRowMapper};
