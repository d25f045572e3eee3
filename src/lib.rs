#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # people-batch

 A chunk-oriented batch job importing people from a CSV file into a SQL
 table, and the small batch toolkit it is built on.

 ## Core Concepts

- **Job:** the whole batch process, made of one or more `Step`s run in order.
  A run goes through `STARTING`, `RUNNING`, then `COMPLETED` or `FAILED`.
- **Step:** a chunk-oriented phase reading, processing and writing items.
- **ItemReader:** retrieves the input of a step, one item at a time.
- **ItemProcessor:** the business logic applied to each item.
- **ItemWriter:** persists one chunk of items as a single unit of work.
- **Chunk:** the items committed together. When a chunk fails, the chunks
  committed before it stay committed and the job stops.
- **JobHooks:** functions called before/after the job and around each chunk.

 ## Features

| **Feature**   | **Description**                                                |
|---------------|----------------------------------------------------------------|
| csv           | Enables the CSV `ItemReader`                                   |
| rdbc-sqlite   | Enables the SQLite `ItemReader` and `ItemWriter`               |
| logger        | Enables a logger `ItemWriter`, useful for dry runs             |
| full          | Enables all available features and the people import (default) |

 ## Getting Started

```rust,no_run
use people_batch::{
    config::ImportJobConfig,
    core::listener::JobHooks,
    people::{connect, import_people, init_schema},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ImportJobConfig::default()
        .with_input_path("data/sample-data.csv")
        .with_database_url("sqlite://people.db")
        .with_chunk_size(10);

    let pool = connect(&config.database_url).await?;
    init_schema(&pool, &config.table, &config.columns).await?;

    let hooks = JobHooks::new().after_chunk(|chunk| {
        println!("chunk {} committed {} people", chunk.chunk_number, chunk.item_count)
    });

    let execution = import_people(&config, &pool, hooks)?;
    println!("Exit Status : {}", execution.get_status());

    Ok(())
}
```

 The same job is available from the command line:

```text
people-import --input data/sample-data.csv --database-url sqlite://people.db --init-schema
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Job configuration value object
pub mod config;

/// Core module for batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of items readers / writers (csv reader, SQLite reader and writer, logger)
pub mod item;

#[cfg(all(feature = "csv", feature = "rdbc-sqlite"))]
/// The people import job
pub mod people;
