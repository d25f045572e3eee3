use rand::distr::{Alphanumeric, SampleString};

/// Buffer of processed items waiting to be written
pub mod chunk;

/// Reader, processor and writer contracts
pub mod item;

pub mod job;

/// Hooks fired around jobs and chunks
pub mod listener;

pub mod step;

/// Generates a random name consisting of alphanumeric characters.
///
/// # Returns
///
/// A `String` containing the generated random name.
fn build_name() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 8)
}
