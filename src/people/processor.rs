use log::info;

use crate::{
    BatchError,
    core::item::{ItemProcessor, ItemProcessorResult},
};

use super::Person;

/// Upper-cases the first and last name of every person.
///
/// ```
/// use people_batch::core::item::ItemProcessor;
/// use people_batch::people::{Person, PersonItemProcessor};
///
/// let processor = PersonItemProcessor;
/// let person = processor.process(&Person::new("jane", "roe")).unwrap();
///
/// assert_eq!(person, Some(Person::new("JANE", "ROE")));
/// ```
#[derive(Default)]
pub struct PersonItemProcessor;

impl ItemProcessor<Person, Person> for PersonItemProcessor {
    /// # Errors
    /// `BatchError::ItemProcessor` when a name is empty.
    fn process(&self, person: &Person) -> ItemProcessorResult<Person> {
        let first_name = required("firstName", person.first_name())?.to_uppercase();
        let last_name = required("lastName", person.last_name())?.to_uppercase();

        let transformed = Person::new(first_name, last_name);

        info!("Converting ({}) into ({})", person, transformed);

        Ok(Some(transformed))
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, BatchError> {
    if value.trim().is_empty() {
        Err(BatchError::ItemProcessor(format!(
            "required field {} is missing",
            field
        )))
    } else {
        Ok(value)
    }
}
