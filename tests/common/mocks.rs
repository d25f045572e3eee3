//! Mock version of the people sink.
use mockall::mock;

use people_batch::{
    core::item::{ItemWriter, ItemWriterResult},
    people::Person,
};

mock! {
    pub PersonWriter {}
    impl ItemWriter<Person> for PersonWriter {
        fn write(&self, items: &[Person]) -> ItemWriterResult;
    }
}
