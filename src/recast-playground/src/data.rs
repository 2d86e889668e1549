//! Sample data for playground examples.

use std::sync::Arc;

use common_config::ExecutionConfig;
use common_error::RecastResult;
use recast_core::{DataType, Field, Record, RecordType};
use recast_engine::MemoryProvider;

/// Name of the sample source.
pub const PEOPLE: &str = "people";

/// Record type of the sample people source.
pub fn person_type() -> RecordType {
    RecordType::new(
        "Person",
        vec![
            Field::new("name", DataType::String),
            Field::new("city", DataType::String),
            Field::new("home_city", DataType::String),
            Field::new("age", DataType::Int64),
        ],
    )
}

fn person(name: &str, city: &str, home_city: &str, age: i64) -> Record {
    Record::new("Person")
        .with("name", name)
        .with("city", city)
        .with("home_city", home_city)
        .with("age", age)
}

/// Create a provider holding the sample people source.
///
/// Several rows spell the same city with different casing, so string
/// equality gives different answers with and without case-insensitive
/// interception.
pub fn create_people(config: ExecutionConfig) -> RecastResult<Arc<MemoryProvider>> {
    let provider = MemoryProvider::with_config(config);
    provider.register_source(
        PEOPLE,
        person_type(),
        vec![
            person("Alice", "Paris", "paris", 30),
            person("Bob", "New York", "New York", 25),
            person("Charlie", "san francisco", "San Francisco", 35),
            person("Diana", "Seattle", "Portland", 28),
            person("Eve", "PARIS", "Lyon", 32),
            person("Frank", "seattle", "SEATTLE", 41),
        ],
    )?;
    Ok(provider)
}
