//! Type system for Recast values.
//!
//! `Value` is the runtime representation flowing out of query providers and
//! `DataType` is the static type carried by every expression node.

mod comparison;
mod data_type;
mod record;
mod value;

pub use comparison::StringComparison;
pub use data_type::DataType;
pub use record::{Field, Record, RecordType};
pub use value::Value;
