//! Built-in rewriters.

mod case_insensitive;

pub use case_insensitive::CaseInsensitiveEquality;
