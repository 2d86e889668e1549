//! Recast Playground - Experiments and Examples
//!
//! This crate provides a small command-line app for trying case-insensitive
//! query rewriting against sample data.
//!
//! # Available Binaries
//!
//! - **`query-runner`**: filter, count and explain queries over the sample
//!   people dataset, with or without interception
//!
//! # Usage
//!
//! ```bash
//! cargo run --package recast-playground --bin query-runner -- --help
//! ```

pub mod data;
pub mod utils;

pub use data::{PEOPLE, create_people, person_type};
pub use utils::{format_rows, print_divider, print_header, print_rows};
