//! Query execution
//!
//! Runs [`catalog_query`] requests against a collection.

mod executor;
pub mod filter;

pub use executor::{aggregate, count, delete_where, find, Group};
