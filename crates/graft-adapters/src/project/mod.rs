//! Base project adapters.

mod reader;

pub use reader::{LocalProjectReader, ProjectReader, alias_candidates};
