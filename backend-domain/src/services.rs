// Domain services: pure query construction and normalization

pub mod item_parser;
pub mod query_builder;
pub mod query_cleaner;
pub mod query_validator;

pub use item_parser::*;
pub use query_builder::*;
pub use query_cleaner::*;
pub use query_validator::*;
