pub mod catalog_queries;
pub mod validation_queries;

pub use catalog_queries::*;
pub use validation_queries::*;
