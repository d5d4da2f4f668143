// Domain entities

pub mod catalog;
pub mod item;
pub mod options;
pub mod query;
pub mod runtime;
pub mod trade;

pub use catalog::*;
pub use item::*;
pub use options::*;
pub use query::*;
pub use runtime::*;
pub use trade::*;
