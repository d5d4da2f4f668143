// Domain value objects
pub mod filter_bound;
pub mod trade_status;

pub use filter_bound::*;
pub use trade_status::*;
