pub mod search_commands;

pub use search_commands::*;
