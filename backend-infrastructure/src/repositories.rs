pub mod catalog_files;

pub use catalog_files::*;
