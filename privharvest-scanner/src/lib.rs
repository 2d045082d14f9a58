pub mod error;
pub mod fetch;
pub mod heuristics;
pub mod parser;

pub use error::ScanError;
pub use fetch::{Fetch, HttpFetcher};
pub use parser::{CategoryLink, CategoryPage, DirectoryMarkup, PageParser, RawToolEntry};
