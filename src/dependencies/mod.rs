pub mod descriptor;
pub mod extractor;
pub mod fetcher;
pub mod installer;
pub mod outcome;
pub mod resolver;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

pub use outcome::Resolution;
pub use resolver::Resolver;
