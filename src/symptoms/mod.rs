mod catalog;
mod encoder;
#[cfg(test)]
mod tests;

pub use catalog::{SymptomCatalog, SymptomEntry};
pub use encoder::{Encoding, FeatureVector, canonicalize, encode};
