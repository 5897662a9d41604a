//! Concrete extractors. Only npm is implemented here as a worked example of
//! the `Extractor` trait; other ecosystem parsers are collaborators.

pub mod npm;
