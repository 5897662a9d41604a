//! The Veles secret-detection substrate (spec §4.6): streaming simple-token
//! and pair detectors, a single-pass aggregating engine, and the generic
//! HTTP validator template, plus a handful of illustrative vendor
//! validators that exercise the template the way concrete secret regexes
//! are collaborators in the upstream system.

pub mod engine;
pub mod pair;
pub mod token;
pub mod validator;
pub mod vendors;

pub use engine::Engine;
pub use pair::{Pair, PairDetector};
pub use token::SimpleTokenDetector;
pub use validator::{HttpValidatorTemplate, ValidationOutcome, ValidationStatus};
