//! Concrete detectors. NetScaler is a worked example of the `Detector`
//! trait for signature-style findings that don't go through a package
//! manager lockfile.

pub mod netscaler;
pub mod secrets;
