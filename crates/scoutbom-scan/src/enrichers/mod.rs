//! Concrete enrichers (spec §4.7): license resolution, local OSV matching,
//! vendor expiration checks, and base-image attribution. Each is a small,
//! illustrative `Enricher` plugin — the framework they exercise is the hard
//! part, not any one of these annotation passes.

pub mod base_image;
pub mod expiration;
pub mod license;
pub mod osv_match;

pub use base_image::BaseImageEnricher;
pub use expiration::ExpirationEnricher;
pub use license::{LicenseEnricher, LicenseLookup};
pub use osv_match::OsvMatchEnricher;
