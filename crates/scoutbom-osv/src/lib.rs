//! The local OSV vulnerability matcher: per-ecosystem zipped database cache
//! with CRC32C integrity, partial (name-filtered) loading, and the
//! affectedness predicate over OSV range events.

pub mod affected;
pub mod matcher;
pub mod vuln;
pub mod zipdb;

pub use affected::is_affected;
pub use matcher::{Matcher, MatcherConfig};
pub use vuln::{Affected, AffectedPackage, Event, EventKind, Range, Severity, Vulnerability};
pub use zipdb::{OsvError, ZippedDb};
