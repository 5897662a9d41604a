//! Simple token detector: a single-regex streaming scan that turns each
//! match into a `Secret` via a caller-supplied constructor, which may still
//! reject a structurally-valid-looking match (e.g. a checksum failure).

use regex::Regex;
use scoutbom_core::Secret;

/// One detector: scans bounded-length windows of the input for `re`,
/// constructing a `Secret` from every match `from_match` accepts.
pub struct SimpleTokenDetector {
    pub name: &'static str,
    /// Upper bound on a single match's byte length. The engine uses this to
    /// decide how much of the stream it must hold in memory around a
    /// candidate match; the regex itself is also expected to be bounded.
    pub max_len: usize,
    pub re: Regex,
    pub from_match: fn(&[u8]) -> Option<Secret>,
}

impl SimpleTokenDetector {
    /// Run this detector once over the full buffer (the engine is
    /// responsible for chunking larger-than-memory inputs; within a chunk,
    /// scanning is a single regex pass).
    pub fn scan(&self, location: &str, buf: &[u8]) -> Vec<Secret> {
        let text = String::from_utf8_lossy(buf);
        let mut out = Vec::new();
        for m in self.re.find_iter(&text) {
            let matched = m.as_str().as_bytes();
            if matched.len() > self.max_len {
                continue;
            }
            if let Some(mut secret) = (self.from_match)(matched) {
                secret.location = location.to_string();
                out.push(secret);
            }
        }
        out
    }
}
