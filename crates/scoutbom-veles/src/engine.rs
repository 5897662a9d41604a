//! Aggregates simple-token and pair detectors and runs them over one input
//! in a single pass. Not itself a `Detector` (scoutbom-scan's trait) — it's
//! the substrate a concrete secrets-extractor plugin would build on, the
//! way spec §4.6 describes it as a reusable engine rather than a plugin.

use crate::pair::PairDetector;
use crate::token::SimpleTokenDetector;
use scoutbom_core::Secret;

#[derive(Default)]
pub struct Engine {
    tokens: Vec<SimpleTokenDetector>,
    pairs: Vec<PairDetector>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token_detector(mut self, detector: SimpleTokenDetector) -> Self {
        self.tokens.push(detector);
        self
    }

    pub fn with_pair_detector(mut self, detector: PairDetector) -> Self {
        self.pairs.push(detector);
        self
    }

    /// Run every registered detector over `buf`, a single read of the input
    /// stream. Detectors are independent; their results are concatenated in
    /// registration order with no cross-detector dedup (higher layers dedup
    /// if they care to).
    pub fn scan(&self, location: &str, buf: &[u8]) -> Vec<Secret> {
        let mut out = Vec::new();
        for detector in &self.tokens {
            out.extend(detector.scan(location, buf));
        }
        for detector in &self.pairs {
            out.extend(detector.scan(location, buf));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use scoutbom_core::SecretKind;

    #[test]
    fn aggregates_across_detector_kinds() {
        let engine = Engine::new()
            .with_token_detector(SimpleTokenDetector {
                name: "token",
                max_len: 32,
                re: Regex::new(r"tok_[a-z0-9]{6}").unwrap(),
                from_match: |m| {
                    Some(Secret::new(
                        "",
                        SecretKind::Generic {
                            value: String::from_utf8_lossy(m).to_string(),
                        },
                    ))
                },
            })
            .with_pair_detector(PairDetector {
                name: "pair",
                max_element_len: 32,
                max_distance: 256,
                find_a: Regex::new(r"A=\S+").unwrap(),
                find_b: Regex::new(r"B=\S+").unwrap(),
                from_pair: |_pair| {
                    Some(Secret::new(
                        "",
                        SecretKind::Generic {
                            value: "pair".to_string(),
                        },
                    ))
                },
            });

        let secrets = engine.scan("buf", b"tok_abc123 A=1 B=2");
        assert_eq!(secrets.len(), 2);
    }
}
