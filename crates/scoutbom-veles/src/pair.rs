//! Pair detector: finds every `(A, B)` match pair within `max_distance`
//! bytes of each other and emits a `Secret` for each accepted pair.
//! Overlapping pairs are all reported — the caller dedups if it wants to.

use regex::Regex;
use scoutbom_core::Secret;

pub struct Pair<'a> {
    pub a: &'a str,
    pub b: &'a str,
    pub a_pos: usize,
    pub b_pos: usize,
}

pub struct PairDetector {
    pub name: &'static str,
    pub max_element_len: usize,
    pub max_distance: usize,
    pub find_a: Regex,
    pub find_b: Regex,
    pub from_pair: fn(&Pair) -> Option<Secret>,
}

impl PairDetector {
    pub fn scan(&self, location: &str, buf: &[u8]) -> Vec<Secret> {
        let text = String::from_utf8_lossy(buf);

        let a_matches: Vec<(usize, &str)> = self
            .find_a
            .find_iter(&text)
            .map(|m| (m.start(), m.as_str()))
            .filter(|(_, s)| s.len() <= self.max_element_len)
            .collect();
        let b_matches: Vec<(usize, &str)> = self
            .find_b
            .find_iter(&text)
            .map(|m| (m.start(), m.as_str()))
            .filter(|(_, s)| s.len() <= self.max_element_len)
            .collect();

        let mut out = Vec::new();
        for &(a_pos, a_text) in &a_matches {
            for &(b_pos, b_text) in &b_matches {
                let distance = a_pos.abs_diff(b_pos);
                if distance > self.max_distance {
                    continue;
                }
                let pair = Pair {
                    a: a_text,
                    b: b_text,
                    a_pos,
                    b_pos,
                };
                if let Some(mut secret) = (self.from_pair)(&pair) {
                    secret.location = location.to_string();
                    out.push(secret);
                }
            }
        }
        out
    }
}
