//! Per-domain location index: exact map, prefix trie, ordered regex list.

use std::collections::HashMap;

use regex::Regex;

use crate::error::BuildError;
use crate::trie::{Candidate, CompressedPathTrie};

/// Whether a lookup should stop at the first matching sub-index / stage,
/// or keep going and accumulate every candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMode {
    First,
    All,
}

struct RegexEntry<T> {
    pattern: String,
    regex: Regex,
    targets: Vec<T>,
}

/// Holds the three location sub-indexes (`Exact`, `Prefix`, `Regex`) for a
/// single configured domain.
pub struct DomainRouter<T> {
    domain: String,
    exact: HashMap<String, Vec<T>>,
    prefix: CompressedPathTrie<T>,
    // Kept as an ordered sequence, not a map, so iteration order is
    // deterministically insertion order rather than merely "by convention".
    regex: Vec<RegexEntry<T>>,
}

impl<T> DomainRouter<T> {
    pub fn new(domain: impl Into<String>) -> Self {
        DomainRouter {
            domain: domain.into(),
            exact: HashMap::new(),
            prefix: CompressedPathTrie::new(),
            regex: Vec::new(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl<T: Clone> DomainRouter<T> {
    /// Normalizes and classifies every entry in `locations`, routing each to
    /// the matching sub-index under `target`. Returns one `BuildError` per
    /// failed entry (regex compile failures); other entries still take
    /// effect. A domain mismatch aborts this call's whole location list and
    /// is reported as a single error.
    pub fn append_conf(
        &mut self,
        domain: &str,
        locations: &[String],
        target: &T,
    ) -> Vec<BuildError> {
        if domain != self.domain {
            return vec![BuildError::DomainMismatch {
                expected: self.domain.clone(),
                got: domain.to_string(),
            }];
        }

        let mut errors = Vec::new();
        for raw in locations {
            let location = raw.trim();
            if location.is_empty() {
                continue;
            }

            if let Some(remain) = location.strip_prefix("= ") {
                let remain = remain.trim().to_string();
                self.exact.entry(remain).or_default().push(target.clone());
            } else if let Some(remain) = location.strip_prefix("~ ") {
                let pattern = remain.trim().to_string();
                match self.regex.iter_mut().find(|e| e.pattern == pattern) {
                    Some(entry) => entry.targets.push(target.clone()),
                    None => match Regex::new(&pattern) {
                        Ok(regex) => self.regex.push(RegexEntry {
                            pattern,
                            regex,
                            targets: vec![target.clone()],
                        }),
                        Err(cause) => {
                            tracing::warn!(
                                "routing: regex compile failed, domain={}, pattern={:?}, error={}",
                                self.domain,
                                pattern,
                                cause
                            );
                            errors.push(BuildError::RegexCompileError { pattern, cause });
                        }
                    },
                }
            } else if let Err(err) = self.prefix.insert(location.as_bytes(), target.clone()) {
                errors.push(err);
            }
        }
        errors
    }
}

impl<T: Clone + Eq> DomainRouter<T> {
    /// Matches `path` against this domain's location set in
    /// Exact → Prefix → Regex order.
    pub fn lookup_path(&self, path: &str, mode: LookupMode) -> Vec<Candidate<T>> {
        let mut out = Vec::new();

        if let Some(list) = self.exact.get(path) {
            if !list.is_empty() {
                if mode == LookupMode::First {
                    out.push(Candidate {
                        value: list[0].clone(),
                        bindings: HashMap::new(),
                    });
                    return out;
                }
                out.extend(list.iter().map(|value| Candidate {
                    value: value.clone(),
                    bindings: HashMap::new(),
                }));
            }
        }

        if !self.prefix.is_empty() {
            let prefix_candidates = self.prefix.lookup_candidates(path.as_bytes());
            if !prefix_candidates.is_empty() {
                out.extend(prefix_candidates);
                if mode == LookupMode::First {
                    return out;
                }
            }
        }

        for entry in &self.regex {
            if entry.regex.is_match(path) {
                out.extend(entry.targets.iter().map(|value| Candidate {
                    value: value.clone(),
                    bindings: HashMap::new(),
                }));
                if mode == LookupMode::First {
                    return out;
                }
            }
        }

        out
    }
}
