//! Top-level domain → location dispatcher.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::{LocationConf, MappingBlock};
use crate::error::BuildError;
use crate::trie::{Candidate, CompressedPathTrie};

use super::domain_router::{DomainRouter, LookupMode};

/// Lowercases and strips a trailing `:port`, so `"API.example.com:8080"` and
/// `"api.example.com"` land on the same entry.
fn normalize_domain(domain: &str) -> String {
    let without_port = match domain.find(':') {
        Some(idx) => &domain[..idx],
        None => domain,
    };
    without_port.to_ascii_lowercase()
}

fn reversed_bytes(s: &str) -> Vec<u8> {
    let mut bytes = s.as_bytes().to_vec();
    bytes.reverse();
    bytes
}

enum Stage {
    Exact,
    Suffix,
    Prefix,
    Done,
}

/// Walks the exact map, then the suffix trie, then the prefix trie, yielding
/// each distinct `DomainRouter` at most once.
struct DomainCursor<'a, T> {
    router: &'a LocationRouter<T>,
    normalized: String,
    stage: Stage,
    stage_candidates: std::vec::IntoIter<Candidate<usize>>,
    visited: HashSet<usize>,
}

impl<'a, T> DomainCursor<'a, T> {
    fn new(router: &'a LocationRouter<T>, domain: &str) -> Self {
        DomainCursor {
            router,
            normalized: normalize_domain(domain),
            stage: Stage::Exact,
            stage_candidates: Vec::new().into_iter(),
            visited: HashSet::new(),
        }
    }

    fn take_if_unvisited(&mut self, idx: usize) -> Option<Arc<DomainRouter<T>>> {
        if self.visited.insert(idx) {
            self.router.domain_routers.get(idx).cloned()
        } else {
            None
        }
    }
}

impl<'a, T> Iterator for DomainCursor<'a, T> {
    type Item = Arc<DomainRouter<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stage {
                Stage::Exact => {
                    self.stage = Stage::Suffix;
                    if let Some(&idx) = self.router.exact_domain.get(&self.normalized) {
                        if let Some(dr) = self.take_if_unvisited(idx) {
                            return Some(dr);
                        }
                    }
                }
                Stage::Suffix => {
                    if let Some(candidate) = self.stage_candidates.next() {
                        if let Some(dr) = self.take_if_unvisited(candidate.value) {
                            return Some(dr);
                        }
                        continue;
                    }
                    let reversed = reversed_bytes(&self.normalized);
                    self.stage_candidates = self
                        .router
                        .domain_suffix_cpt
                        .lookup_candidates(&reversed)
                        .into_iter();
                    self.stage = Stage::Prefix;
                }
                Stage::Prefix => {
                    if let Some(candidate) = self.stage_candidates.next() {
                        if let Some(dr) = self.take_if_unvisited(candidate.value) {
                            return Some(dr);
                        }
                        continue;
                    }
                    self.stage_candidates = self
                        .router
                        .domain_prefix_cpt
                        .lookup_candidates(self.normalized.as_bytes())
                        .into_iter();
                    self.stage = Stage::Done;
                }
                Stage::Done => {
                    if let Some(candidate) = self.stage_candidates.next() {
                        if let Some(dr) = self.take_if_unvisited(candidate.value) {
                            return Some(dr);
                        }
                        continue;
                    }
                    return None;
                }
            }
        }
    }
}

/// Dispatches a path lookup to the right per-domain index, trying an exact
/// domain match, then domains registered as a reversed-suffix pattern, then
/// domains registered as a plain prefix pattern.
pub struct LocationRouter<T> {
    domain_routers: Vec<Arc<DomainRouter<T>>>,
    exact_domain: HashMap<String, usize>,
    domain_prefix_cpt: CompressedPathTrie<usize>,
    domain_suffix_cpt: CompressedPathTrie<usize>,
}

impl<T: Clone + Eq> LocationRouter<T> {
    /// Builds a router from a list of `(target, domains, locations)` blocks.
    /// Build errors (bad regex, inconsistent domain entries) are collected
    /// and returned alongside the router rather than aborting the build.
    pub fn new(configs: Vec<LocationConf<T>>) -> (Self, Vec<BuildError>) {
        let mut errors = Vec::new();
        let mut order: Vec<String> = Vec::new();
        let mut by_domain: HashMap<String, DomainRouter<T>> = HashMap::new();

        for conf in configs {
            for MappingBlock { domains, locations } in &conf.blocks {
                for raw_domain in domains {
                    let domain = normalize_domain(raw_domain);
                    let dr = by_domain
                        .entry(domain.clone())
                        .or_insert_with(|| {
                            order.push(domain.clone());
                            DomainRouter::new(domain.clone())
                        });
                    errors.extend(dr.append_conf(&domain, locations, &conf.target));
                }
            }
        }

        let mut domain_routers = Vec::with_capacity(order.len());
        let mut exact_domain = HashMap::with_capacity(order.len());
        let mut domain_prefix_cpt = CompressedPathTrie::new();
        let mut domain_suffix_cpt = CompressedPathTrie::new();

        for domain in order {
            let dr = by_domain.remove(&domain).expect("tracked in `order`");
            let idx = domain_routers.len();
            domain_routers.push(Arc::new(dr));
            exact_domain.insert(domain.clone(), idx);
            if let Err(e) = domain_prefix_cpt.insert(domain.as_bytes(), idx) {
                errors.push(e);
            }
            if let Err(e) = domain_suffix_cpt.insert(&reversed_bytes(&domain), idx) {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            tracing::info!(
                "routing: built location router, domains={}",
                domain_routers.len()
            );
        } else {
            tracing::warn!(
                "routing: built location router with errors, domains={}, errors={}",
                domain_routers.len(),
                errors.len()
            );
        }

        (
            LocationRouter {
                domain_routers,
                exact_domain,
                domain_prefix_cpt,
                domain_suffix_cpt,
            },
            errors,
        )
    }

    fn cursor(&self, domain: &str) -> DomainCursor<'_, T> {
        DomainCursor::new(self, domain)
    }

    /// Returns the first matching target across every domain that could
    /// plausibly own `domain`, stopping at the first domain whose own
    /// lookup produces a hit.
    pub fn get_target(&self, domain: &str, path: &str) -> Option<Candidate<T>> {
        for dr in self.cursor(domain) {
            let hits = dr.lookup_path(path, LookupMode::First);
            if let Some(first) = hits.into_iter().next() {
                return Some(first);
            }
        }
        None
    }

    /// Returns every distinct target across every domain that could
    /// plausibly own `domain`, de-duplicated by value.
    pub fn get_all_targets(&self, domain: &str, path: &str) -> Vec<Candidate<T>> {
        let mut out: Vec<Candidate<T>> = Vec::new();
        for dr in self.cursor(domain) {
            for candidate in dr.lookup_path(path, LookupMode::All) {
                if !out.iter().any(|c| c.value == candidate.value) {
                    out.push(candidate);
                }
            }
        }
        out
    }

    /// All domain routers that could plausibly own `domain`, in match
    /// priority order (Exact, then Suffix, then Prefix).
    pub fn get_routers_for_domain(&self, domain: &str) -> Vec<Arc<DomainRouter<T>>> {
        self.cursor(domain).collect()
    }

    pub fn get_all_routers(&self) -> Vec<Arc<DomainRouter<T>>> {
        self.domain_routers.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conf(target: i32, domains: &[&str], locations: &[&str]) -> LocationConf<i32> {
        LocationConf {
            target,
            blocks: vec![MappingBlock {
                domains: domains.iter().map(|s| s.to_string()).collect(),
                locations: locations.iter().map(|s| s.to_string()).collect(),
            }],
        }
    }

    #[test]
    fn exact_domain_beats_suffix_and_prefix() {
        let (router, errs) = LocationRouter::new(vec![
            conf(1, &["api.example.com"], &["/users"]),
            conf(2, &["*.example.com"], &["/users"]),
        ]);
        assert!(errs.is_empty());
        let hit = router.get_target("api.example.com", "/users").unwrap();
        assert_eq!(hit.value, 1);
    }

    #[test]
    fn port_and_case_are_normalized() {
        let (router, _) = LocationRouter::new(vec![conf(1, &["Api.Example.com"], &["/users"])]);
        let hit = router
            .get_target("api.example.com:9009", "/users")
            .unwrap();
        assert_eq!(hit.value, 1);
    }

    #[test]
    fn get_all_targets_dedupes_by_value() {
        let (router, _) = LocationRouter::new(vec![
            conf(1, &["a.com"], &["/x"]),
            conf(1, &["a.com"], &["/x"]),
            conf(2, &["a.com"], &["/x"]),
        ]);
        let mut hits: Vec<_> = router
            .get_all_targets("a.com", "/x")
            .into_iter()
            .map(|c| c.value)
            .collect();
        hits.sort();
        assert_eq!(hits, vec![1, 2]);
    }
}
