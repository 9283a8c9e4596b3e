//! Matching engine for an HTTP domain/location router: a compressed path
//! trie with `:name` variable segments, and the two-stage domain → location
//! lookup pipeline built on top of it.
//!
//! Construction is single-threaded and fallible-but-non-aborting (bad
//! entries are collected, not raised); once built, a [`Router`] is
//! immutable and safe for unlimited concurrent readers.

pub mod config;
pub mod error;
pub mod routing;
pub mod trie;

use std::sync::Arc;

pub use config::{LocationConf, MappingBlock};
pub use error::BuildError;
pub use routing::{DomainRouter, LookupMode};
pub use trie::Candidate;

/// Top-level entry point: builds the domain/location index from a set of
/// [`LocationConf`] blocks and answers `GetTarget`/`GetAllTargets` queries
/// against it.
pub struct Router<T> {
    inner: routing::LocationRouter<T>,
}

impl<T: Clone + Eq> Router<T> {
    /// Builds a router from `configs`. Build errors (bad regex, mismatched
    /// domain entries) are collected and returned alongside the router
    /// rather than aborting construction.
    pub fn new(configs: Vec<LocationConf<T>>) -> (Self, Vec<BuildError>) {
        let (inner, errors) = routing::LocationRouter::new(configs);
        (Router { inner }, errors)
    }

    pub fn get_target(&self, domain: &str, path: &str) -> Option<Candidate<T>> {
        self.inner.get_target(domain, path)
    }

    pub fn get_all_targets(&self, domain: &str, path: &str) -> Vec<Candidate<T>> {
        self.inner.get_all_targets(domain, path)
    }

    pub fn get_routers_for_domain(&self, domain: &str) -> Vec<Arc<DomainRouter<T>>> {
        self.inner.get_routers_for_domain(domain)
    }

    pub fn get_all_routers(&self) -> Vec<Arc<DomainRouter<T>>> {
        self.inner.get_all_routers()
    }
}
