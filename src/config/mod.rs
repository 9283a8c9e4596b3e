//! Configuration DTOs for building a router: the shape callers hand to
//! `Router::new`. No file I/O or environment handling lives here — loading
//! and parsing a particular on-disk format is the embedding application's
//! job, not the engine's.

use serde::{Deserialize, Serialize};

/// One `(domains, locations)` pair sharing a single target, following the
/// nginx-style `server { listen; location { } }` grouping a block of
/// location rules under a set of server names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappingBlock {
    pub domains: Vec<String>,
    pub locations: Vec<String>,
}

/// A caller-supplied target plus every `(domains, locations)` block that
/// should resolve to it. `Router::new` takes a `Vec<LocationConf<T>>` and
/// expands the cartesian product of each block's domains and locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationConf<T> {
    pub target: T,
    pub blocks: Vec<MappingBlock>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_block_roundtrips_through_json() {
        let block = MappingBlock {
            domains: vec!["api.example.com".to_string()],
            locations: vec!["/users".to_string(), "~ ^/v[0-9]+/.*".to_string()],
        };
        let json = serde_json::to_string(&block).unwrap();
        let back: MappingBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(block, back);
    }

    #[test]
    fn location_conf_roundtrips_with_string_target() {
        let conf = LocationConf {
            target: "cluster-a".to_string(),
            blocks: vec![MappingBlock {
                domains: vec!["a.com".to_string()],
                locations: vec!["= /health".to_string()],
            }],
        };
        let json = serde_json::to_string(&conf).unwrap();
        let back: LocationConf<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(conf, back);
    }
}
