//! Compressed path trie with first-class `:name` variable segments.
//!
//! Construction (`insert`) is single-threaded and mutable; once built, a
//! `CompressedPathTrie` is read-only and safe for unlimited concurrent
//! lookups — no interior mutability is used on the query path.

use std::collections::{HashMap, VecDeque};

use crate::error::BuildError;

const VAR_SENTINEL: u8 = b':';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Root,
    Default,
    Leaf,
    Var,
}

#[derive(Debug, Clone)]
struct LeafValue<T> {
    val_id: u64,
    value: T,
}

#[derive(Debug, Clone)]
struct VarDescriptor {
    val_id: u64,
    name: String,
}

#[derive(Debug)]
struct Node<T> {
    path: Vec<u8>,
    children: HashMap<u8, Node<T>>,
    leaves: Vec<LeafValue<T>>,
    var_descriptors: Vec<VarDescriptor>,
    kind: NodeKind,
}

impl<T> Node<T> {
    fn root() -> Self {
        Node {
            path: Vec::new(),
            children: HashMap::new(),
            leaves: Vec::new(),
            var_descriptors: Vec::new(),
            kind: NodeKind::Root,
        }
    }

    fn default_with_path(path: Vec<u8>) -> Self {
        Node {
            path,
            children: HashMap::new(),
            leaves: Vec::new(),
            var_descriptors: Vec::new(),
            kind: NodeKind::Default,
        }
    }

    fn var() -> Self {
        Node {
            path: Vec::new(),
            children: HashMap::new(),
            leaves: Vec::new(),
            var_descriptors: Vec::new(),
            kind: NodeKind::Var,
        }
    }
}

/// A `(value, bindings)` pair yielded by a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<T> {
    pub value: T,
    pub bindings: HashMap<String, String>,
}

/// Radix tree over byte strings with `:name` variable segments.
///
/// `valID` is scoped to this instance, not process-wide — each `insert`
/// call gets a fresh id, which lets the lookup scratch attribute captured
/// variable bindings to the exact pattern that produced a given leaf even
/// when several patterns share a variable node.
#[derive(Debug)]
pub struct CompressedPathTrie<T> {
    root: Node<T>,
    next_val_id: u64,
    size: usize,
}

impl<T> Default for CompressedPathTrie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CompressedPathTrie<T> {
    pub fn new() -> Self {
        CompressedPathTrie {
            root: Node::root(),
            next_val_id: 0,
            size: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Registers `pattern` with `value`. Duplicate identical patterns stack
    /// rather than overwrite — a lookup that matches the pattern yields one
    /// candidate per insertion.
    pub fn insert(&mut self, pattern: &[u8], value: T) -> Result<(), BuildError> {
        let val_id = self.next_val_id;
        self.next_val_id += 1;
        self.size += 1;

        let mut node = &mut self.root;
        let mut s = pattern;

        loop {
            let k = longest_common_prefix_stop_at_colon(s, &node.path);
            if k < node.path.len() {
                split_node(node, k);
            }

            if k == s.len() {
                node.leaves.push(LeafValue { val_id, value });
                if node.kind != NodeKind::Root {
                    node.kind = NodeKind::Leaf;
                }
                return Ok(());
            }
            s = &s[k..];

            if s[0] == VAR_SENTINEL {
                if let Some(existing) = node.children.get(&VAR_SENTINEL) {
                    if existing.kind != NodeKind::Var {
                        return Err(BuildError::BadVariableNode {
                            pattern: String::from_utf8_lossy(pattern).into_owned(),
                        });
                    }
                }

                let (name, tail) = parse_variable_segment(s);
                let child = node.children.entry(VAR_SENTINEL).or_insert_with(Node::var);
                child.var_descriptors.push(VarDescriptor { val_id, name });

                if tail.is_empty() {
                    child.leaves.push(LeafValue { val_id, value });
                    return Ok(());
                }
                node = child;
                s = tail;
                continue;
            }

            let c = s[0];
            if node.children.contains_key(&c) {
                node = node.children.get_mut(&c).unwrap();
                continue;
            }

            // No child for this byte yet: create one. Truncate its edge
            // label at the first colon so a following variable segment
            // still grows its own `Var` node instead of being swallowed
            // into a literal leaf.
            let split_len = s
                .iter()
                .position(|&b| b == VAR_SENTINEL)
                .unwrap_or(s.len());
            let mut new_node = Node::default_with_path(s[..split_len].to_vec());
            if split_len == s.len() {
                new_node.kind = NodeKind::Leaf;
                new_node.leaves.push(LeafValue { val_id, value });
                node.children.insert(c, new_node);
                return Ok(());
            }
            node.children.insert(c, new_node);
            node = node.children.get_mut(&c).unwrap();
            s = &s[split_len..];

            // `node.path` now exactly equals the prefix already consumed
            // and `s` starts at the colon sentinel: attach the variable
            // child directly rather than looping back through the
            // top-of-loop lcp computation, which would wrongly compare
            // the remaining (colon-led) `s` against `node.path` again.
            let (name, tail) = parse_variable_segment(s);
            let child = node.children.entry(VAR_SENTINEL).or_insert_with(Node::var);
            child.var_descriptors.push(VarDescriptor { val_id, name });
            if tail.is_empty() {
                child.leaves.push(LeafValue { val_id, value });
                return Ok(());
            }
            node = child;
            s = tail;
        }
    }
}

impl<T: Clone> CompressedPathTrie<T> {
    /// Returns candidates in longest-match-first order.
    pub fn lookup_candidates(&self, input: &[u8]) -> Vec<Candidate<T>> {
        if input.is_empty() || self.size == 0 {
            return Vec::new();
        }

        let mut bindings: HashMap<u64, HashMap<String, String>> = HashMap::new();
        let mut candidates = Vec::new();
        let mut queue: VecDeque<(&Node<T>, &[u8])> = VecDeque::new();
        queue.push_back((&self.root, input));

        while let Some((n, tail)) = queue.pop_front() {
            if n.kind == NodeKind::Var {
                let end = tail.iter().position(|&b| b == b'/').unwrap_or(tail.len());
                let var_value = String::from_utf8_lossy(&tail[..end]).into_owned();
                for vd in &n.var_descriptors {
                    bindings
                        .entry(vd.val_id)
                        .or_default()
                        .insert(vd.name.clone(), var_value.clone());
                }
                for leaf in &n.leaves {
                    candidates.push(Candidate {
                        value: leaf.value.clone(),
                        bindings: bindings.get(&leaf.val_id).cloned().unwrap_or_default(),
                    });
                }
                if end < tail.len() {
                    if let Some(child) = n.children.get(&b'/') {
                        queue.push_back((child, &tail[end..]));
                    }
                }
                continue;
            }

            let i = longest_common_prefix(tail, &n.path);
            if i < n.path.len() {
                continue;
            }
            for leaf in &n.leaves {
                candidates.push(Candidate {
                    value: leaf.value.clone(),
                    bindings: bindings.get(&leaf.val_id).cloned().unwrap_or_default(),
                });
            }
            if i < tail.len() {
                let rest = &tail[i..];
                if rest[0] != VAR_SENTINEL {
                    if let Some(child) = n.children.get(&rest[0]) {
                        queue.push_back((child, rest));
                    }
                }
                if let Some(var_child) = n.children.get(&VAR_SENTINEL) {
                    queue.push_back((var_child, rest));
                }
            }
        }

        candidates.reverse();
        candidates
    }
}

fn split_node<T>(node: &mut Node<T>, k: usize) {
    let tail_path = node.path.split_off(k);
    let first_byte = tail_path[0];

    let child_kind = if node.kind == NodeKind::Root {
        if node.leaves.is_empty() {
            NodeKind::Default
        } else {
            NodeKind::Leaf
        }
    } else {
        node.kind
    };

    let child = Node {
        path: tail_path,
        children: std::mem::take(&mut node.children),
        leaves: std::mem::take(&mut node.leaves),
        var_descriptors: std::mem::take(&mut node.var_descriptors),
        kind: child_kind,
    };

    node.children = HashMap::new();
    node.children.insert(first_byte, child);
    if node.kind != NodeKind::Root {
        node.kind = NodeKind::Default;
    }
}

fn longest_common_prefix_stop_at_colon(s: &[u8], path: &[u8]) -> usize {
    let max = s.len().min(path.len());
    let mut k = 0;
    while k < max && s[k] != VAR_SENTINEL && s[k] == path[k] {
        k += 1;
    }
    k
}

fn longest_common_prefix(a: &[u8], b: &[u8]) -> usize {
    let max = a.len().min(b.len());
    let mut k = 0;
    while k < max && a[k] == b[k] {
        k += 1;
    }
    k
}

/// `s[0]` is the colon sentinel. Returns the variable name and the
/// remainder of `s` starting at the next `/` (or the empty tail).
fn parse_variable_segment(s: &[u8]) -> (String, &[u8]) {
    let rest = &s[1..];
    match rest.iter().position(|&b| b == b'/') {
        Some(p) => (
            String::from_utf8_lossy(&rest[..p]).into_owned(),
            &s[1 + p..],
        ),
        None => (String::from_utf8_lossy(rest).into_owned(), &s[s.len()..]),
    }
}
