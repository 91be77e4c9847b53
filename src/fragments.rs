/// Entity fragments: order-independent key-set hashing and graph rendering.
///
/// A fragment is identified by the set of (key, value) bindings it carries. Two
/// fragments whose keys are the same set, in whatever order, hash to the same
/// [`FragmentHash`] and collapse into one graph node. Fragments are linked when a
/// neighbor key of one matches a key of another.
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::models::deserialize_null_default;

/// One attribute binding, e.g. `email = "jane@example.com"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FragmentKey {
    pub key: String,
    pub value: String,
}

impl FragmentKey {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for FragmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// A partial entity as returned by the entity fragments endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fragment {
    #[serde(deserialize_with = "deserialize_null_default")]
    pub keys: Vec<FragmentKey>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub neighbors: Vec<FragmentKey>,
    pub payload: Value,
    pub metadata: Value,
}

impl Fragment {
    /// Canonical hash of this fragment's key set.
    pub fn hash(&self) -> FragmentHash {
        hash_keys(&self.keys)
    }

    /// Per-key hashes of this fragment's own keys.
    pub fn key_hashes(&self) -> BTreeSet<FragmentHash> {
        self.keys.iter().map(hash_key).collect()
    }

    /// Per-key hashes of the keys this fragment points at.
    pub fn neighbor_hashes(&self) -> BTreeSet<FragmentHash> {
        self.neighbors.iter().map(hash_key).collect()
    }
}

/// Hex SHA-256 digest identifying a key or a key set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentHash(String);

impl FragmentHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for display.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for FragmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn digest(input: &str) -> FragmentHash {
    FragmentHash(hex::encode(Sha256::digest(input.as_bytes())))
}

/// Hash a single key from its JSON serialization.
pub fn hash_key(key: &FragmentKey) -> FragmentHash {
    digest(&json!({ "key": key.key, "value": key.value }).to_string())
}

/// Hash a key set. Insertion order and duplicates do not affect the result.
pub fn hash_keys(keys: &[FragmentKey]) -> FragmentHash {
    let hashes: BTreeSet<FragmentHash> = keys.iter().map(hash_key).collect();
    let joined = hashes
        .iter()
        .map(FragmentHash::as_str)
        .collect::<Vec<_>>()
        .join(",");
    digest(&joined)
}

/// Group fragments that carry the same key set.
pub fn group_fragments(fragments: &[Fragment]) -> BTreeMap<FragmentHash, Vec<&Fragment>> {
    let mut groups: BTreeMap<FragmentHash, Vec<&Fragment>> = BTreeMap::new();
    for fragment in fragments {
        groups.entry(fragment.hash()).or_default().push(fragment);
    }
    groups
}

/// A node of a [`FragmentGraph`]: one distinct key set.
#[derive(Debug, Clone)]
pub struct FragmentNode {
    pub id: String,
    pub hash: FragmentHash,
    /// Sorted, de-duplicated keys.
    pub keys: Vec<FragmentKey>,
    /// How many input fragments merged into this node.
    pub fragment_count: usize,
    key_hashes: BTreeSet<FragmentHash>,
    neighbor_hashes: BTreeSet<FragmentHash>,
}

impl FragmentNode {
    pub fn label(&self) -> String {
        self.keys
            .iter()
            .map(FragmentKey::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Undirected graph of fragments linked through neighbor keys.
#[derive(Debug, Clone, Default)]
pub struct FragmentGraph {
    pub nodes: Vec<FragmentNode>,
    /// Node index pairs, smaller index first.
    pub edges: BTreeSet<(usize, usize)>,
}

impl FragmentGraph {
    /// Build the graph. Nodes keep the order in which their key set first appears.
    pub fn build(fragments: &[Fragment]) -> Self {
        let mut nodes: Vec<FragmentNode> = Vec::new();
        let mut index: HashMap<FragmentHash, usize> = HashMap::new();

        for fragment in fragments {
            let hash = fragment.hash();
            let position = *index.entry(hash.clone()).or_insert_with(|| {
                let keys: Vec<FragmentKey> = fragment
                    .keys
                    .iter()
                    .cloned()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect();
                nodes.push(FragmentNode {
                    id: format!("n{}", nodes.len()),
                    hash,
                    keys,
                    fragment_count: 0,
                    key_hashes: fragment.key_hashes(),
                    neighbor_hashes: BTreeSet::new(),
                });
                nodes.len() - 1
            });
            let node = &mut nodes[position];
            node.fragment_count += 1;
            node.neighbor_hashes.extend(fragment.neighbor_hashes());
        }

        let mut owners: HashMap<&FragmentHash, Vec<usize>> = HashMap::new();
        for (i, node) in nodes.iter().enumerate() {
            for key_hash in &node.key_hashes {
                owners.entry(key_hash).or_default().push(i);
            }
        }

        let mut edges = BTreeSet::new();
        for (a, node) in nodes.iter().enumerate() {
            for neighbor in &node.neighbor_hashes {
                for &b in owners.get(neighbor).map(Vec::as_slice).unwrap_or(&[]) {
                    if a != b {
                        edges.insert((a.min(b), a.max(b)));
                    }
                }
            }
        }

        Self { nodes, edges }
    }

    /// Indexes of nodes sharing an edge with `node`.
    pub fn neighbors_of(&self, node: usize) -> Vec<usize> {
        self.edges
            .iter()
            .filter_map(|&(a, b)| match node {
                n if n == a => Some(b),
                n if n == b => Some(a),
                _ => None,
            })
            .collect()
    }

    /// Render as a Graphviz `graph` description.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("graph fragments {\n");
        for node in &self.nodes {
            out.push_str(&format!(
                "  {} [label=\"{}\"];\n",
                node.id,
                escape_dot(&node.label())
            ));
        }
        for &(a, b) in &self.edges {
            out.push_str(&format!("  {} -- {};\n", self.nodes[a].id, self.nodes[b].id));
        }
        out.push_str("}\n");
        out
    }
}

fn escape_dot(label: &str) -> String {
    let mut escaped = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}
