//! Resolved dependency tree types.
//!
//! Nodes are built bottom-up by the resolver and never mutated afterwards.
//! Serialization produces the response document: each dependency keyed by name
//! with its declared range as `target`, its resolved `version` and its own
//! `dependencies`.

use serde::Serialize;
use std::collections::BTreeMap;

/// Dependencies keyed (and therefore ordered) by package name
pub type DependencyMap = BTreeMap<String, DependencyNode>;

/// A dependency resolved to a concrete version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyNode {
    /// Package name (the key in the parent's map)
    #[serde(skip)]
    name: String,
    /// Range the dependency was declared with
    #[serde(rename = "target")]
    range: String,
    /// Resolved version, as published
    version: String,
    /// Resolved dependencies of the selected version
    dependencies: DependencyMap,
}

/// Root package plus its resolved dependencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTree {
    pub name: String,
    pub version: String,
    pub dependencies: DependencyMap,
}

impl DependencyNode {
    /// Create a resolved node
    pub fn new(name: String, range: String, version: String, dependencies: DependencyMap) -> Self {
        Self {
            name,
            range,
            version,
            dependencies,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> &str {
        &self.range
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn dependencies(&self) -> &DependencyMap {
        &self.dependencies
    }

    /// Look up a direct child by name
    pub fn child(&self, name: &str) -> Option<&DependencyNode> {
        self.dependencies.get(name)
    }

    /// Number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + count_nodes(&self.dependencies)
    }

    /// Length of the longest path from this node to a leaf
    pub fn depth(&self) -> usize {
        1 + self
            .dependencies
            .values()
            .map(DependencyNode::depth)
            .max()
            .unwrap_or(0)
    }
}

impl ResolvedTree {
    pub fn new(name: String, version: String, dependencies: DependencyMap) -> Self {
        Self {
            name,
            version,
            dependencies,
        }
    }

    /// Follow a path of dependency names from the root
    pub fn find(&self, path: &[&str]) -> Option<&DependencyNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.dependencies.get(*first)?;
        for name in rest {
            node = node.child(name)?;
        }
        Some(node)
    }

    /// Total number of resolved nodes below the root
    pub fn node_count(&self) -> usize {
        count_nodes(&self.dependencies)
    }

    /// Longest chain of dependencies below the root
    pub fn depth(&self) -> usize {
        self.dependencies.values().map(DependencyNode::depth).max().unwrap_or(0)
    }
}

fn count_nodes(map: &DependencyMap) -> usize {
    map.values().map(DependencyNode::node_count).sum()
}
