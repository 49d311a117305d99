//! Accessibility tree snapshots.
//!
//! A [`UiSnapshot`] is a flat arena of [`UiNode`]s indexed by [`NodeId`].
//! The platform listener captures one snapshot per UI event; the checkout
//! engine only ever reads it. Nodes keep explicit parent links so that
//! click-target resolution can walk up the ancestor chain with a bounded
//! loop instead of trusting the platform to report an acyclic graph.

use serde::{Deserialize, Serialize};

/// Index handle into a [`UiSnapshot`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single element of the accessibility tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiNode {
    /// Fully-qualified view id (e.g. `cn.damai:id/btn_buy`), if exposed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_id: Option<String>,

    /// Visible text/label, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Widget class name (e.g. `android.widget.TextView`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    /// Whether the platform reports this node as click-actionable.
    #[serde(default)]
    pub clickable: bool,

    /// Parent node, `None` for the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,

    /// Child nodes in layout order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
}

impl UiNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view_id(mut self, view_id: impl Into<String>) -> Self {
        self.view_id = Some(view_id.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn clickable(mut self) -> Self {
        self.clickable = true;
        self
    }
}

/// Immutable snapshot of a window's accessibility tree.
///
/// Query results use first-match-in-arena-order semantics, which matches
/// the traversal order the capturing side used to flatten the tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiSnapshot {
    nodes: Vec<UiNode>,
}

impl UiSnapshot {
    /// Build a snapshot directly from a node arena. Parent/child links are
    /// taken as-is; use [`SnapshotBuilder`] for link-consistent construction.
    pub fn from_nodes(nodes: Vec<UiNode>) -> Self {
        Self { nodes }
    }

    pub fn get(&self, id: NodeId) -> Option<&UiNode> {
        self.nodes.get(id.index())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Text of the node, empty string when absent (either the node has no
    /// text or the id is stale).
    pub fn text_of(&self, id: NodeId) -> &str {
        self.get(id).and_then(|n| n.text.as_deref()).unwrap_or("")
    }

    /// First node carrying exactly the given view id.
    pub fn find_by_id(&self, view_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.view_id.as_deref() == Some(view_id))
            .map(|i| NodeId(i as u32))
    }

    /// All nodes carrying the given view id, in arena order.
    pub fn find_all_by_id(&self, view_id: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.view_id.as_deref() == Some(view_id))
            .map(|(i, _)| NodeId(i as u32))
            .collect()
    }

    /// First node whose text matches.
    ///
    /// Substring match by default; with `exact` the full text must equal
    /// `text`. An empty needle never matches (a blank label is "not
    /// configured", not "matches everything").
    pub fn find_by_text(&self, text: &str, exact: bool) -> Option<NodeId> {
        if text.is_empty() {
            return None;
        }
        self.nodes
            .iter()
            .position(|n| match n.text.as_deref() {
                Some(t) if exact => t == text,
                Some(t) => t.contains(text),
                None => false,
            })
            .map(|i| NodeId(i as u32))
    }

    /// All nodes whose text matches, in arena order.
    pub fn find_all_by_text(&self, text: &str, exact: bool) -> Vec<NodeId> {
        if text.is_empty() {
            return Vec::new();
        }
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| match n.text.as_deref() {
                Some(t) if exact => t == text,
                Some(t) => t.contains(text),
                None => false,
            })
            .map(|(i, _)| NodeId(i as u32))
            .collect()
    }

    /// Resolve the node that should receive a click targeted at `id`.
    ///
    /// Many toolkits attach the clickable capability to a container rather
    /// than the leaf the text/id matched, so a non-clickable hit delegates
    /// to its nearest clickable ancestor. The walk is bounded by the arena
    /// size so a cyclic parent chain from a misbehaving platform query
    /// still terminates.
    pub fn clickable_target(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        for _ in 0..=self.nodes.len() {
            let node = self.get(current)?;
            if node.clickable {
                return Some(current);
            }
            current = node.parent?;
        }
        None
    }
}

/// Incremental, link-consistent snapshot construction.
///
/// Used by platform capture code and by test/replay fixtures.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    nodes: Vec<UiNode>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parentless node (a window root).
    pub fn add_root(&mut self, mut node: UiNode) -> NodeId {
        node.parent = None;
        node.children.clear();
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Add a node under `parent`, wiring both link directions.
    pub fn add_child(&mut self, parent: NodeId, mut node: UiNode) -> NodeId {
        node.parent = Some(parent);
        node.children.clear();
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        if let Some(p) = self.nodes.get_mut(parent.index()) {
            p.children.push(id);
        }
        id
    }

    pub fn build(self) -> UiSnapshot {
        UiSnapshot::from_nodes(self.nodes)
    }
}
