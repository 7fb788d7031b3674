//! A minimal scene graph: the host-side home of pooled objects.
//!
//! Nodes are the pool's entities. Each node carries a parent link, a list of
//! children and an `active` flag. A node is only *active in hierarchy* when it
//! and every ancestor above it are active.

use crate::{
    collections::{HashPool, PoolId, PoolObject},
    error::{PoolError, PoolResult},
};
use smallvec::SmallVec;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct NodeId(pub u64);

impl PoolId for NodeId {
    #[inline]
    fn next(&self) -> NodeId {
        NodeId(self.0 + 1)
    }
}

#[derive(Debug)]
pub struct Node {
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 8]>,
    label: String,
    active: bool,
}

impl Default for Node {
    #[inline]
    fn default() -> Node {
        Node {
            parent: None,
            children: SmallVec::default(),
            label: String::new(),
            // Freshly instantiated objects start out live, the same as in most engines
            active: true,
        }
    }
}

impl Node {
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Get the nth direct child's id
    #[inline]
    pub fn nth_child(&self, n: usize) -> Option<NodeId> {
        self.children.get(n).copied()
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn active_self(&self) -> bool {
        self.active
    }
}

impl PoolObject for Node {
    #[inline]
    fn clear(&mut self) {
        self.parent = None;
        self.children.clear();
        self.label.clear();
        self.active = true;
    }
}

#[derive(Default, Debug)]
pub struct SceneGraph {
    nodes: HashPool<NodeId, Node>,
    // Scratch stack for subtree walks
    node_search_stack: Vec<NodeId>,
}

impl SceneGraph {
    #[inline]
    pub fn new() -> SceneGraph {
        SceneGraph::default()
    }

    /// Create a new, active, root node.
    pub fn spawn<S: AsRef<str>>(&mut self, label: S) -> NodeId {
        self.nodes.create(|_, node| node.label.push_str(label.as_ref()))
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> PoolResult<&mut Node> {
        self.nodes.get_mut(id).ok_or(PoolError::MissingNode(id))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sets a node's parent (re-parenting or un-parenting if needed)
    pub fn set_parent(&mut self, node_id: NodeId, parent_id: Option<NodeId>) -> PoolResult<()> {
        if !self.contains(node_id) {
            return Err(PoolError::MissingNode(node_id));
        }
        if let Some(parent_id) = parent_id {
            if !self.contains(parent_id) {
                return Err(PoolError::MissingNode(parent_id));
            }
            // Walk up from the new parent; meeting the node means it would become its own ancestor
            let mut cursor = Some(parent_id);
            while let Some(id) = cursor {
                if id == node_id {
                    return Err(PoolError::ParentCycle(node_id));
                }
                cursor = self.node(id).and_then(Node::parent);
            }
        }

        let old_parent_id = self.node_mut(node_id)?.parent;
        if old_parent_id == parent_id {
            return Ok(());
        }
        if let Some(old_parent_id) = old_parent_id {
            let old_parent = self.node_mut(old_parent_id)?;
            old_parent.children.retain(|child| *child != node_id);
        }
        if let Some(parent_id) = parent_id {
            self.node_mut(parent_id)?.children.push(node_id);
        }
        self.node_mut(node_id)?.parent = parent_id;
        Ok(())
    }

    #[inline]
    pub fn set_active(&mut self, id: NodeId, active: bool) -> PoolResult<()> {
        self.node_mut(id)?.active = active;
        Ok(())
    }

    /// The node's own flag, ignoring its ancestors. Unknown nodes read as inactive.
    #[inline]
    pub fn is_active_self(&self, id: NodeId) -> bool {
        self.node(id).map_or(false, Node::active_self)
    }

    /// True only when the node and all of its ancestors are active.
    pub fn is_active_in_hierarchy(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(id) = cursor {
            match self.node(id) {
                Some(node) if node.active => cursor = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Remove a node and everything beneath it. Unknown ids are ignored.
    pub fn destroy(&mut self, id: NodeId) -> usize {
        let parent_id = match self.node(id) {
            Some(node) => node.parent,
            None => return 0,
        };
        if let Some(parent_id) = parent_id {
            if let Some(parent) = self.nodes.get_mut(parent_id) {
                parent.children.retain(|child| *child != id);
            }
        }

        let mut destroyed = 0;
        self.node_search_stack.clear();
        self.node_search_stack.push(id);
        while let Some(id) = self.node_search_stack.pop() {
            if let Some(node) = self.nodes.get(id) {
                self.node_search_stack.extend(node.children());
            }
            if self.nodes.delete(&id) {
                destroyed += 1;
            }
        }
        log::debug!("Destroyed {} node(s) under {:?}", destroyed, id);
        destroyed
    }
}
