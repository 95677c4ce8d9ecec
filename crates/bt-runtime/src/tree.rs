use std::collections::HashSet;
use std::sync::Arc;

use bt_core::{Blackboard, OwnerContext, Status, TickContext};

use crate::clone::clone_subtree;
use crate::{CloneError, Node, NodeId, NodeKind, NodePool, TreeError};

/// A root node plus the flat registry of every node id reachable from it.
///
/// Trees come in two flavours: a *prototype*, built once with [`Tree::prototype`] and shared,
/// and *instances*, produced per owner by [`Tree::instantiate`]. Instances share the prototype's
/// registry (ids are preserved by cloning) but own every node.
pub struct Tree {
    root: Node,
    registry: Arc<[NodeId]>,
    owner: Option<OwnerContext>,
    is_cloned: bool,
    last_status: Option<Status>,
}

impl Tree {
    /// Validates `root` and wraps it as a prototype.
    ///
    /// Ids must be unique across the tree since they key the node pool. Childless decorators and
    /// empty composites are accepted (they report their default result) but logged.
    pub fn prototype(root: Node) -> Result<Self, TreeError> {
        let mut seen = HashSet::new();
        let mut registry = Vec::new();

        for node in Nodes::new(&root) {
            if !seen.insert(node.id()) {
                return Err(TreeError::DuplicateNodeId(node.id()));
            }
            registry.push(node.id());

            match node.kind() {
                NodeKind::Composite(c) if c.is_empty() => {
                    tracing::warn!(node = %node.id(), name = %node.name(), "composite has no children");
                }
                NodeKind::Decorator(d) if d.child().is_none() => {
                    tracing::warn!(node = %node.id(), name = %node.name(), "decorator has no child");
                }
                _ => {}
            }
        }

        Ok(Self {
            root,
            registry: registry.into(),
            owner: None,
            is_cloned: false,
            last_status: None,
        })
    }

    /// Produces an independent, runtime-ready instance owned by `owner`.
    ///
    /// Structure (ids, names, configuration, flags) is copied; runtime state starts fresh.
    /// Instances can only be made from a prototype.
    pub fn instantiate(&self, owner: OwnerContext, pool: &NodePool) -> Result<Tree, CloneError> {
        if self.is_cloned {
            return Err(CloneError::NotAPrototype);
        }

        let root = clone_subtree(&self.root, &owner, pool)?;
        Ok(Tree {
            root,
            registry: Arc::clone(&self.registry),
            owner: Some(owner),
            is_cloned: true,
            last_status: None,
        })
    }

    /// Advances the tree one step.
    pub fn tick(&mut self, blackboard: &mut Blackboard<'_>) -> Status {
        let status = self.root.run(blackboard);
        self.last_status = Some(status);
        status
    }

    /// Publishes the clock into `blackboard`, then ticks.
    pub fn tick_with(&mut self, ctx: &TickContext, blackboard: &mut Blackboard<'_>) -> Status {
        ctx.publish(blackboard);
        self.tick(blackboard)
    }

    /// Aborts the active running path.
    pub fn stop(&mut self, blackboard: &mut Blackboard<'_>) {
        self.root.abort(blackboard);
    }

    /// Hands every node back to `pool`.
    pub fn release(self, pool: &NodePool) {
        pool.release(self.root);
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Ids of every node, depth-first pre-order.
    pub fn registry(&self) -> &[NodeId] {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn owner(&self) -> Option<&OwnerContext> {
        self.owner.as_ref()
    }

    pub fn is_cloned(&self) -> bool {
        self.is_cloned
    }

    pub fn last_status(&self) -> Option<Status> {
        self.last_status
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.iter().find(|node| node.id() == id)
    }

    pub fn iter(&self) -> Nodes<'_> {
        Nodes::new(&self.root)
    }
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.root.id())
            .field("nodes", &self.registry.len())
            .field("is_cloned", &self.is_cloned)
            .field("last_status", &self.last_status)
            .finish()
    }
}

/// Depth-first pre-order walk with an explicit stack.
pub struct Nodes<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Nodes<'a> {
    fn new(root: &'a Node) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = &'a Node;
    type IntoIter = Nodes<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
