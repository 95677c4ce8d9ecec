use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{CloneError, Node, NodeId, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfig {
    /// Free instances kept per prototype node; surplus releases are dropped.
    pub max_free_per_prototype: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_free_per_prototype: 64,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoolStats {
    /// Acquisitions served from a free list.
    pub hits: u64,
    /// Acquisitions that had to allocate.
    pub misses: u64,
    /// Nodes returned and kept.
    pub released: u64,
    /// Nodes returned while their free list was full.
    pub dropped: u64,
}

/// Free lists of node instances keyed by prototype [`NodeId`].
///
/// The pool only tracks instances nobody is using. It is `Send + Sync` so trees can be spawned
/// and released from any thread; ticking never touches it.
pub struct NodePool {
    config: PoolConfig,
    free: Mutex<HashMap<NodeId, Vec<Node>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    released: AtomicU64,
    dropped: AtomicU64,
}

impl NodePool {
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            config,
            free: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            released: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> PoolConfig {
        self.config
    }

    /// A childless instance of `proto` with fresh runtime state.
    ///
    /// Reuses a free instance when one exists, otherwise allocates. Either way the result is
    /// indistinguishable from a newly constructed copy.
    pub fn acquire(&self, proto: &Node) -> Result<Node, CloneError> {
        let pooled = self.free.lock().get_mut(&proto.id()).and_then(Vec::pop);

        let Some(mut node) = pooled else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(node = %proto.id(), name = %proto.name(), "node pool miss");
            return Ok(Node::shell_of(proto));
        };

        if node.id() != proto.id() {
            return Err(CloneError::PoolCorrupted {
                expected: proto.id(),
                found: node.id(),
            });
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        node.reset_from(proto);
        Ok(node)
    }

    /// Returns `node` and its whole subtree to the free lists.
    ///
    /// Leaves are not stopped; abort the tree first if they hold resources that `on_stop`
    /// releases.
    pub fn release(&self, node: Node) {
        let mut pending = vec![node];
        let mut free = self.free.lock();

        while let Some(mut node) = pending.pop() {
            node.take_children(&mut pending);
            node.scrub();

            let list = free.entry(node.id()).or_default();
            if list.len() >= self.config.max_free_per_prototype {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                continue;
            }
            list.push(node);
            self.released.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Fills the free lists with `copies` instances of every node in `tree`.
    pub fn prewarm(&self, tree: &Tree, copies: usize) {
        let mut free = self.free.lock();
        for proto in tree.iter() {
            let list = free.entry(proto.id()).or_default();
            let target = copies.min(self.config.max_free_per_prototype);
            while list.len() < target {
                list.push(Node::shell_of(proto));
            }
        }
    }

    pub fn free_count(&self, id: NodeId) -> usize {
        self.free.lock().get(&id).map_or(0, Vec::len)
    }

    pub fn total_free(&self) -> usize {
        self.free.lock().values().map(Vec::len).sum()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    /// Drops every free instance. Counters are kept.
    pub fn clear(&self) {
        self.free.lock().clear();
    }
}

impl Default for NodePool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NodePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodePool")
            .field("config", &self.config)
            .field("free", &self.total_free())
            .field("stats", &self.stats())
            .finish()
    }
}
