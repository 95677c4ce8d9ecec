//! Iterative structural cloning of a prototype subtree.

use bt_core::OwnerContext;

use crate::{CloneError, Node, NodePool};

struct Frame<'a> {
    proto: &'a Node,
    node: Node,
    next_child: usize,
}

/// Copies `proto` and everything below it, depth first, with an explicit stack.
///
/// Each node is acquired from the pool and awoken before its children are visited. On any
/// error the partially built nodes are released back to the pool and nothing is returned.
pub(crate) fn clone_subtree(
    proto: &Node,
    owner: &OwnerContext,
    pool: &NodePool,
) -> Result<Node, CloneError> {
    let root = acquire_awake(proto, owner, pool)?;
    let mut stack = vec![Frame {
        proto,
        node: root,
        next_child: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        let parent_proto = frame.proto;
        if let Some(child_proto) = parent_proto.child_at(frame.next_child) {
            frame.next_child += 1;
            match acquire_awake(child_proto, owner, pool) {
                Ok(node) => stack.push(Frame {
                    proto: child_proto,
                    node,
                    next_child: 0,
                }),
                Err(err) => {
                    tracing::debug!(error = %err, depth = stack.len(), "clone failed; rolling back");
                    for frame in stack {
                        pool.release(frame.node);
                    }
                    return Err(err);
                }
            }
            continue;
        }

        // Every child of the top frame is attached: hand it to its parent.
        let Some(done) = stack.pop() else { break };
        match stack.last_mut() {
            Some(parent) => parent.node.attach_child(done.node),
            None => return Ok(done.node),
        }
    }

    unreachable!("clone stack drained without yielding a root")
}

fn acquire_awake(proto: &Node, owner: &OwnerContext, pool: &NodePool) -> Result<Node, CloneError> {
    let mut node = pool.acquire(proto)?;
    if let Err(source) = node.awake(owner) {
        pool.release(node);
        return Err(CloneError::Awake {
            node: proto.id(),
            name: proto.name().to_owned(),
            source,
        });
    }
    Ok(node)
}
