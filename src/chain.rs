//! Index-addressed circular chain.
//!
//! The chain is an arena of `N` nodes where node `i` links to `(i + 1) % N` and
//! `(i + N - 1) % N`. Nodes refer to slots and neighbours by index only, so the cycle
//! never forms an ownership loop. Topology is fixed once built.

/// One link of the chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Node {
    slot: usize,
    prev: usize,
    next: usize,
}

impl Node {
    #[inline(always)]
    pub const fn slot(&self) -> usize {
        self.slot
    }

    #[inline(always)]
    pub const fn prev(&self) -> usize {
        self.prev
    }

    #[inline(always)]
    pub const fn next(&self) -> usize {
        self.next
    }
}

/// `N` nodes wired into a single cycle.
#[derive(Debug)]
pub struct Chain<const N: usize> {
    nodes: [Node; N],
}

impl<const N: usize> Chain<N> {
    /// Returns `None` for `N == 0`; there is no cycle of length zero.
    pub(crate) fn build() -> Option<Self> {
        if N == 0 {
            return None;
        }
        let nodes = core::array::from_fn(|i| Node {
            slot: i,
            prev: (i + N - 1) % N,
            next: (i + 1) % N,
        });
        Some(Self { nodes })
    }

    #[inline(always)]
    pub const fn len(&self) -> usize {
        N
    }

    /// Always false: a built chain holds at least one node.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// # Panics
    /// Panics if `index >= N`.
    #[inline(always)]
    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Check that `next`/`prev` are mutual inverses, every slot is referenced exactly once,
    /// and `N` steps along `next` from node 0 visit every node before returning.
    pub fn is_single_cycle(&self) -> bool {
        let mut slot_seen = [false; N];
        for (i, node) in self.nodes.iter().enumerate() {
            if node.next >= N || node.prev >= N || node.slot >= N {
                return false;
            }
            if self.nodes[node.next].prev != i || self.nodes[node.prev].next != i {
                return false;
            }
            if core::mem::replace(&mut slot_seen[node.slot], true) {
                return false;
            }
        }

        let mut visited = [false; N];
        let mut at = 0;
        for _ in 0..N {
            if core::mem::replace(&mut visited[at], true) {
                return false;
            }
            at = self.nodes[at].next;
        }
        at == 0
    }
}
