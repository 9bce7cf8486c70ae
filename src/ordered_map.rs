//! A balanced ordered map supporting O(log n) predecessor/successor from a
//! key *or* from a previously returned node handle (C3, §4.3).
//!
//! This exists because the sweep engine's SweepLine is ordered by a
//! comparator whose result depends on mutable external state (the
//! position/slope tables, §4.6) that changes between sweep events.
//! `std::collections::BTreeMap` assumes its ordering is stable for the
//! lifetime of the structure and caches no such assumption explicitly, but
//! it also exposes no handle-based predecessor/successor query, which the
//! sweep engine needs (§4.6 step 1: "remember, per removed node, its
//! immediate predecessor and successor"). A hashed structure is out of the
//! question entirely since ordered traversal is required.
//!
//! The map is realized as an arena-indexed AVL tree with explicit parent
//! links (a "threaded" tree in the sense of §9): every node knows its
//! parent, so predecessor/successor from a handle is a bounded walk up and
//! across the tree, not a re-search from the root. The comparator is never
//! stored on the map — every operation that needs one takes it as an
//! explicit parameter, so the same map type backs both the exactly-keyed
//! Schedule (§4.6) and the stateful SweepLine.

use std::cmp::Ordering;

/// A stable handle into an [`OrderedMap`], returned by `try_add` and valid
/// until the referenced entry is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

struct Node<K, V> {
    key: K,
    value: V,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
    height: i32,
}

/// A balanced sorted map from `K` to `V`, ordered by an externally supplied
/// comparator.
pub struct OrderedMap<K, V> {
    nodes: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    root: Option<NodeId>,
    len: usize,
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        OrderedMap {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }
}

impl<K, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn key(&self, id: NodeId) -> &K {
        &self.slot(id).key
    }

    pub fn value(&self, id: NodeId) -> &V {
        &self.slot(id).value
    }

    pub fn value_mut(&mut self, id: NodeId) -> &mut V {
        &mut self.slot_mut(id).value
    }

    fn slot(&self, id: NodeId) -> &Node<K, V> {
        self.nodes[id.0].as_ref().expect("dangling NodeId")
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.nodes[id.0].as_mut().expect("dangling NodeId")
    }

    fn height_of(&self, id: Option<NodeId>) -> i32 {
        id.map_or(0, |id| self.slot(id).height)
    }

    fn update_height(&mut self, id: NodeId) {
        let (l, r) = {
            let n = self.slot(id);
            (n.left, n.right)
        };
        let h = 1 + self.height_of(l).max(self.height_of(r));
        self.slot_mut(id).height = h;
    }

    fn balance_factor(&self, id: NodeId) -> i32 {
        let n = self.slot(id);
        self.height_of(n.left) - self.height_of(n.right)
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(l) = self.slot(id).left {
            id = l;
        }
        id
    }

    fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(r) = self.slot(id).right {
            id = r;
        }
        id
    }

    /// The smallest-keyed entry's handle.
    pub fn first(&self) -> Option<NodeId> {
        self.root.map(|r| self.leftmost(r))
    }

    /// The largest-keyed entry's handle.
    pub fn last(&self) -> Option<NodeId> {
        self.root.map(|r| self.rightmost(r))
    }

    /// The next entry in ascending order after `id`, in O(log n).
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(r) = self.slot(id).right {
            return Some(self.leftmost(r));
        }
        let mut cur = id;
        while let Some(p) = self.slot(cur).parent {
            if self.slot(p).left == Some(cur) {
                return Some(p);
            }
            cur = p;
        }
        None
    }

    /// The previous entry in ascending order before `id`, in O(log n).
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(l) = self.slot(id).left {
            return Some(self.rightmost(l));
        }
        let mut cur = id;
        while let Some(p) = self.slot(cur).parent {
            if self.slot(p).right == Some(cur) {
                return Some(p);
            }
            cur = p;
        }
        None
    }

    /// Looks up `key` using `cmp`, without inserting.
    pub fn get<C>(&self, key: &K, mut cmp: C) -> Option<NodeId>
    where
        C: FnMut(&K, &K) -> Ordering,
    {
        let mut cur = self.root;
        while let Some(id) = cur {
            match cmp(key, &self.slot(id).key) {
                Ordering::Equal => return Some(id),
                Ordering::Less => cur = self.slot(id).left,
                Ordering::Greater => cur = self.slot(id).right,
            }
        }
        None
    }

    /// Inserts `key -> value` if absent using `cmp`. Idempotent on key
    /// presence: if `key` is already present, returns its existing handle
    /// and `inserted = false`, leaving the existing value untouched.
    pub fn try_add<C>(&mut self, key: K, value: V, mut cmp: C) -> (NodeId, bool)
    where
        C: FnMut(&K, &K) -> Ordering,
    {
        let Some(root) = self.root else {
            let id = self.alloc(Node {
                key,
                value,
                left: None,
                right: None,
                parent: None,
                height: 1,
            });
            self.root = Some(id);
            self.len += 1;
            return (id, true);
        };

        let mut cur = root;
        loop {
            match cmp(&key, &self.slot(cur).key) {
                Ordering::Equal => return (cur, false),
                Ordering::Less => {
                    if let Some(l) = self.slot(cur).left {
                        cur = l;
                    } else {
                        let id = self.alloc(Node {
                            key,
                            value,
                            left: None,
                            right: None,
                            parent: Some(cur),
                            height: 1,
                        });
                        self.slot_mut(cur).left = Some(id);
                        self.len += 1;
                        self.rebalance_from(cur);
                        return (id, true);
                    }
                }
                Ordering::Greater => {
                    if let Some(r) = self.slot(cur).right {
                        cur = r;
                    } else {
                        let id = self.alloc(Node {
                            key,
                            value,
                            left: None,
                            right: None,
                            parent: Some(cur),
                            height: 1,
                        });
                        self.slot_mut(cur).right = Some(id);
                        self.len += 1;
                        self.rebalance_from(cur);
                        return (id, true);
                    }
                }
            }
        }
    }

    /// Removes the entry referenced by `id`, returning its `(key, value)`.
    /// Other handles remain valid: if `id`'s slot cannot be freed directly
    /// (it has two children), the structural successor is relinked into
    /// `id`'s position rather than having its data copied over, so a
    /// handle to that successor, if the caller kept one, still refers to
    /// the same logical entry.
    pub fn remove(&mut self, id: NodeId) -> (K, V) {
        self.len -= 1;
        let (left, right, parent) = {
            let n = self.slot(id);
            (n.left, n.right, n.parent)
        };

        let rebalance_start;
        match (left, right) {
            (Some(_), Some(right)) => {
                let succ = self.leftmost(right);
                let succ_right = self.slot(succ).right;
                let succ_parent = self.slot(succ).parent.unwrap();

                if succ_parent == id {
                    // `right` has no left child: `succ == right` itself.
                    rebalance_start = Some(succ);
                } else {
                    // Splice `succ` out of its spot, promoting its right child.
                    self.set_child_slot(succ_parent, Some(succ), succ_right);
                    if let Some(sr) = succ_right {
                        self.slot_mut(sr).parent = Some(succ_parent);
                    }
                    self.slot_mut(succ).right = Some(right);
                    self.slot_mut(right).parent = Some(succ);
                    rebalance_start = Some(succ_parent);
                }

                self.slot_mut(succ).left = left;
                self.slot_mut(left.unwrap()).parent = Some(succ);
                self.slot_mut(succ).parent = parent;
                match parent {
                    Some(p) => self.set_child_slot(p, Some(id), Some(succ)),
                    None => self.root = Some(succ),
                }
            }
            (one, None) | (None, one) => {
                if let Some(child) = one {
                    self.slot_mut(child).parent = parent;
                }
                match parent {
                    Some(p) => self.set_child_slot(p, Some(id), one),
                    None => self.root = one,
                }
                rebalance_start = parent;
            }
        }

        if let Some(start) = rebalance_start {
            self.rebalance_from(start);
        } else if self.root.is_some() {
            let r = self.root.unwrap();
            self.update_height(r);
        }

        let node = self.nodes[id.0].take().expect("dangling NodeId");
        self.free.push(id.0);
        (node.key, node.value)
    }

    /// Replaces whichever of `parent`'s (or, if `parent == target`, treats
    /// `target` as the root pointer owner) child slots currently holds
    /// `target` with `replacement`. `parent` is always a real node here;
    /// the root case is handled by callers directly via `self.root`.
    fn set_child_slot(&mut self, parent: NodeId, target: Option<NodeId>, replacement: Option<NodeId>) {
        let n = self.slot_mut(parent);
        if n.left == target {
            n.left = replacement;
        } else if n.right == target {
            n.right = replacement;
        }
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        if let Some(slot) = self.free.pop() {
            self.nodes[slot] = Some(node);
            NodeId(slot)
        } else {
            self.nodes.push(Some(node));
            NodeId(self.nodes.len() - 1)
        }
    }

    fn rebalance_from(&mut self, mut id: NodeId) {
        loop {
            self.update_height(id);
            let balance = self.balance_factor(id);
            let new_id = if balance > 1 {
                let left = self.slot(id).left.unwrap();
                if self.balance_factor(left) < 0 {
                    let new_left = self.rotate_left(left);
                    self.slot_mut(id).left = Some(new_left);
                }
                self.rotate_right(id)
            } else if balance < -1 {
                let right = self.slot(id).right.unwrap();
                if self.balance_factor(right) > 0 {
                    let new_right = self.rotate_right(right);
                    self.slot_mut(id).right = Some(new_right);
                }
                self.rotate_left(id)
            } else {
                id
            };

            match self.slot(new_id).parent {
                Some(p) => id = p,
                None => {
                    self.root = Some(new_id);
                    break;
                }
            }
        }
    }

    /// Left-rotates the subtree rooted at `id`, returning the new subtree
    /// root. Reattaches the new root to `id`'s former parent.
    fn rotate_left(&mut self, id: NodeId) -> NodeId {
        let parent = self.slot(id).parent;
        let pivot = self.slot(id).right.expect("rotate_left needs a right child");
        let pivot_left = self.slot(pivot).left;

        self.slot_mut(id).right = pivot_left;
        if let Some(pl) = pivot_left {
            self.slot_mut(pl).parent = Some(id);
        }

        self.slot_mut(pivot).left = Some(id);
        self.slot_mut(id).parent = Some(pivot);

        self.slot_mut(pivot).parent = parent;
        if let Some(p) = parent {
            self.set_child_slot(p, Some(id), Some(pivot));
        }

        self.update_height(id);
        self.update_height(pivot);
        pivot
    }

    /// Right-rotates the subtree rooted at `id`, returning the new subtree
    /// root. Reattaches the new root to `id`'s former parent.
    fn rotate_right(&mut self, id: NodeId) -> NodeId {
        let parent = self.slot(id).parent;
        let pivot = self.slot(id).left.expect("rotate_right needs a left child");
        let pivot_right = self.slot(pivot).right;

        self.slot_mut(id).left = pivot_right;
        if let Some(pr) = pivot_right {
            self.slot_mut(pr).parent = Some(id);
        }

        self.slot_mut(pivot).right = Some(id);
        self.slot_mut(id).parent = Some(pivot);

        self.slot_mut(pivot).parent = parent;
        if let Some(p) = parent {
            self.set_child_slot(p, Some(id), Some(pivot));
        }

        self.update_height(id);
        self.update_height(pivot);
        pivot
    }

    /// In-order iteration of handles, for debugging/testing.
    #[cfg(test)]
    fn in_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len);
        let mut cur = self.first();
        while let Some(id) = cur {
            out.push(id);
            cur = self.successor(id);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn natural_cmp(a: &i32, b: &i32) -> Ordering {
        a.cmp(b)
    }

    #[test]
    fn insert_then_in_order_traversal_is_sorted() {
        let mut map: OrderedMap<i32, &'static str> = OrderedMap::new();
        for k in [5, 3, 8, 1, 4, 7, 9, 2, 6, 0] {
            map.try_add(k, "v", natural_cmp);
        }
        let keys: Vec<i32> = map.in_order().into_iter().map(|id| *map.key(id)).collect();
        assert_eq!(keys, (0..10).collect::<Vec<_>>());
        assert_eq!(map.len(), 10);
    }

    #[test]
    fn try_add_is_idempotent_on_existing_key() {
        let mut map: OrderedMap<i32, i32> = OrderedMap::new();
        let (id1, inserted1) = map.try_add(5, 10, natural_cmp);
        assert!(inserted1);
        let (id2, inserted2) = map.try_add(5, 99, natural_cmp);
        assert!(!inserted2);
        assert_eq!(id1, id2);
        assert_eq!(*map.value(id1), 10);
    }

    #[test]
    fn predecessor_successor_from_handles() {
        let mut map: OrderedMap<i32, ()> = OrderedMap::new();
        let mut handles = Vec::new();
        for k in 0..20 {
            let (id, _) = map.try_add(k, (), natural_cmp);
            handles.push(id);
        }
        for k in 1..20 {
            assert_eq!(*map.key(map.predecessor(handles[k]).unwrap()), (k - 1) as i32);
        }
        assert!(map.predecessor(handles[0]).is_none());
        for k in 0..19 {
            assert_eq!(*map.key(map.successor(handles[k]).unwrap()), (k + 1) as i32);
        }
        assert!(map.successor(handles[19]).is_none());
    }

    #[test]
    fn remove_preserves_other_handles_and_order() {
        let mut map: OrderedMap<i32, i32> = OrderedMap::new();
        let mut handles = Vec::new();
        for k in 0..15 {
            let (id, _) = map.try_add(k, k * 10, natural_cmp);
            handles.push((k, id));
        }
        // Remove a handful of interior nodes with two children and leaves.
        for &victim in &[7, 3, 10, 0, 14] {
            let (_, id) = handles.iter().find(|(k, _)| *k == victim).unwrap();
            map.remove(*id);
        }
        let remaining: Vec<i32> = map.in_order().into_iter().map(|id| *map.key(id)).collect();
        let expected: Vec<i32> = (0..15).filter(|k| ![7, 3, 10, 0, 14].contains(k)).collect();
        assert_eq!(remaining, expected);
        assert_eq!(map.len(), expected.len());

        // Surviving handles must still resolve to their original key/value.
        for &(k, id) in &handles {
            if expected.contains(&k) {
                assert_eq!(*map.key(id), k);
                assert_eq!(*map.value(id), k * 10);
            }
        }
    }

    #[test]
    fn stateful_comparator_reflects_external_state_each_call() {
        // Simulates the SweepLine: the "position" of each key changes
        // between operations, and the comparator must consult the live
        // state rather than any cached ordering.
        let mut position = vec![0.0_f64; 4];
        let cmp = |a: &usize, b: &usize, pos: &[f64]| {
            pos[*a].partial_cmp(&pos[*b]).unwrap().then(a.cmp(b))
        };

        let mut map: OrderedMap<usize, ()> = OrderedMap::new();
        position = vec![3.0, 1.0, 2.0, 0.0];
        for k in 0..4 {
            map.try_add(k, (), |a, b| cmp(a, b, &position));
        }
        let order: Vec<usize> = map.in_order().into_iter().map(|id| *map.key(id)).collect();
        assert_eq!(order, vec![3, 1, 2, 0]);

        // Reorder externally, rebuild into a fresh map using the new state.
        position = vec![0.0, 1.0, 2.0, 3.0];
        let mut map2: OrderedMap<usize, ()> = OrderedMap::new();
        for k in 0..4 {
            map2.try_add(k, (), |a, b| cmp(a, b, &position));
        }
        let order2: Vec<usize> = map2.in_order().into_iter().map(|id| *map2.key(id)).collect();
        assert_eq!(order2, vec![0, 1, 2, 3]);
    }
}
