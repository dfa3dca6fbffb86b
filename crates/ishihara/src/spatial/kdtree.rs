//! Incremental 2D k-d tree with bounded k-nearest queries.
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::DVec2;

/// Weight balance factor. A subtree is rebuilt once an insert lands deeper than
/// `log_{1/ALPHA}(len)`, which keeps inserts amortized logarithmic even for
/// sorted input.
const ALPHA: f64 = 0.7;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline]
    fn next(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    #[inline]
    fn of(self, p: DVec2) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }
}

#[derive(Debug, Clone)]
struct Node<T> {
    point: DVec2,
    item: T,
    axis: Axis,
    left: Option<usize>,
    right: Option<usize>,
    size: usize,
}

/// A neighbor returned by [`SpatialIndex::nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a, T> {
    pub point: DVec2,
    pub item: &'a T,
    pub distance_squared: f64,
}

/// Max-heap entry: the current worst candidate sits on top.
struct Candidate {
    distance_squared: f64,
    id: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_squared
            .total_cmp(&other.distance_squared)
            .then(self.id.cmp(&other.id))
    }
}

/// 2D nearest-neighbor index over points, each carrying an item.
///
/// Nodes live in an arena in insertion order; ids are stable for the index's
/// lifetime. Distances are squared Euclidean.
#[derive(Debug, Clone)]
pub struct SpatialIndex<T> {
    nodes: Vec<Node<T>>,
    root: Option<usize>,
    rebuilds: usize,
}

impl<T> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SpatialIndex<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            rebuilds: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root: None,
            rebuilds: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.rebuilds = 0;
    }

    /// Number of subtree rebuilds performed so far.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (DVec2, &T)> {
        self.nodes.iter().map(|n| (n.point, &n.item))
    }

    /// Adds `item` at `point`.
    pub fn insert(&mut self, point: DVec2, item: T) {
        let id = self.nodes.len();
        let Some(mut current) = self.root else {
            self.nodes.push(Node {
                point,
                item,
                axis: Axis::X,
                left: None,
                right: None,
                size: 1,
            });
            self.root = Some(id);
            return;
        };

        let mut path = Vec::new();
        let axis = loop {
            path.push(current);
            let node = &mut self.nodes[current];
            node.size += 1;
            let go_left = node.axis.of(point) < node.axis.of(node.point);
            let slot = if go_left {
                &mut node.left
            } else {
                &mut node.right
            };
            match *slot {
                Some(next) => current = next,
                None => {
                    *slot = Some(id);
                    break node.axis.next();
                }
            }
        };

        self.nodes.push(Node {
            point,
            item,
            axis,
            left: None,
            right: None,
            size: 1,
        });

        if path.len() > depth_limit(self.nodes.len()) {
            self.rebalance(&path);
        }
    }

    /// Rebuilds the deepest weight-unbalanced ancestor on `path`.
    fn rebalance(&mut self, path: &[usize]) {
        let mut child_size = 1usize;
        for (i, &node) in path.iter().enumerate().rev() {
            let size = self.nodes[node].size;
            if child_size as f64 > ALPHA * size as f64 {
                let new_root = self.rebuild_subtree(node);
                match i.checked_sub(1).map(|p| path[p]) {
                    None => self.root = Some(new_root),
                    Some(parent) => {
                        let parent = &mut self.nodes[parent];
                        if parent.left == Some(node) {
                            parent.left = Some(new_root);
                        } else {
                            parent.right = Some(new_root);
                        }
                    }
                }
                self.rebuilds += 1;
                return;
            }
            child_size = size;
        }
    }

    fn rebuild_subtree(&mut self, root: usize) -> usize {
        let axis = self.nodes[root].axis;
        let mut ids = Vec::with_capacity(self.nodes[root].size);
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            ids.push(id);
            let node = &self.nodes[id];
            stack.extend(node.left);
            stack.extend(node.right);
        }
        self.build_balanced(&mut ids, axis).unwrap_or(root)
    }

    fn build_balanced(&mut self, ids: &mut [usize], axis: Axis) -> Option<usize> {
        if ids.is_empty() {
            return None;
        }
        ids.sort_unstable_by(|&a, &b| {
            axis.of(self.nodes[a].point)
                .total_cmp(&axis.of(self.nodes[b].point))
                .then(a.cmp(&b))
        });
        let size = ids.len();
        let mid = size / 2;
        let id = ids[mid];
        let (left_ids, rest) = ids.split_at_mut(mid);
        let left = self.build_balanced(left_ids, axis.next());
        let right = self.build_balanced(&mut rest[1..], axis.next());

        let node = &mut self.nodes[id];
        node.axis = axis;
        node.left = left;
        node.right = right;
        node.size = size;
        Some(id)
    }

    /// Up to `k` entries closest to `point`, ascending by squared distance.
    ///
    /// Ties are broken by insertion order. Returns an empty vector for an empty
    /// index or `k == 0`. `k` larger than the index is clamped to its length.
    pub fn nearest(&self, point: DVec2, k: usize) -> Vec<Neighbor<'_, T>> {
        let Some(root) = self.root else {
            return Vec::new();
        };
        let k = k.min(self.nodes.len());
        if k == 0 {
            return Vec::new();
        }

        let mut heap = BinaryHeap::with_capacity(k + 1);
        self.nearest_recursive(root, point, k, &mut heap);

        heap.into_sorted_vec()
            .into_iter()
            .map(|c| {
                let node = &self.nodes[c.id];
                Neighbor {
                    point: node.point,
                    item: &node.item,
                    distance_squared: c.distance_squared,
                }
            })
            .collect()
    }

    fn nearest_recursive(
        &self,
        id: usize,
        point: DVec2,
        k: usize,
        heap: &mut BinaryHeap<Candidate>,
    ) {
        let node = &self.nodes[id];
        let candidate = Candidate {
            distance_squared: node.point.distance_squared(point),
            id,
        };
        if heap.len() < k {
            heap.push(candidate);
        } else if heap.peek().is_some_and(|worst| candidate < *worst) {
            heap.pop();
            heap.push(candidate);
        }

        let diff = node.axis.of(point) - node.axis.of(node.point);
        let (near, far) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(near) = near {
            self.nearest_recursive(near, point, k, heap);
        }
        if let Some(far) = far {
            let reachable = heap.len() < k
                || heap
                    .peek()
                    .is_some_and(|worst| diff * diff <= worst.distance_squared);
            if reachable {
                self.nearest_recursive(far, point, k, heap);
            }
        }
    }

    /// Longest root-to-leaf edge count, or 0 for an empty index.
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut max = 0;
        let mut stack = vec![(root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            max = max.max(depth);
            let node = &self.nodes[id];
            for child in [node.left, node.right].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
        max
    }
}

/// Deepest acceptable insert depth for an index of `len` entries.
#[inline]
fn depth_limit(len: usize) -> usize {
    ((len as f64).ln() / (1.0 / ALPHA).ln()).floor() as usize + 1
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::sampling::rand01;

    fn brute_force(points: &[DVec2], q: DVec2, k: usize) -> Vec<(f64, usize)> {
        let mut all: Vec<_> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (p.distance_squared(q), i))
            .collect();
        all.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        all.truncate(k);
        all
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index: SpatialIndex<usize> = SpatialIndex::new();
        assert!(index.nearest(DVec2::ZERO, 5).is_empty());
        assert_eq!(index.depth(), 0);
    }

    #[test]
    fn zero_k_returns_nothing() {
        let mut index = SpatialIndex::new();
        index.insert(DVec2::ZERO, 0usize);
        assert!(index.nearest(DVec2::ZERO, 0).is_empty());
    }

    #[test]
    fn fewer_entries_than_k() {
        let mut index = SpatialIndex::new();
        index.insert(DVec2::new(3.0, 0.0), "far");
        index.insert(DVec2::new(1.0, 0.0), "near");
        let found = index.nearest(DVec2::ZERO, 10);
        assert_eq!(found.len(), 2);
        assert_eq!(*found[0].item, "near");
        assert_eq!(found[0].distance_squared, 1.0);
        assert_eq!(*found[1].item, "far");
    }

    #[test]
    fn unbounded_k_returns_every_entry() {
        let mut index = SpatialIndex::new();
        for i in 0..20 {
            index.insert(DVec2::new(i as f64, (i % 3) as f64), i);
        }
        let found = index.nearest(DVec2::ZERO, usize::MAX);
        assert_eq!(found.len(), 20);
        assert_eq!(*found[0].item, 0);
    }

    #[test]
    fn matches_brute_force_on_random_points() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut index = SpatialIndex::new();
        let mut points = Vec::new();
        for i in 0..2000 {
            let p = DVec2::new(rand01(&mut rng) * 500.0, rand01(&mut rng) * 300.0);
            index.insert(p, i);
            points.push(p);
        }
        assert_eq!(index.len(), 2000);

        for _ in 0..200 {
            let q = DVec2::new(rand01(&mut rng) * 520.0 - 10.0, rand01(&mut rng) * 320.0 - 10.0);
            for k in [1, 2, 7, 50] {
                let expected = brute_force(&points, q, k);
                let got: Vec<_> = index
                    .nearest(q, k)
                    .into_iter()
                    .map(|n| (n.distance_squared, *n.item))
                    .collect();
                assert_eq!(got, expected);
            }
        }
    }

    #[test]
    fn results_are_sorted_ascending() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut index = SpatialIndex::new();
        for i in 0..300 {
            index.insert(DVec2::new(rand01(&mut rng), rand01(&mut rng)), i);
        }
        let found = index.nearest(DVec2::splat(0.5), 40);
        assert_eq!(found.len(), 40);
        assert!(found
            .windows(2)
            .all(|w| w[0].distance_squared <= w[1].distance_squared));
    }

    #[test]
    fn sorted_inserts_stay_shallow() {
        let mut index = SpatialIndex::new();
        for i in 0..1000 {
            index.insert(DVec2::new(i as f64, 0.0), i);
        }
        assert!(index.rebuilds() > 0);
        assert!(index.depth() <= 25, "depth {} too large", index.depth());

        let points: Vec<_> = (0..1000).map(|i| DVec2::new(i as f64, 0.0)).collect();
        let q = DVec2::new(500.2, 3.0);
        let got: Vec<_> = index
            .nearest(q, 5)
            .into_iter()
            .map(|n| (n.distance_squared, *n.item))
            .collect();
        assert_eq!(got, brute_force(&points, q, 5));
    }

    #[test]
    fn duplicate_points_are_all_kept() {
        let mut index = SpatialIndex::new();
        for i in 0..50 {
            index.insert(DVec2::new(1.0, 1.0), i);
        }
        let found = index.nearest(DVec2::new(1.0, 1.0), 50);
        assert_eq!(found.len(), 50);
        let mut items: Vec<_> = found.iter().map(|n| *n.item).collect();
        items.sort();
        assert_eq!(items, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn clear_resets_index() {
        let mut index = SpatialIndex::with_capacity(4);
        index.insert(DVec2::ZERO, 1);
        index.clear();
        assert!(index.is_empty());
        assert!(index.nearest(DVec2::ZERO, 1).is_empty());
        assert_eq!(index.iter().count(), 0);
    }
}
