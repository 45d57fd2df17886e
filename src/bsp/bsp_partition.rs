// src/bsp/bsp_partition.rs

use crate::bsp::bsp_node::Leaf;
use crate::bsp::PARTITION_GUARD;
use crate::utils::{DungeonRng, RectI};
use log::{debug, warn};

/// Recursively splits the map bounds until enough leaves exist to host the
/// requested rooms.
#[derive(Debug, Clone)]
pub struct SpacePartitioner {
    pub min_leaf_size: i32,
    pub target_leaves: usize,
    pub guard: usize,
}

impl SpacePartitioner {
    pub fn new(min_leaf_size: i32, target_leaves: usize) -> Self {
        SpacePartitioner {
            min_leaf_size,
            target_leaves,
            guard: PARTITION_GUARD,
        }
    }

    pub fn with_guard(mut self, guard: usize) -> Self {
        self.guard = guard;
        self
    }

    /// Builds the partition tree. Always splits the largest splittable leaf
    /// next (first in pre-order on ties).
    pub fn partition(&self, bounds: RectI, rng: &mut DungeonRng) -> Leaf {
        let mut root = Leaf::new(bounds);
        let mut leaf_count = 1;
        let mut iterations = 0;

        while leaf_count < self.target_leaves {
            if iterations >= self.guard {
                warn!("Partition guard hit after {} iterations", iterations);
                break;
            }
            iterations += 1;

            let path = match self.largest_splittable(&root) {
                Some(path) => path,
                None => break,
            };
            let node = match node_at_mut(&mut root, &path) {
                Some(node) => node,
                None => break,
            };
            if node.split(rng, self.min_leaf_size) {
                leaf_count += 1;
            } else {
                break;
            }
        }

        debug!(
            "Partitioned {:?} into {} leaves (target {}, depth {})",
            bounds,
            leaf_count,
            self.target_leaves,
            root.depth()
        );
        root
    }

    /// Path (false = left, true = right) to the largest splittable leaf.
    fn largest_splittable(&self, root: &Leaf) -> Option<Vec<bool>> {
        let mut best: Option<(i64, Vec<bool>)> = None;
        let mut path = Vec::new();
        self.search(root, &mut path, &mut best);
        best.map(|(_, p)| p)
    }

    fn search(&self, node: &Leaf, path: &mut Vec<bool>, best: &mut Option<(i64, Vec<bool>)>) {
        if node.is_leaf() {
            if node.is_splittable(self.min_leaf_size) {
                let area = node.bounds.area();
                if best.as_ref().map_or(true, |(a, _)| area > *a) {
                    *best = Some((area, path.clone()));
                }
            }
            return;
        }
        if let Some(left) = &node.left {
            path.push(false);
            self.search(left, path, best);
            path.pop();
        }
        if let Some(right) = &node.right {
            path.push(true);
            self.search(right, path, best);
            path.pop();
        }
    }
}

fn node_at_mut<'a>(root: &'a mut Leaf, path: &[bool]) -> Option<&'a mut Leaf> {
    let mut node = root;
    for &go_right in path {
        node = if go_right {
            node.right.as_deref_mut()?
        } else {
            node.left.as_deref_mut()?
        };
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaves_tile_the_root() {
        let mut rng = DungeonRng::from_seed(54321);
        let bounds = RectI::centered(140, 140);
        let root = SpacePartitioner::new(36, 8).partition(bounds, &mut rng);
        let leaves = root.leaves();

        assert!(!leaves.is_empty() && leaves.len() <= 8);
        let total: i64 = leaves.iter().map(|l| l.bounds.area()).sum();
        assert_eq!(total, bounds.area());
        for (i, a) in leaves.iter().enumerate() {
            assert!(bounds.contains_rect(&a.bounds));
            assert!(a.bounds.width >= 36 && a.bounds.height >= 36);
            for b in leaves.iter().skip(i + 1) {
                assert!(!a.bounds.intersects(&b.bounds));
            }
        }
        if leaves.len() < 8 {
            assert!(leaves.iter().all(|l| !l.is_splittable(36)));
        }
    }

    #[test]
    fn test_unsplittable_root_stays_single() {
        let mut rng = DungeonRng::from_seed(1);
        let root = SpacePartitioner::new(20, 8).partition(RectI::new(0, 0, 30, 30), &mut rng);
        assert!(root.is_leaf());
        assert_eq!(root.leaf_count(), 1);
    }

    #[test]
    fn test_guard_limits_splits() {
        let mut rng = DungeonRng::from_seed(9);
        let root = SpacePartitioner::new(4, 64)
            .with_guard(3)
            .partition(RectI::new(0, 0, 100, 100), &mut rng);
        assert_eq!(root.leaf_count(), 4);
    }

    #[test]
    fn test_partition_is_deterministic() {
        let p = SpacePartitioner::new(12, 10);
        let bounds = RectI::new(0, 0, 96, 64);
        let a = p.partition(bounds, &mut DungeonRng::from_seed(3));
        let b = p.partition(bounds, &mut DungeonRng::from_seed(3));
        let la: Vec<RectI> = a.leaves().iter().map(|l| l.bounds).collect();
        let lb: Vec<RectI> = b.leaves().iter().map(|l| l.bounds).collect();
        assert_eq!(la, lb);
    }
}
