// src/bsp/bsp_node.rs

use crate::bsp::SPLIT_RATIO;
use crate::utils::{DungeonRng, RectI};

/// Node of the space-partition tree. A leaf has no children.
#[derive(Debug, Clone)]
pub struct Leaf {
    pub bounds: RectI,
    pub left: Option<Box<Leaf>>,
    pub right: Option<Box<Leaf>>,
}

/// Which way a leaf gets cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitAxis {
    /// Cut across the height: children stacked bottom/top.
    Horizontal,
    /// Cut across the width: children side by side.
    Vertical,
}

impl Leaf {
    /// Create a leaf with no children.
    pub fn new(bounds: RectI) -> Self {
        Leaf {
            bounds,
            left: None,
            right: None,
        }
    }

    /// Returns `true` if `self` has no children.
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// A leaf is splittable when either side can hold two `min_leaf` halves.
    pub fn is_splittable(&self, min_leaf: i32) -> bool {
        self.is_leaf() && (self.bounds.width >= min_leaf * 2 || self.bounds.height >= min_leaf * 2)
    }

    /// Picks the axis that keeps the halves closest to square. If only one axis
    /// is large enough it is forced.
    pub fn choose_axis(&self, rng: &mut DungeonRng, min_leaf: i32) -> Option<SplitAxis> {
        let w = self.bounds.width;
        let h = self.bounds.height;
        let can_vertical = w >= min_leaf * 2;
        let can_horizontal = h >= min_leaf * 2;

        match (can_vertical, can_horizontal) {
            (false, false) => None,
            (true, false) => Some(SplitAxis::Vertical),
            (false, true) => Some(SplitAxis::Horizontal),
            (true, true) => {
                let (wf, hf) = (w as f64, h as f64);
                if wf / hf >= SPLIT_RATIO {
                    Some(SplitAxis::Vertical)
                } else if hf / wf >= SPLIT_RATIO {
                    Some(SplitAxis::Horizontal)
                } else if rng.coin_flip() {
                    Some(SplitAxis::Horizontal)
                } else {
                    Some(SplitAxis::Vertical)
                }
            }
        }
    }

    /// Split this leaf in two. Returns `false` if it already has children or is
    /// too small on both axes.
    pub fn split(&mut self, rng: &mut DungeonRng, min_leaf: i32) -> bool {
        if !self.is_leaf() {
            return false;
        }
        let axis = match self.choose_axis(rng, min_leaf) {
            Some(axis) => axis,
            None => return false,
        };

        let b = self.bounds;
        let (first, second) = match axis {
            SplitAxis::Horizontal => {
                let s = rng.range_inclusive(min_leaf, b.height - min_leaf);
                (
                    RectI::new(b.x, b.y, b.width, s),
                    RectI::new(b.x, b.y + s, b.width, b.height - s),
                )
            }
            SplitAxis::Vertical => {
                let s = rng.range_inclusive(min_leaf, b.width - min_leaf);
                (
                    RectI::new(b.x, b.y, s, b.height),
                    RectI::new(b.x + s, b.y, b.width - s, b.height),
                )
            }
        };

        self.left = Some(Box::new(Leaf::new(first)));
        self.right = Some(Box::new(Leaf::new(second)));
        true
    }

    /// Terminal nodes in pre-order, left first.
    pub fn leaves(&self) -> Vec<&Leaf> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Leaf>) {
        if self.is_leaf() {
            out.push(self);
            return;
        }
        if let Some(left) = &self.left {
            left.collect_leaves(out);
        }
        if let Some(right) = &self.right {
            right.collect_leaves(out);
        }
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            return 1;
        }
        self.left.as_ref().map_or(0, |l| l.leaf_count()) + self.right.as_ref().map_or(0, |r| r.leaf_count())
    }

    pub fn depth(&self) -> usize {
        let l = self.left.as_ref().map_or(0, |l| l.depth());
        let r = self.right.as_ref().map_or(0, |r| r.depth());
        1 + l.max(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_area_and_min_size() {
        let mut rng = DungeonRng::from_seed(7);
        let mut leaf = Leaf::new(RectI::new(0, 0, 100, 40));
        assert!(leaf.split(&mut rng, 14));
        let l = leaf.left.as_ref().unwrap().bounds;
        let r = leaf.right.as_ref().unwrap().bounds;
        assert_eq!(l.area() + r.area(), 4000);
        // 100/40 >= 1.25 so the width is cut
        assert_eq!(l.height, 40);
        assert!(l.width >= 14 && r.width >= 14);
        assert!(!leaf.is_leaf());
        assert!(!leaf.split(&mut rng, 14));
    }

    #[test]
    fn test_forced_axis_when_other_is_too_small() {
        let mut rng = DungeonRng::from_seed(1);
        // Square-ish, but only the height can fit two halves.
        let leaf = Leaf::new(RectI::new(0, 0, 30, 32));
        for _ in 0..20 {
            assert_eq!(leaf.choose_axis(&mut rng, 16), Some(SplitAxis::Horizontal));
        }
        let tiny = Leaf::new(RectI::new(0, 0, 20, 20));
        assert_eq!(tiny.choose_axis(&mut rng, 16), None);
    }

    #[test]
    fn test_leaves_pre_order() {
        let mut rng = DungeonRng::from_seed(3);
        let mut root = Leaf::new(RectI::new(0, 0, 64, 64));
        assert!(root.split(&mut rng, 16));
        assert_eq!(root.leaf_count(), 2);
        assert_eq!(root.depth(), 2);
        let leaves = root.leaves();
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].bounds.x, 0);
        assert_eq!(leaves[0].bounds.y, 0);
    }
}
