use crate::partition::{default_threshold, Partition};
use crate::point::Point;
use crate::point_map::PointMap;
use crate::split_point::SplitPoint;

/// A fixed-canvas 2D rectangular region allocator.
///
/// Services `allocate`/`deallocate` requests for axis-aligned sub-rectangles
/// by walking a split tree (the `store`) co-indexed by a fragment and a large
/// partition of idle leaves.
///
/// Not `Clone`/`Copy` on purpose: two allocators silently sharing the same
/// split tree would alias it.
pub struct Allocator2d {
    extent: Point,
    remaining_area: u64,
    fragment_threshold: u64,
    store: PointMap<SplitPoint>,
    frag: Partition,
    large: Partition,
}

impl Allocator2d {
    /// a new allocator over `canvas`, with the fragment threshold computed
    /// from `canvas` per [`default_threshold`]
    pub fn new(canvas: Point) -> Self {
        Self::with_threshold(canvas, 0)
    }

    /// `fragment_threshold = 0` selects the auto formula; any positive value
    /// is accepted verbatim and is immutable for the allocator's lifetime
    pub fn with_threshold(canvas: Point, fragment_threshold: u64) -> Self {
        let fragment_threshold = if fragment_threshold == 0 {
            default_threshold(canvas)
        } else {
            fragment_threshold
        };

        let mut this = Self {
            extent: canvas,
            remaining_area: canvas.area(),
            fragment_threshold,
            store: PointMap::new(),
            frag: Partition::new(),
            large: Partition::new(),
        };

        let root = Point::default();
        this.insert_into_partition(root, canvas);
        this.store.insert(root, SplitPoint::new(root, root, canvas));
        this
    }

    #[inline]
    pub fn extent(&self) -> Point {
        self.extent
    }

    #[inline]
    pub fn remaining_area(&self) -> u64 {
        self.remaining_area
    }

    #[inline]
    fn is_fragment(&self, size: Point) -> bool {
        size.area() <= self.fragment_threshold
    }

    fn insert_into_partition(&mut self, origin: Point, size: Point) {
        if self.is_fragment(size) {
            self.frag.insert(origin, size);
        } else {
            self.large.insert(origin, size);
        }
    }

    fn remove_from_partition(&mut self, origin: Point, size: Point) {
        if self.is_fragment(size) {
            self.frag.remove(origin, size);
        } else {
            self.large.remove(origin, size);
        }
    }

    /// fragments are searched before large regions
    fn find_candidate(&self, extent: Point) -> Option<Point> {
        self.frag.find_fit(extent).or_else(|| self.large.find_fit(extent))
    }

    /// Places `extent` on the canvas, returning its origin, or `None` if the
    /// request is infeasible (zero-area, oversized, out of remaining area, or
    /// no placement exists). Never partially applied: a failed call leaves
    /// every index and `remaining_area` untouched.
    pub fn allocate(&mut self, extent: Point) -> Option<Point> {
        if extent.area() == 0 {
            return None;
        }
        if extent.beyond(self.extent) {
            return None;
        }
        if self.remaining_area < extent.area() {
            return None;
        }

        let origin = self.find_candidate(extent)?;
        self.commit(origin, extent);
        self.remaining_area -= extent.area();
        Some(origin)
    }

    fn commit(&mut self, origin: Point, extent: Point) {
        let (bot_lft, top_rit, was_leaf) = {
            let node = self.store.get(&origin).expect("allocate: index pointed at a missing split-point");
            debug_assert!(node.idle, "allocate: index pointed at a non-idle node");
            (node.bot_lft, node.top_rit, node.is_leaf())
        };

        if was_leaf {
            self.remove_from_partition(bot_lft, top_rit - bot_lft);

            let split = bot_lft + extent;
            let mut probe = SplitPoint::new(bot_lft, bot_lft, top_rit);
            probe.split = split;
            let children: Vec<(Point, Point)> = probe.children().collect();

            for (src, dst) in children {
                self.insert_into_partition(src, dst - src);
                self.store.insert(src, SplitPoint::new(bot_lft, src, dst));
            }

            let node = self.store.get_mut(&origin).unwrap();
            node.split = split;
            node.used_extent = extent;
        } else {
            // a previously allocated node that was freed but whose layout is
            // still partially occupied by its own (still-split) children:
            // remove its currently-idle `[bot_lft, split)` slot but don't
            // re-split it.
            let split = self.store[&origin].split;
            self.remove_from_partition(bot_lft, split - bot_lft);
            self.store.get_mut(&origin).unwrap().used_extent = extent;
        }

        self.mark_captured(origin);
    }

    /// walks from `origin` to the root, clearing the child-idle flag each
    /// ancestor holds for the node directly below it on the path
    fn mark_captured(&mut self, origin: Point) {
        self.store.get_mut(&origin).unwrap().idle = false;

        let mut cur = origin;
        while !self.store[&cur].is_root() {
            let child = self.store[&cur].clone();
            let parent = child.parent;
            child.mark_child_captured(self.store.get_mut(&parent).unwrap());
            cur = parent;
        }
    }

    /// Frees the block at `origin`. Returns `false` (a non-fatal caller
    /// error) if `origin` is not a currently-tracked allocation.
    pub fn deallocate(&mut self, origin: Point) -> bool {
        let Some(used_extent) = self.store.get(&origin).map(|n| n.used_extent) else {
            return false;
        };
        self.remaining_area += used_extent.area();

        {
            let node = self.store.get_mut(&origin).unwrap();
            node.idle = true;
            node.used_extent = Point::default();
        }

        let reindex_origin = self.mark_idle(origin);
        let reindex_size = self.store[&reindex_origin].split - reindex_origin;
        self.insert_into_partition(reindex_origin, reindex_size);
        true
    }

    /// walks upward merging idle nodes into their parent until a node that
    /// cannot merge (or the root) is reached; returns the origin whose
    /// rectangle should be reindexed as newly idle
    fn mark_idle(&mut self, origin: Point) -> Point {
        let mut p = origin;
        let mut last = origin;

        while self.try_merge(p) {
            let parent = self.store[&p].parent;
            last = p;
            p = parent;
        }

        if self.store[&p].is_leaf() {
            p
        } else {
            last
        }
    }

    /// merges `p` into a leaf iff it is idle and all three children are
    /// idle. Returns whether the walk should continue into `p`'s parent
    /// (i.e. the merge happened and `p` is not the root).
    fn try_merge(&mut self, p: Point) -> bool {
        let (idle, split_idle, bot_lft, top_rit, split, is_root) = {
            let node = &self.store[&p];
            (node.idle, node.is_split_idle(), node.bot_lft, node.top_rit, node.split, node.is_root())
        };
        if !(idle && split_idle) {
            return false;
        }

        let mut probe = SplitPoint::new(bot_lft, bot_lft, top_rit);
        probe.split = split;
        let children: Vec<(Point, Point)> = probe.children().collect();
        for (src, dst) in children {
            self.store.remove(&src);
            self.remove_from_partition(src, dst - src);
        }

        // erase self from whichever partition currently holds it; harmless
        // no-op if this node was never indexed (e.g. it's the leaf the
        // caller just freed, not yet reindexed)
        self.remove_from_partition(bot_lft, split - bot_lft);
        self.store.get_mut(&p).unwrap().split = top_rit;

        if is_root {
            return false;
        }

        let child = self.store[&p].clone();
        let parent = child.parent;
        child.mark_child_idle(self.store.get_mut(&parent).unwrap());

        true
    }
}
