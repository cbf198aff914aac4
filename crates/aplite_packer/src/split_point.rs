use crate::point::Point;

/// Which of the three children spawned by a split a given node is.
///
/// Determined purely from geometry: a child sharing its parent's `x`
/// coordinate sits in the top-left slot, one sharing the parent's `y`
/// coordinate sits in the bottom-right slot, and anything else is the
/// top-right remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRole {
    TopLeft,
    TopRight,
    BottomRight,
}

impl ChildRole {
    #[inline]
    pub fn of(parent_bot_lft: Point, child_bot_lft: Point) -> Self {
        if parent_bot_lft.x == child_bot_lft.x {
            ChildRole::TopLeft
        } else if parent_bot_lft.y == child_bot_lft.y {
            ChildRole::BottomRight
        } else {
            ChildRole::TopRight
        }
    }
}

/// One node of the split tree, keyed in the store by `bot_lft`.
#[derive(Debug, Clone)]
pub struct SplitPoint {
    pub parent: Point,
    pub bot_lft: Point,
    pub top_rit: Point,
    pub split: Point,

    pub used_extent: Point,

    pub idle: bool,
    pub idle_top_lft: bool,
    pub idle_top_rit: bool,
    pub idle_bot_rit: bool,
}

impl SplitPoint {
    pub fn new(parent: Point, bot_lft: Point, top_rit: Point) -> Self {
        Self {
            parent,
            bot_lft,
            top_rit,
            split: top_rit,
            used_extent: Point::default(),
            idle: true,
            idle_top_lft: true,
            idle_top_rit: true,
            idle_bot_rit: true,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.split == self.top_rit
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent == self.bot_lft
    }

    /// true iff every child of this (split) node is idle, i.e. this node is
    /// eligible to merge back into a leaf
    #[inline]
    pub fn is_split_idle(&self) -> bool {
        self.idle_top_lft && self.idle_top_rit && self.idle_bot_rit
    }

    /// clears the idle flag this child corresponds to, on the caller-supplied
    /// parent record
    pub fn mark_child_captured(&self, parent: &mut SplitPoint) {
        match ChildRole::of(parent.bot_lft, self.bot_lft) {
            ChildRole::TopLeft => parent.idle_top_lft = false,
            ChildRole::BottomRight => parent.idle_bot_rit = false,
            ChildRole::TopRight => parent.idle_top_rit = false,
        }
    }

    /// sets the idle flag this child corresponds to, on the caller-supplied
    /// parent record
    pub fn mark_child_idle(&self, parent: &mut SplitPoint) {
        match ChildRole::of(parent.bot_lft, self.bot_lft) {
            ChildRole::TopLeft => parent.idle_top_lft = true,
            ChildRole::BottomRight => parent.idle_bot_rit = true,
            ChildRole::TopRight => parent.idle_top_rit = true,
        }
    }

    /// the up-to-three children a split at `split = bot_lft + used_extent`
    /// produces, in bottom-right / top-right / top-left order, skipping any
    /// whose area would be zero
    pub fn children(&self) -> impl Iterator<Item = (Point, Point)> {
        let bot_lft = self.bot_lft;
        let top_rit = self.top_rit;
        let split = self.split;

        let bot_rit = (Point::new(split.x, bot_lft.y), Point::new(top_rit.x, split.y));
        let top_rit_child = (split, top_rit);
        let top_lft = (Point::new(bot_lft.x, split.y), Point::new(split.x, top_rit.y));

        [bot_rit, top_rit_child, top_lft]
            .into_iter()
            .filter(|&(src, dst)| (dst - src).area() > 0)
    }
}

#[cfg(test)]
mod split_point_test {
    use super::*;

    #[test]
    fn leaf_and_root_flags() {
        let root = SplitPoint::new(Point::new(0, 0), Point::new(0, 0), Point::new(100, 100));
        assert!(root.is_leaf());
        assert!(root.is_root());
    }

    #[test]
    fn children_skip_zero_area() {
        // a split exactly filling the node's width leaves no bottom-right child
        let mut node = SplitPoint::new(Point::new(0, 0), Point::new(0, 0), Point::new(40, 100));
        node.split = Point::new(40, 30);
        let children: Vec<_> = node.children().collect();
        // bottom-right: (40,0)-(40,30) zero-area, skipped
        // top-right: (40,30)-(40,100) zero-area, skipped
        // top-left: (0,30)-(40,100) real
        assert_eq!(children.len(), 1);
        assert_eq!(children[0], (Point::new(0, 30), Point::new(40, 100)));
    }

    #[test]
    fn child_role_geometry() {
        let parent = Point::new(10, 10);
        assert_eq!(ChildRole::of(parent, Point::new(10, 40)), ChildRole::TopLeft);
        assert_eq!(ChildRole::of(parent, Point::new(40, 10)), ChildRole::BottomRight);
        assert_eq!(ChildRole::of(parent, Point::new(40, 40)), ChildRole::TopRight);
    }
}
