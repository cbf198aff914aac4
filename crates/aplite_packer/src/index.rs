use std::collections::BTreeMap;

use crate::point::Point;

/// `outer ↦ (inner ↦ [origins])`: the idiomatic-Rust rendering of the
/// original's `std::map<size, std::multimap<size, point>>`. `BTreeMap::range`
/// supplies the `lower_bound` walk the search alternation needs; the `Vec`
/// bucket supplies the multiset semantics (several idle leaves can share the
/// same `(w, h)`).
#[derive(Debug, Default)]
pub struct OrderedIndex(BTreeMap<u32, BTreeMap<u32, Vec<Point>>>);

impl OrderedIndex {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, outer: u32, inner: u32, origin: Point) {
        self.0.entry(outer).or_default().entry(inner).or_default().push(origin);
    }

    /// removes `origin` from the `(outer, inner)` bucket, pruning empty
    /// buckets on the way out so the index never carries dangling keys
    pub fn remove(&mut self, outer: u32, inner: u32, origin: Point) {
        let Some(inner_map) = self.0.get_mut(&outer) else { return };
        let Some(bucket) = inner_map.get_mut(&inner) else { return };
        if let Some(pos) = bucket.iter().position(|&p| p == origin) {
            bucket.swap_remove(pos);
        }
        if bucket.is_empty() {
            inner_map.remove(&inner);
        }
        if inner_map.is_empty() {
            self.0.remove(&outer);
        }
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, outer: u32, inner: u32, origin: Point) -> bool {
        self.0.get(&outer).and_then(|m| m.get(&inner)).is_some_and(|b| b.contains(&origin))
    }
}

/// Cursor over one outer level of an [`OrderedIndex`], used by the
/// alternating search in [`find_fit`]. Walks outer keys one at a time,
/// probing the matching inner level for a fit before advancing.
struct Cursor<'a> {
    outer_keys: std::collections::btree_map::Range<'a, u32, BTreeMap<u32, Vec<Point>>>,
    current: Option<(&'a u32, &'a BTreeMap<u32, Vec<Point>>)>,
}

impl<'a> Cursor<'a> {
    fn new(index: &'a OrderedIndex, min_outer: u32) -> Self {
        let mut outer_keys = index.0.range(min_outer..);
        let current = outer_keys.next();
        Self { outer_keys, current }
    }

    fn probe(&mut self, min_inner: u32) -> Option<Point> {
        self.current.and_then(|(_, inner_map)| inner_map.range(min_inner..).next()).map(|(_, bucket)| bucket[0])
    }

    fn advance(&mut self) -> bool {
        self.current = self.outer_keys.next();
        self.current.is_some()
    }
}

/// The alternating `xy`/`yx` search: probe one side, advance it on a miss,
/// stop on the first hit or once both sides are exhausted.
pub fn find_fit(xy: &OrderedIndex, yx: &OrderedIndex, extent: Point) -> Option<Point> {
    let mut cursor_xy = Cursor::new(xy, extent.x);
    let mut cursor_yx = Cursor::new(yx, extent.y);

    let mut possible_x = cursor_xy.current.is_some();
    let mut possible_y = cursor_yx.current.is_some();

    while possible_x || possible_y {
        if possible_x {
            if let Some(origin) = cursor_xy.probe(extent.y) {
                return Some(origin);
            }
            possible_x = cursor_xy.advance();
        }

        if possible_y {
            if let Some(origin) = cursor_yx.probe(extent.x) {
                return Some(origin);
            }
            possible_y = cursor_yx.advance();
        }
    }

    None
}

#[cfg(test)]
mod index_test {
    use super::*;

    #[test]
    fn insert_then_find_exact() {
        let mut xy = OrderedIndex::new();
        let mut yx = OrderedIndex::new();
        xy.insert(40, 30, Point::new(1, 1));
        yx.insert(30, 40, Point::new(1, 1));

        assert_eq!(find_fit(&xy, &yx, Point::new(40, 30)), Some(Point::new(1, 1)));
    }

    #[test]
    fn find_fit_requires_both_dimensions() {
        let mut xy = OrderedIndex::new();
        let mut yx = OrderedIndex::new();
        // a 100x10 region does not fit a 20x20 request even though width is ample
        xy.insert(100, 10, Point::new(0, 0));
        yx.insert(10, 100, Point::new(0, 0));

        assert_eq!(find_fit(&xy, &yx, Point::new(20, 20)), None);
    }

    #[test]
    fn remove_prunes_empty_buckets() {
        let mut xy = OrderedIndex::new();
        xy.insert(10, 10, Point::new(0, 0));
        xy.remove(10, 10, Point::new(0, 0));
        assert!(xy.is_empty());
    }

    #[test]
    fn multiset_semantics() {
        let mut xy = OrderedIndex::new();
        xy.insert(10, 10, Point::new(0, 0));
        xy.insert(10, 10, Point::new(50, 50));
        xy.remove(10, 10, Point::new(0, 0));
        assert_eq!(xy.0[&10][&10], vec![Point::new(50, 50)]);
    }
}
