use crate::allocator::Allocator2d;
use crate::point::Point;

/// Reacts to an [`Allocator2dChecked`] being dropped, or [`replace`]d, while
/// it still holds outstanding allocations.
///
/// [`replace`]: Allocator2dChecked::replace
pub trait LeakHandler {
    fn on_leak(&mut self, extent: Point, remaining_area: u64);
}

/// Default leak reaction: log to stderr and abort the process, mirroring the
/// unconditional `std::terminate`-on-leak original behavior.
#[derive(Debug, Default, Clone, Copy)]
pub struct AbortOnLeak;

impl LeakHandler for AbortOnLeak {
    fn on_leak(&mut self, extent: Point, remaining_area: u64) {
        eprintln!(
            "aplite_packer: allocator dropped with {} of {} cells still outstanding",
            extent.area() - remaining_area,
            extent.area(),
        );
        std::process::abort();
    }
}

/// Wraps [`Allocator2d`] with a leak check run on drop and on [`replace`],
/// the two points the original's destructor and move-assignment operator
/// both ran the same check.
///
/// [`replace`]: Allocator2dChecked::replace
pub struct Allocator2dChecked<H: LeakHandler = AbortOnLeak> {
    inner: Allocator2d,
    handler: H,
}

impl Allocator2dChecked<AbortOnLeak> {
    pub fn new(canvas: Point) -> Self {
        Self::with_handler(canvas, 0, AbortOnLeak)
    }

    pub fn with_threshold(canvas: Point, fragment_threshold: u64) -> Self {
        Self::with_handler(canvas, fragment_threshold, AbortOnLeak)
    }
}

impl<H: LeakHandler> Allocator2dChecked<H> {
    pub fn with_handler(canvas: Point, fragment_threshold: u64, handler: H) -> Self {
        Self { inner: Allocator2d::with_threshold(canvas, fragment_threshold), handler }
    }

    fn check_leak(&mut self) {
        if self.inner.remaining_area() != self.inner.extent().area() {
            let extent = self.inner.extent();
            let remaining = self.inner.remaining_area();
            self.handler.on_leak(extent, remaining);
        }
    }

    /// the Rust stand-in for move-assignment: runs the leak check on the
    /// current contents before replacing them with `other`
    pub fn replace(&mut self, other: Self) {
        self.check_leak();
        *self = other;
    }
}

impl<H: LeakHandler> std::ops::Deref for Allocator2dChecked<H> {
    type Target = Allocator2d;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<H: LeakHandler> std::ops::DerefMut for Allocator2dChecked<H> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<H: LeakHandler> Drop for Allocator2dChecked<H> {
    fn drop(&mut self) {
        self.check_leak();
    }
}

#[cfg(test)]
mod checked_test {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone)]
    struct CountingHandler(Rc<Cell<u32>>);

    impl LeakHandler for CountingHandler {
        fn on_leak(&mut self, _extent: Point, _remaining_area: u64) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn balanced_allocator_does_not_report_on_drop() {
        let count = Rc::new(Cell::new(0));
        {
            let mut a = Allocator2dChecked::with_handler(Point::new(64, 64), 0, CountingHandler(count.clone()));
            let origin = a.allocate(Point::new(8, 8)).unwrap();
            assert!(a.deallocate(origin));
        }
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn outstanding_allocation_reports_on_drop() {
        let count = Rc::new(Cell::new(0));
        {
            let mut a = Allocator2dChecked::with_handler(Point::new(64, 64), 0, CountingHandler(count.clone()));
            a.allocate(Point::new(8, 8)).unwrap();
        }
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn replace_checks_the_leak_before_overwriting() {
        let count = Rc::new(Cell::new(0));
        let mut a = Allocator2dChecked::with_handler(Point::new(64, 64), 0, CountingHandler(count.clone()));
        a.allocate(Point::new(8, 8)).unwrap();

        let fresh = Allocator2dChecked::with_handler(Point::new(32, 32), 0, CountingHandler(count.clone()));
        a.replace(fresh);
        assert_eq!(count.get(), 1);

        drop(a);
        assert_eq!(count.get(), 1);
    }
}
