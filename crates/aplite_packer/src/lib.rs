mod allocator;
mod checked;
mod index;
mod partition;
mod point;
mod point_map;
mod split_point;

pub use allocator::Allocator2d;
pub use checked::{AbortOnLeak, Allocator2dChecked, LeakHandler};
pub use partition::default_threshold;
pub use point::{point, Point};
