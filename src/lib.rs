//! Segment-segment intersection over `f64` coordinates: a pairwise test
//! (C5), a brute-force all-pairs intersector with a splitter (C7), and a
//! Bentley-Ottmann sweep-line engine (C6) for the same query in
//! `O((n+k) log n)`.
//!
//! ```
//! use line_intersectors::{find_simple, Segment, Point};
//!
//! let lines = [
//!     Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
//!     Segment::new(Point::new(5.0, -5.0), Point::new(5.0, 5.0)),
//! ];
//! let crossings = find_simple(&lines).unwrap();
//! assert_eq!(crossings.len(), 1);
//! assert_eq!(crossings[0].shared, Point::new(5.0, 0.0));
//! ```

mod brute;
mod error;
pub mod gen;
mod location;
mod multi_point;
mod normalize;
mod order;
mod ordered_map;
mod pair;
mod point;
mod segment;
mod sweep;

pub use brute::{find_simple, find_simple_eps, split};
pub use error::{GeometryError, Result};
pub use location::{LineLocation, LineRelation};
pub use multi_point::MultiLinePoint;
pub use order::{compare_epsilon, compare_exact};
pub use pair::{pair_find, pair_find_eps, PairResult};
pub use point::{cross, Point};
pub use segment::{locate_collinear, Segment};
pub use sweep::find;
