//! Synthetic segment generators for tests, benchmarks and the `visualize`
//! demo. Not part of the geometric core; reuses this crate's earlier
//! f32/unit-square generator shape, lifted to `f64` [`Segment`]s.

use rand::Rng;

use crate::point::Point;
use crate::segment::Segment;

pub trait LineGenerator {
    fn line(rng: &mut impl Rng) -> Segment;
}

fn random_unit_point(rng: &mut impl Rng) -> Point {
    Point::new(rng.gen::<f64>(), rng.gen::<f64>())
}

fn random_point_in_circle(center: Point, radius: f64, rng: &mut impl Rng) -> Point {
    let r = rng.gen_range(0f64..radius.max(f64::MIN_POSITIVE));
    let theta = rng.gen_range(0f64..2f64 * std::f64::consts::PI);
    Point::new(center.x + r * theta.cos(), center.y + r * theta.sin())
}

/// Endpoints drawn uniformly from the unit square, independent of each other.
pub struct RandomUnitSquare;

/// One endpoint drawn from the unit square, the other within a short random
/// radius of it — produces mostly-local, mostly-non-crossing segments.
pub struct ShortLines;

impl LineGenerator for RandomUnitSquare {
    fn line(rng: &mut impl Rng) -> Segment {
        Segment::new(random_unit_point(rng), random_unit_point(rng))
    }
}

impl LineGenerator for ShortLines {
    fn line(rng: &mut impl Rng) -> Segment {
        let start = random_unit_point(rng);
        let length = rng.gen_range(0f64..0.25);
        let end = random_point_in_circle(start, length, rng);
        Segment::new(start, end)
    }
}

/// Generates `n` segments via `G`, skipping any that happen to be empty
/// (coincident endpoints), which no entry point in this crate accepts.
pub fn generate_lines<G: LineGenerator>(n: usize, rng: &mut impl Rng) -> Vec<Segment> {
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let line = G::line(rng);
        if !line.is_empty() {
            out.push(line);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_lines_are_never_empty() {
        let mut rng = rand::thread_rng();
        for line in generate_lines::<ShortLines>(200, &mut rng) {
            assert!(!line.is_empty());
        }
    }
}
