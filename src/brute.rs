//! The brute-force O(n^2) intersector, used both as the reference
//! implementation for equivalence testing (§8) and directly by callers for
//! small inputs, plus the segment splitter (C7, §4.7).

use crate::error::{GeometryError, Result};
use crate::multi_point::MultiLinePoint;
use crate::order::{compare_epsilon, compare_exact};
use crate::ordered_map::OrderedMap;
use crate::pair::pair_find_eps;
use crate::point::Point;
use crate::segment::Segment;

/// All pairwise intersections among `lines`, using only the unconditional
/// floor tolerance.
pub fn find_simple(lines: &[Segment]) -> Result<Vec<MultiLinePoint>> {
    validate_segments(lines)?;
    Ok(find_simple_inner(lines, None))
}

/// Same as [`find_simple`], but merges crossing points within `eps` of each
/// other. `eps` must be strictly positive.
pub fn find_simple_eps(lines: &[Segment], eps: f64) -> Result<Vec<MultiLinePoint>> {
    if !(eps > 0.0) {
        return Err(GeometryError::InvalidEpsilon { epsilon: eps });
    }
    validate_segments(lines)?;
    Ok(find_simple_inner(lines, Some(eps)))
}

fn validate_segments(lines: &[Segment]) -> Result<()> {
    for (index, line) in lines.iter().enumerate() {
        if line.is_empty() {
            return Err(GeometryError::EmptySegment { index });
        }
    }
    Ok(())
}

fn find_simple_inner(lines: &[Segment], eps: Option<f64>) -> Vec<MultiLinePoint> {
    let mut schedule: OrderedMap<Point, MultiLinePoint> = OrderedMap::new();

    for i in 0..lines.len() {
        for j in (i + 1)..lines.len() {
            let r = pair_find_eps(lines[i].start, lines[i].end, lines[j].start, lines[j].end, eps);
            let Some(shared) = r.shared else { continue };
            if !(r.first.is_contained() && r.second.is_contained()) {
                continue;
            }

            let (id, inserted) = schedule.try_add(shared, MultiLinePoint::new(shared), |a, b| {
                point_cmp(*a, *b, eps)
            });
            if !inserted {
                debug_assert!(schedule.key(id).eq_exact(shared) || eps.is_some());
            }
            let event = schedule.value_mut(id);
            event.try_add_line(i, r.first);
            event.try_add_line(j, r.second);
        }
    }

    let mut out = Vec::with_capacity(schedule.len());
    let mut cur = schedule.first();
    while let Some(id) = cur {
        out.push(schedule.value(id).clone());
        cur = schedule.successor(id);
    }
    out
}

fn point_cmp(a: Point, b: Point, eps: Option<f64>) -> std::cmp::Ordering {
    match eps {
        Some(e) => compare_epsilon(a, b, e),
        None => compare_exact(a, b),
    }
}

/// Cuts `lines` at every crossing reported against them, producing the
/// maximal set of non-crossing sub-segments (§4.7).
///
/// `crossings` would typically be the output of [`find_simple`] or
/// [`crate::find`] run over the same `lines`.
pub fn split(lines: &[Segment], crossings: &[MultiLinePoint]) -> Result<Vec<Segment>> {
    for crossing in crossings {
        for &index in &crossing.lines {
            if index >= lines.len() {
                return Err(GeometryError::IndexOutOfRange { index, len: lines.len() });
            }
        }
    }

    let mut per_segment: Vec<Vec<(Point, crate::location::LineLocation)>> = vec![Vec::new(); lines.len()];
    for crossing in crossings {
        for (&index, &location) in crossing.lines.iter().zip(crossing.locations.iter()) {
            per_segment[index].push((crossing.shared, location));
        }
    }

    let mut out = Vec::new();
    for (index, hits) in per_segment.into_iter().enumerate() {
        let segment = lines[index];
        if hits.is_empty() {
            out.push(segment);
            continue;
        }

        let mut new_start = segment.start;
        let mut new_end = segment.end;
        let mut interior = Vec::new();
        for (point, location) in hits {
            use crate::location::LineLocation::*;
            match location {
                Start => new_start = point,
                End => new_end = point,
                Between => interior.push(point),
                _ => {}
            }
        }

        interior.sort_by(|a, b| {
            (*a - new_start)
                .length_sq()
                .partial_cmp(&(*b - new_start).length_sq())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut prev = new_start;
        for point in interior {
            if !prev.eq_exact(point) {
                out.push(Segment::new(prev, point));
            }
            prev = point;
        }
        if !prev.eq_exact(new_end) {
            out.push(Segment::new(prev, new_end));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LineLocation;

    #[test]
    fn crossing_segments_produce_one_point() {
        let lines = [
            Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
            Segment::new(Point::new(5.0, -5.0), Point::new(5.0, 5.0)),
        ];
        let found = find_simple(&lines).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].shared, Point::new(5.0, 0.0));
        assert_eq!(found[0].lines.len(), 2);
    }

    #[test]
    fn disjoint_segments_report_nothing() {
        let lines = [
            Segment::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0)),
            Segment::new(Point::new(0.0, 5.0), Point::new(1.0, 5.0)),
        ];
        assert!(find_simple(&lines).unwrap().is_empty());
    }

    #[test]
    fn empty_segment_is_rejected() {
        let lines = [Segment::new(Point::new(1.0, 1.0), Point::new(1.0, 1.0))];
        assert_eq!(
            find_simple(&lines).unwrap_err(),
            GeometryError::EmptySegment { index: 0 }
        );
    }

    #[test]
    fn non_positive_epsilon_is_rejected() {
        let lines = [Segment::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0))];
        assert_eq!(
            find_simple_eps(&lines, 0.0).unwrap_err(),
            GeometryError::InvalidEpsilon { epsilon: 0.0 }
        );
    }

    #[test]
    fn split_cuts_segment_at_interior_crossing() {
        let lines = [
            Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
            Segment::new(Point::new(5.0, -5.0), Point::new(5.0, 5.0)),
        ];
        let crossings = find_simple(&lines).unwrap();
        let pieces = split(&lines, &crossings).unwrap();
        assert_eq!(pieces.len(), 3);
        assert!(pieces.contains(&Segment::new(Point::new(0.0, 0.0), Point::new(5.0, 0.0))));
        assert!(pieces.contains(&Segment::new(Point::new(5.0, 0.0), Point::new(10.0, 0.0))));
    }

    #[test]
    fn split_rejects_out_of_range_index() {
        let lines = [Segment::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0))];
        let bogus = MultiLinePoint {
            shared: Point::new(0.5, 0.0),
            lines: vec![0, 5],
            locations: vec![LineLocation::Between, LineLocation::Between],
        };
        assert_eq!(
            split(&lines, &[bogus]).unwrap_err(),
            GeometryError::IndexOutOfRange { index: 5, len: 1 }
        );
    }
}
