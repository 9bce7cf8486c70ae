//! The Bentley-Ottmann sweep-line engine (C6, §4.6): O((n+k) log n)
//! multi-segment intersection.
//!
//! The sweep proceeds top-to-bottom, left-to-right over the lexicographic
//! order of §4.2 (`y` then `x`). Two ordered structures drive it: the
//! `Schedule`, a map from point to the set of lines touching it there, and
//! the `SweepLine`, the set of lines currently crossing the sweep, ordered
//! by their position at the cursor's `y` and, failing that, by slope.
//!
//! The `SweepLine`'s ordering depends on the live `position`/`slope` tables
//! below, which is exactly the case [`crate::ordered_map::OrderedMap`] was
//! built for: a `BTreeSet` could not re-derive its order as those tables
//! change between events.

use log::{debug, trace};
use std::collections::HashSet;

use crate::error::{GeometryError, Result};
use crate::location::{LineLocation, LineRelation};
use crate::multi_point::MultiLinePoint;
use crate::normalize::normalize;
use crate::order::{compare_exact, less_exact};
use crate::ordered_map::{NodeId, OrderedMap};
use crate::pair::pair_find;
use crate::point::Point;
use crate::segment::Segment;

/// All crossing points among `lines`, computed with the sweep-line engine.
pub fn find(lines: &[Segment]) -> Result<Vec<MultiLinePoint>> {
    if lines.is_empty() {
        return Ok(Vec::new());
    }
    let mut engine = Engine::new(lines)?;
    engine.run()
}

struct Engine<'a> {
    segments: &'a [Segment],
    sweep_start: Vec<Point>,
    sweep_end: Vec<Point>,
    flipped: Vec<bool>,
    slope: Vec<f64>,
    position: Vec<f64>,
    cursor: Point,
    schedule: OrderedMap<Point, MultiLinePoint>,
    sweep_line: OrderedMap<usize, ()>,
    output: Vec<MultiLinePoint>,
}

impl<'a> Engine<'a> {
    fn new(segments: &'a [Segment]) -> Result<Self> {
        let n = segments.len();
        let mut engine = Engine {
            segments,
            sweep_start: vec![Point::default(); n],
            sweep_end: vec![Point::default(); n],
            flipped: vec![false; n],
            slope: vec![0.0; n],
            position: vec![0.0; n],
            cursor: Point::default(),
            schedule: OrderedMap::new(),
            sweep_line: OrderedMap::new(),
            output: Vec::new(),
        };

        for (index, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                return Err(GeometryError::EmptySegment { index });
            }
            let flip = less_exact(segment.end, segment.start);
            let (start, end) = if flip { (segment.end, segment.start) } else { (segment.start, segment.end) };
            engine.flipped[index] = flip;
            engine.sweep_start[index] = start;
            engine.sweep_end[index] = end;
            engine.slope[index] = if end.y - start.y == 0.0 {
                f64::INFINITY
            } else {
                (end.x - start.x) / (end.y - start.y)
            };
            engine.schedule_add(start, index, LineLocation::Start);
            engine.schedule_add(end, index, LineLocation::End);
        }

        Ok(engine)
    }

    fn schedule_add(&mut self, point: Point, line: usize, location: LineLocation) {
        let (id, _) = self
            .schedule
            .try_add(point, MultiLinePoint::new(point), |a, b| compare_exact(*a, *b));
        self.schedule.value_mut(id).try_add_line(line, location);
    }

    fn sweep_try_add(&mut self, idx: usize) -> (NodeId, bool) {
        let position = &self.position;
        let slope = &self.slope;
        self.sweep_line
            .try_add(idx, (), |a, b| compare_lines(position, slope, *a, *b))
    }

    fn sweep_get(&self, idx: usize) -> Option<NodeId> {
        let position = &self.position;
        let slope = &self.slope;
        self.sweep_line.get(&idx, |a, b| compare_lines(position, slope, *a, *b))
    }

    fn active_line_indices(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.sweep_line.len());
        let mut cur = self.sweep_line.first();
        while let Some(id) = cur {
            out.push(*self.sweep_line.key(id));
            cur = self.sweep_line.successor(id);
        }
        out
    }

    fn run(&mut self) -> Result<Vec<MultiLinePoint>> {
        while let Some(id) = self.schedule.first() {
            let (point, event) = self.schedule.remove(id);
            self.process_event(point, event)?;
        }
        if !self.sweep_line.is_empty() {
            return Err(GeometryError::SearchStructureCorrupted(
                "sweep line non-empty at termination".into(),
            ));
        }
        Ok(std::mem::take(&mut self.output))
    }

    fn process_event(&mut self, point: Point, mut event: MultiLinePoint) -> Result<()> {
        trace!("event at ({}, {}) with {} line(s)", point.x, point.y, event.lines.len());
        self.cursor = point;

        let removing: Vec<usize> = event
            .lines
            .iter()
            .zip(event.locations.iter())
            .filter(|(_, loc)| matches!(loc, LineLocation::End | LineLocation::Between))
            .map(|(&line, _)| line)
            .collect();

        let mut removed_handles = Vec::with_capacity(removing.len());
        for &line in &removing {
            let handle = self.sweep_get(line).ok_or_else(|| {
                GeometryError::SearchStructureCorrupted(format!(
                    "line {line} expected on sweep line at ({}, {})",
                    point.x, point.y
                ))
            })?;
            removed_handles.push(handle);
        }
        let (outer_left, outer_right) = self.outer_neighbors(&removed_handles);
        for handle in removed_handles {
            self.sweep_line.remove(handle);
        }

        let adding: Vec<usize> = event
            .lines
            .iter()
            .zip(event.locations.iter())
            .filter(|(_, loc)| matches!(loc, LineLocation::Start | LineLocation::Between))
            .map(|(&line, _)| line)
            .collect();

        if adding.is_empty() {
            if let (Some(left), Some(right)) = (outer_left, outer_right) {
                let left_line = *self.sweep_line.key(left);
                let right_line = *self.sweep_line.key(right);
                self.test_crossing(left_line, right_line, &mut event)?;
            }
        } else {
            for idx in self.active_line_indices() {
                if !self.slope[idx].is_infinite() {
                    self.position[idx] = self.slope[idx] * (self.cursor.y - self.sweep_start[idx].y)
                        + self.sweep_start[idx].x;
                }
            }

            let mut inserted_handles = Vec::with_capacity(adding.len());
            for &idx in &adding {
                self.position[idx] = self.cursor.x;
                let (handle, _) = self.sweep_try_add(idx);
                inserted_handles.push(handle);
            }

            let (left_pair, right_pair) = self.outer_pairs(&inserted_handles);
            if let Some((outside, inside)) = left_pair {
                self.test_crossing(outside, inside, &mut event)?;
            }
            if let Some((inside, outside)) = right_pair {
                self.test_crossing(inside, outside, &mut event)?;
            }
        }

        self.maybe_emit(event);
        Ok(())
    }

    /// The immediate surviving (non-removed) predecessor/successor of the
    /// block of nodes about to be removed, computed before removal.
    fn outer_neighbors(&self, removed: &[NodeId]) -> (Option<NodeId>, Option<NodeId>) {
        let removed_set: HashSet<NodeId> = removed.iter().copied().collect();
        let mut left = None;
        let mut right = None;
        for &handle in removed {
            if let Some(p) = self.sweep_line.predecessor(handle) {
                if !removed_set.contains(&p) {
                    left = Some(p);
                }
            }
            if let Some(s) = self.sweep_line.successor(handle) {
                if !removed_set.contains(&s) {
                    right = Some(s);
                }
            }
        }
        (left, right)
    }

    /// The (outside, inside) and (inside, outside) boundary pairs flanking a
    /// freshly inserted block, as line indices.
    fn outer_pairs(&self, inserted: &[NodeId]) -> (Option<(usize, usize)>, Option<(usize, usize)>) {
        let inserted_set: HashSet<NodeId> = inserted.iter().copied().collect();
        let mut left_pair = None;
        let mut right_pair = None;
        for &handle in inserted {
            if let Some(p) = self.sweep_line.predecessor(handle) {
                if !inserted_set.contains(&p) {
                    left_pair = Some((*self.sweep_line.key(p), *self.sweep_line.key(handle)));
                }
            }
            if let Some(s) = self.sweep_line.successor(handle) {
                if !inserted_set.contains(&s) {
                    right_pair = Some((*self.sweep_line.key(handle), *self.sweep_line.key(s)));
                }
            }
        }
        (left_pair, right_pair)
    }

    /// Tests two neighbouring lines on the sweep line for a crossing,
    /// discarding crossings at or before the cursor and scheduling the rest
    /// (§4.6 steps 3 and 5).
    fn test_crossing(&mut self, a: usize, b: usize, current: &mut MultiLinePoint) -> Result<()> {
        let r = pair_find(self.sweep_start[a], self.sweep_end[a], self.sweep_start[b], self.sweep_end[b]);
        if r.relation == LineRelation::Parallel {
            return Ok(());
        }
        let Some(shared) = r.shared else { return Ok(()) };
        if r.first.is_endpoint() && r.second.is_endpoint() {
            return Ok(());
        }
        let meaningful = (r.first == LineLocation::Between && r.second.is_contained())
            || (r.second == LineLocation::Between && r.first.is_contained());
        if !meaningful {
            return Ok(());
        }

        match compare_exact(shared, self.cursor) {
            std::cmp::Ordering::Less => {}
            std::cmp::Ordering::Equal => {
                debug!("crossing of {a}/{b} merges into current event at ({}, {})", shared.x, shared.y);
                current.try_add_line(a, r.first);
                current.try_add_line(b, r.second);
            }
            std::cmp::Ordering::Greater => {
                debug!("scheduling crossing of {a}/{b} at ({}, {})", shared.x, shared.y);
                self.schedule_add(shared, a, r.first);
                self.schedule_add(shared, b, r.second);
            }
        }
        Ok(())
    }

    fn maybe_emit(&mut self, event: MultiLinePoint) {
        if event.lines.len() < 2 {
            return;
        }
        let first_slope = self.slope[event.lines[0]];
        let all_same_slope = event.lines.iter().all(|&line| {
            let s = self.slope[line];
            s == first_slope || (s.is_infinite() && first_slope.is_infinite())
        });
        let all_endpoints = event.locations.iter().all(|l| l.is_endpoint());
        // §4.6 step 3: only overlapping-endpoint events of collinear segments
        // are already reported as two separate Start/End events; a `Between`
        // location means a real crossing (possibly a collinear overlap) that
        // must still be reported even when every line shares a slope.
        if all_same_slope && all_endpoints {
            return;
        }
        self.output.push(normalize(event, &self.flipped));
    }
}

fn compare_lines(position: &[f64], slope: &[f64], a: usize, b: usize) -> std::cmp::Ordering {
    if a == b {
        return std::cmp::Ordering::Equal;
    }
    match position[a].partial_cmp(&position[b]).unwrap_or(std::cmp::Ordering::Equal) {
        std::cmp::Ordering::Equal => match slope[a].partial_cmp(&slope[b]).unwrap_or(std::cmp::Ordering::Equal) {
            std::cmp::Ordering::Equal => a.cmp(&b),
            other => other,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_reports_nothing() {
        assert_eq!(find(&[]).unwrap(), Vec::new());
    }

    #[test]
    fn single_crossing_is_found() {
        let lines = [
            Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
            Segment::new(Point::new(5.0, -5.0), Point::new(5.0, 5.0)),
        ];
        let found = find(&lines).unwrap();
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
        assert!(find(&lines).unwrap().is_empty());
    }

    #[test]
    fn triangle_vertices_are_reported() {
        // S2: three segments forming a triangle, meeting pairwise at vertices.
        let a = Point::new(0.0, 0.0);
        let b = Point::new(4.0, 0.0);
        let c = Point::new(2.0, 3.0);
        let lines = [Segment::new(a, b), Segment::new(b, c), Segment::new(c, a)];
        let found = find(&lines).unwrap();
        assert_eq!(found.len(), 3);
        for point in [a, b, c] {
            assert!(found.iter().any(|e| e.shared == point));
        }
    }

    #[test]
    fn empty_segment_is_rejected() {
        let lines = [Segment::new(Point::new(1.0, 1.0), Point::new(1.0, 1.0))];
        assert_eq!(find(&lines).unwrap_err(), GeometryError::EmptySegment { index: 0 });
    }

    #[test]
    fn star_of_spokes_reports_single_shared_center() {
        let o = Point::new(0.0, 0.0);
        let spokes = [
            Point::new(1.0, 0.0),
            Point::new(2.0, 1.0),
            Point::new(1.0, 2.0),
            Point::new(-1.0, 2.0),
            Point::new(-2.0, 1.0),
        ];
        let lines: Vec<Segment> = spokes.iter().map(|&s| Segment::new(o - s, s)).collect();
        let found = find(&lines).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].shared, o);
        assert_eq!(found[0].lines.len(), spokes.len());
    }

    #[test]
    fn horizontal_segment_is_handled() {
        let lines = [
            Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
            Segment::new(Point::new(3.0, -3.0), Point::new(3.0, 3.0)),
            Segment::new(Point::new(7.0, -3.0), Point::new(7.0, 3.0)),
        ];
        let found = find(&lines).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn collinear_overlap_is_reported_by_sweep_engine() {
        // S3: two collinear, overlapping segments share the same slope, so
        // the event at (1,1) must not be discarded by the "same slope, all
        // endpoints" exclusion — one of its two locations is `Between`.
        let lines = [
            Segment::new(Point::new(0.0, 0.0), Point::new(4.0, 4.0)),
            Segment::new(Point::new(1.0, 1.0), Point::new(3.0, 3.0)),
        ];
        let found = find(&lines).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].shared, Point::new(1.0, 1.0));
        assert!(found[0].locations.contains(&LineLocation::Between));
    }
}
