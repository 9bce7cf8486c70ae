use crate::location::LineLocation;
use crate::multi_point::MultiLinePoint;

/// Rewrites an event's `Start`/`End` tags to reflect each line's *original*
/// input direction, undoing whatever internal reordering an engine applied
/// at initialization (§4.7). `flipped[i]` is `true` when segment `i`'s
/// original `end` was lexicographically smaller than its `start`, meaning
/// the engine swapped them for its own bookkeeping.
pub(crate) fn normalize(mut event: MultiLinePoint, flipped: &[bool]) -> MultiLinePoint {
    for (line, location) in event.lines.iter().zip(event.locations.iter_mut()) {
        if flipped[*line] {
            *location = match *location {
                LineLocation::Start => LineLocation::End,
                LineLocation::End => LineLocation::Start,
                other => other,
            };
        }
    }
    event
}
