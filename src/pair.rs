//! Pairwise segment-segment intersection (C5), combining Cormen's
//! `Segments-Intersect` cross-product test with O'Rourke's parametric test
//! for robustness (§4.5).

use std::hash::{Hash, Hasher};

use crate::location::{LineLocation, LineRelation};
use crate::order::compare_exact;
use crate::point::{cross, Point};
use crate::segment::locate_collinear;

/// Floor below which a cross product or denominator is treated as zero,
/// even on the exact entry point — bitwise-exact zero cross products are
/// rare in practice and near-collinear cases are frequent.
const MIN_EPS: f64 = 1e-10;

/// Hard cap on epsilon-doubling retries (§9); exceeding it falls back to
/// `Parallel` rather than looping forever.
const MAX_DOUBLINGS: u32 = 50;

/// The outcome of intersecting two (infinite) lines through `a,b` and
/// `c,d`, together with where the shared point (if any) falls on each
/// segment. See §3 for the field invariants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairResult {
    pub shared: Option<Point>,
    pub first: LineLocation,
    pub second: LineLocation,
    pub relation: LineRelation,
}

impl PairResult {
    fn collinear(shared: Option<Point>, first: LineLocation, second: LineLocation) -> Self {
        PairResult {
            shared,
            first,
            second,
            relation: LineRelation::Collinear,
        }
    }

    fn parallel() -> Self {
        PairResult {
            shared: None,
            first: LineLocation::None,
            second: LineLocation::None,
            relation: LineRelation::Parallel,
        }
    }

    fn divergent(shared: Point, first: LineLocation, second: LineLocation) -> Self {
        PairResult {
            shared: Some(shared),
            first,
            second,
            relation: LineRelation::Divergent,
        }
    }
}

impl Hash for PairResult {
    /// Folds the IEEE-754 bit pattern of `shared.x` and `shared.y` via XOR,
    /// per §9's floating-point hashing note.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.relation.hash(state);
        self.first.hash(state);
        self.second.hash(state);
        match self.shared {
            Some(p) => state.write_u64(p.x.to_bits() ^ p.y.to_bits()),
            None => state.write_u64(0),
        }
    }
}

/// Intersect the infinite lines through segments `a->b` and `c->d`, using
/// only the unconditional floor tolerance (§4.5 step 2).
pub fn pair_find(a: Point, b: Point, c: Point, d: Point) -> PairResult {
    pair_find_eps(a, b, c, d, None)
}

/// Same as [`pair_find`], but with a caller-supplied tolerance. `eps` is
/// folded into the effective tolerance as `max(eps, MIN_EPS)`; a
/// non-positive `eps` is simply ignored (the floor still applies), since
/// every caller of this entry point treats `eps` as optional sugar rather
/// than a hard requirement — validation of a *required* positive epsilon
/// belongs to the ε-accepting public entry points (`find_simple_eps`),
/// which reject `eps <= 0` explicitly.
pub fn pair_find_eps(a: Point, b: Point, c: Point, d: Point, eps: Option<f64>) -> PairResult {
    let snap_eps = eps.filter(|e| *e > 0.0);
    let mut eps_eff = snap_eps.unwrap_or(0.0).max(MIN_EPS);

    for _ in 0..=MAX_DOUBLINGS {
        match try_find(a, b, c, d, eps_eff, snap_eps) {
            Ok(result) => return result,
            Err(()) => eps_eff *= 2.0,
        }
    }
    PairResult::parallel()
}

fn try_find(
    a: Point,
    b: Point,
    c: Point,
    d: Point,
    eps_eff: f64,
    snap_eps: Option<f64>,
) -> Result<PairResult, ()> {
    let d1 = cross(c, a, d);
    let d2 = cross(c, b, d);
    let d3 = cross(a, c, b);
    let d4 = cross(a, d, b);

    let z1 = d1.abs() <= eps_eff;
    let z2 = d2.abs() <= eps_eff;
    let z3 = d3.abs() <= eps_eff;
    let z4 = d4.abs() <= eps_eff;

    if z1 && z2 && z3 && z4 {
        return Ok(collinear_case(a, b, c, d, eps_eff));
    }

    if z1 || z2 || z3 || z4 {
        return Ok(touching_case(a, b, c, d, z1, z2, z3, z4, eps_eff));
    }

    let rx = b.x - a.x;
    let ry = b.y - a.y;
    let sx = d.x - c.x;
    let sy = d.y - c.y;
    let denom = rx * sy - ry * sx;

    if denom.abs() <= eps_eff {
        return Ok(PairResult::parallel());
    }

    let qpx = c.x - a.x;
    let qpy = c.y - a.y;
    let s_param = (qpx * sy - qpy * sx) / denom;
    let t_param = (qpx * ry - qpy * rx) / denom;

    let first = classify_side(d1.signum() != d2.signum(), s_param)?;
    let second = classify_side(d3.signum() != d4.signum(), t_param)?;

    let mut shared = a + s_param * (b - a);
    let (first, second) = snap_to_endpoints(shared, a, b, c, d, first, second, snap_eps);
    // Re-derive `shared` as the exact endpoint when snapping occurred, so the
    // returned point always matches an input coordinate exactly in that case
    // (corrects long-segment rounding, per §4.5 step 7).
    if let Some(eps) = snap_eps {
        if first == LineLocation::Start && shared.eq_eps(a, eps) {
            shared = a;
        } else if first == LineLocation::End && shared.eq_eps(b, eps) {
            shared = b;
        } else if second == LineLocation::Start && shared.eq_eps(c, eps) {
            shared = c;
        } else if second == LineLocation::End && shared.eq_eps(d, eps) {
            shared = d;
        }
    }

    Ok(PairResult::divergent(shared, first, second))
}

fn classify_side(signs_differ: bool, param: f64) -> Result<LineLocation, ()> {
    if signs_differ {
        if param > 0.0 && param < 1.0 {
            Ok(LineLocation::Between)
        } else {
            Err(())
        }
    } else if param <= 0.0 {
        Ok(LineLocation::Before)
    } else if param >= 1.0 {
        Ok(LineLocation::After)
    } else {
        Err(())
    }
}

#[allow(clippy::too_many_arguments)]
fn snap_to_endpoints(
    shared: Point,
    a: Point,
    b: Point,
    c: Point,
    d: Point,
    first: LineLocation,
    second: LineLocation,
    snap_eps: Option<f64>,
) -> (LineLocation, LineLocation) {
    let Some(eps) = snap_eps else {
        return (first, second);
    };
    let first = if shared.eq_eps(a, eps) {
        LineLocation::Start
    } else if shared.eq_eps(b, eps) {
        LineLocation::End
    } else {
        first
    };
    let second = if shared.eq_eps(c, eps) {
        LineLocation::Start
    } else if shared.eq_eps(d, eps) {
        LineLocation::End
    } else {
        second
    };
    (first, second)
}

/// §4.5 step 3: all four cross products vanish.
fn collinear_case(a: Point, b: Point, c: Point, d: Point, eps_eff: f64) -> PairResult {
    let (first_probe, first_tag, second_probe, second_tag) = if compare_exact(c, d).is_le() {
        (c, LineLocation::Start, d, LineLocation::End)
    } else {
        (d, LineLocation::End, c, LineLocation::Start)
    };

    let loc = locate_collinear(a, b, first_probe, eps_eff);
    if loc.is_contained() {
        return PairResult::collinear(Some(first_probe), loc, first_tag);
    }
    let loc = locate_collinear(a, b, second_probe, eps_eff);
    if loc.is_contained() {
        return PairResult::collinear(Some(second_probe), loc, second_tag);
    }
    PairResult::collinear(None, LineLocation::None, LineLocation::None)
}

/// §4.5 step 4: exactly one endpoint is a touching intersection (possibly
/// detected from either side, or both, when the touching point is a shared
/// endpoint of both segments).
///
/// Priority when more than one `zk` is simultaneously zero — always `z1`,
/// then `z2`, then `z3`, then `z4`, never "whichever is smaller" or some
/// other data-dependent rule. This case only arises when `a`, `b`, `c`, `d`
/// share an endpoint (e.g. `b == c` forces both `z2` and `z3` to vanish
/// exactly, independent of `eps_eff`), and in that case all four branches
/// that could fire agree on which point is `shared` — it's the common
/// endpoint by value — so the fixed priority never produces a different
/// *point*, only picks which of the two equivalent derivations computes the
/// tags. A genuine four-way tie (all of `z1..z4` zero) is handled earlier,
/// in `collinear_case`, and never reaches this function.
#[allow(clippy::too_many_arguments)]
fn touching_case(
    a: Point,
    b: Point,
    c: Point,
    d: Point,
    z1: bool,
    z2: bool,
    z3: bool,
    z4: bool,
    eps_eff: f64,
) -> PairResult {
    if z1 {
        let second = locate_collinear(c, d, a, eps_eff);
        return PairResult::divergent(a, LineLocation::Start, second);
    }
    if z2 {
        let second = locate_collinear(c, d, b, eps_eff);
        return PairResult::divergent(b, LineLocation::End, second);
    }
    if z3 {
        let first = locate_collinear(a, b, c, eps_eff);
        return PairResult::divergent(c, first, LineLocation::Start);
    }
    debug_assert!(z4);
    let first = locate_collinear(a, b, d, eps_eff);
    PairResult::divergent(d, first, LineLocation::End)
}
