// Copyright 2025 Lars Brubaker
// Geometric predicates for the triangulation engine.
//
// Every predicate that decides a topological question (which side, which
// circle, whether two segments meet) takes an explicit tolerance `eps`, a
// distance in coordinate units. Values within `eps` of a decision boundary
// resolve to the degenerate answer (collinear, on-circle, touching), which
// keeps cocircular and collinear input from flipping back and forth.

pub type Real = f64;

/// Default distance under which two points are considered the same.
pub const DEFAULT_TOLERANCE: Real = 1e-9;

/// A 2D position.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Coord {
    pub x: Real,
    pub y: Real,
}

impl Coord {
    #[inline]
    pub const fn new(x: Real, y: Real) -> Self {
        Coord { x, y }
    }

    #[inline]
    pub fn dist_sq(self, o: Coord) -> Real {
        let dx = self.x - o.x;
        let dy = self.y - o.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn dist(self, o: Coord) -> Real {
        self.dist_sq(o).sqrt()
    }

    #[inline]
    pub fn midpoint(self, o: Coord) -> Coord {
        Coord::new(0.5 * (self.x + o.x), 0.5 * (self.y + o.y))
    }
}

impl From<(Real, Real)> for Coord {
    fn from((x, y): (Real, Real)) -> Self {
        Coord::new(x, y)
    }
}

impl From<[Real; 2]> for Coord {
    fn from([x, y]: [Real; 2]) -> Self {
        Coord::new(x, y)
    }
}

/// Which side of a directed line a point lies on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Orientation {
    Left,
    Right,
    Collinear,
}

/// Twice the signed area of triangle abc. Positive when c is left of a->b.
#[inline]
pub fn orient(a: Coord, b: Coord, c: Coord) -> Real {
    (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)
}

/// Side of `c` relative to the directed line a->b. Collinear when the
/// distance of `c` from the line is at most `eps`.
pub fn orientation(a: Coord, b: Coord, c: Coord, eps: Real) -> Orientation {
    let det = orient(a, b, c);
    let len = a.dist(b);
    if len <= eps {
        // Degenerate base: fall back to the distance from a.
        return if a.dist(c) <= eps || det.abs() <= eps * eps {
            Orientation::Collinear
        } else if det > 0.0 {
            Orientation::Left
        } else {
            Orientation::Right
        };
    }
    if det.abs() <= eps * len {
        Orientation::Collinear
    } else if det > 0.0 {
        Orientation::Left
    } else {
        Orientation::Right
    }
}

#[inline]
pub fn is_left(a: Coord, b: Coord, c: Coord, eps: Real) -> bool {
    orientation(a, b, c, eps) == Orientation::Left
}

/// Raw in-circle determinant. Positive when d lies inside the circumcircle of
/// the counter-clockwise triangle abc.
pub fn in_circle(a: Coord, b: Coord, c: Coord, d: Coord) -> Real {
    let adx = a.x - d.x;
    let ady = a.y - d.y;
    let bdx = b.x - d.x;
    let bdy = b.y - d.y;
    let cdx = c.x - d.x;
    let cdy = c.y - d.y;

    let ab_det = adx * bdy - bdx * ady;
    let bc_det = bdx * cdy - cdx * bdy;
    let ca_det = cdx * ady - adx * cdy;

    let a_lift = adx * adx + ady * ady;
    let b_lift = bdx * bdx + bdy * bdy;
    let c_lift = cdx * cdx + cdy * cdy;

    a_lift * bc_det + b_lift * ca_det + c_lift * ab_det
}

/// True when d lies strictly inside the circumcircle of the CCW triangle abc,
/// by more than the tolerance. Cocircular points are never inside.
pub fn inside_circumcircle(a: Coord, b: Coord, c: Coord, d: Coord, eps: Real) -> bool {
    let det = in_circle(a, b, c, d);
    let m = a.dist_sq(d).max(b.dist_sq(d)).max(c.dist_sq(d));
    det > eps * m * m.sqrt()
}

#[inline]
pub fn coincident(a: Coord, b: Coord, eps: Real) -> bool {
    a.dist_sq(b) <= eps * eps
}

/// True when c lies on the closed segment ab (within `eps`).
pub fn between(a: Coord, b: Coord, c: Coord, eps: Real) -> bool {
    if orientation(a, b, c, eps) != Orientation::Collinear {
        return false;
    }
    let dot = (c.x - a.x) * (b.x - a.x) + (c.y - a.y) * (b.y - a.y);
    let len_sq = a.dist_sq(b);
    let slack = eps * len_sq.sqrt();
    dot >= -slack && dot <= len_sq + slack
}

/// Proper crossing: each segment has the endpoints of the other strictly on
/// opposite sides. Shared endpoints and collinear overlaps do not count.
pub fn segments_cross(a: Coord, b: Coord, c: Coord, d: Coord, eps: Real) -> bool {
    let o1 = orientation(a, b, c, eps);
    let o2 = orientation(a, b, d, eps);
    let o3 = orientation(c, d, a, eps);
    let o4 = orientation(c, d, b, eps);
    o1 != Orientation::Collinear
        && o2 != Orientation::Collinear
        && o3 != Orientation::Collinear
        && o4 != Orientation::Collinear
        && o1 != o2
        && o3 != o4
}

/// Improper intersection: the closed segments share at least one point.
pub fn segments_touch(a: Coord, b: Coord, c: Coord, d: Coord, eps: Real) -> bool {
    segments_cross(a, b, c, d, eps)
        || between(a, b, c, eps)
        || between(a, b, d, eps)
        || between(c, d, a, eps)
        || between(c, d, b, eps)
}

/// Intersection point of segments ab and cd, or None if they are parallel.
/// The parameter along ab is clamped to [0, 1].
pub fn segment_intersection(a: Coord, b: Coord, c: Coord, d: Coord) -> Option<Coord> {
    let rx = b.x - a.x;
    let ry = b.y - a.y;
    let sx = d.x - c.x;
    let sy = d.y - c.y;
    let denom = rx * sy - ry * sx;
    if denom == 0.0 {
        return None;
    }
    let t = (((c.x - a.x) * sy - (c.y - a.y) * sx) / denom).clamp(0.0, 1.0);
    Some(Coord::new(a.x + t * rx, a.y + t * ry))
}

/// Crossing-number test. Points on the polygon outline may land either way.
pub fn point_in_polygon(p: Coord, polygon: &[Coord]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x = pj.x + (p.y - pj.y) * (pi.x - pj.x) / (pi.y - pj.y);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// True when `p` lies on the outline of `polygon` within `eps`.
pub fn on_polygon_outline(p: Coord, polygon: &[Coord], eps: Real) -> bool {
    let n = polygon.len();
    (0..n).any(|i| between(polygon[i], polygon[(i + 1) % n], p, eps))
}

/// True when `p` lies in the closed triangle abc, whatever its winding.
pub fn in_triangle(p: Coord, a: Coord, b: Coord, c: Coord, eps: Real) -> bool {
    let o1 = orientation(a, b, p, eps);
    let o2 = orientation(b, c, p, eps);
    let o3 = orientation(c, a, p, eps);
    let has_left = [o1, o2, o3].contains(&Orientation::Left);
    let has_right = [o1, o2, o3].contains(&Orientation::Right);
    !(has_left && has_right)
}

/// True when `p` lies in the open triangle abc (on no side).
pub fn strictly_in_triangle(p: Coord, a: Coord, b: Coord, c: Coord, eps: Real) -> bool {
    let o1 = orientation(a, b, p, eps);
    let o2 = orientation(b, c, p, eps);
    let o3 = orientation(c, a, p, eps);
    o1 != Orientation::Collinear && o1 == o2 && o2 == o3
}

/// Signed area of a closed polygon. Negative for clockwise order.
pub fn signed_area(polygon: &[Coord]) -> Real {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += polygon[i].x * polygon[j].y - polygon[j].x * polygon[i].y;
    }
    area * 0.5
}

/// True when no two non-adjacent sides of the closed polygon touch and no
/// adjacent sides fold back onto each other.
pub fn polygon_is_simple(polygon: &[Coord], eps: Real) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[(i + 1) % n]);
        if coincident(a, b, eps) {
            return false;
        }
        for j in (i + 1)..n {
            let (c, d) = (polygon[j], polygon[(j + 1) % n]);
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            if adjacent {
                // Sharing one endpoint is fine; folding back onto a neighbour is not.
                let (shared, x, y) = if j == i + 1 { (b, a, d) } else { (a, b, c) };
                if between(shared, y, x, eps) || between(shared, x, y, eps) {
                    return false;
                }
            } else if segments_touch(a, b, c, d, eps) {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPS: Real = DEFAULT_TOLERANCE;

    fn c(x: Real, y: Real) -> Coord {
        Coord::new(x, y)
    }

    #[test]
    fn orientation_basic() {
        assert_eq!(orientation(c(0.0, 0.0), c(1.0, 0.0), c(0.5, 1.0), EPS), Orientation::Left);
        assert_eq!(orientation(c(0.0, 0.0), c(1.0, 0.0), c(0.5, -1.0), EPS), Orientation::Right);
        assert_eq!(orientation(c(0.0, 0.0), c(1.0, 0.0), c(3.0, 0.0), EPS), Orientation::Collinear);
    }

    #[test]
    fn orientation_within_tolerance_is_collinear() {
        let o = orientation(c(0.0, 0.0), c(10.0, 0.0), c(5.0, 1e-12), EPS);
        assert_eq!(o, Orientation::Collinear);
    }

    #[test]
    fn in_circle_sign() {
        let (a, b, d) = (c(0.0, 0.0), c(1.0, 0.0), c(0.0, 1.0));
        assert!(in_circle(a, b, d, c(0.5, 0.5)) > 0.0);
        assert!(in_circle(a, b, d, c(2.0, 2.0)) < 0.0);
    }

    #[test]
    fn cocircular_is_not_inside() {
        // Four corners of a square share one circumcircle.
        let (a, b, d) = (c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0));
        assert!(!inside_circumcircle(a, b, d, c(0.0, 1.0), EPS));
        assert!(inside_circumcircle(a, b, d, c(0.1, 0.9), EPS));
    }

    #[test]
    fn between_closed_segment() {
        assert!(between(c(0.0, 0.0), c(2.0, 2.0), c(1.0, 1.0), EPS));
        assert!(between(c(0.0, 0.0), c(2.0, 2.0), c(2.0, 2.0), EPS));
        assert!(!between(c(0.0, 0.0), c(2.0, 2.0), c(3.0, 3.0), EPS));
        assert!(!between(c(0.0, 0.0), c(2.0, 2.0), c(1.0, 0.0), EPS));
    }

    #[test]
    fn proper_and_improper_crossings() {
        let (a, b) = (c(0.0, 0.0), c(2.0, 2.0));
        assert!(segments_cross(a, b, c(0.0, 2.0), c(2.0, 0.0), EPS));
        // T-junction touches but does not cross.
        assert!(!segments_cross(a, b, c(1.0, 1.0), c(2.0, 0.0), EPS));
        assert!(segments_touch(a, b, c(1.0, 1.0), c(2.0, 0.0), EPS));
        assert!(!segments_touch(a, b, c(3.0, 0.0), c(4.0, 0.0), EPS));
    }

    #[test]
    fn intersection_point() {
        let x = segment_intersection(c(0.0, 0.0), c(1.0, 1.0), c(0.0, 1.0), c(1.0, 0.0));
        let x = x.unwrap_or_default();
        assert_relative_eq!(x.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(x.y, 0.5, epsilon = 1e-12);
        assert!(segment_intersection(c(0.0, 0.0), c(1.0, 0.0), c(0.0, 1.0), c(1.0, 1.0)).is_none());
    }

    #[test]
    fn polygon_queries() {
        let square = [c(0.0, 0.0), c(0.0, 1.0), c(1.0, 1.0), c(1.0, 0.0)];
        assert!(signed_area(&square) < 0.0);
        assert_relative_eq!(signed_area(&square).abs(), 1.0);
        assert!(point_in_polygon(c(0.5, 0.5), &square));
        assert!(!point_in_polygon(c(1.5, 0.5), &square));
        assert!(on_polygon_outline(c(1.0, 0.5), &square, EPS));
        assert!(polygon_is_simple(&square, EPS));

        let bowtie = [c(0.0, 0.0), c(1.0, 1.0), c(1.0, 0.0), c(0.0, 1.0)];
        assert!(!polygon_is_simple(&bowtie, EPS));
    }

    #[test]
    fn triangle_containment() {
        let (a, b, d) = (c(0.0, 0.0), c(2.0, 0.0), c(0.0, 2.0));
        assert!(in_triangle(c(1.0, 0.0), a, b, d, EPS));
        assert!(!strictly_in_triangle(c(1.0, 0.0), a, b, d, EPS));
        assert!(strictly_in_triangle(c(0.5, 0.5), a, d, b, EPS));
        assert!(!in_triangle(c(2.0, 2.0), a, b, d, EPS));
    }
}
