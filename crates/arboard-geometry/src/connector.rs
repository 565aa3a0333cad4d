//! Connector clipping between two node circles.

use crate::Point;

/// Direction from `from` to `to` in radians.
///
/// Coincident points have no direction; they fall back to angle 0 so callers
/// never see NaN.
fn direction(from: Point, to: Point) -> f64 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    let angle = dy.atan2(dx);
    if angle.is_finite() { angle } else { 0.0 }
}

/// Compute the endpoints of a connector between two circles of equal radius.
///
/// Returns `(p1, p2)` where `p1` lies on the source circle and `p2` on the
/// target circle, both on the line joining the centers.
pub fn edge_points(source: Point, target: Point, radius: f64) -> (Point, Point) {
    let angle = direction(source, target);
    let p1 = source.offset(angle, radius);
    let p2 = target.offset(angle, -radius);
    (p1, p2)
}

/// Midpoint of a segment
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}
