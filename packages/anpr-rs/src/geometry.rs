//! Polygon helpers shared by consolidation and result assembly.
use anpr_engine::{DetectionBox, Point};

/// Moves a crop-space polygon into image space by adding the box origin.
///
/// Returns `None` if any vertex would leave the `i32` range.
pub fn offset_polygon(bbox: &DetectionBox, polygon: &[Point]) -> Option<Vec<Point>> {
    polygon
        .iter()
        .map(|p| Some(Point::new(p.x.checked_add(bbox.x_min())?, p.y.checked_add(bbox.y_min())?)))
        .collect()
}

/// Convex hull of `points` using Andrew's monotone chain.
///
/// Vertices come back counter-clockwise (in y-down image coordinates,
/// clockwise on screen) starting from the lowest x, then lowest y. Duplicate
/// and collinear points are dropped.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts = points.to_vec();
    pts.sort_unstable();
    pts.dedup();

    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<Point> = Vec::with_capacity(pts.len());
    for p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], *p) <= 0 {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Point> = Vec::with_capacity(pts.len());
    for p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], *p) <= 0 {
            upper.pop();
        }
        upper.push(*p);
    }

    // Last point of each half is the first of the other.
    lower.pop();
    upper.pop();

    lower.extend(upper);
    lower
}

/// Cross product of OA and OB, widened so any `i32` coordinates fit.
#[inline]
fn cross(o: Point, a: Point, b: Point) -> i128 {
    let (ox, oy) = (i128::from(o.x), i128::from(o.y));
    (i128::from(a.x) - ox) * (i128::from(b.y) - oy) - (i128::from(a.y) - oy) * (i128::from(b.x) - ox)
}
