//! Bounding boxes and convex hulls over shape point sets.

use kurbo::{Affine, Point};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounds `{minX, maxX, minY, maxY}` in some coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// What an empty point set measures as.
    pub const ZERO: Bounds = Bounds::new(0.0, 0.0, 0.0, 0.0);

    /// Stand-in camera box used when nothing finite could be measured.
    pub const SENTINEL: Bounds = Bounds::new(-100.0, 100.0, -100.0, 100.0);

    pub const fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.min_x + self.width() / 2.0,
            self.min_y + self.height() / 2.0,
        )
    }

    pub fn max_dim(&self) -> f64 {
        self.width().max(self.height())
    }

    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.max_x.is_finite()
            && self.min_y.is_finite()
            && self.max_y.is_finite()
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.min_x.min(other.min_x),
            self.max_x.max(other.max_x),
            self.min_y.min(other.min_y),
            self.max_y.max(other.max_y),
        )
    }

    /// Bounds of the four transformed corners.
    pub fn transform(&self, m: Affine) -> Option<Bounds> {
        let mut builder = BoundsBuilder::new();
        for corner in self.corners() {
            builder.add(m * corner);
        }
        builder.finish()
    }
}

/// Incremental bounds over points that may include non-finite values.
///
/// Non-finite points are dropped, and a builder that saw nothing finite
/// finishes as `None`. Aggregating callers merge `Option<Bounds>` so an
/// empty contributor never leaks a sentinel into its parent.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsBuilder {
    bounds: Option<Bounds>,
}

impl BoundsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, p: Point) {
        if !(p.x.is_finite() && p.y.is_finite()) {
            return;
        }
        let point_box = Bounds::new(p.x, p.x, p.y, p.y);
        self.bounds = Some(match self.bounds {
            Some(b) => b.union(&point_box),
            None => point_box,
        });
    }

    pub fn extend(&mut self, points: impl IntoIterator<Item = Point>) {
        for p in points {
            self.add(p);
        }
    }

    /// Merge another box; non-finite or absent boxes are ignored.
    pub fn merge(&mut self, other: Option<Bounds>) {
        if let Some(b) = other.filter(Bounds::is_finite) {
            self.bounds = Some(match self.bounds {
                Some(own) => own.union(&b),
                None => b,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    pub fn finish(self) -> Option<Bounds> {
        self.bounds
    }
}

/// Tight bounds of a point set. An empty set yields [`Bounds::ZERO`].
///
/// The zero box cannot be told apart from a real point at the origin, so
/// aggregating callers should use [`BoundsBuilder`] instead.
pub fn compute_bounds(points: &[Point]) -> Bounds {
    let mut builder = BoundsBuilder::new();
    builder.extend(points.iter().copied());
    builder.finish().unwrap_or(Bounds::ZERO)
}

/// Z component of `(a - o) × (b - o)`; positive for a left turn.
fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull via Andrew's monotone chain.
///
/// Collinear points are dropped. Inputs with at most two points are returned
/// unchanged. Only used for debug overlays; rendering never depends on it.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();
    if sorted.len() <= 2 {
        return sorted;
    }

    let mut lower: Vec<Point> = Vec::with_capacity(sorted.len());
    for &p in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point> = Vec::with_capacity(sorted.len());
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn bounds_of_triangle() {
        let b = compute_bounds(&pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]));
        assert_eq!(b, Bounds::new(0.0, 10.0, 0.0, 10.0));
        assert_eq!(b.center(), Point::new(5.0, 5.0));
        assert_eq!(b.max_dim(), 10.0);
    }

    #[test]
    fn empty_bounds_are_zero_not_nan() {
        let b = compute_bounds(&[]);
        assert_eq!(b, Bounds::ZERO);
        assert!(b.is_finite());
    }

    #[test]
    fn builder_ignores_non_finite() {
        let mut builder = BoundsBuilder::new();
        builder.add(Point::new(f64::NAN, 1.0));
        builder.add(Point::new(f64::INFINITY, 1.0));
        assert!(builder.is_empty());
        builder.merge(Some(Bounds::new(f64::NEG_INFINITY, 1.0, 0.0, 1.0)));
        assert_eq!(builder.finish(), None);

        builder.add(Point::new(2.0, 3.0));
        builder.merge(None);
        assert_eq!(builder.finish(), Some(Bounds::new(2.0, 2.0, 3.0, 3.0)));
    }

    #[test]
    fn transform_uses_all_corners() {
        let b = Bounds::new(0.0, 2.0, 0.0, 1.0);
        let rotated = b
            .transform(Affine::rotate(std::f64::consts::FRAC_PI_2))
            .unwrap();
        assert!((rotated.min_x - -1.0).abs() < 1e-9);
        assert!((rotated.max_x - 0.0).abs() < 1e-9);
        assert!((rotated.max_y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn hull_of_triangle_scenario() {
        let hull = convex_hull(&pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]));
        assert_eq!(hull, pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]));
    }

    #[test]
    fn hull_drops_interior_and_collinear_points() {
        let input = pts(&[
            (0.0, 0.0),
            (5.0, 0.0),
            (10.0, 0.0),
            (5.0, 5.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (3.0, 7.0),
        ]);
        let hull = convex_hull(&input);
        assert_eq!(hull, pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]));
    }

    #[test]
    fn hull_small_inputs_unchanged() {
        let two = pts(&[(3.0, 1.0), (0.0, 0.0)]);
        assert_eq!(convex_hull(&two), two);
        assert!(convex_hull(&[]).is_empty());
    }

    #[test]
    fn hull_is_convex_and_contains_everything() {
        // Deterministic scatter.
        let input: Vec<Point> = (0..40)
            .map(|i| {
                let t = i as f64 * 0.7;
                Point::new((t * 3.1).sin() * 50.0 + t, (t * 1.7).cos() * 30.0)
            })
            .collect();
        let hull = convex_hull(&input);
        assert!(hull.len() >= 3);

        let n = hull.len();
        for i in 0..n {
            let (a, b) = (hull[i], hull[(i + 1) % n]);
            assert!(cross(a, b, hull[(i + 2) % n]) > 0.0, "hull not convex at {i}");
            for &p in &input {
                assert!(cross(a, b, p) >= -1e-9, "{p:?} lies outside edge {i}");
            }
        }
    }
}
