use geo::{AffineOps, AffineTransform, Coord, LineString, Polygon, Simplify};
use imageproc::point::Point;

/// Closed polygon through the contour vertices (pixel-corner coordinates)
pub fn fit_polygon(contour: &[Point<i32>]) -> Polygon<f64> {
    let ring: LineString<f64> = contour
        .iter()
        .map(|p| Coord {
            x: p.x as f64,
            y: p.y as f64,
        })
        .collect();
    Polygon::new(ring, vec![])
}

/// Douglas-Peucker simplification of the exterior ring.
///
/// The ring is simplified as a plain line string anchored at its start
/// point. Returns `None` when the result would collapse below three distinct
/// vertices, in which case the caller keeps the unsimplified polygon.
pub fn simplify(polygon: &Polygon<f64>, tolerance: f64) -> Option<Polygon<f64>> {
    let ring: LineString<f64> = polygon.exterior().simplify(&tolerance);
    let simplified = Polygon::new(ring, vec![]);
    (distinct_vertices(&simplified) >= 3).then_some(simplified)
}

/// Scale every vertex about the origin: (x, y) -> (x * sx, y * sy)
pub fn scale_about_origin(polygon: &Polygon<f64>, sx: f64, sy: f64) -> Polygon<f64> {
    let transform = AffineTransform::scale(sx, sy, Coord { x: 0.0, y: 0.0 });
    polygon.affine_transform(&transform)
}

pub fn distinct_vertices(polygon: &Polygon<f64>) -> usize {
    let ring = polygon.exterior();
    let n = ring.0.len();
    if n > 1 && ring.is_closed() { n - 1 } else { n }
}
