use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::point::Point;

/// External (outermost) contours of an edge map as pixel-corner rings,
/// compressed to their corners.
///
/// Border following finds one outer border per component; each is then
/// re-traced along the pixel edges so the ring encloses whole pixels rather
/// than running through boundary pixel centres. Contours are returned in the
/// raster scan order of their first pixel.
pub fn find_external_contours(edges: &GrayImage) -> Vec<Vec<Point<i32>>> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| c.points.iter().copied().min_by_key(|p| (p.y, p.x)))
        .map(|start| compress_runs(&trace_outer_crack(edges, start)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    East,
    South,
    West,
    North,
}

impl Heading {
    fn step(self) -> (i32, i32) {
        match self {
            Heading::East => (1, 0),
            Heading::South => (0, 1),
            Heading::West => (-1, 0),
            Heading::North => (0, -1),
        }
    }

    // Clockwise on screen, y pointing down
    fn turn_right(self) -> Self {
        match self {
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
            Heading::North => Heading::East,
        }
    }

    fn turn_left(self) -> Self {
        match self {
            Heading::East => Heading::North,
            Heading::North => Heading::West,
            Heading::West => Heading::South,
            Heading::South => Heading::East,
        }
    }

    /// Pixels (ahead-left, ahead-right) of the lattice point `at`
    fn pixels_ahead(self, at: Point<i32>) -> (Point<i32>, Point<i32>) {
        let top_left = Point::new(at.x - 1, at.y - 1);
        let top_right = Point::new(at.x, at.y - 1);
        let bottom_left = Point::new(at.x - 1, at.y);
        let bottom_right = at;
        match self {
            Heading::East => (top_right, bottom_right),
            Heading::South => (bottom_right, bottom_left),
            Heading::West => (bottom_left, top_left),
            Heading::North => (top_left, top_right),
        }
    }
}

/// Outer pixel-edge boundary of the 8-connected region holding `start`.
///
/// Lattice point (x, y) is the top-left corner of pixel (x, y). `start` must
/// be the region's topmost-leftmost pixel; the ring begins at its top-left
/// corner and runs clockwise on screen with the region on its right. The
/// closing point is not repeated. The shoelace area of the ring equals the
/// region's pixel count once its holes are filled.
pub fn trace_outer_crack(raster: &GrayImage, start: Point<i32>) -> Vec<Point<i32>> {
    let (width, height) = raster.dimensions();
    let filled = |p: Point<i32>| {
        p.x >= 0
            && p.y >= 0
            && (p.x as u32) < width
            && (p.y as u32) < height
            && raster.get_pixel(p.x as u32, p.y as u32)[0] != 0
    };

    let mut ring = vec![start];
    let mut corner = start;
    let mut heading = Heading::East;
    loop {
        let (dx, dy) = heading.step();
        corner = Point::new(corner.x + dx, corner.y + dy);

        let (left, right) = heading.pixels_ahead(corner);
        heading = if filled(left) {
            heading.turn_left()
        } else if filled(right) {
            heading
        } else {
            heading.turn_right()
        };

        if corner == start && heading == Heading::East {
            break;
        }
        ring.push(corner);
    }
    ring
}

/// Keep only the points where the trace changes direction
pub fn compress_runs(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let mut trace: Vec<Point<i32>> = Vec::with_capacity(points.len());
    for &p in points {
        if trace.last() != Some(&p) {
            trace.push(p);
        }
    }
    while trace.len() > 1 && trace.first() == trace.last() {
        trace.pop();
    }
    if trace.len() < 3 {
        return trace;
    }

    let n = trace.len();
    let step = |a: Point<i32>, b: Point<i32>| (b.x - a.x, b.y - a.y);
    (0..n)
        .filter(|&i| {
            let prev = trace[(i + n - 1) % n];
            let next = trace[(i + 1) % n];
            step(prev, trace[i]) != step(trace[i], next)
        })
        .map(|i| trace[i])
        .collect()
}

/// Absolute shoelace area of a closed vertex ring
pub fn enclosed_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let twice: i64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
        })
        .sum();
    twice.abs() as f64 / 2.0
}

/// Index of the contour with the largest enclosed area; ties keep the first
pub fn largest_by_area(contours: &[Vec<Point<i32>>]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, contour) in contours.iter().enumerate() {
        let area = enclosed_area(contour);
        tracing::trace!(contour = idx, vertices = contour.len(), area, "external contour");
        match best {
            Some((_, top)) if area <= top => {}
            _ => best = Some((idx, area)),
        }
    }
    best.map(|(idx, _)| idx)
}
