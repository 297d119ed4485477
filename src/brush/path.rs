use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Pointer samples of the stroke in progress.
///
/// `Idle` until [`begin`](Self::begin), `Tracking` until [`end`](Self::end).
#[derive(Debug, Default)]
pub struct PathTracker {
    samples: Vec<Point>,
    tracking: bool,
}

impl PathTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer-down: start a fresh sequence seeded with the down position.
    pub fn begin(&mut self, at: Point) {
        self.samples.clear();
        self.samples.push(at);
        self.tracking = true;
    }

    /// Pointer-move: append a sample. Returns `false` (and records nothing)
    /// when no stroke is in progress.
    pub fn push(&mut self, at: Point) -> bool {
        if !self.tracking {
            return false;
        }
        self.samples.push(at);
        true
    }

    /// Pointer-up: hand back the finished samples and return to idle.
    pub fn end(&mut self) -> Vec<Point> {
        self.tracking = false;
        std::mem::take(&mut self.samples)
    }

    /// Drop the stroke in progress without finishing it.
    pub fn cancel(&mut self) {
        self.tracking = false;
        self.samples.clear();
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn samples(&self) -> &[Point] {
        &self.samples
    }

    /// Direction of travel from the previous sample to the latest one.
    pub fn tangent_angle(&self) -> f32 {
        tangent_angle(&self.samples)
    }
}

/// `atan2(dy, dx)` between the last two points; `0` with fewer than two.
pub fn tangent_angle(points: &[Point]) -> f32 {
    match points {
        [.., prev, curr] => (curr.y - prev.y).atan2(curr.x - prev.x),
        _ => 0.0,
    }
}

/// Total length of the polyline through `points`.
pub fn arc_length(points: &[Point]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Position and tangent angle at `distance` along the polyline.
///
/// Distances past the end continue along the final segment's direction, so
/// text that overruns a short path keeps its heading. Zero-length segments
/// are skipped. Returns `None` for an empty polyline.
pub fn point_at(points: &[Point], distance: f32) -> Option<(Point, f32)> {
    let first = *points.first()?;
    let mut travelled = 0.0f32;
    let mut last_segment: Option<(Point, Point, f32)> = None;

    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        let len = a.distance(b);
        if len <= f32::EPSILON {
            continue;
        }
        let angle = (b.y - a.y).atan2(b.x - a.x);
        if distance <= travelled + len {
            let t = ((distance - travelled) / len).max(0.0);
            return Some((lerp(a, b, t), angle));
        }
        travelled += len;
        last_segment = Some((a, b, angle));
    }

    match last_segment {
        Some((a, b, angle)) => {
            let len = a.distance(b);
            let t = 1.0 + (distance - travelled) / len;
            Some((lerp(a, b, t), angle))
        }
        None => Some((first, 0.0)),
    }
}

fn lerp(a: Point, b: Point, t: f32) -> Point {
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}
