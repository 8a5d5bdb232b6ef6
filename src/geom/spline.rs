//! Centripetal Catmull-Rom interpolation through an ordered point list.
//!
//! Every interval `[points[i], points[i + 1]]` is a cubic Hermite segment whose
//! tangents come from the non-uniform Catmull-Rom formulation with knot spacing
//! `|p_{i+1} - p_i|^alpha` (alpha = 0.5). Open ends use a phantom point
//! reflected through the end point, so the curve passes through every sample.

use super::{Point3, Vec3};

/// Knot exponent for the centripetal variant.
pub const CENTRIPETAL_ALPHA: f64 = 0.5;

/// Chord spacings below this are replaced to avoid division blow-up at
/// coincident samples.
const MIN_KNOT_SPACING: f64 = 1e-4;

/// Cubic polynomial `c0 + c1 u + c2 u^2 + c3 u^3` for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cubic {
    c0: f64,
    c1: f64,
    c2: f64,
    c3: f64,
}

impl Cubic {
    fn hermite(x0: f64, x1: f64, t0: f64, t1: f64) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    fn nonuniform(x: [f64; 4], dt0: f64, dt1: f64, dt2: f64) -> Self {
        let [x0, x1, x2, x3] = x;
        let t1 = (x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1;
        let t2 = (x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2;
        Self::hermite(x1, x2, t1 * dt1, t2 * dt1)
    }

    fn value(self, u: f64) -> f64 {
        self.c0 + u * (self.c1 + u * (self.c2 + u * self.c3))
    }

    fn derivative(self, u: f64) -> f64 {
        self.c1 + u * (2.0 * self.c2 + u * 3.0 * self.c3)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SplineSegment {
    x: Cubic,
    y: Cubic,
    z: Cubic,
}

/// Interpolating spline through a fixed list of control points.
#[derive(Debug, Clone, PartialEq)]
pub struct CentripetalSpline {
    segments: Vec<SplineSegment>,
}

impl CentripetalSpline {
    /// Returns `None` when fewer than two points are given.
    #[must_use]
    pub fn new(points: &[Point3]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let last = points.len() - 1;
        let segments = (0..last)
            .map(|i| {
                let p1 = points[i];
                let p2 = points[i + 1];
                let p0 = if i == 0 { reflect(p1, p2) } else { points[i - 1] };
                let p3 = if i + 1 == last { reflect(p2, p1) } else { points[i + 2] };
                build_segment(p0, p1, p2, p3)
            })
            .collect();

        Some(Self { segments })
    }

    /// Number of intervals (control points minus one).
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Evaluate interval `segment` at local parameter `u` in `[0, 1]`.
    #[must_use]
    pub fn point(&self, segment: usize, u: f64) -> Point3 {
        let s = self.segment(segment);
        Point3::new(s.x.value(u), s.y.value(u), s.z.value(u))
    }

    /// First derivative of interval `segment` at local parameter `u`.
    #[must_use]
    pub fn tangent(&self, segment: usize, u: f64) -> Vec3 {
        let s = self.segment(segment);
        Vec3::new(s.x.derivative(u), s.y.derivative(u), s.z.derivative(u))
    }

    /// Evaluate at a global parameter `s` in `[0, segment_count]`, where the
    /// integer part selects the interval.
    #[must_use]
    pub fn point_at(&self, s: f64) -> Point3 {
        let (segment, u) = self.locate(s);
        self.point(segment, u)
    }

    #[must_use]
    pub fn tangent_at(&self, s: f64) -> Vec3 {
        let (segment, u) = self.locate(s);
        self.tangent(segment, u)
    }

    fn locate(&self, s: f64) -> (usize, f64) {
        let max = self.segments.len() as f64;
        let s = s.clamp(0.0, max);
        let segment = (s.floor() as usize).min(self.segments.len() - 1);
        (segment, s - segment as f64)
    }

    fn segment(&self, segment: usize) -> SplineSegment {
        self.segments[segment.min(self.segments.len() - 1)]
    }
}

fn reflect(end: Point3, neighbour: Point3) -> Point3 {
    end.add_vec(end.sub_point(neighbour))
}

fn knot_spacing(a: Point3, b: Point3) -> f64 {
    a.sub_point(b).length_squared().powf(CENTRIPETAL_ALPHA * 0.5)
}

fn build_segment(p0: Point3, p1: Point3, p2: Point3, p3: Point3) -> SplineSegment {
    let mut dt0 = knot_spacing(p0, p1);
    let mut dt1 = knot_spacing(p1, p2);
    let mut dt2 = knot_spacing(p2, p3);

    if dt1 < MIN_KNOT_SPACING {
        dt1 = 1.0;
    }
    if dt0 < MIN_KNOT_SPACING {
        dt0 = dt1;
    }
    if dt2 < MIN_KNOT_SPACING {
        dt2 = dt1;
    }

    SplineSegment {
        x: Cubic::nonuniform([p0.x, p1.x, p2.x, p3.x], dt0, dt1, dt2),
        y: Cubic::nonuniform([p0.y, p1.y, p2.y, p3.y], dt0, dt1, dt2),
        z: Cubic::nonuniform([p0.z, p1.z, p2.z, p3.z], dt0, dt1, dt2),
    }
}
