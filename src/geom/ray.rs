//! Ray casting against triangle meshes.

use super::bvh::Bvh;
use super::mesh::GeomMesh;
use super::{BBox, Point3, Tolerance, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Returns `None` for a non-finite origin or a zero direction.
    #[must_use]
    pub fn new(origin: Point3, direction: Vec3) -> Option<Self> {
        if !origin.is_finite() {
            return None;
        }
        Some(Self {
            origin,
            direction: direction.normalized()?,
        })
    }

    /// Ray from `origin` through `target`.
    #[must_use]
    pub fn through(origin: Point3, target: Point3) -> Option<Self> {
        Self::new(origin, target - origin)
    }

    #[must_use]
    pub fn at(self, t: f64) -> Point3 {
        self.origin.add_vec(self.direction.mul_scalar(t))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub t: f64,
    pub u: f64,
    pub v: f64,
}

/// Double-sided Möller–Trumbore test. Hits behind the origin are rejected.
#[must_use]
pub fn ray_triangle_intersection(ray: Ray, tri: [Point3; 3], tol: Tolerance) -> Option<RayHit> {
    let [a, b, c] = tri;
    let edge1 = b.sub_point(a);
    let edge2 = c.sub_point(a);
    let h = ray.direction.cross(edge2);
    let det = edge1.dot(h);
    let det_eps = Tolerance::ZERO_LENGTH.eps * edge1.length() * h.length();
    if !det.is_finite() || det.abs() <= det_eps {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin.sub_point(a);
    let u = inv_det * s.dot(h);
    let uv_eps = tol.eps;
    if u < -uv_eps || u > 1.0 + uv_eps {
        return None;
    }

    let q = s.cross(edge1);
    let v = inv_det * ray.direction.dot(q);
    if v < -uv_eps || u + v > 1.0 + uv_eps {
        return None;
    }

    let t = inv_det * edge2.dot(q);
    if !t.is_finite() || t < 0.0 {
        return None;
    }

    Some(RayHit { t, u, v })
}

/// A hit on a specific face of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHit {
    pub face: usize,
    pub distance: f64,
    pub point: Point3,
}

/// A mesh paired with a triangle BVH for picking.
#[derive(Debug, Clone)]
pub struct RaycastMesh {
    mesh: GeomMesh,
    bvh: Option<Bvh>,
}

impl RaycastMesh {
    #[must_use]
    pub fn new(mesh: GeomMesh) -> Self {
        let boxes: Vec<BBox> = (0..mesh.triangle_count())
            .filter_map(|face| mesh.triangle_bbox(face))
            .collect();
        // Faces with dangling indices are dropped above; only index the BVH
        // when every face survived so primitive ids stay face ids.
        let bvh = if boxes.len() == mesh.triangle_count() {
            Bvh::build(&boxes)
        } else {
            log::warn!("raycast mesh has invalid faces; picking disabled for it");
            None
        };
        Self { mesh, bvh }
    }

    #[must_use]
    pub fn mesh(&self) -> &GeomMesh {
        &self.mesh
    }

    /// Bounds of all faces, `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<BBox> {
        self.bvh.as_ref().map(Bvh::bounds)
    }

    /// Nearest face hit by `ray` within `max_distance`.
    #[must_use]
    pub fn raycast(&self, ray: Ray, max_distance: f64, tol: Tolerance) -> Option<MeshHit> {
        let bvh = self.bvh.as_ref()?;
        let (face, distance) =
            bvh.nearest_ray_hit(ray.origin, ray.direction, 0.0, max_distance, |face| {
                let tri = self.mesh.triangle(face)?;
                ray_triangle_intersection(ray, tri, tol).map(|hit| hit.t)
            })?;
        Some(MeshHit {
            face,
            distance,
            point: ray.at(distance),
        })
    }
}
