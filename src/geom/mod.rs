mod bvh;
mod core;
mod mesh;
mod ray;
mod spline;
mod tube;

pub use bvh::Bvh;
pub use core::{BBox, Point3, Quat, Tolerance, Vec3};
pub use mesh::GeomMesh;
pub use ray::{MeshHit, Ray, RayHit, RaycastMesh, ray_triangle_intersection};
pub use spline::{CENTRIPETAL_ALPHA, CentripetalSpline};
pub use tube::{
    RingFrame, SpineSample, TRIANGLES_PER_QUAD, TubeError, TubeMesh, TubeOptions,
    faces_per_ring_cell, sweep_tube,
};
