//! Pointer to month resolution.
//!
//! The pointer is unprojected through a perspective camera into a world ray.
//! A top-level BVH over the pickable meshes prunes whole months, each mesh's
//! triangle BVH finds its nearest face, and the overall nearest hit wins.
//! That depth ordering matters: the spiral overlaps itself on screen.

use serde::Serialize;

use crate::geom::{Bvh, MeshHit, Point3, Quat, Ray, Tolerance, Vec3};

use super::config::CameraConfig;
use super::region::{HitKey, MeshId, PickMesh, RegionId, RegionIndex};

/// Camera pose: where it is and which way it faces (looking down local -Z).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Point3,
    pub orientation: Quat,
}

impl CameraPose {
    /// Pose at `position` looking at `target` with +Y up.
    #[must_use]
    pub fn looking_at(position: Point3, target: Point3) -> Self {
        let orientation = Quat::look_at(position, target, Vec3::Y)
            .or_else(|| Quat::look_at(position, target, Vec3::Z))
            .unwrap_or(Quat::IDENTITY);
        Self {
            position,
            orientation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub pose: CameraPose,
    pub fov_y_degrees: f64,
    /// Width over height.
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl PerspectiveCamera {
    #[must_use]
    pub fn from_config(config: &CameraConfig, aspect: f64) -> Self {
        Self {
            pose: CameraPose::looking_at(
                Point3::from_array(config.position),
                Point3::from_array(config.look_at),
            ),
            fov_y_degrees: config.fov_y_degrees,
            aspect,
            near: config.near,
            far: config.far,
        }
    }

    /// World-space ray through normalised device coordinates (`[-1, 1]`, +Y up).
    #[must_use]
    pub fn ray_through_ndc(&self, ndc_x: f64, ndc_y: f64) -> Option<Ray> {
        let half_height = (self.fov_y_degrees.to_radians() * 0.5).tan();
        let local = Vec3::new(ndc_x * half_height * self.aspect, ndc_y * half_height, -1.0);
        Ray::new(self.pose.position, self.pose.orientation.rotate_vec(local))
    }
}

/// The canvas rectangle in client (CSS pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// `None` for an empty viewport.
    #[must_use]
    pub fn to_ndc(&self, pointer_x: f64, pointer_y: f64) -> Option<(f64, f64)> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return None;
        }
        let x = (pointer_x - self.left) / self.width * 2.0 - 1.0;
        let y = -(pointer_y - self.top) / self.height * 2.0 + 1.0;
        (x.is_finite() && y.is_finite()).then_some((x, y))
    }

    #[must_use]
    pub fn aspect(&self) -> Option<f64> {
        (self.width > 0.0 && self.height > 0.0).then(|| self.width / self.height)
    }
}

/// The pickable meshes plus a BVH over their bounds.
#[derive(Debug, Clone)]
pub struct PickScene {
    meshes: Vec<PickMesh>,
    top: Option<Bvh>,
    /// Top-level BVH primitive to mesh index; empty meshes are left out.
    prim_mesh: Vec<usize>,
}

impl PickScene {
    #[must_use]
    pub fn new(meshes: Vec<PickMesh>) -> Self {
        let (prim_mesh, boxes): (Vec<usize>, Vec<_>) = meshes
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.mesh.bounds().map(|b| (i, b)))
            .unzip();
        Self {
            top: Bvh::build(&boxes),
            meshes,
            prim_mesh,
        }
    }

    #[must_use]
    pub fn meshes(&self) -> &[PickMesh] {
        &self.meshes
    }

    /// Nearest face hit within `max_distance`.
    #[must_use]
    pub fn raycast(&self, ray: Ray, max_distance: f64) -> Option<(HitKey, MeshHit)> {
        let top = self.top.as_ref()?;
        let mut hits: Vec<(usize, MeshHit)> = Vec::new();
        let (prim, _) = top.nearest_ray_hit(ray.origin, ray.direction, 0.0, max_distance, |prim| {
            let mesh_idx = self.prim_mesh[prim];
            let hit = self.meshes[mesh_idx]
                .mesh
                .raycast(ray, max_distance, Tolerance::PICK)?;
            hits.push((prim, hit));
            Some(hit.distance)
        })?;

        let (_, hit) = hits.into_iter().find(|(p, _)| *p == prim)?;
        let key = HitKey {
            mesh: MeshId(self.prim_mesh[prim]),
            face: hit.face,
        };
        Some((key, hit))
    }
}

/// A resolved pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub region: RegionId,
    pub key: HitKey,
    pub distance: f64,
    pub point: Point3,
}

/// Resolve a pointer position to the month under it, if any.
#[must_use]
pub fn resolve_hit(
    pointer_x: f64,
    pointer_y: f64,
    viewport: &Viewport,
    camera: &PerspectiveCamera,
    scene: &PickScene,
    index: &dyn RegionIndex,
) -> Option<PickHit> {
    let (ndc_x, ndc_y) = viewport.to_ndc(pointer_x, pointer_y)?;
    let ray = camera.ray_through_ndc(ndc_x, ndc_y)?;
    let (key, hit) = scene.raycast(ray, f64::INFINITY)?;
    let region = index.lookup(key)?;
    log::trace!("pick: mesh {} face {} -> region {}", key.mesh.0, key.face, region.0);
    Some(PickHit {
        region,
        key,
        distance: hit.distance,
        point: hit.point,
    })
}

/// Hovered and selected months. Hover also keeps the pointer position as a
/// tooltip anchor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SelectionState {
    pub hovered: Option<RegionId>,
    pub hover_pointer: Option<[f64; 2]>,
    pub selected: Option<RegionId>,
}

impl SelectionState {
    pub fn set_hover(&mut self, hit: Option<RegionId>, pointer: [f64; 2]) {
        self.hovered = hit;
        self.hover_pointer = hit.map(|_| pointer);
    }

    pub fn select(&mut self, region: RegionId) {
        self.selected = Some(region);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{GeomMesh, RaycastMesh};
    use crate::spiral::region::{FaceGroup, PerMeshIndex};

    fn quad_at_z(z: f64) -> GeomMesh {
        GeomMesh::new(
            vec![[-1.0, -1.0, z], [1.0, -1.0, z], [1.0, 1.0, z], [-1.0, 1.0, z]],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    fn pick_mesh(mesh: GeomMesh, region: usize) -> PickMesh {
        PickMesh {
            groups: vec![FaceGroup {
                start: 0,
                count: mesh.triangle_count(),
                region: RegionId(region),
            }],
            mesh: RaycastMesh::new(mesh),
        }
    }

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::from_config(&CameraConfig::default(), 1.0)
    }

    #[test]
    fn ndc_mapping() {
        let viewport = Viewport::new(10.0, 20.0, 200.0, 100.0);
        assert_eq!(viewport.to_ndc(110.0, 70.0), Some((0.0, 0.0)));
        assert_eq!(viewport.to_ndc(10.0, 20.0), Some((-1.0, 1.0)));
        assert_eq!(viewport.to_ndc(210.0, 120.0), Some((1.0, -1.0)));
        assert_eq!(Viewport::new(0.0, 0.0, 0.0, 100.0).to_ndc(0.0, 0.0), None);
    }

    #[test]
    fn center_ray_looks_down_negative_z() {
        let ray = camera().ray_through_ndc(0.0, 0.0).unwrap();
        assert_eq!(ray.origin, Point3::new(0.0, 0.0, 5.0));
        assert!((ray.direction.z + 1.0).abs() < 1e-12);

        let right = camera().ray_through_ndc(1.0, 0.0).unwrap();
        assert!(right.direction.x > 0.0);
        let up = camera().ray_through_ndc(0.0, 1.0).unwrap();
        assert!(up.direction.y > 0.0);
    }

    #[test]
    fn nearest_mesh_wins() {
        let meshes = vec![pick_mesh(quad_at_z(-3.0), 0), pick_mesh(quad_at_z(-1.0), 1)];
        let regions_index = PerMeshIndex::new(&[]);
        let scene = PickScene::new(meshes);

        let ray = camera().ray_through_ndc(0.0, 0.0).unwrap();
        let (key, hit) = scene.raycast(ray, f64::INFINITY).unwrap();
        assert_eq!(key.mesh, MeshId(1));
        assert!((hit.distance - 6.0).abs() < 1e-9);
        // Region index has no entries, so the hit resolves to nothing.
        let viewport = Viewport::new(0.0, 0.0, 100.0, 100.0);
        assert!(resolve_hit(50.0, 50.0, &viewport, &camera(), &scene, &regions_index).is_none());
    }

    #[test]
    fn miss_over_empty_space() {
        let scene = PickScene::new(vec![pick_mesh(quad_at_z(-1.0), 0)]);
        let off_axis = PerspectiveCamera {
            pose: CameraPose::looking_at(Point3::new(50.0, 0.0, 5.0), Point3::new(50.0, 0.0, 0.0)),
            ..camera()
        };
        let ray = off_axis.ray_through_ndc(0.0, 0.0).unwrap();
        assert!(scene.raycast(ray, f64::INFINITY).is_none());
        assert!(PickScene::new(Vec::new()).raycast(ray, f64::INFINITY).is_none());
    }

    #[test]
    fn hover_tracks_pointer_only_on_hit() {
        let mut selection = SelectionState::default();
        selection.set_hover(Some(RegionId(3)), [4.0, 5.0]);
        assert_eq!(selection.hover_pointer, Some([4.0, 5.0]));
        selection.set_hover(None, [6.0, 7.0]);
        assert_eq!(selection, SelectionState::default());
    }
}
