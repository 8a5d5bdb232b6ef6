//! Month regions and the index that maps a geometric hit back to one.
//!
//! Two partition strategies share the [`RegionIndex`] contract:
//!
//! - [`PartitionStrategy::PerMesh`]: every month becomes its own pickable
//!   mesh and the mesh id *is* the region id.
//! - [`PartitionStrategy::FaceGroups`]: all months share one mesh carrying
//!   per-month face groups; a dense face table resolves hits in O(1).

use std::fmt::Debug;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::geom::{BBox, GeomMesh, RaycastMesh};

use super::calendar::{CalendarMonth, month_name};
use super::config::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub usize);

/// Index into the pickable mesh list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeshId(pub usize);

/// A face hit on a pickable mesh, in that mesh's local face numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitKey {
    pub mesh: MeshId,
    pub face: usize,
}

/// One calendar month's slice of the tube surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthRegion {
    pub id: RegionId,
    pub year: i32,
    /// Zero-based, January is 0.
    pub month_index: usize,
    /// First face of the month on the global tube surface.
    pub face_range_start: usize,
    pub face_range_count: usize,
    pub color: Rgb,
    pub bbox: BBox,
    pub is_current: bool,
}

impl MonthRegion {
    #[must_use]
    pub fn calendar_month(&self) -> CalendarMonth {
        CalendarMonth {
            year: self.year,
            month_index: self.month_index,
        }
    }

    #[must_use]
    pub fn month_name(&self) -> &'static str {
        month_name(self.month_index).unwrap_or("???")
    }

    /// `"Jan 2000"`.
    #[must_use]
    pub fn label(&self) -> String {
        self.calendar_month().label()
    }

    #[must_use]
    pub fn face_range(&self) -> Range<usize> {
        self.face_range_start..self.face_range_start + self.face_range_count
    }

    #[must_use]
    pub fn contains_face(&self, face: usize) -> bool {
        self.face_range().contains(&face)
    }
}

pub trait RegionIndex: Debug {
    /// Owning region of a hit, `None` for faces outside every region.
    fn lookup(&self, key: HitKey) -> Option<RegionId>;

    fn strategy(&self) -> PartitionStrategy;
}

/// Mesh id to region id, one pickable mesh per month.
#[derive(Debug, Clone)]
pub struct PerMeshIndex {
    region_of_mesh: Vec<RegionId>,
}

impl PerMeshIndex {
    #[must_use]
    pub fn new(regions: &[MonthRegion]) -> Self {
        Self {
            region_of_mesh: regions.iter().map(|r| r.id).collect(),
        }
    }
}

impl RegionIndex for PerMeshIndex {
    fn lookup(&self, key: HitKey) -> Option<RegionId> {
        self.region_of_mesh.get(key.mesh.0).copied()
    }

    fn strategy(&self) -> PartitionStrategy {
        PartitionStrategy::PerMesh
    }
}

/// Face id to region id on a single shared mesh.
#[derive(Debug, Clone)]
pub struct FaceGroupIndex {
    face_to_region: Vec<u32>,
    group_starts: Vec<usize>,
    group_regions: Vec<RegionId>,
    face_count: usize,
}

impl FaceGroupIndex {
    const NO_REGION: u32 = u32::MAX;

    /// `regions` must be sorted by `face_range_start` with disjoint ranges.
    #[must_use]
    pub fn new(regions: &[MonthRegion], face_count: usize) -> Self {
        let mut face_to_region = vec![Self::NO_REGION; face_count];
        for region in regions {
            let range = region.face_range();
            let end = range.end.min(face_count);
            let start = range.start.min(end);
            face_to_region[start..end].fill(region.id.0 as u32);
        }

        Self {
            face_to_region,
            group_starts: regions.iter().map(|r| r.face_range_start).collect(),
            group_regions: regions.iter().map(|r| r.id).collect(),
            face_count,
        }
    }

    /// Binary search over group starts. Same answer as [`RegionIndex::lookup`]
    /// without the dense table.
    #[must_use]
    pub fn search(&self, face: usize) -> Option<RegionId> {
        if face >= self.face_count {
            return None;
        }
        let slot = self.group_starts.partition_point(|&start| start <= face);
        slot.checked_sub(1).map(|i| self.group_regions[i])
    }
}

impl RegionIndex for FaceGroupIndex {
    fn lookup(&self, key: HitKey) -> Option<RegionId> {
        if key.mesh != MeshId(0) {
            return None;
        }
        match self.face_to_region.get(key.face) {
            Some(&Self::NO_REGION) | None => None,
            Some(&region) => Some(RegionId(region as usize)),
        }
    }

    fn strategy(&self) -> PartitionStrategy {
        PartitionStrategy::FaceGroups
    }
}

/// Contiguous faces of a pickable mesh rendered with one region's material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FaceGroup {
    pub start: usize,
    pub count: usize,
    pub region: RegionId,
}

/// A renderable, ray-castable mesh plus its material groups.
#[derive(Debug, Clone)]
pub struct PickMesh {
    pub mesh: RaycastMesh,
    pub groups: Vec<FaceGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStrategy {
    #[default]
    PerMesh,
    FaceGroups,
}

impl PartitionStrategy {
    /// Split the tube `surface` into pickable meshes and build the matching index.
    #[must_use]
    pub fn partition(
        self,
        surface: &GeomMesh,
        regions: &[MonthRegion],
    ) -> (Vec<PickMesh>, Box<dyn RegionIndex>) {
        match self {
            Self::PerMesh => {
                let meshes = regions
                    .iter()
                    .map(|region| PickMesh {
                        mesh: RaycastMesh::new(
                            surface.extract_face_range(region.face_range_start, region.face_range_count),
                        ),
                        groups: vec![FaceGroup {
                            start: 0,
                            count: region.face_range_count,
                            region: region.id,
                        }],
                    })
                    .collect();
                (meshes, Box::new(PerMeshIndex::new(regions)))
            }
            Self::FaceGroups => {
                let groups = regions
                    .iter()
                    .map(|region| FaceGroup {
                        start: region.face_range_start,
                        count: region.face_range_count,
                        region: region.id,
                    })
                    .collect();
                let index = FaceGroupIndex::new(regions, surface.triangle_count());
                let mesh = PickMesh {
                    mesh: RaycastMesh::new(surface.clone()),
                    groups,
                };
                (vec![mesh], Box::new(index))
            }
        }
    }
}
