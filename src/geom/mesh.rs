use super::{BBox, Point3};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeomMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
}

impl GeomMesh {
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Corner positions of triangle `face`, or `None` when out of range.
    #[must_use]
    pub fn triangle(&self, face: usize) -> Option<[Point3; 3]> {
        let tri = self.indices.get(face * 3..face * 3 + 3)?;
        let corner = |i: u32| self.positions.get(i as usize).copied().map(Point3::from);
        Some([corner(tri[0])?, corner(tri[1])?, corner(tri[2])?])
    }

    /// Axis-aligned bounds of triangle `face`.
    #[must_use]
    pub fn triangle_bbox(&self, face: usize) -> Option<BBox> {
        self.triangle(face).and_then(|corners| BBox::from_points(&corners))
    }

    /// Bounds of all faces in `[start, start + count)`.
    #[must_use]
    pub fn face_range_bbox(&self, start: usize, count: usize) -> Option<BBox> {
        (start..start + count)
            .filter_map(|face| self.triangle_bbox(face))
            .reduce(BBox::union)
    }

    /// Copy of the faces `[start, start + count)` as a standalone mesh with only
    /// the vertices those faces reference. Face order is preserved, so local face
    /// `i` corresponds to face `start + i` of `self`.
    #[must_use]
    pub fn extract_face_range(&self, start: usize, count: usize) -> Self {
        let end = (start + count).min(self.triangle_count());
        let slice = &self.indices[start.min(end) * 3..end * 3];

        let (Some(&lo), Some(&hi)) = (slice.iter().min(), slice.iter().max()) else {
            return Self::default();
        };
        let (lo, hi) = (lo as usize, hi as usize);

        Self {
            positions: self.positions[lo..=hi].to_vec(),
            indices: slice.iter().map(|i| i - lo as u32).collect(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err("mesh indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self
            .positions
            .iter()
            .any(|p| !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite())
        {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        let n = self.positions.len() as u32;
        if self.indices.iter().any(|&i| i >= n) {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        Ok(())
    }
}
