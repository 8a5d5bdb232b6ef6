use super::{BBox, Point3, Vec3};

#[derive(Debug, Clone, Copy)]
struct BvhNode {
    bbox: BBox,
    left: u32,
    right: u32,
    start: u32,
    count: u32,
}

impl BvhNode {
    const fn leaf(bbox: BBox, start: u32, count: u32) -> Self {
        Self {
            bbox,
            left: u32::MAX,
            right: u32::MAX,
            start,
            count,
        }
    }

    const fn inner(bbox: BBox, left: u32, right: u32) -> Self {
        Self {
            bbox,
            left,
            right,
            start: 0,
            count: 0,
        }
    }

    const fn is_leaf(self) -> bool {
        self.count != 0
    }
}

/// Median-split bounding volume hierarchy over primitive bounding boxes.
///
/// Primitives are addressed by their index in the slice passed to [`Bvh::build`].
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    prim_indices: Vec<u32>,
}

impl Bvh {
    const DEFAULT_LEAF_SIZE: usize = 8;

    #[must_use]
    pub fn build(bboxes: &[BBox]) -> Option<Self> {
        Self::build_with_leaf_size(bboxes, Self::DEFAULT_LEAF_SIZE)
    }

    #[must_use]
    pub fn build_with_leaf_size(bboxes: &[BBox], leaf_size: usize) -> Option<Self> {
        if bboxes.is_empty() {
            return None;
        }

        let leaf_size = leaf_size.clamp(1, 256);
        let prim_indices: Vec<u32> = (0..(bboxes.len() as u32)).collect();
        let nodes = Vec::with_capacity(bboxes.len().saturating_mul(2));

        let mut bvh = Self { nodes, prim_indices };
        bvh.build_node(bboxes, 0, bboxes.len(), leaf_size);
        Some(bvh)
    }

    /// Bounds of every primitive in the hierarchy.
    #[must_use]
    pub fn bounds(&self) -> BBox {
        self.nodes[0].bbox
    }

    fn build_node(&mut self, bboxes: &[BBox], start: usize, end: usize, leaf_size: usize) -> u32 {
        let node_index = self.nodes.len() as u32;
        let bbox = self.range_bbox(bboxes, start, end);
        self.nodes.push(BvhNode::leaf(bbox, 0, 0));

        let count = end - start;
        if count <= leaf_size {
            self.nodes[node_index as usize] = BvhNode::leaf(bbox, start as u32, count as u32);
            return node_index;
        }

        let axis = self.choose_split_axis(bboxes, start, end);
        let mid = start + count / 2;
        self.prim_indices[start..end].select_nth_unstable_by(mid - start, |a, b| {
            let ca = centroid_component(bboxes[*a as usize], axis);
            let cb = centroid_component(bboxes[*b as usize], axis);
            ca.total_cmp(&cb)
        });

        let left = self.build_node(bboxes, start, mid, leaf_size);
        let right = self.build_node(bboxes, mid, end, leaf_size);
        self.nodes[node_index as usize] = BvhNode::inner(bbox, left, right);
        node_index
    }

    fn range_bbox(&self, bboxes: &[BBox], start: usize, end: usize) -> BBox {
        self.prim_indices[(start + 1)..end]
            .iter()
            .fold(bboxes[self.prim_indices[start] as usize], |acc, &idx| {
                acc.union(bboxes[idx as usize])
            })
    }

    fn choose_split_axis(&self, bboxes: &[BBox], start: usize, end: usize) -> u8 {
        let first = bboxes[self.prim_indices[start] as usize].center();
        let spread = self.prim_indices[(start + 1)..end]
            .iter()
            .fold(BBox::new(first, first), |acc, &idx| {
                acc.expand_point(bboxes[idx as usize].center())
            })
            .size();

        if spread.x >= spread.y && spread.x >= spread.z {
            0
        } else if spread.y >= spread.z {
            1
        } else {
            2
        }
    }

    /// Closest primitive along the ray. `hit_distance` returns the ray
    /// parameter at which a primitive is hit, or `None` for a miss.
    ///
    /// Nodes are visited near-to-far and the search window shrinks with every
    /// hit, so occluded subtrees are skipped.
    pub fn nearest_ray_hit<F>(
        &self,
        origin: Point3,
        dir: Vec3,
        t_min: f64,
        t_max: f64,
        mut hit_distance: F,
    ) -> Option<(usize, f64)>
    where
        F: FnMut(usize) -> Option<f64>,
    {
        let mut best: Option<(usize, f64)> = None;
        let mut limit = t_max;
        let mut stack = vec![0u32];

        while let Some(node_idx) = stack.pop() {
            let node = self.nodes[node_idx as usize];
            if ray_bbox_entry(origin, dir, node.bbox, t_min, limit).is_none() {
                continue;
            }

            if node.is_leaf() {
                let start = node.start as usize;
                let end = start + node.count as usize;
                for &prim in &self.prim_indices[start..end] {
                    let prim_idx = prim as usize;
                    let Some(t) = hit_distance(prim_idx) else {
                        continue;
                    };
                    if t.is_finite() && t >= t_min && t < limit {
                        limit = t;
                        best = Some((prim_idx, t));
                    }
                }
                continue;
            }

            // Push the farther child first so the nearer one is popped next.
            let left_entry = ray_bbox_entry(origin, dir, self.nodes[node.left as usize].bbox, t_min, limit);
            let right_entry = ray_bbox_entry(origin, dir, self.nodes[node.right as usize].bbox, t_min, limit);
            match (left_entry, right_entry) {
                (Some(l), Some(r)) if l <= r => {
                    stack.push(node.right);
                    stack.push(node.left);
                }
                (Some(_), Some(_)) => {
                    stack.push(node.left);
                    stack.push(node.right);
                }
                (Some(_), None) => stack.push(node.left),
                (None, Some(_)) => stack.push(node.right),
                (None, None) => {}
            }
        }

        best
    }
}

fn centroid_component(bbox: BBox, axis: u8) -> f64 {
    let c = bbox.center();
    match axis {
        0 => c.x,
        1 => c.y,
        _ => c.z,
    }
}

/// Slab test. Returns the entry parameter when the ray overlaps the box
/// within `[t_min, t_max]`.
fn ray_bbox_entry(origin: Point3, dir: Vec3, bbox: BBox, t_min: f64, t_max: f64) -> Option<f64> {
    let mut tmin = t_min;
    let mut tmax = t_max;
    let eps = 1e-15;

    for axis in 0..3u8 {
        let (o, d, min, max) = match axis {
            0 => (origin.x, dir.x, bbox.min.x, bbox.max.x),
            1 => (origin.y, dir.y, bbox.min.y, bbox.max.y),
            _ => (origin.z, dir.z, bbox.min.z, bbox.max.z),
        };

        if !o.is_finite() || !d.is_finite() {
            return None;
        }

        if d.abs() <= eps {
            if o < min || o > max {
                return None;
            }
            continue;
        }

        let inv_d = 1.0 / d;
        let mut t0 = (min - o) * inv_d;
        let mut t1 = (max - o) * inv_d;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        tmin = tmin.max(t0);
        tmax = tmax.min(t1);
        if tmax < tmin {
            return None;
        }
    }

    Some(tmin)
}
