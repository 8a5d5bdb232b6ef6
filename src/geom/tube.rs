//! Tube sweep: a fixed-radius ring swept along a spine of positions and tangents.
//!
//! Faces are emitted ring cell by ring cell, so the triangles between ring `r`
//! and ring `r + 1` occupy the contiguous index range
//! `[r * faces_per_ring_cell(radial), (r + 1) * faces_per_ring_cell(radial))`.
//! Callers rely on this ordering to partition the surface into face ranges.

use super::mesh::GeomMesh;
use super::{Point3, Tolerance, Vec3};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Each quad between two rings is split into two triangles.
pub const TRIANGLES_PER_QUAD: usize = 2;

/// Threshold for detecting sharp tangent changes along the spine.
/// A dot product below this value (~75° angle) is reported as a warning.
const CUSP_DOT_THRESHOLD: f64 = 0.25;

/// Number of triangles between two consecutive rings.
#[must_use]
pub const fn faces_per_ring_cell(radial_segments: usize) -> usize {
    radial_segments * TRIANGLES_PER_QUAD
}

#[derive(Debug, Clone, Copy)]
pub struct TubeOptions {
    /// Number of segments around the circular cross-section.
    pub radial_segments: usize,
    pub radius: f64,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum TubeError {
    #[error("tube spine requires at least 2 rings")]
    SpineTooShort,
    #[error("tube spine must have finite points and tangents")]
    NonFiniteSpine,
    #[error("radius must be finite and > 0")]
    InvalidRadius,
    #[error("tube requires at least 3 radial segments")]
    NotEnoughRadialSegments,
    #[error("tube vertex count exceeds u32 indices")]
    TooManyVertices,
}

/// One ring position along the spine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpineSample {
    pub position: Point3,
    pub tangent: Vec3,
}

/// Orthonormal frame carried along the spine by parallel transport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingFrame {
    pub tangent: Vec3,
    pub normal: Vec3,
    pub binormal: Vec3,
}

impl RingFrame {
    /// Frame with an arbitrary but deterministic normal.
    #[must_use]
    pub fn from_tangent(tangent: Vec3) -> Option<Self> {
        let tangent = tangent.normalized()?;
        let reference = if tangent.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
        let normal = tangent.cross(reference).normalized()?;
        let binormal = tangent.cross(normal);
        Some(Self { tangent, normal, binormal })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TubeMesh {
    pub mesh: GeomMesh,
    pub ring_count: usize,
    pub radial_segments: usize,
    pub warnings: Vec<String>,
}

impl TubeMesh {
    #[must_use]
    pub fn faces_per_ring_cell(&self) -> usize {
        faces_per_ring_cell(self.radial_segments)
    }

    /// Spine cell (ring index) that owns `face`.
    #[must_use]
    pub fn ring_of_face(&self, face: usize) -> usize {
        face / self.faces_per_ring_cell()
    }
}

pub fn sweep_tube(
    spine: &[SpineSample],
    options: TubeOptions,
    tol: Tolerance,
) -> Result<TubeMesh, TubeError> {
    if options.radial_segments < 3 {
        return Err(TubeError::NotEnoughRadialSegments);
    }
    if !options.radius.is_finite() || options.radius <= tol.eps {
        return Err(TubeError::InvalidRadius);
    }
    if spine.len() < 2 {
        return Err(TubeError::SpineTooShort);
    }
    if spine
        .iter()
        .any(|s| !s.position.is_finite() || !s.tangent.is_finite())
    {
        return Err(TubeError::NonFiniteSpine);
    }
    if spine
        .len()
        .checked_mul(options.radial_segments)
        .is_none_or(|v| v > u32::MAX as usize)
    {
        return Err(TubeError::TooManyVertices);
    }

    let (frames, warnings) = compute_ring_frames(spine, tol);
    for warning in &warnings {
        log::warn!("tube sweep: {warning}");
    }

    let radial_segments = options.radial_segments;
    let positions = build_ring_vertices(spine, &frames, options);

    let ring_count = spine.len();
    let cell_count = ring_count - 1;
    let mut indices: Vec<u32> =
        Vec::with_capacity(cell_count * faces_per_ring_cell(radial_segments) * 3);

    for r in 0..cell_count {
        for seg in 0..radial_segments {
            let seg_next = (seg + 1) % radial_segments;

            let i0 = (r * radial_segments + seg) as u32;
            let i1 = (r * radial_segments + seg_next) as u32;
            let i2 = ((r + 1) * radial_segments + seg_next) as u32;
            let i3 = ((r + 1) * radial_segments + seg) as u32;

            indices.extend_from_slice(&[i0, i1, i2]);
            indices.extend_from_slice(&[i0, i2, i3]);
        }
    }

    Ok(TubeMesh {
        mesh: GeomMesh::new(positions, indices),
        ring_count,
        radial_segments,
        warnings,
    })
}

fn ring_vertices(sample: &SpineSample, frame: &RingFrame, options: TubeOptions) -> Vec<[f64; 3]> {
    (0..options.radial_segments)
        .map(|seg| {
            let angle = 2.0 * std::f64::consts::PI * seg as f64 / options.radial_segments as f64;
            sample
                .position
                .add_vec(frame.normal.mul_scalar(options.radius * angle.cos()))
                .add_vec(frame.binormal.mul_scalar(options.radius * angle.sin()))
                .to_array()
        })
        .collect()
}

#[cfg(feature = "parallel")]
fn build_ring_vertices(
    spine: &[SpineSample],
    frames: &[RingFrame],
    options: TubeOptions,
) -> Vec<[f64; 3]> {
    spine
        .par_iter()
        .zip(frames.par_iter())
        .flat_map_iter(|(sample, frame)| ring_vertices(sample, frame, options))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn build_ring_vertices(
    spine: &[SpineSample],
    frames: &[RingFrame],
    options: TubeOptions,
) -> Vec<[f64; 3]> {
    spine
        .iter()
        .zip(frames)
        .flat_map(|(sample, frame)| ring_vertices(sample, frame, options))
        .collect()
}

fn compute_ring_frames(spine: &[SpineSample], tol: Tolerance) -> (Vec<RingFrame>, Vec<String>) {
    let mut warnings = Vec::new();
    let mut frames: Vec<RingFrame> = Vec::with_capacity(spine.len());

    let fallback = RingFrame {
        tangent: Vec3::Z,
        normal: Vec3::X,
        binormal: Vec3::Y,
    };
    let first = match RingFrame::from_tangent(spine[0].tangent) {
        Some(frame) => frame,
        None => {
            warnings.push("spine has degenerate initial tangent; using default frame".to_string());
            fallback
        }
    };
    frames.push(first);

    let mut cusp_like = 0usize;
    for sample in &spine[1..] {
        let prev = frames[frames.len() - 1];
        let tangent = match sample.tangent.normalized() {
            Some(t) => t,
            None => {
                warnings.push("spine has degenerate tangent; reusing previous tangent".to_string());
                prev.tangent
            }
        };

        if prev.tangent.dot(tangent) < CUSP_DOT_THRESHOLD {
            cusp_like += 1;
        }

        frames.push(parallel_transport_frame(&prev, tangent, tol));
    }

    if cusp_like > 0 {
        warnings.push(format!(
            "spine continuity warning: {cusp_like} sharp tangent changes"
        ));
    }

    (frames, warnings)
}

fn parallel_transport_frame(prev_frame: &RingFrame, new_tangent: Vec3, tol: Tolerance) -> RingFrame {
    let old_tangent = prev_frame.tangent;
    let cross = old_tangent.cross(new_tangent);

    if cross.length_squared() < tol.eps_squared() {
        let flip = if old_tangent.dot(new_tangent) < 0.0 { -1.0 } else { 1.0 };
        return RingFrame {
            tangent: new_tangent,
            normal: prev_frame.normal.mul_scalar(flip),
            binormal: prev_frame.binormal.mul_scalar(flip),
        };
    }

    let rotation_axis = cross.normalized().unwrap_or(Vec3::Z);
    let angle = old_tangent.dot(new_tangent).clamp(-1.0, 1.0).acos();

    let new_normal = rotate_vector(prev_frame.normal, rotation_axis, angle)
        .normalized()
        .unwrap_or(prev_frame.normal);
    let new_binormal = new_tangent
        .cross(new_normal)
        .normalized()
        .unwrap_or(prev_frame.binormal);

    RingFrame {
        tangent: new_tangent,
        normal: new_normal,
        binormal: new_binormal,
    }
}

// Rodrigues rotation.
fn rotate_vector(v: Vec3, axis: Vec3, angle: f64) -> Vec3 {
    let (sin_angle, cos_angle) = angle.sin_cos();
    v.mul_scalar(cos_angle)
        + axis.cross(v).mul_scalar(sin_angle)
        + axis.mul_scalar(axis.dot(v) * (1.0 - cos_angle))
}
