//! Curve to tube surface, partitioned into one face range per month.
//!
//! The tube is a single continuous sweep. Each curve interval contributes
//! `subdivisions` ring cells, so every interval owns exactly
//! `C = radial_segments * TRIANGLES_PER_QUAD * subdivisions` consecutive faces
//! and a month made of `n` intervals owns `n * C` faces.

use crate::geom::{
    BBox, CentripetalSpline, GeomMesh, SpineSample, Tolerance, TubeOptions, faces_per_ring_cell,
    sweep_tube,
};

use super::calendar::CalendarMonth;
use super::config::Rgb;
use super::curve::CurveSample;
use super::error::{SpiralError, SpiralResult};
use super::region::{MonthRegion, RegionId};

/// Curve intervals owned by one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBlock {
    pub month: CalendarMonth,
    pub first_interval: usize,
    pub interval_count: usize,
}

/// Split `total_intervals` over `months`: `floor(total / months)` each, the
/// last month also takes the remainder.
pub fn month_blocks(total_intervals: usize, months: &[CalendarMonth]) -> SpiralResult<Vec<MonthBlock>> {
    let degenerate = SpiralError::DegenerateGeometry {
        segments: total_intervals,
        months: months.len(),
    };
    let per_month = total_intervals.checked_div(months.len()).ok_or(degenerate.clone())?;
    if per_month < 1 {
        return Err(degenerate);
    }

    let last = months.len() - 1;
    Ok(months
        .iter()
        .enumerate()
        .map(|(i, &month)| {
            let first_interval = i * per_month;
            let interval_count = if i == last {
                total_intervals - first_interval
            } else {
                per_month
            };
            MonthBlock {
                month,
                first_interval,
                interval_count,
            }
        })
        .collect())
}

#[derive(Debug, Clone)]
pub struct SegmentParams<'a> {
    pub radial_segments: usize,
    pub tube_radius: f64,
    /// Ring cells per curve interval.
    pub subdivisions: usize,
    pub palette: &'a [Rgb; 12],
    /// Month drawn in `current_color` instead of its palette entry.
    pub current: Option<CalendarMonth>,
    pub current_color: Rgb,
}

impl SegmentParams<'_> {
    /// Faces per curve interval.
    #[must_use]
    pub fn faces_per_interval(&self) -> usize {
        faces_per_ring_cell(self.radial_segments) * self.subdivisions
    }
}

/// The swept tube plus the spline it follows.
#[derive(Debug, Clone)]
pub struct TubeSurface {
    pub mesh: GeomMesh,
    pub spline: CentripetalSpline,
    pub faces_per_interval: usize,
    pub blocks: Vec<MonthBlock>,
}

/// Sweep the tube along `curve` and tag each month's faces.
///
/// `months` must be ordered oldest first; regions are returned in the same
/// order with contiguous face ranges starting at 0.
pub fn segment(
    curve: &CurveSample,
    params: &SegmentParams<'_>,
    months: &[CalendarMonth],
) -> SpiralResult<(TubeSurface, Vec<MonthRegion>)> {
    if params.subdivisions == 0 {
        return Err(SpiralError::resolution("spline_subdivisions", "must be > 0"));
    }
    let blocks = month_blocks(curve.interval_count(), months)?;
    let spline = CentripetalSpline::new(curve.points()).ok_or(SpiralError::DegenerateGeometry {
        segments: curve.interval_count(),
        months: months.len(),
    })?;

    let spine = spine_samples(&spline, params.subdivisions);
    let tube = sweep_tube(
        &spine,
        TubeOptions {
            radial_segments: params.radial_segments,
            radius: params.tube_radius,
        },
        Tolerance::default_geom(),
    )?;

    let faces_per_interval = params.faces_per_interval();
    debug_assert_eq!(
        tube.mesh.triangle_count(),
        curve.interval_count() * faces_per_interval
    );

    let mut face_start = 0;
    let mut regions = Vec::with_capacity(blocks.len());
    for (i, block) in blocks.iter().enumerate() {
        let face_count = block.interval_count * faces_per_interval;
        let bbox = tube
            .mesh
            .face_range_bbox(face_start, face_count)
            .ok_or(SpiralError::DegenerateGeometry {
                segments: block.interval_count,
                months: months.len(),
            })?;
        let is_current = params.current == Some(block.month);
        let color = if is_current {
            params.current_color
        } else {
            params.palette[block.month.month_index % params.palette.len()]
        };

        regions.push(MonthRegion {
            id: RegionId(i),
            year: block.month.year,
            month_index: block.month.month_index,
            face_range_start: face_start,
            face_range_count: face_count,
            color,
            bbox,
            is_current,
        });
        face_start += face_count;
    }

    log::debug!(
        "segment: {} faces, {} regions, {} faces per interval",
        tube.mesh.triangle_count(),
        regions.len(),
        faces_per_interval
    );

    let surface = TubeSurface {
        mesh: tube.mesh,
        spline,
        faces_per_interval,
        blocks,
    };
    Ok((surface, regions))
}

/// `subdivisions` rings per spline interval plus the closing ring.
fn spine_samples(spline: &CentripetalSpline, subdivisions: usize) -> Vec<SpineSample> {
    let intervals = spline.segment_count();
    let step = 1.0 / subdivisions as f64;
    let mut spine = Vec::with_capacity(intervals * subdivisions + 1);
    for segment in 0..intervals {
        for sub in 0..subdivisions {
            let u = sub as f64 * step;
            spine.push(SpineSample {
                position: spline.point(segment, u),
                tangent: spline.tangent(segment, u),
            });
        }
    }
    let last = intervals - 1;
    spine.push(SpineSample {
        position: spline.point(last, 1.0),
        tangent: spline.tangent(last, 1.0),
    });
    spine
}

/// Non-pickable wireframe over one month with a ring at every day boundary.
#[derive(Debug, Clone)]
pub struct DayGrid {
    pub region: RegionId,
    pub days: u8,
    pub mesh: GeomMesh,
}

/// One [`DayGrid`] per month block of `surface`.
pub fn day_grids(
    surface: &TubeSurface,
    radial_segments: usize,
    radius: f64,
) -> SpiralResult<Vec<DayGrid>> {
    let options = TubeOptions {
        radial_segments,
        radius,
    };

    surface
        .blocks
        .iter()
        .enumerate()
        .map(|(i, block)| {
            let days = block.month.days();
            let start = block.first_interval as f64;
            let span = block.interval_count as f64;
            let spine: Vec<SpineSample> = (0..=days)
                .map(|day| {
                    let s = start + span * f64::from(day) / f64::from(days);
                    SpineSample {
                        position: surface.spline.point_at(s),
                        tangent: surface.spline.tangent_at(s),
                    }
                })
                .collect();
            let tube = sweep_tube(&spine, options, Tolerance::default_geom())?;
            Ok(DayGrid {
                region: RegionId(i),
                days,
                mesh: tube.mesh,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spiral::calendar::TimeRange;
    use crate::spiral::config::{ResolutionParams, StyleConfig};
    use crate::spiral::curve::generate_curve;

    fn build(
        range: TimeRange,
        samples_per_year: usize,
        current: Option<CalendarMonth>,
    ) -> SpiralResult<(TubeSurface, Vec<MonthRegion>)> {
        let resolution = ResolutionParams {
            samples_per_year,
            ..ResolutionParams::default()
        };
        let style = StyleConfig::default();
        let curve = generate_curve(&range, &resolution)?;
        let params = SegmentParams {
            radial_segments: resolution.radial_segments,
            tube_radius: resolution.tube_radius,
            subdivisions: resolution.spline_subdivisions,
            palette: &style.palette,
            current,
            current_color: style.current_month_color,
        };
        let months: Vec<_> = range.months().collect();
        segment(&curve, &params, &months)
    }

    #[test]
    fn blocks_give_remainder_to_last_month() {
        let months: Vec<_> = TimeRange::new(2000, 2000).months().collect();
        let blocks = month_blocks(125, &months).unwrap();
        assert_eq!(blocks[0].interval_count, 10);
        assert_eq!(blocks[10].first_interval, 100);
        assert_eq!(blocks[11].first_interval, 110);
        assert_eq!(blocks[11].interval_count, 15);
    }

    #[test]
    fn blocks_reject_too_coarse_resolution() {
        let months: Vec<_> = TimeRange::new(2000, 2000).months().collect();
        assert_eq!(
            month_blocks(11, &months),
            Err(SpiralError::DegenerateGeometry { segments: 11, months: 12 })
        );
        assert!(month_blocks(10, &[]).is_err());
    }

    #[test]
    fn face_ranges_cover_the_tube() {
        let (surface, regions) = build(TimeRange::new(2000, 2001), 120, None).unwrap();
        assert_eq!(regions.len(), 24);
        // 6 radial segments, 2 triangles per quad, 2 rings per interval.
        assert_eq!(surface.faces_per_interval, 24);
        assert_eq!(regions[0].face_range_start, 0);
        assert_eq!(regions[0].face_range_count, 10 * 24);
        for pair in regions.windows(2) {
            assert_eq!(pair[0].face_range().end, pair[1].face_range_start);
        }
        let last = regions.last().unwrap();
        assert_eq!(last.face_range().end, surface.mesh.triangle_count());
    }

    #[test]
    fn palette_by_month_with_current_highlight() {
        let style = StyleConfig::default();
        let current = CalendarMonth { year: 2001, month_index: 4 };
        let (_, regions) = build(TimeRange::new(2000, 2001), 120, Some(current)).unwrap();

        assert_eq!(regions[4].color, style.palette[4]);
        assert!(!regions[4].is_current);
        assert_eq!(regions[16].color, style.current_month_color);
        assert!(regions[16].is_current);
        assert_eq!(regions.iter().filter(|r| r.is_current).count(), 1);
        assert_eq!(regions[13].color, style.palette[1]);
    }

    #[test]
    fn region_bounds_contain_their_faces() {
        let (surface, regions) = build(TimeRange::new(2000, 2000), 120, None).unwrap();
        for region in &regions {
            let bbox = region.bbox.expand_by(1e-9);
            for face in region.face_range() {
                for corner in surface.mesh.triangle(face).unwrap() {
                    assert!(bbox.contains_point(corner));
                }
            }
        }
    }

    #[test]
    fn day_grid_has_one_cell_per_day() {
        let (surface, _) = build(TimeRange::new(2000, 2000), 120, None).unwrap();
        let grids = day_grids(&surface, 6, 0.101).unwrap();
        assert_eq!(grids.len(), 12);
        assert_eq!(grids[1].days, 29);
        assert_eq!(grids[1].mesh.triangle_count(), 29 * faces_per_ring_cell(6));
        assert_eq!(grids[0].mesh.triangle_count(), 31 * faces_per_ring_cell(6));
    }

    #[test]
    fn coarse_resolution_is_degenerate() {
        let err = build(TimeRange::new(2000, 2001), 6, None).unwrap_err();
        assert_eq!(err, SpiralError::DegenerateGeometry { segments: 12, months: 24 });
    }
}
