//! Time axis to spiral curve.
//!
//! `t = i / total_samples` runs from 0 at January of the first year to 1 at
//! the end of the last year. The spiral starts wide and shallow and winds
//! inward and deeper as time advances:
//!
//! ```text
//! angle  = sign * t * 2pi * turns_per_year * years
//! radius = base_radius * (1 - radius_shrink * t)
//! z      = depth_origin - t * depth_per_year * years
//! ```

use std::f64::consts::TAU;

use crate::geom::Point3;

use super::calendar::TimeRange;
use super::config::ResolutionParams;
use super::error::{SpiralError, SpiralResult};

/// Control points of the spiral, one more than the number of intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveSample {
    points: Vec<Point3>,
}

impl CurveSample {
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Number of curve intervals, `samples_per_year * years`.
    #[must_use]
    pub fn interval_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }
}

/// Total number of curve intervals for `range`.
pub fn total_samples(range: &TimeRange, params: &ResolutionParams) -> SpiralResult<usize> {
    range.validate()?;
    if params.samples_per_year == 0 {
        return Err(SpiralError::resolution("samples_per_year", "must be > 0"));
    }
    let intervals = params
        .samples_per_year
        .checked_mul(range.years())
        .filter(|n| *n > 0)
        .ok_or(SpiralError::resolution(
            "samples_per_year",
            "too many samples for the time range",
        ))?;

    // The swept tube indexes its vertices with u32.
    let tube_vertices = intervals
        .checked_mul(params.spline_subdivisions)
        .and_then(|rings| rings.checked_add(1))
        .and_then(|rings| rings.checked_mul(params.radial_segments));
    if tube_vertices.is_none_or(|v| v > u32::MAX as usize) {
        return Err(SpiralError::resolution(
            "radial_segments",
            "tube vertex count exceeds u32 indices",
        ));
    }
    Ok(intervals)
}

/// Sample the spiral for `range`. Pure: identical inputs give bit-identical points.
pub fn generate_curve(range: &TimeRange, params: &ResolutionParams) -> SpiralResult<CurveSample> {
    params.validate()?;
    let total = total_samples(range, params)?;

    let years = range.years() as f64;
    let sweep = params.winding.sign() * TAU * params.turns_per_year * years;
    let total_depth = params.depth_per_year * years;

    let points = (0..=total)
        .map(|i| {
            let t = i as f64 / total as f64;
            let angle = t * sweep;
            let radius = params.base_radius * (1.0 - params.radius_shrink * t);
            Point3::new(
                radius * angle.cos(),
                radius * angle.sin(),
                params.depth_origin - t * total_depth,
            )
        })
        .collect();

    log::debug!(
        "curve: {} samples over {} years ({}..={})",
        total + 1,
        range.years(),
        range.start_year,
        range.end_year
    );

    Ok(CurveSample { points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spiral::config::Winding;

    fn params(samples_per_year: usize) -> ResolutionParams {
        ResolutionParams {
            samples_per_year,
            ..ResolutionParams::default()
        }
    }

    #[test]
    fn sample_count_matches_range() {
        let curve = generate_curve(&TimeRange::new(2000, 2001), &params(120)).unwrap();
        assert_eq!(curve.interval_count(), 240);
        assert_eq!(curve.points().len(), 241);
    }

    #[test]
    fn starts_outermost_and_shallowest() {
        let p = params(120);
        let curve = generate_curve(&TimeRange::new(2000, 2003), &p).unwrap();
        let first = curve.points()[0];
        let last = *curve.points().last().unwrap();

        assert_eq!(first, Point3::new(p.base_radius, 0.0, p.depth_origin));
        assert!((last.z - (p.depth_origin - 4.0 * p.depth_per_year)).abs() < 1e-12);

        let radius = |q: Point3| q.x.hypot(q.y);
        assert!((radius(last) - p.base_radius * 0.3).abs() < 1e-12);
        for pair in curve.points().windows(2) {
            assert!(radius(pair[1]) < radius(pair[0]));
            assert!(pair[1].z < pair[0].z);
        }
    }

    #[test]
    fn clockwise_winding_turns_negative() {
        let curve = generate_curve(&TimeRange::new(2000, 2000), &params(120)).unwrap();
        // A quarter year in, clockwise puts the curve below the x axis.
        assert!(curve.points()[30].y < 0.0);

        let ccw = ResolutionParams {
            winding: Winding::CounterClockwise,
            ..params(120)
        };
        let curve = generate_curve(&TimeRange::new(2000, 2000), &ccw).unwrap();
        assert!(curve.points()[30].y > 0.0);
    }

    #[test]
    fn deterministic() {
        let range = TimeRange::new(1990, 2030);
        let a = generate_curve(&range, &params(120)).unwrap();
        let b = generate_curve(&range, &params(120)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(matches!(
            generate_curve(&TimeRange::new(2001, 2000), &params(120)),
            Err(SpiralError::InvalidRange { .. })
        ));
        assert!(matches!(
            generate_curve(&TimeRange::new(2000, 2001), &params(0)),
            Err(SpiralError::InvalidResolution { name: "samples_per_year", .. })
        ));
        assert!(generate_curve(&TimeRange::new(i32::MIN, i32::MAX), &params(120)).is_err());
    }

    #[test]
    fn rejects_tube_too_large_for_u32_indices() {
        let range = TimeRange::new(2000, 2040);
        let wide = ResolutionParams {
            radial_segments: 1 << 20,
            ..params(120)
        };
        assert_eq!(
            total_samples(&range, &wide),
            Err(SpiralError::resolution(
                "radial_segments",
                "tube vertex count exceeds u32 indices"
            ))
        );

        let fine = ResolutionParams {
            spline_subdivisions: 1 << 24,
            ..params(120)
        };
        assert!(total_samples(&range, &fine).is_err());
        assert_eq!(total_samples(&range, &params(120)), Ok(4920));
    }
}
