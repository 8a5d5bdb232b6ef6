//! Engine configuration.
//!
//! Every field has a default, so a host only has to send the values it wants
//! to change. Hosts pass the configuration as a plain JS object which is
//! deserialised with `serde-wasm-bindgen`.

use serde::{Deserialize, Serialize};

use super::calendar::TimeRange;
use super::error::{SpiralError, SpiralResult};
use super::region::PartitionStrategy;

/// 24-bit `0xRRGGBB` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const WHITE: Self = Self(0xFF_FF_FF);

    #[must_use]
    pub const fn channels(self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    /// Channels scaled to `[0, 1]`, the layout renderers expect.
    #[must_use]
    pub fn to_unit_array(self) -> [f64; 3] {
        self.channels().map(|c| f64::from(c) / 255.0)
    }
}

/// Direction in which the spiral turns as time advances, seen from the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winding {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl Winding {
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Clockwise => -1.0,
            Self::CounterClockwise => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionParams {
    /// Curve intervals per calendar year.
    pub samples_per_year: usize,
    pub turns_per_year: f64,
    /// Spiral radius at the start of the range.
    pub base_radius: f64,
    /// Radius falls linearly to `base_radius * (1 - radius_shrink)` at the end.
    pub radius_shrink: f64,
    pub depth_per_year: f64,
    /// Depth of the first sample.
    pub depth_origin: f64,
    pub winding: Winding,
    pub tube_radius: f64,
    pub radial_segments: usize,
    /// Tube rings per curve interval.
    pub spline_subdivisions: usize,
    pub partition: PartitionStrategy,
}

impl Default for ResolutionParams {
    fn default() -> Self {
        Self {
            samples_per_year: 120,
            turns_per_year: 1.0,
            base_radius: 1.0,
            radius_shrink: 0.7,
            depth_per_year: 3.0,
            depth_origin: 5.0,
            winding: Winding::Clockwise,
            tube_radius: 0.1,
            radial_segments: 6,
            spline_subdivisions: 2,
            partition: PartitionStrategy::PerMesh,
        }
    }
}

impl ResolutionParams {
    pub fn validate(&self) -> SpiralResult<()> {
        if self.samples_per_year == 0 {
            return Err(SpiralError::resolution("samples_per_year", "must be > 0"));
        }
        if !(self.turns_per_year.is_finite() && self.turns_per_year > 0.0) {
            return Err(SpiralError::resolution("turns_per_year", "must be finite and > 0"));
        }
        if !(self.base_radius.is_finite() && self.base_radius > 0.0) {
            return Err(SpiralError::resolution("base_radius", "must be finite and > 0"));
        }
        if !(self.radius_shrink > 0.0 && self.radius_shrink < 1.0) {
            return Err(SpiralError::resolution("radius_shrink", "must be in (0, 1)"));
        }
        if !(self.depth_per_year.is_finite() && self.depth_per_year > 0.0) {
            return Err(SpiralError::resolution("depth_per_year", "must be finite and > 0"));
        }
        if !self.depth_origin.is_finite() {
            return Err(SpiralError::resolution("depth_origin", "must be finite"));
        }
        if !(self.tube_radius.is_finite() && self.tube_radius > 0.0) {
            return Err(SpiralError::resolution("tube_radius", "must be finite and > 0"));
        }
        if self.radial_segments < 3 {
            return Err(SpiralError::resolution("radial_segments", "must be >= 3"));
        }
        if self.spline_subdivisions == 0 {
            return Err(SpiralError::resolution("spline_subdivisions", "must be > 0"));
        }
        Ok(())
    }
}

/// Wireframe that marks the days of each month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub enabled: bool,
    /// Overlay tube radius relative to the month tube.
    pub radius_scale: f64,
    pub color: Rgb,
    pub opacity: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius_scale: 1.01,
            color: Rgb::WHITE,
            opacity: 0.35,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// One color per calendar month, January first.
    pub palette: [Rgb; 12],
    pub current_month_color: Rgb,
    pub background: Rgb,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            palette: [
                Rgb(0xFF6B6B),
                Rgb(0xFF8E53),
                Rgb(0xFFC93C),
                Rgb(0x95E1D3),
                Rgb(0x38E54D),
                Rgb(0x45B7D1),
                Rgb(0x4A90E2),
                Rgb(0x7B68EE),
                Rgb(0xC77DFF),
                Rgb(0xFF69B4),
                Rgb(0xFF1493),
                Rgb(0xDC143C),
            ],
            current_month_color: Rgb::WHITE,
            background: Rgb(0x0A0A0A),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_degrees: f64,
    pub near: f64,
    pub far: f64,
    pub position: [f64; 3],
    pub look_at: [f64; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 2000.0,
            position: [0.0, 0.0, 5.0],
            look_at: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub min_depth: f64,
    pub max_depth: f64,
    /// Depth change per unit of wheel `deltaY`.
    pub wheel_scale: f64,
    /// Depth change per arrow key press.
    pub key_step: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            min_depth: -200.0,
            max_depth: 200.0,
            wheel_scale: 0.01,
            key_step: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Fraction of the remaining distance covered per frame.
    pub damping: f64,
    /// Viewing distance as a multiple of the region's bounding diagonal.
    pub distance_scale: f64,
    /// Scale damping by frame time instead of applying it once per frame.
    pub frame_rate_independent: bool,
    /// Frame rate at which `damping` is exact when `frame_rate_independent` is set.
    pub reference_fps: f64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            damping: 0.08,
            distance_scale: 0.8,
            frame_rate_independent: false,
            reference_fps: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiralConfig {
    pub range: TimeRange,
    pub resolution: ResolutionParams,
    pub overlay: OverlayConfig,
    pub style: StyleConfig,
    pub camera: CameraConfig,
    pub navigation: NavigationConfig,
    pub focus: FocusConfig,
}

impl SpiralConfig {
    /// Default configuration for `start_year..=end_year`.
    #[must_use]
    pub fn for_years(start_year: i32, end_year: i32) -> Self {
        Self {
            range: TimeRange::new(start_year, end_year),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SpiralResult<()> {
        self.range.validate()?;
        self.resolution.validate()?;

        if !(self.overlay.radius_scale.is_finite() && self.overlay.radius_scale > 0.0) {
            return Err(SpiralError::resolution("overlay.radius_scale", "must be finite and > 0"));
        }
        if !(0.0..=1.0).contains(&self.overlay.opacity) {
            return Err(SpiralError::resolution("overlay.opacity", "must be in [0, 1]"));
        }

        let camera = &self.camera;
        if !(camera.fov_y_degrees > 0.0 && camera.fov_y_degrees < 180.0) {
            return Err(SpiralError::resolution("camera.fov_y_degrees", "must be in (0, 180)"));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(SpiralError::resolution("camera.near", "must satisfy 0 < near < far"));
        }
        if camera.position.iter().chain(&camera.look_at).any(|v| !v.is_finite()) {
            return Err(SpiralError::resolution("camera.position", "must be finite"));
        }

        let nav = &self.navigation;
        if !(nav.min_depth.is_finite() && nav.max_depth.is_finite() && nav.min_depth <= nav.max_depth) {
            return Err(SpiralError::resolution("navigation.min_depth", "must be finite and <= max_depth"));
        }
        if !(nav.wheel_scale.is_finite() && nav.key_step.is_finite()) {
            return Err(SpiralError::resolution("navigation.wheel_scale", "must be finite"));
        }

        let focus = &self.focus;
        if !(focus.damping > 0.0 && focus.damping < 1.0) {
            return Err(SpiralError::resolution("focus.damping", "must be in (0, 1)"));
        }
        if !(focus.distance_scale.is_finite() && focus.distance_scale > 0.0) {
            return Err(SpiralError::resolution("focus.distance_scale", "must be finite and > 0"));
        }
        if !(focus.reference_fps.is_finite() && focus.reference_fps > 0.0) {
            return Err(SpiralError::resolution("focus.reference_fps", "must be finite and > 0"));
        }
        Ok(())
    }
}
