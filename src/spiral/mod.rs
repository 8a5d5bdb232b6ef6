//! Calendar spiral engine: time range to tube geometry, month regions,
//! picking and camera focus.

mod calendar;
mod config;
mod curve;
mod error;
mod focus;
mod pick;
mod region;
mod segment;
mod view;

pub use calendar::{CalendarMonth, MONTH_NAMES, MONTHS_PER_YEAR, TimeRange, month_name};
pub use config::{
    CameraConfig, FocusConfig, NavigationConfig, OverlayConfig, ResolutionParams, Rgb,
    SpiralConfig, StyleConfig, Winding,
};
pub use curve::{CurveSample, generate_curve, total_samples};
pub use error::{SpiralError, SpiralErrorKind, SpiralResult};
pub use focus::{
    CameraFocusTarget, FocusController, FocusState, InitialCameraState, NavigationInput,
    focus_target_for,
};
pub use pick::{
    CameraPose, PerspectiveCamera, PickHit, PickScene, SelectionState, Viewport, resolve_hit,
};
pub use region::{
    FaceGroup, FaceGroupIndex, HitKey, MeshId, MonthRegion, PartitionStrategy, PerMeshIndex,
    PickMesh, RegionId, RegionIndex,
};
pub use segment::{
    DayGrid, MonthBlock, SegmentParams, TubeSurface, day_grids, month_blocks, segment,
};
pub use view::{SpiralModel, SpiralView, build_spiral_model, build_spiral_model_on};
