//! The built model and the interactive view over it.
//!
//! [`SpiralModel`] is immutable once built. [`SpiralView`] owns the mutable
//! state of a mounted view (camera, viewport, focus, selection) and is what
//! input handlers and the frame driver call into.

use time::{Date, OffsetDateTime};

use crate::geom::Point3;

use super::calendar::CalendarMonth;
use super::config::SpiralConfig;
use super::curve::{CurveSample, generate_curve};
use super::error::SpiralResult;
use super::focus::{
    FocusController, FocusState, InitialCameraState, NavigationInput, focus_target_for,
};
use super::pick::{
    CameraPose, PerspectiveCamera, PickHit, PickScene, SelectionState, Viewport, resolve_hit,
};
use super::region::{MonthRegion, PartitionStrategy, RegionId, RegionIndex};
use super::segment::{DayGrid, SegmentParams, TubeSurface, day_grids, segment};

#[derive(Debug)]
pub struct SpiralModel {
    pub config: SpiralConfig,
    pub curve: CurveSample,
    pub surface: TubeSurface,
    /// Oldest first; `regions[i].id == RegionId(i)`.
    pub regions: Vec<MonthRegion>,
    pub index: Box<dyn RegionIndex>,
    pub scene: PickScene,
    pub overlays: Vec<DayGrid>,
    pub current_month: CalendarMonth,
}

impl SpiralModel {
    #[must_use]
    pub fn region(&self, id: RegionId) -> Option<&MonthRegion> {
        self.regions.get(id.0)
    }

    #[must_use]
    pub fn region_for(&self, year: i32, month_index: usize) -> Option<&MonthRegion> {
        let ordinal = self.config.range.ordinal_of(year, month_index)?;
        self.regions.get(ordinal)
    }

    #[must_use]
    pub fn strategy(&self) -> PartitionStrategy {
        self.index.strategy()
    }
}

/// Build against today's UTC date.
pub fn build_spiral_model(config: &SpiralConfig) -> SpiralResult<SpiralModel> {
    build_spiral_model_on(config, OffsetDateTime::now_utc().date())
}

/// Build with `today` deciding which month is highlighted as current.
pub fn build_spiral_model_on(config: &SpiralConfig, today: Date) -> SpiralResult<SpiralModel> {
    config.validate()?;
    let resolution = &config.resolution;
    let current_month = CalendarMonth::of_date(today);

    let curve = generate_curve(&config.range, resolution)?;
    let months: Vec<CalendarMonth> = config.range.months().collect();
    let params = SegmentParams {
        radial_segments: resolution.radial_segments,
        tube_radius: resolution.tube_radius,
        subdivisions: resolution.spline_subdivisions,
        palette: &config.style.palette,
        current: Some(current_month),
        current_color: config.style.current_month_color,
    };
    let (surface, regions) = segment(&curve, &params, &months)?;

    let overlays = if config.overlay.enabled {
        day_grids(
            &surface,
            resolution.radial_segments,
            resolution.tube_radius * config.overlay.radius_scale,
        )?
    } else {
        Vec::new()
    };

    let (meshes, index) = resolution.partition.partition(&surface.mesh, &regions);
    let scene = PickScene::new(meshes);

    log::debug!(
        "spiral model: {} regions, {} pickable meshes ({:?}), {} overlays",
        regions.len(),
        scene.meshes().len(),
        resolution.partition,
        overlays.len()
    );

    Ok(SpiralModel {
        config: config.clone(),
        curve,
        surface,
        regions,
        index,
        scene,
        overlays,
        current_month,
    })
}

/// A mounted view: model plus camera, viewport, focus and selection.
#[derive(Debug)]
pub struct SpiralView {
    model: SpiralModel,
    camera: PerspectiveCamera,
    initial: InitialCameraState,
    viewport: Viewport,
    controller: FocusController,
    selection: SelectionState,
}

impl SpiralView {
    #[must_use]
    pub fn new(model: SpiralModel, viewport: Viewport) -> Self {
        let aspect = viewport.aspect().unwrap_or(1.0);
        let camera = PerspectiveCamera::from_config(&model.config.camera, aspect);
        let controller =
            FocusController::new(model.config.navigation.clone(), model.config.focus.clone());
        Self {
            initial: InitialCameraState(camera.pose),
            camera,
            viewport,
            controller,
            selection: SelectionState::default(),
            model,
        }
    }

    #[must_use]
    pub fn model(&self) -> &SpiralModel {
        &self.model
    }

    #[must_use]
    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn controller(&self) -> &FocusController {
        &self.controller
    }

    #[must_use]
    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    #[must_use]
    pub fn selected_region(&self) -> Option<&MonthRegion> {
        self.model.region(self.selection.selected?)
    }

    #[must_use]
    pub fn hovered_region(&self) -> Option<&MonthRegion> {
        self.model.region(self.selection.hovered?)
    }

    /// Month under the pointer (client coordinates), no state change.
    #[must_use]
    pub fn pick(&self, pointer_x: f64, pointer_y: f64) -> Option<PickHit> {
        resolve_hit(
            pointer_x,
            pointer_y,
            &self.viewport,
            &self.camera,
            &self.model.scene,
            self.model.index.as_ref(),
        )
    }

    pub fn hover(&mut self, pointer_x: f64, pointer_y: f64) -> Option<&MonthRegion> {
        let hit = self.pick(pointer_x, pointer_y).map(|h| h.region);
        self.selection.set_hover(hit, [pointer_x, pointer_y]);
        self.hovered_region()
    }

    /// Select and focus the month under the pointer. Empty space changes nothing.
    pub fn click(&mut self, pointer_x: f64, pointer_y: f64) -> Option<&MonthRegion> {
        let hit = self.pick(pointer_x, pointer_y)?;
        self.focus_region(hit.region);
        self.selected_region()
    }

    /// Select and focus a month by date. `false` when it is outside the range.
    pub fn focus_on(&mut self, year: i32, month_index: usize) -> bool {
        match self.model.region_for(year, month_index).map(|r| r.id) {
            Some(id) => {
                self.focus_region(id);
                true
            }
            None => false,
        }
    }

    fn focus_region(&mut self, id: RegionId) {
        let Some(region) = self.model.region(id) else {
            return;
        };
        let target = focus_target_for(
            region.bbox,
            self.camera.pose.position,
            self.model.config.focus.distance_scale,
        );
        log::debug!("focus on {}", region.label());
        self.selection.select(id);
        self.controller.focus(target);
    }

    pub fn set_navigation_offset(&mut self, delta: f64) {
        self.controller.navigate(NavigationInput::Offset(delta));
    }

    pub fn wheel(&mut self, delta_y: f64) {
        self.controller.navigate(NavigationInput::Wheel(delta_y));
    }

    /// Handle a `KeyboardEvent.key`. Returns whether the key was used.
    pub fn key(&mut self, key: &str) -> bool {
        let input = match key {
            "ArrowUp" => NavigationInput::StepBack,
            "ArrowDown" => NavigationInput::StepForward,
            _ => return false,
        };
        self.controller.navigate(input);
        true
    }

    pub fn reset_camera(&mut self) {
        self.controller.reset(&mut self.camera.pose, &self.initial);
        self.selection.clear_selection();
    }

    /// Advance one frame of `dt` seconds and return the pose to render.
    pub fn tick(&mut self, dt: f64) -> CameraPose {
        self.controller.step(&mut self.camera.pose, &self.initial, dt);
        self.camera.pose
    }

    /// New canvas size and position. Safe to call any number of times.
    pub fn resize(&mut self, width: f64, height: f64, left: f64, top: f64) {
        self.viewport = Viewport::new(left, top, width, height);
        if let Some(aspect) = self.viewport.aspect() {
            self.camera.aspect = aspect;
        }
    }

    /// World position of the focus target's look-at point while focused.
    #[must_use]
    pub fn focus_look_at(&self) -> Option<Point3> {
        match self.controller.state() {
            FocusState::Focused(target) => Some(target.look_at),
            FocusState::Free => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn small_config() -> SpiralConfig {
        SpiralConfig::for_years(2000, 2001)
    }

    #[test]
    fn region_for_maps_dates() {
        let model = build_spiral_model_on(&small_config(), date!(2020 - 01 - 01)).unwrap();
        let region = model.region_for(2001, 2).unwrap();
        assert_eq!(region.id, RegionId(14));
        assert_eq!(region.label(), "Mar 2001");
        assert!(model.region_for(2002, 0).is_none());
        assert!(model.regions.iter().all(|r| !r.is_current));
    }

    #[test]
    fn overlays_follow_config() {
        let model = build_spiral_model_on(&small_config(), date!(2020 - 01 - 01)).unwrap();
        assert_eq!(model.overlays.len(), 24);

        let mut config = small_config();
        config.overlay.enabled = false;
        let model = build_spiral_model_on(&config, date!(2020 - 01 - 01)).unwrap();
        assert!(model.overlays.is_empty());
    }

    #[test]
    fn key_handling() {
        let model = build_spiral_model_on(&small_config(), date!(2020 - 01 - 01)).unwrap();
        let mut view = SpiralView::new(model, Viewport::new(0.0, 0.0, 800.0, 600.0));
        assert!(view.key("ArrowDown"));
        assert!(!view.key("Enter"));
        assert_eq!(view.controller().depth(), 5.0);
        let pose = view.tick(1.0 / 60.0);
        assert_eq!(pose.position.z, 0.0);
    }

    #[test]
    fn focus_on_selects_and_focuses() {
        let model = build_spiral_model_on(&small_config(), date!(2020 - 01 - 01)).unwrap();
        let mut view = SpiralView::new(model, Viewport::new(0.0, 0.0, 800.0, 600.0));
        assert!(!view.focus_on(1999, 11));
        assert!(view.focus_on(2000, 6));
        assert_eq!(view.selected_region().map(|r| r.month_index), Some(6));
        assert!(view.controller().is_focused());
        let center = view.model().regions[6].bbox.center();
        assert_eq!(view.focus_look_at(), Some(center));

        view.reset_camera();
        assert!(view.selection().selected.is_none());
        assert!(view.focus_look_at().is_none());
    }

    #[test]
    fn resize_is_idempotent() {
        let model = build_spiral_model_on(&small_config(), date!(2020 - 01 - 01)).unwrap();
        let mut view = SpiralView::new(model, Viewport::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(view.camera().aspect, 1.0);
        view.resize(1600.0, 800.0, 10.0, 20.0);
        let once = (view.viewport(), *view.camera());
        view.resize(1600.0, 800.0, 10.0, 20.0);
        assert_eq!((view.viewport(), *view.camera()), once);
        assert_eq!(view.camera().aspect, 2.0);

        view.resize(1600.0, 0.0, 0.0, 0.0);
        assert_eq!(view.camera().aspect, 2.0);
    }
}
