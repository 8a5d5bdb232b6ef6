#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod spiral;

use std::fmt;

use serde::Serialize;
use spiral::{
    MonthRegion, Rgb, SelectionState, SpiralConfig, SpiralError, SpiralErrorKind, SpiralModel,
    SpiralView, Viewport, build_spiral_model,
};
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("kon rayon threadpool niet initialiseren: {err}")))
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

#[derive(Debug, Serialize, Clone, PartialEq)]
struct MaterialExport {
    color: [f64; 3],
    hex: u32,
    opacity: f64,
    transparent: bool,
    wireframe: bool,
}

impl MaterialExport {
    fn solid(color: Rgb) -> Self {
        Self {
            color: color.to_unit_array(),
            hex: color.0,
            opacity: 1.0,
            transparent: false,
            wireframe: false,
        }
    }

    fn wireframe(color: Rgb, opacity: f64) -> Self {
        Self {
            color: color.to_unit_array(),
            hex: color.0,
            opacity,
            transparent: opacity < 1.0,
            wireframe: true,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
struct FaceGroupExport {
    start: usize,
    count: usize,
    region: usize,
    material: MaterialExport,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type")]
enum GeometryItem<'a> {
    /// Pickable tube surface (or one month of it), drawn per face group.
    Mesh {
        id: usize,
        vertices: &'a [[f64; 3]],
        indices: &'a [u32],
        groups: Vec<FaceGroupExport>,
        pickable: bool,
    },
    /// Day-grid wireframe over one month; never pickable.
    Wireframe {
        region: usize,
        days: u8,
        vertices: &'a [[f64; 3]],
        indices: &'a [u32],
        material: MaterialExport,
    },
}

#[derive(Debug, Serialize)]
struct GeometryExport<'a> {
    background: [f64; 3],
    partition: spiral::PartitionStrategy,
    items: Vec<GeometryItem<'a>>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
struct RegionExport {
    id: usize,
    year: i32,
    month: usize,
    month_name: &'static str,
    label: String,
    face_range_start: usize,
    face_range_count: usize,
    color: u32,
    is_current: bool,
    center: [f64; 3],
}

impl From<&MonthRegion> for RegionExport {
    fn from(region: &MonthRegion) -> Self {
        Self {
            id: region.id.0,
            year: region.year,
            month: region.month_index,
            month_name: region.month_name(),
            label: region.label(),
            face_range_start: region.face_range_start,
            face_range_count: region.face_range_count,
            color: region.color.0,
            is_current: region.is_current,
            center: region.bbox.center().to_array(),
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
struct CameraExport {
    position: [f64; 3],
    quaternion: [f64; 4],
    fov: f64,
    aspect: f64,
    near: f64,
    far: f64,
    depth: f64,
    focused: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
struct SelectionExport {
    hovered: Option<RegionExport>,
    hover_pointer: Option<[f64; 2]>,
    selected: Option<RegionExport>,
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct SpiralEngine {
    view: SpiralView,
}

#[wasm_bindgen]
impl SpiralEngine {
    /// Bouw de spiraal voor `start_year..=end_year` met de standaardinstellingen.
    #[wasm_bindgen(constructor)]
    pub fn new(start_year: i32, end_year: i32) -> Result<SpiralEngine, JsValue> {
        Self::from_config(&SpiralConfig::for_years(start_year, end_year)).map_err(spiral_js_error)
    }

    /// Bouw de spiraal vanuit een configuratie-object. Ontbrekende velden
    /// krijgen hun standaardwaarde.
    #[wasm_bindgen]
    pub fn with_config(config: JsValue) -> Result<SpiralEngine, JsValue> {
        let config: SpiralConfig = if config.is_undefined() || config.is_null() {
            SpiralConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };
        Self::from_config(&config).map_err(spiral_js_error)
    }

    /// Geeft terug of de engine de minimale initialisatie heeft doorlopen.
    /// Een engine bestaat alleen na een geslaagde opbouw.
    #[wasm_bindgen]
    pub fn is_initialized(&self) -> bool {
        true
    }

    /// Haal alle renderbare geometrie op: tube-meshes met materiaalgroepen en
    /// de dagraster-overlays.
    #[wasm_bindgen]
    pub fn get_geometry(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&geometry_export(self.view.model()))
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Haal alle maandregio's op, oudste eerst.
    #[wasm_bindgen]
    pub fn get_regions(&self) -> Result<JsValue, JsValue> {
        let regions: Vec<RegionExport> =
            self.view.model().regions.iter().map(RegionExport::from).collect();
        serde_wasm_bindgen::to_value(&regions).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Verwerk een pointer-move; geeft de maand onder de pointer terug of `null`.
    #[wasm_bindgen]
    pub fn hover(&mut self, pointer_x: f64, pointer_y: f64) -> Result<JsValue, JsValue> {
        let region = self.view.hover(pointer_x, pointer_y).map(RegionExport::from);
        serde_wasm_bindgen::to_value(&region).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Verwerk een klik: selecteer de maand onder de pointer en focus de camera.
    #[wasm_bindgen]
    pub fn click(&mut self, pointer_x: f64, pointer_y: f64) -> Result<JsValue, JsValue> {
        let region = self.view.click(pointer_x, pointer_y).map(RegionExport::from);
        serde_wasm_bindgen::to_value(&region).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Scrollwiel: `delta_y` zoals in `WheelEvent.deltaY`.
    #[wasm_bindgen]
    pub fn wheel(&mut self, delta_y: f64) {
        self.view.wheel(delta_y);
    }

    /// Toetsaanslag (`KeyboardEvent.key`). Geeft terug of de toets is verwerkt.
    #[wasm_bindgen]
    pub fn key(&mut self, name: &str) -> bool {
        self.view.key(name)
    }

    #[wasm_bindgen]
    pub fn set_navigation_offset(&mut self, delta: f64) {
        self.view.set_navigation_offset(delta);
    }

    /// Focus op een maand (0 = januari). Geeft `false` buiten het bereik.
    #[wasm_bindgen]
    pub fn focus_on(&mut self, year: i32, month: u32) -> bool {
        self.view.focus_on(year, month as usize)
    }

    #[wasm_bindgen]
    pub fn reset_camera(&mut self) {
        self.view.reset_camera();
    }

    /// Eén frame verder; geeft de camerapositie om mee te renderen.
    #[wasm_bindgen]
    pub fn tick(&mut self, dt: f64) -> Result<JsValue, JsValue> {
        self.view.tick(dt);
        serde_wasm_bindgen::to_value(&camera_export(&self.view))
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Nieuwe afmetingen en positie van het canvas (client-coördinaten).
    #[wasm_bindgen]
    pub fn resize(&mut self, width: f64, height: f64, left: f64, top: f64) {
        self.view.resize(width, height, left, top);
    }

    #[wasm_bindgen]
    pub fn get_selection(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&selection_export(&self.view))
            .map_err(|err| JsError::new(&err.to_string()).into())
    }
}

impl SpiralEngine {
    fn from_config(config: &SpiralConfig) -> Result<Self, SpiralError> {
        let model = build_spiral_model(config)?;
        debug_log!(
            "spiraal opgebouwd: {} maanden, {} driehoeken",
            model.regions.len(),
            model.surface.mesh.triangle_count()
        );
        Ok(Self {
            view: SpiralView::new(model, Viewport::new(0.0, 0.0, 0.0, 0.0)),
        })
    }
}

fn geometry_export(model: &SpiralModel) -> GeometryExport<'_> {
    let material_of = |region: spiral::RegionId| {
        let color = model.region(region).map_or(Rgb::WHITE, |r| r.color);
        MaterialExport::solid(color)
    };

    let meshes = model
        .scene
        .meshes()
        .iter()
        .enumerate()
        .map(|(id, pick)| GeometryItem::Mesh {
            id,
            vertices: &pick.mesh.mesh().positions,
            indices: &pick.mesh.mesh().indices,
            groups: pick
                .groups
                .iter()
                .map(|group| FaceGroupExport {
                    start: group.start,
                    count: group.count,
                    region: group.region.0,
                    material: material_of(group.region),
                })
                .collect(),
            pickable: true,
        });

    let overlay = &model.config.overlay;
    let wireframes = model.overlays.iter().map(|grid| GeometryItem::Wireframe {
        region: grid.region.0,
        days: grid.days,
        vertices: &grid.mesh.positions,
        indices: &grid.mesh.indices,
        material: MaterialExport::wireframe(overlay.color, overlay.opacity),
    });

    GeometryExport {
        background: model.config.style.background.to_unit_array(),
        partition: model.strategy(),
        items: meshes.chain(wireframes).collect(),
    }
}

fn camera_export(view: &SpiralView) -> CameraExport {
    let camera = view.camera();
    CameraExport {
        position: camera.pose.position.to_array(),
        quaternion: camera.pose.orientation.to_array(),
        fov: camera.fov_y_degrees,
        aspect: camera.aspect,
        near: camera.near,
        far: camera.far,
        depth: view.controller().depth(),
        focused: view.controller().is_focused(),
    }
}

fn selection_export(view: &SpiralView) -> SelectionExport {
    let SelectionState { hover_pointer, .. } = view.selection();
    SelectionExport {
        hovered: view.hovered_region().map(RegionExport::from),
        hover_pointer,
        selected: view.selected_region().map(RegionExport::from),
    }
}

fn spiral_js_error(error: SpiralError) -> JsValue {
    let kind = match error.kind() {
        SpiralErrorKind::InvalidRange => "ongeldig bereik",
        SpiralErrorKind::DegenerateGeometry => "gedegenereerde geometrie",
    };
    js_error(&format!("{kind}: {error}"))
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::{GeometryItem, RegionExport, camera_export, geometry_export, selection_export};
    use crate::spiral::{
        PartitionStrategy, SpiralConfig, SpiralView, Viewport, build_spiral_model_on,
    };
    use time::macros::date;

    fn config(partition: PartitionStrategy) -> SpiralConfig {
        let mut config = SpiralConfig::for_years(2000, 2000);
        config.resolution.partition = partition;
        config
    }

    #[test]
    fn per_mesh_export_has_one_mesh_per_month() {
        let model = build_spiral_model_on(&config(PartitionStrategy::PerMesh), date!(2000 - 05 - 10))
            .expect("model");
        let export = geometry_export(&model);

        let meshes: Vec<_> = export
            .items
            .iter()
            .filter(|item| matches!(item, GeometryItem::Mesh { .. }))
            .collect();
        let wireframes = export.items.len() - meshes.len();
        assert_eq!(meshes.len(), 12);
        assert_eq!(wireframes, 12);

        match meshes[4] {
            GeometryItem::Mesh { groups, pickable, .. } => {
                assert!(*pickable);
                assert_eq!(groups.len(), 1);
                assert_eq!(groups[0].region, 4);
                assert_eq!(groups[0].material.hex, 0xFF_FF_FF);
            }
            other => panic!("verwacht Mesh, kreeg {other:?}"),
        }
    }

    #[test]
    fn face_group_export_shares_one_mesh() {
        let model =
            build_spiral_model_on(&config(PartitionStrategy::FaceGroups), date!(1990 - 01 - 01))
                .expect("model");
        let export = geometry_export(&model);

        match &export.items[0] {
            GeometryItem::Mesh { groups, indices, .. } => {
                assert_eq!(groups.len(), 12);
                assert_eq!(groups[0].material.hex, 0xFF6B6B);
                let total: usize = groups.iter().map(|g| g.count).sum();
                assert_eq!(total * 3, indices.len());
            }
            other => panic!("verwacht Mesh, kreeg {other:?}"),
        }
        assert!(matches!(export.items[1], GeometryItem::Wireframe { .. }));
    }

    #[test]
    fn region_and_camera_exports() {
        let model = build_spiral_model_on(&config(PartitionStrategy::PerMesh), date!(1990 - 01 - 01))
            .expect("model");
        let region = RegionExport::from(&model.regions[0]);
        assert_eq!(region.label, "Jan 2000");
        assert_eq!(region.month_name, "Jan");
        assert_eq!(region.face_range_start, 0);

        let mut view = SpiralView::new(model, Viewport::new(0.0, 0.0, 400.0, 200.0));
        view.set_navigation_offset(2.0);
        view.tick(1.0 / 60.0);
        let camera = camera_export(&view);
        assert_eq!(camera.position, [0.0, 0.0, 3.0]);
        assert_eq!(camera.aspect, 2.0);
        assert!(!camera.focused);

        assert!(view.focus_on(2000, 0));
        let selection = selection_export(&view);
        assert_eq!(selection.selected.map(|r| r.id), Some(0));
        assert!(selection.hovered.is_none());
    }
}
