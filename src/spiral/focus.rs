//! Camera focus and depth navigation.
//!
//! Two states. `Free`: the camera's z follows the navigation depth.
//! `Focused`: every tick moves the camera a fixed fraction of the way to the
//! target and turns it toward the target's look-at point. Any navigation
//! input drops back to `Free`.

use crate::geom::{BBox, Point3, Vec3};

use super::config::{FocusConfig, NavigationConfig};
use super::pick::CameraPose;

/// Camera pose captured at construction; `reset` restores it exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialCameraState(pub CameraPose);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFocusTarget {
    pub position: Point3,
    pub look_at: Point3,
}

/// View `bbox` from outside, on the side the camera is already on.
#[must_use]
pub fn focus_target_for(bbox: BBox, camera_position: Point3, distance_scale: f64) -> CameraFocusTarget {
    let center = bbox.center();
    let direction = (camera_position - center).normalized().unwrap_or(Vec3::Z);
    CameraFocusTarget {
        position: center + direction * (bbox.diagonal() * distance_scale),
        look_at: center,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FocusState {
    #[default]
    Free,
    Focused(CameraFocusTarget),
}

/// Navigation inputs a host can forward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavigationInput {
    /// Raw depth change.
    Offset(f64),
    /// Mouse wheel `deltaY`.
    Wheel(f64),
    /// Arrow up: move toward the start of the range.
    StepBack,
    /// Arrow down: move toward the end of the range.
    StepForward,
}

#[derive(Debug, Clone)]
pub struct FocusController {
    state: FocusState,
    depth: f64,
    navigation: NavigationConfig,
    focus: FocusConfig,
}

impl FocusController {
    #[must_use]
    pub fn new(navigation: NavigationConfig, focus: FocusConfig) -> Self {
        Self {
            state: FocusState::Free,
            depth: 0.0,
            navigation,
            focus,
        }
    }

    #[must_use]
    pub fn state(&self) -> FocusState {
        self.state
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        matches!(self.state, FocusState::Focused(_))
    }

    #[must_use]
    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn focus(&mut self, target: CameraFocusTarget) {
        self.state = FocusState::Focused(target);
    }

    /// Apply a navigation input: cancels focus, moves depth within the window.
    pub fn navigate(&mut self, input: NavigationInput) {
        let delta = match input {
            NavigationInput::Offset(delta) => delta,
            NavigationInput::Wheel(delta_y) => delta_y * self.navigation.wheel_scale,
            NavigationInput::StepBack => -self.navigation.key_step,
            NavigationInput::StepForward => self.navigation.key_step,
        };
        self.state = FocusState::Free;
        if delta.is_finite() {
            self.depth = (self.depth + delta).clamp(self.navigation.min_depth, self.navigation.max_depth);
        }
    }

    /// Back to `Free` at depth 0 with the camera at its initial pose.
    pub fn reset(&mut self, camera: &mut CameraPose, initial: &InitialCameraState) {
        self.state = FocusState::Free;
        self.depth = 0.0;
        *camera = initial.0;
    }

    /// Interpolation factor for a frame of `dt` seconds.
    #[must_use]
    pub fn damping_for(&self, dt: f64) -> f64 {
        let alpha = self.focus.damping;
        if !self.focus.frame_rate_independent || !(dt.is_finite() && dt >= 0.0) {
            return alpha;
        }
        1.0 - (1.0 - alpha).powf(dt * self.focus.reference_fps)
    }

    /// Advance one frame.
    pub fn step(&self, camera: &mut CameraPose, initial: &InitialCameraState, dt: f64) {
        match self.state {
            FocusState::Focused(target) => {
                let position = camera.position.lerp(target.position, self.damping_for(dt));
                let facing = CameraPose::looking_at(position, target.look_at);
                camera.position = position;
                if position != target.look_at {
                    camera.orientation = facing.orientation;
                }
            }
            FocusState::Free => {
                camera.position.z = initial.0.position.z - self.depth;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Quat;

    fn initial() -> InitialCameraState {
        InitialCameraState(CameraPose::looking_at(Point3::new(0.0, 0.0, 5.0), Point3::ORIGIN))
    }

    fn controller() -> FocusController {
        FocusController::new(NavigationConfig::default(), FocusConfig::default())
    }

    #[test]
    fn free_state_follows_depth() {
        let mut c = controller();
        let mut camera = initial().0;
        c.navigate(NavigationInput::Offset(3.0));
        c.step(&mut camera, &initial(), 1.0 / 60.0);
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 2.0));

        c.navigate(NavigationInput::Wheel(100.0));
        c.navigate(NavigationInput::StepBack);
        assert!((c.depth() - (3.0 + 1.0 - 5.0)).abs() < 1e-12);
    }

    #[test]
    fn depth_is_clamped() {
        let mut c = controller();
        for _ in 0..100 {
            c.navigate(NavigationInput::StepForward);
            assert!(c.depth() <= 200.0);
        }
        assert_eq!(c.depth(), 200.0);
        c.navigate(NavigationInput::Offset(-1e9));
        assert_eq!(c.depth(), -200.0);
        c.navigate(NavigationInput::Offset(f64::NAN));
        assert_eq!(c.depth(), -200.0);
    }

    #[test]
    fn focus_moves_a_fixed_fraction_per_frame() {
        let mut c = controller();
        let mut camera = initial().0;
        let target = CameraFocusTarget {
            position: Point3::new(10.0, 0.0, 5.0),
            look_at: Point3::new(10.0, 0.0, 0.0),
        };
        c.focus(target);
        c.step(&mut camera, &initial(), 1.0);
        assert!((camera.position.x - 0.8).abs() < 1e-12);
        for _ in 0..400 {
            c.step(&mut camera, &initial(), 1.0 / 60.0);
        }
        assert!(camera.position.distance_to(target.position) < 1e-9);
        let forward = camera.orientation.rotate_vec(-Vec3::Z);
        assert!((forward.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn navigation_cancels_focus() {
        let mut c = controller();
        let mut camera = initial().0;
        c.focus(CameraFocusTarget {
            position: Point3::new(4.0, 4.0, 4.0),
            look_at: Point3::ORIGIN,
        });
        c.step(&mut camera, &initial(), 1.0 / 60.0);
        c.navigate(NavigationInput::Offset(0.0));
        assert_eq!(c.state(), FocusState::Free);

        let before = camera;
        c.step(&mut camera, &initial(), 1.0 / 60.0);
        assert_eq!(camera.position.x, before.position.x);
        assert_eq!(camera.position.y, before.position.y);
        assert_eq!(camera.position.z, 5.0);
        assert_eq!(camera.orientation, before.orientation);
    }

    #[test]
    fn reset_restores_initial_pose() {
        let mut c = controller();
        let mut camera = initial().0;
        c.navigate(NavigationInput::Offset(20.0));
        c.focus(CameraFocusTarget {
            position: Point3::new(1.0, 2.0, 3.0),
            look_at: Point3::new(0.0, 1.0, 0.0),
        });
        for _ in 0..10 {
            c.step(&mut camera, &initial(), 1.0 / 60.0);
        }
        c.reset(&mut camera, &initial());
        assert_eq!(camera, initial().0);
        assert_eq!(camera.orientation, Quat::IDENTITY);
        assert_eq!(c.depth(), 0.0);
        assert!(!c.is_focused());
    }

    #[test]
    fn frame_rate_independent_damping() {
        let focus = FocusConfig {
            frame_rate_independent: true,
            ..FocusConfig::default()
        };
        let c = FocusController::new(NavigationConfig::default(), focus);
        assert!((c.damping_for(1.0 / 60.0) - 0.08).abs() < 1e-12);
        let two_frames = 1.0 - (1.0f64 - 0.08).powi(2);
        assert!((c.damping_for(2.0 / 60.0) - two_frames).abs() < 1e-12);
        assert_eq!(controller().damping_for(0.5), 0.08);
    }

    #[test]
    fn target_sits_outside_the_box_toward_the_camera() {
        let bbox = BBox::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let target = focus_target_for(bbox, Point3::new(0.0, 0.0, 10.0), 0.8);
        assert_eq!(target.look_at, Point3::ORIGIN);
        let expected = 12f64.sqrt() * 0.8;
        assert!((target.position.z - expected).abs() < 1e-12);

        let fallback = focus_target_for(bbox, Point3::ORIGIN, 1.0);
        assert!((fallback.position.z - 12f64.sqrt()).abs() < 1e-12);
    }
}
