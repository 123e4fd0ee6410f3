//! Flat-camera pose source: yaw/pitch orbit at eye height with FOV zoom.
//!
//! Pure glam math, no platform types. The gaze cast consumes only the
//! `(origin, direction)` pair this produces, so a head-tracked XR pose can
//! stand in without the core noticing.

use app_core::{DEFAULT_FOV_DEG, EYE_HEIGHT, MAX_FOV_DEG, MIN_FOV_DEG};
use glam::{Mat4, Vec3};

const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

#[derive(Clone, Copy, Debug)]
pub struct OrbitCamera {
    /// Radians, 0 looks down -Z, positive turns right.
    pub yaw: f32,
    /// Radians, positive looks up; clamped shy of the poles.
    pub pitch: f32,
    pub fov_deg: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            fov_deg: DEFAULT_FOV_DEG,
        }
    }
}

impl OrbitCamera {
    pub fn eye(&self) -> Vec3 {
        Vec3::new(0.0, EYE_HEIGHT, 0.0)
    }

    /// World look direction for the current yaw/pitch.
    pub fn look_dir(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(sy * cp, sp, -cy * cp).normalize()
    }

    /// Drag-to-look: CSS-pixel deltas scaled by a sensitivity.
    pub fn apply_drag(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.yaw += dx * sensitivity;
        self.pitch = (self.pitch - dy * sensitivity).clamp(-1.5, 1.5);
    }

    /// Wheel FOV zoom, clamped to the panorama-friendly range.
    pub fn apply_zoom(&mut self, notches: f32, speed_deg: f32) {
        self.fov_deg = (self.fov_deg + notches * speed_deg).clamp(MIN_FOV_DEG, MAX_FOV_DEG);
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_deg.to_radians(), aspect.max(1e-3), Z_NEAR, Z_FAR);
        let eye = self.eye();
        let view = Mat4::look_at_rh(eye, eye + self.look_dir(), Vec3::Y);
        proj * view
    }

    /// Gaze ray: eye origin, center-of-view direction.
    pub fn gaze(&self) -> (Vec3, Vec3) {
        (self.eye(), self.look_dir())
    }
}
