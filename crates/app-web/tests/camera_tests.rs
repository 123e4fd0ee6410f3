// Host-side tests for the pure camera math.
// The main crate is wasm-only, so we include the pure-Rust module directly.

#![allow(dead_code)]
mod camera {
    include!("../src/camera.rs");
}

use app_core::{DEFAULT_FOV_DEG, EYE_HEIGHT, MAX_FOV_DEG, MIN_FOV_DEG};
use camera::*;

#[test]
fn default_camera_looks_forward_from_eye_height() {
    let cam = OrbitCamera::default();
    let (origin, dir) = cam.gaze();
    assert_eq!(origin, glam::Vec3::new(0.0, EYE_HEIGHT, 0.0));
    assert!((dir - glam::Vec3::NEG_Z).length() < 1e-6);
    assert_eq!(cam.fov_deg, DEFAULT_FOV_DEG);
}

#[test]
fn yaw_quarter_turn_looks_right() {
    let cam = OrbitCamera {
        yaw: std::f32::consts::FRAC_PI_2,
        ..Default::default()
    };
    let dir = cam.look_dir();
    assert!((dir.x - 1.0).abs() < 1e-6);
    assert!(dir.z.abs() < 1e-6);
}

#[test]
fn pitch_is_clamped_shy_of_the_poles() {
    let mut cam = OrbitCamera::default();
    // A huge downward drag cannot flip the camera.
    cam.apply_drag(0.0, 10_000.0, 0.004);
    assert!(cam.pitch >= -1.5);
    let dir = cam.look_dir();
    assert!(dir.is_finite());
    cam.apply_drag(0.0, -20_000.0, 0.004);
    assert!(cam.pitch <= 1.5);
}

#[test]
fn zoom_clamps_to_fov_range() {
    let mut cam = OrbitCamera::default();
    for _ in 0..100 {
        cam.apply_zoom(-1.0, 2.0);
    }
    assert_eq!(cam.fov_deg, MIN_FOV_DEG);
    for _ in 0..100 {
        cam.apply_zoom(1.0, 2.0);
    }
    assert_eq!(cam.fov_deg, MAX_FOV_DEG);
}

#[test]
fn view_proj_is_invertible() {
    let cam = OrbitCamera {
        yaw: 0.7,
        pitch: -0.3,
        fov_deg: 60.0,
    };
    let m = cam.view_proj(16.0 / 9.0);
    let det = m.determinant();
    assert!(det.is_finite() && det != 0.0);
}
