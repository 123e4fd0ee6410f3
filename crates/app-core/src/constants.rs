// Shared interaction/layout tuning constants used by the core and the web
// frontend.

// Gaze interaction
pub const ACTIVATION_TIME: f32 = 1.5; // seconds of dwell before a node fires

// Panorama sphere (radius must stay inside the camera far clip)
pub const PANO_SPHERE_RADIUS: f32 = 50.0;

// Hotspot arrows on the panorama floor
pub const HOTSPOT_RADIUS: f32 = 4.0; // distance from the viewer
pub const HOTSPOT_Y: f32 = -2.0; // below eye level, clear of the dock

// Main menu arc
pub const MENU_RADIUS: f32 = 1.5;
pub const MENU_ARC: f32 = std::f32::consts::PI * 0.6;
pub const MENU_Y: f32 = 1.6; // eye level

// Sub-menu bottom dock
pub const SUBMENU_RADIUS: f32 = 1.62;
pub const SUBMENU_ARC: f32 = std::f32::consts::PI * 0.5;
pub const SUBMENU_Y: f32 = -0.6;

// Control dock (back / audio buttons)
pub const DOCK_RADIUS: f32 = 1.6;
pub const DOCK_Y: f32 = -0.6;

// Camera-following docks ease toward the camera yaw each frame, and stop
// following once the user pitches down to select.
pub const DOCK_FOLLOW_EASE: f32 = 0.08;
pub const DOCK_FOLLOW_PITCH_GATE: f32 = -0.26; // radians, ~15 degrees down

// Desktop camera
pub const EYE_HEIGHT: f32 = 1.6;
pub const DEFAULT_FOV_DEG: f32 = 60.0;
pub const MIN_FOV_DEG: f32 = 30.0;
pub const MAX_FOV_DEG: f32 = 90.0;

// Tutorial
pub const TUTORIAL_LOOK_THRESHOLD: f32 = std::f32::consts::PI / 3.0;
pub const TUTORIAL_ORB_DWELL: f32 = 2.0; // seconds, slower than normal buttons
