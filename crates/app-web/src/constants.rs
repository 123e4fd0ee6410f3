// Web-frontend tuning constants; interaction/layout constants shared with
// the core live in app-core.

// Pointer look sensitivity, radians per CSS pixel
pub const LOOK_SPEED: f32 = 0.004;

// Wheel zoom, FOV degrees per notch
pub const ZOOM_SPEED_DEG: f32 = 2.0;

// Reticle ring size, fraction of viewport height
pub const RETICLE_RADIUS: f32 = 0.012;

// Largest texture edge uploaded to the GPU; larger sources are downscaled
// during canvas readback.
pub const MAX_TEXTURE_EDGE: u32 = 4096;

// Welcome-screen background panorama
pub const WELCOME_PANORAMA: &str = "/assets/welcome-screen.jpg";
