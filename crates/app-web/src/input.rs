use glam::Vec2;

#[derive(Default, Clone, Copy)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    pub down: bool,
}

impl PointerState {
    /// Update from a pointer-move and return the CSS-pixel delta while the
    /// button is held (zero otherwise).
    pub fn track(&mut self, x: f32, y: f32) -> Vec2 {
        let delta = if self.down {
            Vec2::new(x - self.x, y - self.y)
        } else {
            Vec2::ZERO
        };
        self.x = x;
        self.y = y;
        delta
    }
}

/// Normalize `WheelEvent::delta_y` into zoom notches (+1 out, -1 in).
#[inline]
pub fn wheel_notches(delta_y: f64) -> f32 {
    if delta_y > 0.0 {
        1.0
    } else if delta_y < 0.0 {
        -1.0
    } else {
        0.0
    }
}
