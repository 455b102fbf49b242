/// Drag-to-rotate state for the orbit view

/// Degrees of rotation per pixel of drag
const DRAG_SENSITIVITY: f32 = 0.1;
/// Degrees per arrow-key press
const KEY_STEP: f32 = 5.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct OrbitControls {
    /// Pitch about the X axis, degrees
    pub rotation_x: f32,
    /// Yaw about the Y axis, degrees
    pub rotation_y: f32,
    dragging: bool,
    cursor: Option<(f64, f64)>,
}

impl OrbitControls {
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Left button press starts a drag anchored at the last known cursor
    /// position; release ends it.
    pub fn on_left_button(&mut self, pressed: bool) {
        self.dragging = pressed;
    }

    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        if self.dragging {
            if let Some((last_x, last_y)) = self.cursor {
                self.rotation_y += (x - last_x) as f32 * DRAG_SENSITIVITY;
                self.rotation_x += (y - last_y) as f32 * DRAG_SENSITIVITY;
            }
        }
        self.cursor = Some((x, y));
    }

    /// Cursor left the window: the next move must not jump.
    pub fn on_cursor_left(&mut self) {
        self.cursor = None;
    }

    pub fn nudge(&mut self, pitch_steps: f32, yaw_steps: f32) {
        self.rotation_x += pitch_steps * KEY_STEP;
        self.rotation_y += yaw_steps * KEY_STEP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_without_drag_do_not_rotate() {
        let mut controls = OrbitControls::default();
        controls.on_cursor_moved(10.0, 10.0);
        controls.on_cursor_moved(200.0, 50.0);
        assert_eq!(controls.rotation_x, 0.0);
        assert_eq!(controls.rotation_y, 0.0);
    }

    #[test]
    fn test_drag_maps_horizontal_to_yaw_and_vertical_to_pitch() {
        let mut controls = OrbitControls::default();
        controls.on_cursor_moved(100.0, 100.0);
        controls.on_left_button(true);
        assert!(controls.is_dragging());
        controls.on_cursor_moved(130.0, 90.0);
        assert!((controls.rotation_y - 3.0).abs() < 1e-5);
        assert!((controls.rotation_x + 1.0).abs() < 1e-5);

        controls.on_left_button(false);
        controls.on_cursor_moved(500.0, 500.0);
        assert!((controls.rotation_y - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_cursor_reentry_does_not_jump() {
        let mut controls = OrbitControls::default();
        controls.on_cursor_moved(0.0, 0.0);
        controls.on_left_button(true);
        controls.on_cursor_left();
        controls.on_cursor_moved(400.0, 300.0);
        assert_eq!(controls.rotation_x, 0.0);
        assert_eq!(controls.rotation_y, 0.0);
        controls.on_cursor_moved(410.0, 300.0);
        assert!((controls.rotation_y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_nudge() {
        let mut controls = OrbitControls::default();
        controls.nudge(-1.0, 2.0);
        assert_eq!(controls.rotation_x, -5.0);
        assert_eq!(controls.rotation_y, 10.0);
    }
}
