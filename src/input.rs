use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Tracks keyboard state and the pointer signal.
///
/// The pointer is reported normalized to `[-1, 1]` on both axes with +y up,
/// the convention the model instances follow.
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    cursor: Option<Vec2>,
    viewport: Vec2,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_pressed: HashSet::new(),
            cursor: None,
            viewport: Vec2::ONE,
        }
    }
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the end of each frame to reset per-frame state.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Set the window size in physical pixels used to normalize the cursor.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width.max(1) as f32, height.max(1) as f32);
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            if !self.keys_down.contains(&key) {
                                self.keys_pressed.insert(key);
                            }
                            self.keys_down.insert(key);
                        }
                        ElementState::Released => {
                            self.keys_down.remove(&key);
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            WindowEvent::Resized(size) => {
                self.set_viewport(size.width, size.height);
            }
            _ => {}
        }
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Pointer position in `[-1, 1]` per axis, +y up. Centered when the cursor is
    /// outside the window.
    pub fn pointer(&self) -> Vec2 {
        match self.cursor {
            Some(cursor) => normalize_pointer(cursor, self.viewport),
            None => Vec2::ZERO,
        }
    }
}

fn normalize_pointer(cursor: Vec2, viewport: Vec2) -> Vec2 {
    let x = cursor.x / viewport.x * 2.0 - 1.0;
    let y = -(cursor.y / viewport.y) * 2.0 + 1.0;
    Vec2::new(x, y).clamp(Vec2::splat(-1.0), Vec2::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_corners_map_to_unit_square() {
        let viewport = Vec2::new(800.0, 600.0);
        assert_eq!(normalize_pointer(Vec2::ZERO, viewport), Vec2::new(-1.0, 1.0));
        assert_eq!(normalize_pointer(viewport, viewport), Vec2::new(1.0, -1.0));
        assert_eq!(
            normalize_pointer(Vec2::new(400.0, 300.0), viewport),
            Vec2::ZERO
        );
    }

    #[test]
    fn pointer_is_centered_without_cursor() {
        assert_eq!(Input::new().pointer(), Vec2::ZERO);
    }
}
