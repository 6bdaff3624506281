use crate::view::{ViewController, ViewParameters, Viewport};

use super::state::InputState;
use super::types::{InputEvent, MouseButton, MouseWheelDelta, PointerMoveEvent};

/// Pixels per wheel line when the platform reports line deltas.
pub const LINE_HEIGHT_PX: f32 = 40.0;

/// Maps pointer drags and wheel steps onto the orbit camera.
///
/// A drag is a pointer move while the primary button is held; its delta is
/// measured against the previously tracked pointer position.
#[derive(Debug, Default, Clone, Copy)]
pub struct OrbitControls;

impl OrbitControls {
    /// Feeds one event through `state` and, for drags and wheel steps, into
    /// `params`. Returns `true` when the view parameters changed.
    pub fn apply(
        &self,
        event: &InputEvent,
        state: &mut InputState,
        viewport: Viewport,
        controller: &ViewController,
        params: &mut ViewParameters,
    ) -> bool {
        let previous = state.pointer_pos;
        let dragging = state.button_down(MouseButton::Left);
        state.apply_event(event);

        match event {
            InputEvent::PointerMoved(PointerMoveEvent { x, y }) if dragging => {
                let Some((px, py)) = previous else { return false };
                let (dx, dy) = (x - px, y - py);
                if dx == 0.0 && dy == 0.0 {
                    return false;
                }
                controller.update_from_pointer_drag(dx, dy, viewport, params);
                true
            }

            InputEvent::MouseWheel { delta } => {
                // Scrolling toward the user dollies out.
                let dy = -wheel_pixels(*delta);
                if dy == 0.0 {
                    return false;
                }
                controller.update_from_wheel(dy, params);
                true
            }

            _ => false,
        }
    }
}

fn wheel_pixels(delta: MouseWheelDelta) -> f32 {
    match delta {
        MouseWheelDelta::Line { y, .. } => y * LINE_HEIGHT_PX,
        MouseWheelDelta::Pixel { y, .. } => y,
    }
}
