use winit::{
    event::{ElementState, MouseButton, TouchPhase},
    keyboard::KeyCode,
};

pub type PointerId = u64;

/// The mouse reports as the first pointer.
pub const MOUSE_POINTER: PointerId = 0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    TouchDown {
        x: f32,
        y: f32,
        pointer: PointerId,
        button: MouseButton,
    },
    TouchUp {
        x: f32,
        y: f32,
        pointer: PointerId,
        button: MouseButton,
    },
    TouchDragged {
        x: f32,
        y: f32,
        pointer: PointerId,
    },
    KeyDown(KeyCode),
}

pub fn is_cancel_key(keycode: KeyCode) -> bool {
    matches!(keycode, KeyCode::Escape | KeyCode::BrowserBack)
}

/// Folds raw window events into touch-style events. Mouse presses become
/// pointer `MOUSE_POINTER` and cursor motion while pressed becomes a drag.
#[derive(Debug, Default)]
pub struct InputTranslator {
    cursor: (f32, f32),
    pressed: Option<MouseButton>,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) -> Option<InputEvent> {
        self.cursor = (x, y);
        self.pressed.map(|_| InputEvent::TouchDragged {
            x,
            y,
            pointer: MOUSE_POINTER,
        })
    }

    pub fn mouse_input(&mut self, state: ElementState, button: MouseButton) -> Option<InputEvent> {
        let (x, y) = self.cursor;
        match state {
            ElementState::Pressed if self.pressed.is_none() => {
                self.pressed = Some(button);
                Some(InputEvent::TouchDown {
                    x,
                    y,
                    pointer: MOUSE_POINTER,
                    button,
                })
            }
            ElementState::Released if self.pressed == Some(button) => {
                self.pressed = None;
                Some(InputEvent::TouchUp {
                    x,
                    y,
                    pointer: MOUSE_POINTER,
                    button,
                })
            }
            _ => None,
        }
    }

    pub fn touch(&mut self, phase: TouchPhase, id: u64, x: f32, y: f32) -> InputEvent {
        let button = MouseButton::Left;
        match phase {
            TouchPhase::Started => InputEvent::TouchDown {
                x,
                y,
                pointer: id,
                button,
            },
            TouchPhase::Moved => InputEvent::TouchDragged { x, y, pointer: id },
            TouchPhase::Ended | TouchPhase::Cancelled => InputEvent::TouchUp {
                x,
                y,
                pointer: id,
                button,
            },
        }
    }

    pub fn key(&mut self, state: ElementState, keycode: KeyCode, repeat: bool) -> Option<InputEvent> {
        (state == ElementState::Pressed && !repeat).then_some(InputEvent::KeyDown(keycode))
    }
}
