//! Keyboard-driven transform editing.
//!
//! The controller only tracks which [`TransformAction`] the keys have put
//! together; front-ends apply the returned action with
//! [`Scene::transform_selected`](crate::scene::Scene::transform_selected)
//! and render.

use crate::transform::{Axis, Operation, TransformAction, TransformTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    /// `m`: switch to moving.
    Move,
    /// `r`: switch to rotating.
    Rotate,
    /// `s`: switch to scaling.
    Scale,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
}

impl Key {
    /// Map a DOM-style key name (`"ArrowLeft"`, `"m"`, ...) to a key.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "Escape" | "Esc" => Key::Escape,
            "m" | "M" => Key::Move,
            "r" | "R" => Key::Rotate,
            "s" | "S" => Key::Scale,
            "ArrowLeft" | "Left" => Key::Left,
            "ArrowRight" | "Right" => Key::Right,
            "ArrowUp" | "Up" => Key::Up,
            "ArrowDown" | "Down" => Key::Down,
            "PageUp" => Key::PageUp,
            "PageDown" => Key::PageDown,
            _ => return None,
        };
        Some(key)
    }
}

/// State changes the front-end may want to surface to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardNotice {
    Enabled,
    Disabled,
    /// The current action was changed.
    Changed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyResponse {
    pub notices: Vec<KeyboardNotice>,
    /// Action to apply to the selection, if the key asked for one.
    pub transform: Option<TransformAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardController {
    enabled: bool,
    action: TransformAction,
}

impl Default for KeyboardController {
    fn default() -> Self {
        Self {
            enabled: true,
            action: TransformAction::default(),
        }
    }
}

impl KeyboardController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn action(&self) -> &TransformAction {
        &self.action
    }

    pub fn handle(&mut self, key: Key) -> KeyResponse {
        let mut response = KeyResponse::default();

        if key == Key::Escape {
            self.enabled = !self.enabled;
            response.notices.push(if self.enabled {
                KeyboardNotice::Enabled
            } else {
                KeyboardNotice::Disabled
            });
            return response;
        }
        if !self.enabled {
            return response;
        }

        match key {
            Key::Move => self.retarget(TransformTarget::Position, 1.0),
            Key::Rotate => self.retarget(TransformTarget::Rotation, 1.0),
            Key::Scale => self.retarget(TransformTarget::Scale, 0.1),
            Key::Left | Key::Right => self.action.axis = Axis::X,
            Key::Up | Key::Down => self.action.axis = Axis::Y,
            Key::PageUp | Key::PageDown => self.action.axis = Axis::Z,
            Key::Escape => {}
        }
        response.notices.push(KeyboardNotice::Changed);

        let operation = match key {
            Key::Right | Key::Up | Key::PageUp => Some(Operation::Plus),
            Key::Left | Key::Down | Key::PageDown => Some(Operation::Minus),
            _ => None,
        };
        if let Some(operation) = operation {
            self.action.operation = operation;
            response.transform = Some(self.action);
        }
        response
    }

    fn retarget(&mut self, target: TransformTarget, unit: f32) {
        self.action.target = target;
        self.action.unit = unit;
    }
}
