//! Mouse device state consumed by the picking controller
//!
//! The device is the event source for picking: window code feeds it raw
//! movement, button and wheel input, and the device queues [`MouseEvent`]s
//! carrying a viewport-relative position (pixels from the bottom-left
//! corner) until the picking controller drains them. The
//! device also owns the propagation flag that entity handlers use to stop
//! dispatch to entities further down the hit list.

use crate::foundation::math::Vec2;
use bitflags::bitflags;
use std::collections::VecDeque;

bitflags! {
    /// Set of mouse buttons currently held down
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MouseButtons: u8 {
        /// Left mouse button
        const LEFT = 0b001;
        /// Middle mouse button
        const MIDDLE = 0b010;
        /// Right mouse button
        const RIGHT = 0b100;
    }
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Middle mouse button
    Middle,
    /// Right mouse button
    Right,
}

impl MouseButton {
    /// Button from a DOM-style button code (0 left, 1 middle, 2 right)
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Left),
            1 => Some(Self::Middle),
            2 => Some(Self::Right),
            _ => None,
        }
    }

    /// DOM-style button code
    pub fn code(self) -> u32 {
        match self {
            Self::Left => 0,
            Self::Middle => 1,
            Self::Right => 2,
        }
    }

    fn flag(self) -> MouseButtons {
        match self {
            Self::Left => MouseButtons::LEFT,
            Self::Middle => MouseButtons::MIDDLE,
            Self::Right => MouseButtons::RIGHT,
        }
    }
}

/// Kind of raw mouse event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    /// Cursor moved
    Move,
    /// Button pressed
    Down,
    /// Button released
    Up,
    /// Wheel scrolled
    Scroll,
}

impl MouseEventKind {
    /// Event name as emitted by the device
    pub fn name(self) -> &'static str {
        match self {
            Self::Move => "mousemove",
            Self::Down => "mousedown",
            Self::Up => "mouseup",
            Self::Scroll => "mousescroll",
        }
    }
}

/// A mouse event emitted by [`MouseDevice`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// What happened
    pub kind: MouseEventKind,
    /// X position in pixels, relative to the viewport's left edge
    pub relative_x: f32,
    /// Y position in pixels, relative to the viewport's bottom edge
    pub relative_y: f32,
    /// Button involved in a press/release
    pub button: Option<MouseButton>,
    /// Wheel delta for scroll events
    pub scroll_delta: f32,
}

impl MouseEvent {
    /// Create an event at a position
    pub fn new(kind: MouseEventKind, relative_x: f32, relative_y: f32) -> Self {
        Self {
            kind,
            relative_x,
            relative_y,
            button: None,
            scroll_delta: 0.0,
        }
    }

    /// Position as a vector
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.relative_x, self.relative_y)
    }
}

/// Mouse state and event source
#[derive(Debug, Clone)]
pub struct MouseDevice {
    viewport_height: f32,
    position: Vec2,
    buttons: MouseButtons,
    propagation_enabled: bool,
    pending: VecDeque<MouseEvent>,
}

impl MouseDevice {
    /// Create a device for a viewport of the given height in pixels
    ///
    /// The height converts window coordinates (top-left origin) into
    /// viewport-relative ones (bottom-left origin).
    pub fn new(viewport_height: f32) -> Self {
        Self {
            viewport_height,
            position: Vec2::zeros(),
            buttons: MouseButtons::empty(),
            propagation_enabled: true,
            pending: VecDeque::new(),
        }
    }

    /// Update viewport height after a resize
    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height;
    }

    /// Last known viewport-relative position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Buttons currently held
    pub fn buttons(&self) -> MouseButtons {
        self.buttons
    }

    /// Whether a button is currently held
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.buttons.contains(button.flag())
    }

    /// Window cursor moved (top-left origin pixels)
    pub fn cursor_moved(&mut self, window_x: f32, window_y: f32) {
        self.position = Vec2::new(window_x, self.viewport_height - window_y);
        self.pending.push_back(MouseEvent::new(MouseEventKind::Move, self.position.x, self.position.y));
    }

    /// Button pressed at the current position
    pub fn button_pressed(&mut self, button: MouseButton) {
        self.buttons.insert(button.flag());
        let mut event = MouseEvent::new(MouseEventKind::Down, self.position.x, self.position.y);
        event.button = Some(button);
        self.pending.push_back(event);
    }

    /// Button released at the current position
    pub fn button_released(&mut self, button: MouseButton) {
        self.buttons.remove(button.flag());
        let mut event = MouseEvent::new(MouseEventKind::Up, self.position.x, self.position.y);
        event.button = Some(button);
        self.pending.push_back(event);
    }

    /// Wheel scrolled at the current position
    pub fn scrolled(&mut self, delta: f32) {
        let mut event = MouseEvent::new(MouseEventKind::Scroll, self.position.x, self.position.y);
        event.scroll_delta = delta;
        self.pending.push_back(event);
    }

    /// Number of queued events
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Take all events emitted since the last call, oldest first
    pub fn drain_events(&mut self) -> Vec<MouseEvent> {
        self.pending.drain(..).collect()
    }

    /// Stop dispatch to further entities for the current event
    pub fn stop_event_propagation(&mut self) {
        self.propagation_enabled = false;
    }

    /// Re-enable dispatch
    pub fn enable_event_propagation(&mut self) {
        self.propagation_enabled = true;
    }

    /// Whether dispatch should continue
    pub fn is_event_propagation_enabled(&self) -> bool {
        self.propagation_enabled
    }
}

impl Default for MouseDevice {
    fn default() -> Self {
        Self::new(720.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_position_is_bottom_left_relative() {
        let mut device = MouseDevice::new(600.0);
        device.cursor_moved(100.0, 150.0);

        let event = device.drain_events()[0];
        assert_eq!(event.kind, MouseEventKind::Move);
        assert_eq!(event.relative_x, 100.0);
        assert_eq!(event.relative_y, 450.0);
    }

    #[test]
    fn test_button_state_tracking() {
        let mut device = MouseDevice::default();
        device.button_pressed(MouseButton::Left);
        device.button_pressed(MouseButton::Right);
        assert_eq!(device.buttons(), MouseButtons::LEFT | MouseButtons::RIGHT);

        device.button_released(MouseButton::Left);
        let up = device.drain_events().pop().unwrap();
        assert_eq!(up.kind, MouseEventKind::Up);
        assert_eq!(up.button, Some(MouseButton::Left));
        assert!(!device.is_pressed(MouseButton::Left));
        assert!(device.is_pressed(MouseButton::Right));
    }

    #[test]
    fn test_pending_events_drain_in_order() {
        let mut device = MouseDevice::default();
        device.cursor_moved(1.0, 1.0);
        device.scrolled(-3.0);

        let kinds: Vec<_> = device.drain_events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![MouseEventKind::Move, MouseEventKind::Scroll]);
        assert!(device.drain_events().is_empty());
    }

    #[test]
    fn test_propagation_flag() {
        let mut device = MouseDevice::default();
        assert!(device.is_event_propagation_enabled());
        device.stop_event_propagation();
        assert!(!device.is_event_propagation_enabled());
        device.enable_event_propagation();
        assert!(device.is_event_propagation_enabled());
    }

    #[test]
    fn test_button_codes() {
        assert_eq!(MouseButton::from_code(2), Some(MouseButton::Right));
        assert_eq!(MouseButton::from_code(5), None);
        assert_eq!(MouseButton::Middle.code(), 1);
    }
}
