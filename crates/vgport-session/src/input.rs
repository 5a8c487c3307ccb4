//! Window input and its translation into outbound messages.
//!
//! The host opts into each kind of input with a bit in the input-flags word.
//! Close requests are always forwarded so the host can decide whether the
//! window really goes away.

use vgport_frame::Outbound;

pub const KEY_MASK: u32 = 0x01;
pub const CODEPOINT_MASK: u32 = 0x02;
pub const CURSOR_POS_MASK: u32 = 0x04;
pub const MOUSE_BUTTON_MASK: u32 = 0x08;
pub const SCROLL_MASK: u32 = 0x10;
pub const CURSOR_ENTER_MASK: u32 = 0x20;
pub const DROP_PATHS_MASK: u32 = 0x40;
pub const RESHAPE_MASK: u32 = 0x80;

/// Something the window reported.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: i32,
        scancode: i32,
        action: i32,
        mods: i32,
    },
    Codepoint {
        codepoint: u32,
        mods: i32,
    },
    CursorPos {
        x: f32,
        y: f32,
    },
    MouseButton {
        button: i32,
        action: i32,
        mods: i32,
        x: f32,
        y: f32,
    },
    Scroll {
        x_offset: f32,
        y_offset: f32,
        x: f32,
        y: f32,
    },
    CursorEnter {
        entered: bool,
        x: f32,
        y: f32,
    },
    /// Files dropped onto the window, in drop order.
    DropPaths(Vec<String>),
    Reshape {
        window_width: u32,
        window_height: u32,
        frame_width: u32,
        frame_height: u32,
    },
    /// The user asked to close the window.
    Close,
}

impl InputEvent {
    /// The flag bit that enables this event, or `None` if it is always sent.
    pub fn mask(&self) -> Option<u32> {
        match self {
            InputEvent::Key { .. } => Some(KEY_MASK),
            InputEvent::Codepoint { .. } => Some(CODEPOINT_MASK),
            InputEvent::CursorPos { .. } => Some(CURSOR_POS_MASK),
            InputEvent::MouseButton { .. } => Some(MOUSE_BUTTON_MASK),
            InputEvent::Scroll { .. } => Some(SCROLL_MASK),
            InputEvent::CursorEnter { .. } => Some(CURSOR_ENTER_MASK),
            InputEvent::DropPaths(_) => Some(DROP_PATHS_MASK),
            InputEvent::Reshape { .. } => Some(RESHAPE_MASK),
            InputEvent::Close => None,
        }
    }

    pub fn to_outbound(&self) -> Outbound<'_> {
        match *self {
            InputEvent::Key {
                key,
                scancode,
                action,
                mods,
            } => Outbound::Key {
                key,
                scancode,
                action,
                mods,
            },
            InputEvent::Codepoint { codepoint, mods } => Outbound::Codepoint { codepoint, mods },
            InputEvent::CursorPos { x, y } => Outbound::CursorPos { x, y },
            InputEvent::MouseButton {
                button,
                action,
                mods,
                x,
                y,
            } => Outbound::MouseButton {
                button,
                action,
                mods,
                x,
                y,
            },
            InputEvent::Scroll {
                x_offset,
                y_offset,
                x,
                y,
            } => Outbound::MouseScroll {
                x_offset,
                y_offset,
                x,
                y,
            },
            InputEvent::CursorEnter { entered, x, y } => Outbound::CursorEnter { entered, x, y },
            InputEvent::DropPaths(ref paths) => Outbound::DropPaths(paths),
            InputEvent::Reshape {
                window_width,
                window_height,
                frame_width,
                frame_height,
            } => Outbound::Reshape {
                window_width,
                window_height,
                frame_width,
                frame_height,
            },
            InputEvent::Close => Outbound::Close,
        }
    }
}

/// Decides which input events reach the host.
#[derive(Debug, Clone, Default)]
pub struct InputFilter {
    flags: u32,
    last_cursor: Option<(f32, f32)>,
}

impl InputFilter {
    pub fn new(flags: u32) -> Self {
        Self {
            flags,
            last_cursor: None,
        }
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn set_flags(&mut self, flags: u32) {
        self.flags = flags;
    }

    /// Returns the message to send for `event`, if any.
    ///
    /// Cursor positions equal to the last one sent are dropped.
    pub fn admit<'e>(&mut self, event: &'e InputEvent) -> Option<Outbound<'e>> {
        if let Some(mask) = event.mask() {
            if self.flags & mask == 0 {
                return None;
            }
        }

        if let InputEvent::CursorPos { x, y } = *event {
            if self.last_cursor == Some((x, y)) {
                return None;
            }
            self.last_cursor = Some((x, y));
        }

        Some(event.to_outbound())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> InputEvent {
        InputEvent::Key {
            key: 65,
            scancode: 38,
            action: 1,
            mods: 0,
        }
    }

    #[test]
    fn masked_events_are_dropped() {
        let mut filter = InputFilter::default();
        assert_eq!(filter.admit(&key()), None);

        filter.set_flags(KEY_MASK);
        assert!(matches!(filter.admit(&key()), Some(Outbound::Key { key: 65, .. })));
        assert_eq!(
            filter.admit(&InputEvent::Scroll {
                x_offset: 0.0,
                y_offset: 1.0,
                x: 2.0,
                y: 3.0,
            }),
            None
        );
    }

    #[test]
    fn close_ignores_flags() {
        let mut filter = InputFilter::new(0);
        assert_eq!(filter.admit(&InputEvent::Close), Some(Outbound::Close));
    }

    #[test]
    fn repeated_cursor_position_sent_once() {
        let mut filter = InputFilter::new(CURSOR_POS_MASK);
        let at = |x, y| InputEvent::CursorPos { x, y };

        assert!(filter.admit(&at(1.0, 2.0)).is_some());
        assert!(filter.admit(&at(1.0, 2.0)).is_none());
        assert!(filter.admit(&at(1.5, 2.0)).is_some());
        assert!(filter.admit(&at(1.0, 2.0)).is_some());
    }

    #[test]
    fn masked_cursor_does_not_update_last_position() {
        let mut filter = InputFilter::new(0);
        assert!(filter.admit(&InputEvent::CursorPos { x: 4.0, y: 4.0 }).is_none());

        filter.set_flags(CURSOR_POS_MASK);
        assert!(filter.admit(&InputEvent::CursorPos { x: 4.0, y: 4.0 }).is_some());
    }

    #[test]
    fn drop_paths_need_their_bit() {
        let dropped = InputEvent::DropPaths(vec!["/tmp/a.png".to_string()]);
        let mut filter = InputFilter::new(KEY_MASK);
        assert_eq!(filter.admit(&dropped), None);

        filter.set_flags(DROP_PATHS_MASK);
        assert_eq!(
            filter.admit(&dropped),
            Some(Outbound::DropPaths(&["/tmp/a.png".to_string()]))
        );
    }

    #[test]
    fn reshape_requires_its_own_bit() {
        let reshape = InputEvent::Reshape {
            window_width: 10,
            window_height: 20,
            frame_width: 10,
            frame_height: 20,
        };
        let mut filter = InputFilter::new(0x7F);
        assert_eq!(filter.admit(&reshape), None);

        filter.set_flags(RESHAPE_MASK);
        assert!(matches!(
            filter.admit(&reshape),
            Some(Outbound::Reshape {
                window_width: 10,
                ..
            })
        ));
    }
}
