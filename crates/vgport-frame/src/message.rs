use bytes::{Buf, BufMut, BytesMut};

use crate::opcode::outbound;

/// Window state reported in reply to a stats query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsReport {
    pub input_flags: u32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub focused: bool,
    pub resizable: bool,
    pub iconified: bool,
    pub maximized: bool,
    pub visible: bool,
}

/// A message from the driver to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound<'a> {
    Close,
    Stats(StatsReport),
    /// Diagnostic text.
    Puts(&'a str),
    /// Raw bytes the driver could not interpret, echoed for debugging.
    Inspect(&'a [u8]),
    Reshape {
        window_width: u32,
        window_height: u32,
        frame_width: u32,
        frame_height: u32,
    },
    Ready,
    /// A script was stored under this key.
    DrawReady(&'a [u8]),
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
    MouseScroll {
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
    /// Files dropped onto the window.
    DropPaths(&'a [String]),
    ScriptMiss(&'a [u8]),
    ImageMiss(&'a [u8]),
    FontMiss(&'a [u8]),
}

impl Outbound<'_> {
    /// The wire kind word of this message.
    pub fn kind(&self) -> u32 {
        match self {
            Outbound::Close => outbound::CLOSE,
            Outbound::Stats(_) => outbound::STATS,
            Outbound::Puts(_) => outbound::PUTS,
            Outbound::Inspect(_) => outbound::INSPECT,
            Outbound::Reshape { .. } => outbound::RESHAPE,
            Outbound::Ready => outbound::READY,
            Outbound::DrawReady(_) => outbound::DRAW_READY,
            Outbound::Key { .. } => outbound::KEY,
            Outbound::Codepoint { .. } => outbound::CODEPOINT,
            Outbound::CursorPos { .. } => outbound::CURSOR_POS,
            Outbound::MouseButton { .. } => outbound::MOUSE_BUTTON,
            Outbound::MouseScroll { .. } => outbound::MOUSE_SCROLL,
            Outbound::CursorEnter { .. } => outbound::CURSOR_ENTER,
            Outbound::DropPaths(_) => outbound::DROP_PATHS,
            Outbound::ScriptMiss(_) => outbound::SCRIPT_MISS,
            Outbound::ImageMiss(_) => outbound::IMAGE_MISS,
            Outbound::FontMiss(_) => outbound::FONT_MISS,
        }
    }

    /// Append the kind word and body (everything after the length prefix).
    pub fn encode_payload(&self, dst: &mut BytesMut) {
        dst.put_u32(self.kind());
        match *self {
            Outbound::Close | Outbound::Ready => {}
            Outbound::Stats(stats) => {
                dst.put_u32(stats.input_flags);
                dst.put_i32(stats.x);
                dst.put_i32(stats.y);
                dst.put_i32(stats.width);
                dst.put_i32(stats.height);
                for flag in [
                    stats.focused,
                    stats.resizable,
                    stats.iconified,
                    stats.maximized,
                    stats.visible,
                ] {
                    dst.put_u8(flag as u8);
                }
            }
            Outbound::Puts(text) => dst.put_slice(text.as_bytes()),
            Outbound::Inspect(bytes)
            | Outbound::DrawReady(bytes)
            | Outbound::ScriptMiss(bytes)
            | Outbound::ImageMiss(bytes)
            | Outbound::FontMiss(bytes) => dst.put_slice(bytes),
            Outbound::Reshape {
                window_width,
                window_height,
                frame_width,
                frame_height,
            } => {
                dst.put_u32(window_width);
                dst.put_u32(window_height);
                dst.put_u32(frame_width);
                dst.put_u32(frame_height);
            }
            Outbound::Key {
                key,
                scancode,
                action,
                mods,
            } => {
                dst.put_i32(key);
                dst.put_i32(scancode);
                dst.put_i32(action);
                dst.put_i32(mods);
            }
            Outbound::Codepoint { codepoint, mods } => {
                dst.put_u32(codepoint);
                dst.put_i32(mods);
            }
            Outbound::CursorPos { x, y } => {
                dst.put_f32(x);
                dst.put_f32(y);
            }
            Outbound::MouseButton {
                button,
                action,
                mods,
                x,
                y,
            } => {
                dst.put_i32(button);
                dst.put_i32(action);
                dst.put_i32(mods);
                dst.put_f32(x);
                dst.put_f32(y);
            }
            Outbound::MouseScroll {
                x_offset,
                y_offset,
                x,
                y,
            } => {
                dst.put_f32(x_offset);
                dst.put_f32(y_offset);
                dst.put_f32(x);
                dst.put_f32(y);
            }
            Outbound::CursorEnter { entered, x, y } => {
                dst.put_i32(entered as i32);
                dst.put_f32(x);
                dst.put_f32(y);
            }
            Outbound::DropPaths(paths) => {
                dst.put_u32(paths.len() as u32);
                for path in paths {
                    dst.put_u32(path.len() as u32);
                    dst.put_slice(path.as_bytes());
                }
            }
        }
    }
}

/// Split a decoded outbound payload into its kind word and body.
pub fn split_kind(payload: &[u8]) -> Option<(u32, &[u8])> {
    if payload.len() < 4 {
        return None;
    }
    let mut head = &payload[..4];
    Some((head.get_u32(), &payload[4..]))
}
