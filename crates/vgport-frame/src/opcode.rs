//! Opcode and message-kind tables for both directions of the host protocol.

/// Opcodes the host sends to the driver.
pub mod inbound {
    pub const PUT_SCRIPT: u32 = 0x01;
    pub const DELETE_SCRIPT: u32 = 0x02;
    pub const RESET: u32 = 0x03;
    pub const RENDER: u32 = 0x04;
    pub const CLEAR_COLOR: u32 = 0x05;
    pub const DELETE_IMAGE: u32 = 0x06;
    pub const INPUT_FLAGS: u32 = 0x0A;

    pub const QUIT: u32 = 0x20;
    pub const QUERY_STATS: u32 = 0x21;
    pub const RESHAPE: u32 = 0x22;
    pub const POSITION: u32 = 0x23;
    pub const FOCUS: u32 = 0x24;
    pub const ICONIFY: u32 = 0x25;
    pub const MAXIMIZE: u32 = 0x26;
    pub const RESTORE: u32 = 0x27;
    pub const SHOW: u32 = 0x28;
    pub const HIDE: u32 = 0x29;

    pub const PUT_FONT: u32 = 0x40;
    pub const PUT_IMAGE: u32 = 0x41;
    /// Like `PUT_FONT`, but the payload names a file to load the blob from.
    pub const PUT_FONT_FILE: u32 = 0x42;

    /// Test only: terminates the driver.
    pub const CRASH: u32 = 0xFE;
}

/// Message kinds the driver sends to the host.
pub mod outbound {
    pub const CLOSE: u32 = 0x00;
    pub const STATS: u32 = 0x01;
    pub const PUTS: u32 = 0x02;
    /// 0x03 is reserved.
    pub const INSPECT: u32 = 0x04;
    pub const RESHAPE: u32 = 0x05;
    pub const READY: u32 = 0x06;
    pub const DRAW_READY: u32 = 0x07;

    pub const KEY: u32 = 0x0A;
    pub const CODEPOINT: u32 = 0x0B;
    pub const CURSOR_POS: u32 = 0x0C;
    pub const MOUSE_BUTTON: u32 = 0x0D;
    pub const MOUSE_SCROLL: u32 = 0x0E;
    pub const CURSOR_ENTER: u32 = 0x0F;
    pub const DROP_PATHS: u32 = 0x10;

    pub const SCRIPT_MISS: u32 = 0x20;
    pub const IMAGE_MISS: u32 = 0x21;
    pub const FONT_MISS: u32 = 0x22;
}

/// Returns a human-readable name for an inbound opcode.
pub fn opcode_name(op: u32) -> &'static str {
    use inbound::*;
    match op {
        PUT_SCRIPT => "PUT_SCRIPT",
        DELETE_SCRIPT => "DELETE_SCRIPT",
        RESET => "RESET",
        RENDER => "RENDER",
        CLEAR_COLOR => "CLEAR_COLOR",
        DELETE_IMAGE => "DELETE_IMAGE",
        INPUT_FLAGS => "INPUT_FLAGS",
        QUIT => "QUIT",
        QUERY_STATS => "QUERY_STATS",
        RESHAPE => "RESHAPE",
        POSITION => "POSITION",
        FOCUS => "FOCUS",
        ICONIFY => "ICONIFY",
        MAXIMIZE => "MAXIMIZE",
        RESTORE => "RESTORE",
        SHOW => "SHOW",
        HIDE => "HIDE",
        PUT_FONT => "PUT_FONT",
        PUT_IMAGE => "PUT_IMAGE",
        PUT_FONT_FILE => "PUT_FONT_FILE",
        CRASH => "CRASH",
        _ => "UNKNOWN",
    }
}

/// Returns true if the driver has a handler for `op`.
pub fn is_known(op: u32) -> bool {
    opcode_name(op) != "UNKNOWN"
}
