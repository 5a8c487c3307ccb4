//! Frame builders and parsers shared by the unit tests.

use vgport_frame::opcode::inbound;
use vgport_frame::split_kind;

/// Encode an inbound frame.
pub fn frame(opcode: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 8);
    out.extend_from_slice(&(payload.len() as u32 + 4).to_be_bytes());
    out.extend_from_slice(&opcode.to_be_bytes());
    out.extend_from_slice(payload);
    out
}

/// A `u32` key length, the key, then `rest`.
pub fn keyed(key: &[u8], rest: &[u8]) -> Vec<u8> {
    let mut out = (key.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(key);
    out.extend_from_slice(rest);
    out
}

pub fn put_image(key: &[u8], width: u32, height: u32, format: u32, blob: &[u8]) -> Vec<u8> {
    let mut payload = Vec::new();
    for word in [key.len() as u32, blob.len() as u32, width, height, format] {
        payload.extend_from_slice(&word.to_be_bytes());
    }
    payload.extend_from_slice(key);
    payload.extend_from_slice(blob);
    frame(inbound::PUT_IMAGE, &payload)
}

/// Split a captured output stream into `(kind, body)` pairs.
pub fn messages(mut out: &[u8]) -> Vec<(u32, Vec<u8>)> {
    let mut found = Vec::new();
    while out.len() >= 4 {
        let len = u32::from_be_bytes([out[0], out[1], out[2], out[3]]) as usize;
        let (kind, body) = split_kind(&out[4..4 + len]).expect("message kind");
        found.push((kind, body.to_vec()));
        out = &out[4 + len..];
    }
    found
}
