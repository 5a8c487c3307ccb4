//! Encoder for render-script bytecode, the inverse of [`crate::op`].

use crate::canvas::{Color, LineCap, LineJoin, TextAlign, TextBaseline};
use crate::decode::padded_len;
use crate::op;

/// Builds a script buffer one instruction at a time.
///
/// ```
/// use vgport_script::{Color, ScriptBuilder};
///
/// let script = ScriptBuilder::new()
///     .fill_color(Color::rgba(255, 0, 0, 255))
///     .rect(10.0, 10.0, true, false)
///     .finish();
/// assert_eq!(script.len(), 8 + 12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptBuilder {
    buf: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    /// Append a raw header, for ops this builder has no method for.
    pub fn op(mut self, op: u16, param: u16) -> Self {
        self.buf.extend_from_slice(&op.to_be_bytes());
        self.buf.extend_from_slice(&param.to_be_bytes());
        self
    }

    pub fn floats(mut self, values: &[f32]) -> Self {
        for v in values {
            self.buf.extend_from_slice(&v.to_be_bytes());
        }
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    fn padded(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self.buf.resize(self.buf.len() + padded_len(bytes.len()) - bytes.len(), 0);
        self
    }

    fn flags(fill: bool, stroke: bool) -> u16 {
        u16::from(fill) | (u16::from(stroke) << 1)
    }

    fn keyed(self, code: u16, key: &[u8]) -> Self {
        self.op(code, key_len(key)).padded(key)
    }

    pub fn line(self, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        self.op(op::DRAW_LINE, op::DrawFlags::STROKE)
            .floats(&[x0, y0, x1, y1])
    }

    pub fn triangle(self, points: [f32; 6], fill: bool, stroke: bool) -> Self {
        self.op(op::DRAW_TRIANGLE, Self::flags(fill, stroke))
            .floats(&points)
    }

    pub fn rect(self, w: f32, h: f32, fill: bool, stroke: bool) -> Self {
        self.op(op::DRAW_RECT, Self::flags(fill, stroke)).floats(&[w, h])
    }

    pub fn rounded_rect(self, w: f32, h: f32, radius: f32, fill: bool, stroke: bool) -> Self {
        self.op(op::DRAW_RRECT, Self::flags(fill, stroke))
            .floats(&[w, h, radius])
    }

    pub fn arc(self, radius: f32, angle: f32, fill: bool, stroke: bool) -> Self {
        self.op(op::DRAW_ARC, Self::flags(fill, stroke))
            .floats(&[radius, angle])
    }

    pub fn sector(self, radius: f32, angle: f32, fill: bool, stroke: bool) -> Self {
        self.op(op::DRAW_SECTOR, Self::flags(fill, stroke))
            .floats(&[radius, angle])
    }

    pub fn circle(self, radius: f32, fill: bool, stroke: bool) -> Self {
        self.op(op::DRAW_CIRCLE, Self::flags(fill, stroke))
            .floats(&[radius])
    }

    pub fn text(self, text: &str) -> Self {
        self.keyed(op::DRAW_TEXT, text.as_bytes())
    }

    /// `records` are `[sx, sy, sw, sh, dx, dy, dw, dh]`.
    pub fn sprites(self, image: &[u8], records: &[[f32; 8]]) -> Self {
        let mut out = self
            .op(op::DRAW_SPRITES, key_len(image))
            .raw(&(records.len() as u32).to_be_bytes())
            .padded(image);
        for record in records {
            out = out.floats(record);
        }
        out
    }

    pub fn render_script(self, key: &[u8]) -> Self {
        self.keyed(op::RENDER_SCRIPT, key)
    }

    pub fn begin_path(self) -> Self {
        self.op(op::BEGIN_PATH, 0)
    }

    pub fn close_path(self) -> Self {
        self.op(op::CLOSE_PATH, 0)
    }

    pub fn fill(self) -> Self {
        self.op(op::FILL, 0)
    }

    pub fn stroke(self) -> Self {
        self.op(op::STROKE, 0)
    }

    pub fn move_to(self, x: f32, y: f32) -> Self {
        self.op(op::MOVE_TO, 0).floats(&[x, y])
    }

    pub fn line_to(self, x: f32, y: f32) -> Self {
        self.op(op::LINE_TO, 0).floats(&[x, y])
    }

    pub fn push_state(self) -> Self {
        self.op(op::PUSH_STATE, 0)
    }

    pub fn pop_state(self) -> Self {
        self.op(op::POP_STATE, 0)
    }

    pub fn pop_push_state(self) -> Self {
        self.op(op::POP_PUSH_STATE, 0)
    }

    pub fn scissor(self, w: f32, h: f32) -> Self {
        self.op(op::SCISSOR, 0).floats(&[w, h])
    }

    pub fn translate(self, x: f32, y: f32) -> Self {
        self.op(op::TRANSLATE, 0).floats(&[x, y])
    }

    pub fn scale(self, x: f32, y: f32) -> Self {
        self.op(op::SCALE, 0).floats(&[x, y])
    }

    pub fn rotate(self, radians: f32) -> Self {
        self.op(op::ROTATE, 0).floats(&[radians])
    }

    pub fn transform(self, matrix: [f32; 6]) -> Self {
        self.op(op::TRANSFORM, 0).floats(&matrix)
    }

    pub fn fill_color(self, color: Color) -> Self {
        self.op(op::FILL_COLOR, 0)
            .raw(&[color.r, color.g, color.b, color.a])
    }

    pub fn stroke_color(self, color: Color) -> Self {
        self.op(op::STROKE_COLOR, 0)
            .raw(&[color.r, color.g, color.b, color.a])
    }

    pub fn fill_linear(
        self,
        start: (f32, f32),
        end: (f32, f32),
        inner: Color,
        outer: Color,
    ) -> Self {
        self.op(op::FILL_LINEAR, 0)
            .floats(&[start.0, start.1, end.0, end.1])
            .raw(&[inner.r, inner.g, inner.b, inner.a, outer.r, outer.g, outer.b, outer.a])
    }

    pub fn fill_image(self, key: &[u8]) -> Self {
        self.keyed(op::FILL_IMAGE, key)
    }

    pub fn stroke_image(self, key: &[u8]) -> Self {
        self.keyed(op::STROKE_IMAGE, key)
    }

    /// Width in quarter units, as carried on the wire.
    pub fn stroke_width(self, width: f32) -> Self {
        self.op(op::STROKE_WIDTH, (width * 4.0) as u16)
    }

    pub fn line_cap(self, cap: LineCap) -> Self {
        self.op(op::LINE_CAP, cap as u16)
    }

    pub fn line_join(self, join: LineJoin) -> Self {
        self.op(op::LINE_JOIN, join as u16)
    }

    pub fn font(self, key: &[u8]) -> Self {
        self.keyed(op::FONT, key)
    }

    pub fn font_size(self, size: f32) -> Self {
        self.op(op::FONT_SIZE, (size * 4.0) as u16)
    }

    pub fn text_align(self, align: TextAlign) -> Self {
        self.op(op::TEXT_ALIGN, align as u16)
    }

    pub fn text_baseline(self, baseline: TextBaseline) -> Self {
        self.op(op::TEXT_BASE, baseline as u16)
    }
}

fn key_len(key: &[u8]) -> u16 {
    u16::try_from(key.len()).unwrap_or(u16::MAX)
}
