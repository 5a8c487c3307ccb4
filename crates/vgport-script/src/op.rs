//! The instruction table: opcode to operand shape.
//!
//! [`Instr::decode`] is the only place that knows how many bytes each op
//! consumes. The interpreter matches on the decoded variant and never touches
//! the buffer itself.

use crate::canvas::{Color, LineCap, LineJoin, TextAlign, TextBaseline};
use crate::decode::{array, bytes, color, floats, padded, u16_at, u32_at};
use crate::error::{Result, ScriptError};

pub const DRAW_LINE: u16 = 0x01;
pub const DRAW_TRIANGLE: u16 = 0x02;
pub const DRAW_QUAD: u16 = 0x03;
pub const DRAW_RECT: u16 = 0x04;
pub const DRAW_RRECT: u16 = 0x05;
pub const DRAW_ARC: u16 = 0x06;
pub const DRAW_SECTOR: u16 = 0x07;
pub const DRAW_CIRCLE: u16 = 0x08;
pub const DRAW_ELLIPSE: u16 = 0x09;
pub const DRAW_TEXT: u16 = 0x0A;
pub const DRAW_SPRITES: u16 = 0x0B;
pub const RENDER_SCRIPT: u16 = 0x0F;

pub const BEGIN_PATH: u16 = 0x20;
pub const CLOSE_PATH: u16 = 0x21;
pub const FILL: u16 = 0x22;
pub const STROKE: u16 = 0x23;
pub const MOVE_TO: u16 = 0x26;
pub const LINE_TO: u16 = 0x27;
pub const ARC_TO: u16 = 0x28;
pub const BEZIER_TO: u16 = 0x29;
pub const QUADRATIC_TO: u16 = 0x2A;

pub const PUSH_STATE: u16 = 0x40;
pub const POP_STATE: u16 = 0x41;
pub const POP_PUSH_STATE: u16 = 0x42;
pub const SCISSOR: u16 = 0x44;
pub const INTERSECT_SCISSOR: u16 = 0x45;
pub const RESET_SCISSOR: u16 = 0x46;

pub const TRANSFORM: u16 = 0x50;
pub const SCALE: u16 = 0x51;
pub const ROTATE: u16 = 0x52;
pub const TRANSLATE: u16 = 0x53;
pub const SKEW_X: u16 = 0x54;
pub const SKEW_Y: u16 = 0x55;
pub const RESET_TRANSFORM: u16 = 0x56;

pub const FILL_COLOR: u16 = 0x60;
pub const FILL_LINEAR: u16 = 0x61;
pub const FILL_RADIAL: u16 = 0x62;
pub const FILL_IMAGE: u16 = 0x63;
pub const FILL_STREAM: u16 = 0x64;
pub const FILL_BOX: u16 = 0x65;

pub const STROKE_WIDTH: u16 = 0x70;
pub const STROKE_COLOR: u16 = 0x71;
pub const STROKE_LINEAR: u16 = 0x72;
pub const STROKE_RADIAL: u16 = 0x73;
pub const STROKE_IMAGE: u16 = 0x74;
pub const STROKE_STREAM: u16 = 0x75;
pub const STROKE_BOX: u16 = 0x76;

pub const LINE_CAP: u16 = 0x80;
pub const LINE_JOIN: u16 = 0x81;
pub const MITER_LIMIT: u16 = 0x82;

pub const FONT: u16 = 0x90;
pub const FONT_SIZE: u16 = 0x91;
pub const TEXT_ALIGN: u16 = 0x92;
pub const TEXT_BASE: u16 = 0x93;
pub const FONT_BLUR: u16 = 0x94;

/// Width of the `[u16 op][u16 param]` header.
pub const HEADER_SIZE: usize = 4;

/// Size of one sprite record: eight floats.
pub const SPRITE_RECORD_SIZE: usize = 32;

/// Fill and stroke bits carried in a draw primitive's param word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawFlags(u16);

impl DrawFlags {
    pub const FILL: u16 = 0x01;
    pub const STROKE: u16 = 0x02;

    pub fn fill(self) -> bool {
        self.0 & Self::FILL != 0
    }

    pub fn stroke(self) -> bool {
        self.0 & Self::STROKE != 0
    }
}

/// Which paint slot a style op targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Fill,
    Stroke,
}

/// Gradient endpoints or box geometry plus the two color stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gradient {
    Linear { sx: f32, sy: f32, ex: f32, ey: f32 },
    Radial {
        cx: f32,
        cy: f32,
        inner: f32,
        outer: f32,
    },
    Box {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        feather: f32,
    },
}

/// One decoded instruction. Borrowed operands point into the script buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Instr<'a> {
    Line {
        from: (f32, f32),
        to: (f32, f32),
        flags: DrawFlags,
    },
    Triangle { points: [f32; 6], flags: DrawFlags },
    Quad { points: [f32; 8], flags: DrawFlags },
    Rect { w: f32, h: f32, flags: DrawFlags },
    RoundedRect {
        w: f32,
        h: f32,
        radius: f32,
        flags: DrawFlags,
    },
    Arc {
        radius: f32,
        angle: f32,
        flags: DrawFlags,
    },
    Sector {
        radius: f32,
        angle: f32,
        flags: DrawFlags,
    },
    Circle { radius: f32, flags: DrawFlags },
    Ellipse { rx: f32, ry: f32, flags: DrawFlags },
    Text(&'a [u8]),
    /// `records` holds `count` packed `[sx sy sw sh dx dy dw dh]` groups.
    Sprites { key: &'a [u8], records: &'a [u8] },
    RenderScript(&'a [u8]),

    BeginPath,
    ClosePath,
    Fill,
    Stroke,
    MoveTo(f32, f32),
    LineTo(f32, f32),
    ArcTo {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        radius: f32,
    },
    BezierTo([f32; 6]),
    QuadTo([f32; 4]),

    PushState,
    PopState,
    PopPushState,
    Scissor { w: f32, h: f32 },
    IntersectScissor { w: f32, h: f32 },
    ResetScissor,

    Transform([f32; 6]),
    Scale(f32, f32),
    Rotate(f32),
    Translate(f32, f32),
    SkewX(f32),
    SkewY(f32),
    ResetTransform,

    Color(Target, Color),
    Gradient {
        target: Target,
        shape: Gradient,
        inner: Color,
        outer: Color,
    },
    /// Image and stream paints both look up the image registry.
    ImagePaint(Target, &'a [u8]),
    StrokeWidth(f32),
    LineCap(LineCap),
    LineJoin(LineJoin),
    MiterLimit(f32),

    Font(&'a [u8]),
    FontSize(f32),
    FontBlur(f32),
    TextAlign(TextAlign),
    TextBase(TextBaseline),

    /// A recognized op whose param selects nothing; it has no effect.
    Ignored(u16),
}

impl<'a> Instr<'a> {
    /// Decode the instruction at `offset`, returning it and the offset of the
    /// next one.
    pub fn decode(buf: &'a [u8], offset: usize) -> Result<(Instr<'a>, usize)> {
        let (op, at) = u16_at(buf, offset)?;
        let (param, at) = u16_at(buf, at)?;
        let flags = DrawFlags(param);
        let len = usize::from(param);

        let decoded = match op {
            DRAW_LINE => {
                let ([x0, y0, x1, y1], at) = floats::<4>(buf, at)?;
                let flags = DrawFlags(param & DrawFlags::STROKE);
                let instr = Instr::Line {
                    from: (x0, y0),
                    to: (x1, y1),
                    flags,
                };
                (instr, at)
            }
            DRAW_TRIANGLE => {
                let (points, at) = floats::<6>(buf, at)?;
                (Instr::Triangle { points, flags }, at)
            }
            DRAW_QUAD => {
                let (points, at) = floats::<8>(buf, at)?;
                (Instr::Quad { points, flags }, at)
            }
            DRAW_RECT => {
                let ([w, h], at) = floats::<2>(buf, at)?;
                (Instr::Rect { w, h, flags }, at)
            }
            DRAW_RRECT => {
                let ([w, h, radius], at) = floats::<3>(buf, at)?;
                let instr = Instr::RoundedRect {
                    w,
                    h,
                    radius,
                    flags,
                };
                (instr, at)
            }
            DRAW_ARC => {
                let ([radius, angle], at) = floats::<2>(buf, at)?;
                let instr = Instr::Arc {
                    radius,
                    angle,
                    flags,
                };
                (instr, at)
            }
            DRAW_SECTOR => {
                let ([radius, angle], at) = floats::<2>(buf, at)?;
                let instr = Instr::Sector {
                    radius,
                    angle,
                    flags,
                };
                (instr, at)
            }
            DRAW_CIRCLE => {
                let ([radius], at) = floats::<1>(buf, at)?;
                (Instr::Circle { radius, flags }, at)
            }
            DRAW_ELLIPSE => {
                let ([rx, ry], at) = floats::<2>(buf, at)?;
                (Instr::Ellipse { rx, ry, flags }, at)
            }
            DRAW_TEXT => {
                let (text, at) = padded(buf, at, len)?;
                (Instr::Text(text), at)
            }
            DRAW_SPRITES => {
                let (count, at) = u32_at(buf, at)?;
                let (key, at) = padded(buf, at, len)?;
                let records_len = (count as usize).saturating_mul(SPRITE_RECORD_SIZE);
                let (records, at) = bytes(buf, at, records_len)?;
                (Instr::Sprites { key, records }, at)
            }
            RENDER_SCRIPT => {
                let (key, at) = padded(buf, at, len)?;
                (Instr::RenderScript(key), at)
            }

            BEGIN_PATH => (Instr::BeginPath, at),
            CLOSE_PATH => (Instr::ClosePath, at),
            FILL => (Instr::Fill, at),
            STROKE => (Instr::Stroke, at),
            MOVE_TO => {
                let ([x, y], at) = floats::<2>(buf, at)?;
                (Instr::MoveTo(x, y), at)
            }
            LINE_TO => {
                let ([x, y], at) = floats::<2>(buf, at)?;
                (Instr::LineTo(x, y), at)
            }
            ARC_TO => {
                let ([x1, y1, x2, y2, radius], at) = floats::<5>(buf, at)?;
                let instr = Instr::ArcTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    radius,
                };
                (instr, at)
            }
            BEZIER_TO => {
                let (points, at) = floats::<6>(buf, at)?;
                (Instr::BezierTo(points), at)
            }
            QUADRATIC_TO => {
                let (points, at) = floats::<4>(buf, at)?;
                (Instr::QuadTo(points), at)
            }

            PUSH_STATE => (Instr::PushState, at),
            POP_STATE => (Instr::PopState, at),
            POP_PUSH_STATE => (Instr::PopPushState, at),
            SCISSOR => {
                let ([w, h], at) = floats::<2>(buf, at)?;
                (Instr::Scissor { w, h }, at)
            }
            INTERSECT_SCISSOR => {
                let ([w, h], at) = floats::<2>(buf, at)?;
                (Instr::IntersectScissor { w, h }, at)
            }
            RESET_SCISSOR => (Instr::ResetScissor, at),

            TRANSFORM => {
                let (matrix, at) = floats::<6>(buf, at)?;
                (Instr::Transform(matrix), at)
            }
            SCALE => {
                let ([x, y], at) = floats::<2>(buf, at)?;
                (Instr::Scale(x, y), at)
            }
            ROTATE => {
                let ([radians], at) = floats::<1>(buf, at)?;
                (Instr::Rotate(radians), at)
            }
            TRANSLATE => {
                let ([x, y], at) = floats::<2>(buf, at)?;
                (Instr::Translate(x, y), at)
            }
            SKEW_X => {
                let ([radians], at) = floats::<1>(buf, at)?;
                (Instr::SkewX(radians), at)
            }
            SKEW_Y => {
                let ([radians], at) = floats::<1>(buf, at)?;
                (Instr::SkewY(radians), at)
            }
            RESET_TRANSFORM => (Instr::ResetTransform, at),

            FILL_COLOR | STROKE_COLOR => {
                let (c, at) = color(buf, at)?;
                (Instr::Color(target_of(op), c), at)
            }
            FILL_LINEAR | STROKE_LINEAR => {
                let ([sx, sy, ex, ey], at) = floats::<4>(buf, at)?;
                let (stops, at) = stops(buf, at)?;
                gradient(op, Gradient::Linear { sx, sy, ex, ey }, stops, at)
            }
            FILL_RADIAL | STROKE_RADIAL => {
                let ([cx, cy, inner, outer], at) = floats::<4>(buf, at)?;
                let (stops, at) = stops(buf, at)?;
                let shape = Gradient::Radial {
                    cx,
                    cy,
                    inner,
                    outer,
                };
                gradient(op, shape, stops, at)
            }
            FILL_BOX | STROKE_BOX => {
                let ([x, y, w, h, radius, feather], at) = floats::<6>(buf, at)?;
                let (stops, at) = stops(buf, at)?;
                let shape = Gradient::Box {
                    x,
                    y,
                    w,
                    h,
                    radius,
                    feather,
                };
                gradient(op, shape, stops, at)
            }
            FILL_IMAGE | FILL_STREAM | STROKE_IMAGE | STROKE_STREAM => {
                let (key, at) = padded(buf, at, len)?;
                (Instr::ImagePaint(target_of(op), key), at)
            }
            STROKE_WIDTH => (Instr::StrokeWidth(f32::from(param) / 4.0), at),

            LINE_CAP => match param {
                0 => (Instr::LineCap(LineCap::Butt), at),
                1 => (Instr::LineCap(LineCap::Round), at),
                2 => (Instr::LineCap(LineCap::Square), at),
                _ => (Instr::Ignored(op), at),
            },
            LINE_JOIN => match param {
                0 => (Instr::LineJoin(LineJoin::Bevel), at),
                1 => (Instr::LineJoin(LineJoin::Round), at),
                2 => (Instr::LineJoin(LineJoin::Miter), at),
                _ => (Instr::Ignored(op), at),
            },
            MITER_LIMIT => (Instr::MiterLimit(f32::from(param)), at),

            FONT => {
                let (key, at) = padded(buf, at, len)?;
                (Instr::Font(key), at)
            }
            FONT_SIZE => (Instr::FontSize(f32::from(param) / 4.0), at),
            FONT_BLUR => (Instr::FontBlur(f32::from(param) / 4.0), at),
            TEXT_ALIGN => match param {
                0 => (Instr::TextAlign(TextAlign::Left), at),
                1 => (Instr::TextAlign(TextAlign::Center), at),
                2 => (Instr::TextAlign(TextAlign::Right), at),
                _ => (Instr::Ignored(op), at),
            },
            TEXT_BASE => match param {
                0 => (Instr::TextBase(TextBaseline::Top), at),
                1 => (Instr::TextBase(TextBaseline::Middle), at),
                2 => (Instr::TextBase(TextBaseline::Alphabetic), at),
                3 => (Instr::TextBase(TextBaseline::Bottom), at),
                _ => (Instr::Ignored(op), at),
            },

            _ => return Err(ScriptError::UnknownOp { op, offset }),
        };
        Ok(decoded)
    }
}

fn target_of(op: u16) -> Target {
    if op >= STROKE_WIDTH {
        Target::Stroke
    } else {
        Target::Fill
    }
}

fn stops(buf: &[u8], offset: usize) -> Result<((Color, Color), usize)> {
    let (raw, at) = array::<8>(buf, offset)?;
    let inner = Color::rgba(raw[0], raw[1], raw[2], raw[3]);
    let outer = Color::rgba(raw[4], raw[5], raw[6], raw[7]);
    Ok(((inner, outer), at))
}

fn gradient<'a>(
    op: u16,
    shape: Gradient,
    (inner, outer): (Color, Color),
    at: usize,
) -> (Instr<'a>, usize) {
    (
        Instr::Gradient {
            target: target_of(op),
            shape,
            inner,
            outer,
        },
        at,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(op: u16, param: u16) -> Vec<u8> {
        let mut out = op.to_be_bytes().to_vec();
        out.extend_from_slice(&param.to_be_bytes());
        out
    }

    fn with_floats(mut buf: Vec<u8>, values: &[f32]) -> Vec<u8> {
        for v in values {
            buf.extend_from_slice(&v.to_be_bytes());
        }
        buf
    }

    #[test]
    fn rect_with_fill_flag() {
        let buf = with_floats(header(DRAW_RECT, 1), &[10.0, 20.0]);
        let (instr, next) = Instr::decode(&buf, 0).unwrap();
        let Instr::Rect { w, h, flags } = instr else {
            panic!("expected rect, got {instr:?}");
        };
        assert_eq!((w, h), (10.0, 20.0));
        assert!(flags.fill() && !flags.stroke());
        assert_eq!(next, 12);
    }

    #[test]
    fn line_ignores_fill_flag() {
        let buf = with_floats(header(DRAW_LINE, 3), &[0.0, 0.0, 1.0, 1.0]);
        let (instr, _) = Instr::decode(&buf, 0).unwrap();
        let Instr::Line { flags, .. } = instr else {
            panic!("expected line");
        };
        assert!(!flags.fill());
        assert!(flags.stroke());
    }

    #[test]
    fn key_operands_skip_padding() {
        for len in 0u16..=5 {
            let mut buf = header(RENDER_SCRIPT, len);
            buf.extend(std::iter::repeat(b'k').take(len as usize));
            buf.resize(4 + usize::from(len).div_ceil(4) * 4, 0);
            buf.extend_from_slice(&header(BEGIN_PATH, 0));

            let (instr, next) = Instr::decode(&buf, 0).unwrap();
            assert_eq!(instr, Instr::RenderScript(&buf[4..4 + len as usize]));
            assert_eq!(next, 4 + len as usize + (4 - len as usize % 4) % 4);
            assert_eq!(Instr::decode(&buf, next).unwrap().0, Instr::BeginPath);
        }
    }

    #[test]
    fn sprites_layout() {
        let mut buf = header(DRAW_SPRITES, 3);
        buf.extend_from_slice(&2u32.to_be_bytes());
        buf.extend_from_slice(b"img\0");
        buf = with_floats(buf, &[0.0; 16]);

        let (instr, next) = Instr::decode(&buf, 0).unwrap();
        let Instr::Sprites { key, records } = instr else {
            panic!("expected sprites");
        };
        assert_eq!(key, b"img");
        assert_eq!(records.len(), 2 * SPRITE_RECORD_SIZE);
        assert_eq!(next, buf.len());
    }

    #[test]
    fn param_scaled_values() {
        let buf = header(STROKE_WIDTH, 6);
        let (instr, _) = Instr::decode(&buf, 0).unwrap();
        assert_eq!(instr, Instr::StrokeWidth(1.5));
        let buf = header(FONT_SIZE, 64);
        let (instr, _) = Instr::decode(&buf, 0).unwrap();
        assert_eq!(instr, Instr::FontSize(16.0));
        let buf = header(MITER_LIMIT, 10);
        let (instr, _) = Instr::decode(&buf, 0).unwrap();
        assert_eq!(instr, Instr::MiterLimit(10.0));
    }

    #[test]
    fn stroke_variants_target_stroke() {
        let mut buf = header(STROKE_COLOR, 0);
        buf.extend_from_slice(&[1, 2, 3, 4]);
        let (instr, _) = Instr::decode(&buf, 0).unwrap();
        assert_eq!(instr, Instr::Color(Target::Stroke, Color::rgba(1, 2, 3, 4)));

        let mut buf = with_floats(header(FILL_LINEAR, 0), &[0.0, 0.0, 1.0, 1.0]);
        buf.extend_from_slice(&[255, 0, 0, 255, 0, 0, 255, 255]);
        let (instr, next) = Instr::decode(&buf, 0).unwrap();
        assert_eq!(
            instr,
            Instr::Gradient {
                target: Target::Fill,
                shape: Gradient::Linear {
                    sx: 0.0,
                    sy: 0.0,
                    ex: 1.0,
                    ey: 1.0
                },
                inner: Color::rgba(255, 0, 0, 255),
                outer: Color::rgba(0, 0, 255, 255),
            }
        );
        assert_eq!(next, 4 + 16 + 8);
    }

    #[test]
    fn out_of_range_params_are_ignored() {
        let buf = header(LINE_CAP, 9);
        let (instr, _) = Instr::decode(&buf, 0).unwrap();
        assert_eq!(instr, Instr::Ignored(LINE_CAP));
    }

    #[test]
    fn unknown_op_reports_offset() {
        let mut buf = header(BEGIN_PATH, 0);
        buf.extend_from_slice(&header(0x7777, 0));
        let err = Instr::decode(&buf, 4).unwrap_err();
        assert_eq!(err, ScriptError::UnknownOp { op: 0x7777, offset: 4 });
    }

    #[test]
    fn truncated_operands() {
        let buf = with_floats(header(DRAW_TRIANGLE, 1), &[1.0, 2.0]);
        assert!(matches!(
            Instr::decode(&buf, 0),
            Err(ScriptError::Truncated { .. })
        ));
    }
}
