use std::ops::Range;

use serde::{Deserialize, Serialize};
use vgport_registry::{FontBackend, FontId, TextureBackend, TextureId};

/// 8-bit RGBA color, not premultiplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// How a fill or stroke is colored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Color),
    Linear {
        start: (f32, f32),
        end: (f32, f32),
        inner: Color,
        outer: Color,
    },
    Radial {
        center: (f32, f32),
        inner_radius: f32,
        outer_radius: f32,
        inner: Color,
        outer: Color,
    },
    /// A feathered rounded rectangle, useful for drop shadows.
    Box {
        origin: (f32, f32),
        size: (f32, f32),
        radius: f32,
        feather: f32,
        inner: Color,
        outer: Color,
    },
    /// A repeating texture whose top-left corner sits at `origin` and whose
    /// full image spans `extent`.
    Image {
        texture: TextureId,
        origin: (f32, f32),
        extent: (f32, f32),
        angle: f32,
        alpha: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineJoin {
    Bevel,
    Round,
    #[default]
    Miter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextBaseline {
    Top,
    Middle,
    #[default]
    Alphabetic,
    Bottom,
}

/// One wrapped line of text, as a byte range into the laid-out string.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRow {
    pub range: Range<usize>,
    pub width: f32,
}

/// The 2D drawing capability the interpreter renders into.
///
/// This follows an immediate-mode model: there is one current path and one
/// current state (transform, paints, stroke parameters, scissor, font) that
/// `save`/`restore` push and pop. All coordinates are in the current local
/// space. Textures and fonts come from the same backend so that image paints
/// and font faces refer to handles the canvas owns.
pub trait VectorCanvas: TextureBackend + FontBackend {
    /// Fill the whole surface with `color`, ignoring transform and scissor.
    fn clear(&mut self, color: Color);
    fn begin_frame(&mut self, width: f32, height: f32, pixel_ratio: f32);
    fn end_frame(&mut self);

    // State
    fn save(&mut self);
    fn restore(&mut self);
    /// Reset the current state to defaults without touching the stack.
    fn reset(&mut self);

    // Paths
    fn begin_path(&mut self);
    fn close_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn bezier_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32);
    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32);
    fn arc_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, radius: f32);
    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32);
    fn rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32);
    fn circle(&mut self, cx: f32, cy: f32, r: f32);
    fn ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32);
    fn fill(&mut self);
    fn stroke(&mut self);

    // Style
    fn fill_paint(&mut self, paint: Paint);
    fn stroke_paint(&mut self, paint: Paint);
    fn stroke_width(&mut self, width: f32);
    fn line_cap(&mut self, cap: LineCap);
    fn line_join(&mut self, join: LineJoin);
    fn miter_limit(&mut self, limit: f32);

    // Transform
    fn reset_transform(&mut self);
    /// Premultiply the current transform by `[a b c d e f]`.
    fn transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32);
    fn translate(&mut self, x: f32, y: f32);
    fn scale(&mut self, x: f32, y: f32);
    fn rotate(&mut self, radians: f32);
    fn skew_x(&mut self, radians: f32);
    fn skew_y(&mut self, radians: f32);

    // Scissor
    fn scissor(&mut self, x: f32, y: f32, w: f32, h: f32);
    fn intersect_scissor(&mut self, x: f32, y: f32, w: f32, h: f32);
    fn reset_scissor(&mut self);

    // Text
    fn font_face(&mut self, font: FontId);
    fn font_size(&mut self, size: f32);
    fn font_blur(&mut self, blur: f32);
    fn text_align(&mut self, align: TextAlign);
    fn text_baseline(&mut self, baseline: TextBaseline);
    /// Vertical advance between rows with the current font.
    fn line_height(&self) -> f32;
    /// Split `text` into rows no wider than `max_width`.
    fn break_lines(&self, text: &str, max_width: f32) -> Vec<TextRow>;
    fn text(&mut self, x: f32, y: f32, text: &str);
}
