//! A [`VectorCanvas`] that records every call, for tests and inspection.

use std::collections::HashMap;

use vgport_registry::{FontBackend, FontId, ResourceKey, TextureBackend, TextureId};

use crate::canvas::{
    Color, LineCap, LineJoin, Paint, TextAlign, TextBaseline, TextRow, VectorCanvas,
};

/// One recorded canvas call.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasCall {
    Clear(Color),
    BeginFrame(f32, f32),
    EndFrame,
    Save,
    Restore,
    Reset,
    BeginPath,
    ClosePath,
    MoveTo(f32, f32),
    LineTo(f32, f32),
    BezierTo([f32; 6]),
    QuadTo([f32; 4]),
    ArcTo([f32; 5]),
    Rect(f32, f32, f32, f32),
    RoundedRect(f32, f32, f32, f32, f32),
    Circle(f32, f32, f32),
    Ellipse(f32, f32, f32, f32),
    Fill,
    Stroke,
    FillPaint(Paint),
    StrokePaint(Paint),
    StrokeWidth(f32),
    LineCap(LineCap),
    LineJoin(LineJoin),
    MiterLimit(f32),
    ResetTransform,
    Transform([f32; 6]),
    Translate(f32, f32),
    Scale(f32, f32),
    Rotate(f32),
    SkewX(f32),
    SkewY(f32),
    Scissor(f32, f32, f32, f32),
    IntersectScissor(f32, f32, f32, f32),
    ResetScissor,
    FontFace(FontId),
    FontSize(f32),
    FontBlur(f32),
    TextAlign(TextAlign),
    TextBaseline(TextBaseline),
    Text(f32, f32, String),
}

/// Records calls and tracks the save stack depth.
///
/// Text rows break on newlines only. Textures and fonts are accepted unless
/// their data is empty.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub calls: Vec<CanvasCall>,
    pub line_height: f32,
    depth: usize,
    max_depth: usize,
    next_handle: u32,
    textures: HashMap<TextureId, (u32, u32, Vec<u8>)>,
    fonts: HashMap<FontId, ResourceKey>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self {
            line_height: 10.0,
            ..Self::default()
        }
    }

    /// Current number of unmatched saves.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Deepest save stack seen so far.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn texture(&self, texture: TextureId) -> Option<&(u32, u32, Vec<u8>)> {
        self.textures.get(&texture)
    }

    pub fn font(&self, font: FontId) -> Option<&ResourceKey> {
        self.fonts.get(&font)
    }

    pub fn take_calls(&mut self) -> Vec<CanvasCall> {
        std::mem::take(&mut self.calls)
    }

    fn handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl TextureBackend for RecordingCanvas {
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Option<TextureId> {
        if rgba.is_empty() {
            return None;
        }
        let id = TextureId(self.handle());
        self.textures.insert(id, (width, height, rgba.to_vec()));
        Some(id)
    }

    fn update_texture(&mut self, texture: TextureId, rgba: &[u8]) {
        if let Some(entry) = self.textures.get_mut(&texture) {
            entry.2 = rgba.to_vec();
        }
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
    }

    fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&texture).map(|(w, h, _)| (*w, *h))
    }
}

impl FontBackend for RecordingCanvas {
    fn create_font(&mut self, key: &ResourceKey, blob: &[u8]) -> Option<FontId> {
        if blob.is_empty() {
            return None;
        }
        let id = FontId(self.handle());
        self.fonts.insert(id, key.clone());
        Some(id)
    }

    fn delete_font(&mut self, font: FontId) {
        self.fonts.remove(&font);
    }
}

impl VectorCanvas for RecordingCanvas {
    fn clear(&mut self, color: Color) {
        self.calls.push(CanvasCall::Clear(color));
    }

    fn begin_frame(&mut self, width: f32, height: f32, _pixel_ratio: f32) {
        self.calls.push(CanvasCall::BeginFrame(width, height));
    }

    fn end_frame(&mut self) {
        self.calls.push(CanvasCall::EndFrame);
    }

    fn save(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.calls.push(CanvasCall::Save);
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.calls.push(CanvasCall::Restore);
    }

    fn reset(&mut self) {
        self.calls.push(CanvasCall::Reset);
    }

    fn begin_path(&mut self) {
        self.calls.push(CanvasCall::BeginPath);
    }

    fn close_path(&mut self) {
        self.calls.push(CanvasCall::ClosePath);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.calls.push(CanvasCall::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.calls.push(CanvasCall::LineTo(x, y));
    }

    fn bezier_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) {
        self.calls.push(CanvasCall::BezierTo([c1x, c1y, c2x, c2y, x, y]));
    }

    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        self.calls.push(CanvasCall::QuadTo([cx, cy, x, y]));
    }

    fn arc_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, radius: f32) {
        self.calls.push(CanvasCall::ArcTo([x1, y1, x2, y2, radius]));
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.calls.push(CanvasCall::Rect(x, y, w, h));
    }

    fn rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32) {
        self.calls.push(CanvasCall::RoundedRect(x, y, w, h, radius));
    }

    fn circle(&mut self, cx: f32, cy: f32, r: f32) {
        self.calls.push(CanvasCall::Circle(cx, cy, r));
    }

    fn ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) {
        self.calls.push(CanvasCall::Ellipse(cx, cy, rx, ry));
    }

    fn fill(&mut self) {
        self.calls.push(CanvasCall::Fill);
    }

    fn stroke(&mut self) {
        self.calls.push(CanvasCall::Stroke);
    }

    fn fill_paint(&mut self, paint: Paint) {
        self.calls.push(CanvasCall::FillPaint(paint));
    }

    fn stroke_paint(&mut self, paint: Paint) {
        self.calls.push(CanvasCall::StrokePaint(paint));
    }

    fn stroke_width(&mut self, width: f32) {
        self.calls.push(CanvasCall::StrokeWidth(width));
    }

    fn line_cap(&mut self, cap: LineCap) {
        self.calls.push(CanvasCall::LineCap(cap));
    }

    fn line_join(&mut self, join: LineJoin) {
        self.calls.push(CanvasCall::LineJoin(join));
    }

    fn miter_limit(&mut self, limit: f32) {
        self.calls.push(CanvasCall::MiterLimit(limit));
    }

    fn reset_transform(&mut self) {
        self.calls.push(CanvasCall::ResetTransform);
    }

    fn transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.calls.push(CanvasCall::Transform([a, b, c, d, e, f]));
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.calls.push(CanvasCall::Translate(x, y));
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.calls.push(CanvasCall::Scale(x, y));
    }

    fn rotate(&mut self, radians: f32) {
        self.calls.push(CanvasCall::Rotate(radians));
    }

    fn skew_x(&mut self, radians: f32) {
        self.calls.push(CanvasCall::SkewX(radians));
    }

    fn skew_y(&mut self, radians: f32) {
        self.calls.push(CanvasCall::SkewY(radians));
    }

    fn scissor(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.calls.push(CanvasCall::Scissor(x, y, w, h));
    }

    fn intersect_scissor(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.calls.push(CanvasCall::IntersectScissor(x, y, w, h));
    }

    fn reset_scissor(&mut self) {
        self.calls.push(CanvasCall::ResetScissor);
    }

    fn font_face(&mut self, font: FontId) {
        self.calls.push(CanvasCall::FontFace(font));
    }

    fn font_size(&mut self, size: f32) {
        self.calls.push(CanvasCall::FontSize(size));
    }

    fn font_blur(&mut self, blur: f32) {
        self.calls.push(CanvasCall::FontBlur(blur));
    }

    fn text_align(&mut self, align: TextAlign) {
        self.calls.push(CanvasCall::TextAlign(align));
    }

    fn text_baseline(&mut self, baseline: TextBaseline) {
        self.calls.push(CanvasCall::TextBaseline(baseline));
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn break_lines(&self, text: &str, _max_width: f32) -> Vec<TextRow> {
        let mut rows = Vec::new();
        let mut start = 0usize;
        for line in text.split('\n') {
            let end = start + line.len();
            rows.push(TextRow {
                range: start..end,
                width: line.chars().count() as f32,
            });
            start = end + 1;
        }
        rows
    }

    fn text(&mut self, x: f32, y: f32, text: &str) {
        self.calls.push(CanvasCall::Text(x, y, text.to_owned()));
    }
}
