use std::collections::HashMap;
use std::f64::consts::TAU;

use kurbo::{Affine, Arc, BezPath, Circle, Ellipse, PathEl, Point, Rect, RoundedRect, Shape, Vec2};
use tracing::debug;
use vgport_registry::{FontBackend, FontId, ResourceKey, TextureBackend, TextureId};
use vgport_script::{
    Color, LineCap, LineJoin, Paint, TextAlign, TextBaseline, TextRow, VectorCanvas,
};

use crate::layout::{break_rows, TextMetrics};
use crate::scene::{Brush, DrawOp, Scene};

/// Flattening tolerance for shapes and arcs, in device units.
const TOLERANCE: f64 = 0.1;

/// Distance below which points are treated as coincident.
const DIST_TOLERANCE: f64 = 0.01;

const DEFAULT_FONT_SIZE: f32 = 16.0;

#[derive(Debug, Clone)]
struct State {
    transform: Affine,
    fill: Brush,
    stroke: Brush,
    stroke_width: f32,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f32,
    scissor: Option<Rect>,
    font: Option<FontId>,
    font_size: f32,
    font_blur: f32,
    text_align: TextAlign,
    text_baseline: TextBaseline,
}

impl Default for State {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            fill: Brush::Solid {
                color: Color::WHITE,
            },
            stroke: Brush::Solid {
                color: Color::BLACK,
            },
            stroke_width: 1.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            miter_limit: 10.0,
            scissor: None,
            font: None,
            font_size: DEFAULT_FONT_SIZE,
            font_blur: 0.0,
            text_align: TextAlign::default(),
            text_baseline: TextBaseline::default(),
        }
    }
}

#[derive(Debug, Clone)]
struct Texture {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

/// Headless canvas that records frames as [`Scene`]s.
///
/// Path commands are transformed into device space as they are issued, so
/// a transform change in the middle of a path only affects what follows.
#[derive(Debug, Default)]
pub struct SceneCanvas {
    state: State,
    stack: Vec<State>,
    path: BezPath,
    /// Last path point, in the local space it was issued in.
    current: Option<Point>,
    clear: Color,
    frame: Option<Scene>,
    last: Option<Scene>,
    frames: u64,
    next_handle: u32,
    textures: HashMap<TextureId, Texture>,
    fonts: HashMap<FontId, ResourceKey>,
}

impl SceneCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently finished frame.
    pub fn last_scene(&self) -> Option<&Scene> {
        self.last.as_ref()
    }

    /// Number of frames finished so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// Pixels currently held by a texture.
    pub fn texture_pixels(&self, texture: TextureId) -> Option<&[u8]> {
        self.textures.get(&texture).map(|t| t.rgba.as_slice())
    }

    pub fn font_key(&self, font: FontId) -> Option<&ResourceKey> {
        self.fonts.get(&font)
    }

    /// Depth of the save stack.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn device(&self, x: f32, y: f32) -> Point {
        self.state.transform * Point::new(x as f64, y as f64)
    }

    fn brush(&self, paint: Paint) -> Brush {
        let t = self.state.transform;
        let point = |(x, y): (f32, f32)| t * Point::new(x as f64, y as f64);
        match paint {
            Paint::Solid(color) => Brush::Solid { color },
            Paint::Linear {
                start,
                end,
                inner,
                outer,
            } => Brush::Linear {
                start: point(start),
                end: point(end),
                inner,
                outer,
            },
            Paint::Radial {
                center,
                inner_radius,
                outer_radius,
                inner,
                outer,
            } => Brush::Radial {
                center: point(center),
                inner_radius: inner_radius as f64,
                outer_radius: outer_radius as f64,
                inner,
                outer,
            },
            Paint::Box {
                origin,
                size,
                radius,
                feather,
                inner,
                outer,
            } => Brush::Box {
                rect: t.transform_rect_bbox(Rect::new(
                    origin.0 as f64,
                    origin.1 as f64,
                    (origin.0 + size.0) as f64,
                    (origin.1 + size.1) as f64,
                )),
                radius: radius as f64,
                feather: feather as f64,
                inner,
                outer,
            },
            Paint::Image {
                texture,
                origin,
                extent,
                angle,
                alpha,
            } => Brush::Image {
                texture: texture.0,
                origin: point(origin),
                extent: Vec2::new(extent.0 as f64, extent.1 as f64),
                angle: angle as f64,
                alpha: alpha as f64,
            },
        }
    }

    fn append_shape(&mut self, shape: impl Shape) {
        let t = self.state.transform;
        for el in shape.path_elements(TOLERANCE) {
            self.path.push(t * el);
        }
        self.current = None;
    }

    fn local_scissor(&self, x: f32, y: f32, w: f32, h: f32) -> Rect {
        let rect = Rect::new(
            x as f64,
            y as f64,
            (x + w.max(0.0)) as f64,
            (y + h.max(0.0)) as f64,
        );
        self.state.transform.transform_rect_bbox(rect)
    }

    fn record(&mut self, op: DrawOp) {
        match self.frame.as_mut() {
            Some(frame) => frame.ops.push(op),
            None => debug!("draw outside begin_frame/end_frame dropped"),
        }
    }

    fn metrics(&self) -> TextMetrics {
        TextMetrics {
            font_size: self.state.font_size,
        }
    }
}

impl TextureBackend for SceneCanvas {
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Option<TextureId> {
        let expected = width as usize * height as usize * 4;
        if expected == 0 || rgba.len() != expected {
            return None;
        }
        let id = TextureId(self.handle());
        self.textures.insert(
            id,
            Texture {
                width,
                height,
                rgba: rgba.to_vec(),
            },
        );
        Some(id)
    }

    fn update_texture(&mut self, texture: TextureId, rgba: &[u8]) {
        if let Some(entry) = self.textures.get_mut(&texture) {
            entry.rgba.clear();
            entry.rgba.extend_from_slice(rgba);
        }
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
    }

    fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&texture).map(|t| (t.width, t.height))
    }
}

impl FontBackend for SceneCanvas {
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

impl VectorCanvas for SceneCanvas {
    fn clear(&mut self, color: Color) {
        self.clear = color;
    }

    fn begin_frame(&mut self, width: f32, height: f32, pixel_ratio: f32) {
        self.stack.clear();
        self.state = State::default();
        self.path = BezPath::new();
        self.current = None;
        self.frame = Some(Scene {
            width: width as f64,
            height: height as f64,
            pixel_ratio: pixel_ratio as f64,
            clear: self.clear,
            ops: Vec::new(),
        });
    }

    fn end_frame(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.last = Some(frame);
            self.frames += 1;
        }
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn reset(&mut self) {
        self.state = State::default();
    }

    fn begin_path(&mut self) {
        self.path = BezPath::new();
        self.current = None;
    }

    fn close_path(&mut self) {
        self.path.close_path();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.path.move_to(self.device(x, y));
        self.current = Some(Point::new(x as f64, y as f64));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.line_to(self.device(x, y));
        self.current = Some(Point::new(x as f64, y as f64));
    }

    fn bezier_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) {
        self.path
            .curve_to(self.device(c1x, c1y), self.device(c2x, c2y), self.device(x, y));
        self.current = Some(Point::new(x as f64, y as f64));
    }

    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        self.path.quad_to(self.device(cx, cy), self.device(x, y));
        self.current = Some(Point::new(x as f64, y as f64));
    }

    /// A circular arc of `radius` tangent to the lines from the current point
    /// to `(x1, y1)` and from there to `(x2, y2)`.
    fn arc_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, radius: f32) {
        let Some(p0) = self.current else {
            return;
        };
        let p1 = Point::new(x1 as f64, y1 as f64);
        let p2 = Point::new(x2 as f64, y2 as f64);
        let radius = radius as f64;

        let d0 = p0 - p1;
        let d1 = p2 - p1;
        if d0.hypot() < DIST_TOLERANCE
            || d1.hypot() < DIST_TOLERANCE
            || segment_distance(p1, p0, p2) < DIST_TOLERANCE * DIST_TOLERANCE
            || radius < DIST_TOLERANCE
        {
            self.line_to(x1, y1);
            return;
        }

        let d0 = d0.normalize();
        let d1 = d1.normalize();
        let angle = d0.dot(d1).clamp(-1.0, 1.0).acos();
        let d = radius / (angle / 2.0).tan();
        if d > 10000.0 {
            self.line_to(x1, y1);
            return;
        }

        let (center, start, end, clockwise) = if d1.cross(d0) > 0.0 {
            (
                Point::new(p1.x + d0.x * d + d0.y * radius, p1.y + d0.y * d - d0.x * radius),
                d0.x.atan2(-d0.y),
                (-d1.x).atan2(d1.y),
                true,
            )
        } else {
            (
                Point::new(p1.x + d0.x * d - d0.y * radius, p1.y + d0.y * d + d0.x * radius),
                (-d0.x).atan2(d0.y),
                d1.x.atan2(-d1.y),
                false,
            )
        };

        let mut sweep = end - start;
        if clockwise {
            if sweep.abs() >= TAU {
                sweep = TAU;
            } else {
                while sweep < 0.0 {
                    sweep += TAU;
                }
            }
        } else if sweep.abs() >= TAU {
            sweep = -TAU;
        } else {
            while sweep > 0.0 {
                sweep -= TAU;
            }
        }

        let from = center + Vec2::from_angle(start) * radius;
        let t = self.state.transform;
        self.path.line_to(t * from);
        let arc = Arc {
            center,
            radii: Vec2::new(radius, radius),
            start_angle: start,
            sweep_angle: sweep,
            x_rotation: 0.0,
        };
        for el in arc.append_iter(TOLERANCE) {
            self.path.push(t * el);
        }
        self.current = Some(center + Vec2::from_angle(start + sweep) * radius);
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.append_shape(Rect::new(
            x as f64,
            y as f64,
            (x + w) as f64,
            (y + h) as f64,
        ));
    }

    fn rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32) {
        self.append_shape(RoundedRect::new(
            x as f64,
            y as f64,
            (x + w) as f64,
            (y + h) as f64,
            radius as f64,
        ));
    }

    fn circle(&mut self, cx: f32, cy: f32, r: f32) {
        self.append_shape(Circle::new((cx as f64, cy as f64), r as f64));
    }

    fn ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) {
        self.append_shape(Ellipse::new(
            (cx as f64, cy as f64),
            (rx as f64, ry as f64),
            0.0,
        ));
    }

    fn fill(&mut self) {
        if self.path.elements().is_empty() {
            return;
        }
        let op = DrawOp::Fill {
            path: self.path.clone(),
            brush: self.state.fill.clone(),
            scissor: self.state.scissor,
        };
        self.record(op);
    }

    fn stroke(&mut self) {
        if self.path.elements().is_empty() {
            return;
        }
        let scale = self.state.transform.determinant().abs().sqrt();
        let op = DrawOp::Stroke {
            path: self.path.clone(),
            brush: self.state.stroke.clone(),
            width: self.state.stroke_width as f64 * scale,
            cap: self.state.line_cap,
            join: self.state.line_join,
            miter_limit: self.state.miter_limit as f64,
            scissor: self.state.scissor,
        };
        self.record(op);
    }

    fn fill_paint(&mut self, paint: Paint) {
        self.state.fill = self.brush(paint);
    }

    fn stroke_paint(&mut self, paint: Paint) {
        self.state.stroke = self.brush(paint);
    }

    fn stroke_width(&mut self, width: f32) {
        self.state.stroke_width = width;
    }

    fn line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
    }

    fn line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
    }

    fn miter_limit(&mut self, limit: f32) {
        self.state.miter_limit = limit;
    }

    fn reset_transform(&mut self) {
        self.state.transform = Affine::IDENTITY;
    }

    fn transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        let m = Affine::new([a, b, c, d, e, f].map(f64::from));
        self.state.transform = self.state.transform * m;
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.state.transform = self.state.transform * Affine::translate((x as f64, y as f64));
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.state.transform = self.state.transform * Affine::scale_non_uniform(x as f64, y as f64);
    }

    fn rotate(&mut self, radians: f32) {
        self.state.transform = self.state.transform * Affine::rotate(radians as f64);
    }

    fn skew_x(&mut self, radians: f32) {
        let k = (radians as f64).tan();
        self.state.transform = self.state.transform * Affine::new([1.0, 0.0, k, 1.0, 0.0, 0.0]);
    }

    fn skew_y(&mut self, radians: f32) {
        let k = (radians as f64).tan();
        self.state.transform = self.state.transform * Affine::new([1.0, k, 0.0, 1.0, 0.0, 0.0]);
    }

    fn scissor(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.state.scissor = Some(self.local_scissor(x, y, w, h));
    }

    fn intersect_scissor(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let rect = self.local_scissor(x, y, w, h);
        self.state.scissor = Some(match self.state.scissor {
            Some(existing) => existing.intersect(rect),
            None => rect,
        });
    }

    fn reset_scissor(&mut self) {
        self.state.scissor = None;
    }

    fn font_face(&mut self, font: FontId) {
        self.state.font = Some(font);
    }

    fn font_size(&mut self, size: f32) {
        self.state.font_size = size;
    }

    fn font_blur(&mut self, blur: f32) {
        self.state.font_blur = blur;
    }

    fn text_align(&mut self, align: TextAlign) {
        self.state.text_align = align;
    }

    fn text_baseline(&mut self, baseline: TextBaseline) {
        self.state.text_baseline = baseline;
    }

    fn line_height(&self) -> f32 {
        self.metrics().line_height()
    }

    fn break_lines(&self, text: &str, max_width: f32) -> Vec<TextRow> {
        break_rows(self.metrics(), text, max_width)
    }

    fn text(&mut self, x: f32, y: f32, text: &str) {
        let op = DrawOp::Text {
            origin: self.device(x, y),
            text: text.to_owned(),
            font: self.state.font.map(|font| font.0),
            size: self.state.font_size as f64,
            blur: self.state.font_blur as f64,
            align: self.state.text_align,
            baseline: self.state.text_baseline,
            brush: self.state.fill.clone(),
            scissor: self.state.scissor,
        };
        self.record(op);
    }
}

/// Squared distance from `p` to the segment `a`-`b`.
fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len = ab.hypot2();
    let t = if len > 0.0 {
        ((p - a).dot(ab) / len).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = a + ab * t;
    (p - closest).hypot2()
}
