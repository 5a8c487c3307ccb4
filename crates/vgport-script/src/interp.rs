use std::f32::consts::TAU;

use tracing::{debug, warn};
use vgport_registry::{FontRegistry, ImageRegistry, ResourceKey, ScriptRegistry};

use crate::canvas::{Paint, VectorCanvas};
use crate::decode::floats;
use crate::error::ScriptError;
use crate::op::{DrawFlags, Gradient, Instr, Target, SPRITE_RECORD_SIZE};

/// Default wrap width for text rows, in local units.
pub const DEFAULT_WRAP_WIDTH: f32 = 1000.0;

/// Default limit on nested `render_script` calls.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration for the interpreter.
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    /// Maximum row width when breaking text. Default: 1000.
    pub wrap_width: f32,
    /// Maximum script nesting, counting the root. Default: 64.
    pub max_depth: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            wrap_width: DEFAULT_WRAP_WIDTH,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Something the host should hear about after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    ScriptMiss(ResourceKey),
    ImageMiss(ResourceKey),
    FontMiss(ResourceKey),
    Diagnostic(String),
}

/// Receives resource misses and diagnostics raised while a script runs.
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

impl Notifier for Vec<Notice> {
    fn notify(&mut self, notice: Notice) {
        self.push(notice);
    }
}

/// The registries a script may reference.
#[derive(Clone, Copy)]
pub struct Resources<'a> {
    pub scripts: &'a ScriptRegistry,
    pub fonts: &'a FontRegistry,
    pub images: &'a ImageRegistry,
}

/// Counters for one top-level render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Scripts entered, including the root.
    pub scripts: usize,
    pub instructions: usize,
    /// Scripts stopped early by a bad instruction.
    pub aborted: usize,
    /// Pushes left open by scripts and popped on their behalf.
    pub unwound: usize,
}

/// Executes render scripts against a [`VectorCanvas`].
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    config: InterpreterConfig,
}

impl Interpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Run the script stored under `root`.
    ///
    /// The canvas state is reset first. Every script, root or nested, pops
    /// whatever it pushed before returning, so the canvas stack ends at the
    /// depth it started at.
    pub fn render<C, N>(
        &self,
        root: &[u8],
        resources: Resources<'_>,
        canvas: &mut C,
        notifier: &mut N,
    ) -> RunSummary
    where
        C: VectorCanvas + ?Sized,
        N: Notifier + ?Sized,
    {
        canvas.reset();
        let mut run = Run {
            config: &self.config,
            resources,
            canvas,
            notifier,
            summary: RunSummary::default(),
        };
        run.script(root, 0);
        run.summary
    }
}

struct Run<'r, 'a, C: ?Sized, N: ?Sized> {
    config: &'r InterpreterConfig,
    resources: Resources<'a>,
    canvas: &'r mut C,
    notifier: &'r mut N,
    summary: RunSummary,
}

impl<'a, C, N> Run<'_, 'a, C, N>
where
    C: VectorCanvas + ?Sized,
    N: Notifier + ?Sized,
{
    fn script(&mut self, key: &[u8], depth: usize) {
        if depth >= self.config.max_depth {
            let err = ScriptError::DepthExceeded {
                max_depth: self.config.max_depth,
            };
            self.diagnostic(format!("render_script {}: {err}", ResourceKey::from(key)));
            return;
        }

        let scripts = self.resources.scripts;
        let Some(script) = scripts.get(key) else {
            debug!(key = %ResourceKey::from(key), "script miss");
            self.notifier.notify(Notice::ScriptMiss(ResourceKey::from(key)));
            return;
        };
        let code: &'a [u8] = &script.bytecode;
        self.summary.scripts += 1;

        let mut pushes = 0usize;
        let mut offset = 0usize;
        while offset < code.len() {
            match Instr::decode(code, offset) {
                Ok((instr, next)) => {
                    self.summary.instructions += 1;
                    self.exec(instr, &mut pushes, depth);
                    offset = next;
                }
                Err(err) => {
                    self.summary.aborted += 1;
                    self.diagnostic(format!("script {}: {err}", script.key));
                    break;
                }
            }
        }

        if pushes > 0 {
            debug!(key = %script.key, pushes, "unwinding unmatched push_state");
        }
        while pushes > 0 {
            self.canvas.restore();
            pushes -= 1;
            self.summary.unwound += 1;
        }
    }

    fn exec(&mut self, instr: Instr<'a>, pushes: &mut usize, depth: usize) {
        let canvas = &mut *self.canvas;
        match instr {
            Instr::Line { from, to, flags } => {
                canvas.begin_path();
                canvas.move_to(from.0, from.1);
                canvas.line_to(to.0, to.1);
                self.finish(flags);
            }
            Instr::Triangle { points, flags } => {
                self.polygon(&points);
                self.finish(flags);
            }
            Instr::Quad { points, flags } => {
                self.polygon(&points);
                self.finish(flags);
            }
            Instr::Rect { w, h, flags } => {
                canvas.begin_path();
                canvas.rect(0.0, 0.0, w, h);
                self.finish(flags);
            }
            Instr::RoundedRect { w, h, radius, flags } => {
                canvas.begin_path();
                canvas.rounded_rect(0.0, 0.0, w, h, radius);
                self.finish(flags);
            }
            Instr::Arc { radius, angle, flags } => {
                canvas.begin_path();
                self.tessellate(radius, angle, false);
                self.finish(flags);
            }
            Instr::Sector { radius, angle, flags } => {
                canvas.begin_path();
                self.tessellate(radius, angle, true);
                self.finish(flags);
            }
            Instr::Circle { radius, flags } => {
                canvas.begin_path();
                canvas.circle(0.0, 0.0, radius);
                self.finish(flags);
            }
            Instr::Ellipse { rx, ry, flags } => {
                canvas.begin_path();
                canvas.ellipse(0.0, 0.0, rx, ry);
                self.finish(flags);
            }
            Instr::Text(raw) => self.text(raw),
            Instr::Sprites { key, records } => self.sprites(key, records),
            Instr::RenderScript(key) => self.script(key, depth + 1),

            Instr::BeginPath => canvas.begin_path(),
            Instr::ClosePath => canvas.close_path(),
            Instr::Fill => canvas.fill(),
            Instr::Stroke => canvas.stroke(),
            Instr::MoveTo(x, y) => canvas.move_to(x, y),
            Instr::LineTo(x, y) => canvas.line_to(x, y),
            Instr::ArcTo {
                x1,
                y1,
                x2,
                y2,
                radius,
            } => canvas.arc_to(x1, y1, x2, y2, radius),
            Instr::BezierTo([c1x, c1y, c2x, c2y, x, y]) => {
                canvas.bezier_to(c1x, c1y, c2x, c2y, x, y)
            }
            Instr::QuadTo([cx, cy, x, y]) => canvas.quad_to(cx, cy, x, y),

            Instr::PushState => {
                canvas.save();
                *pushes += 1;
            }
            Instr::PopState => self.pop(pushes),
            Instr::PopPushState => {
                self.pop(pushes);
                self.canvas.save();
                *pushes += 1;
            }
            Instr::Scissor { w, h } => canvas.scissor(0.0, 0.0, w, h),
            Instr::IntersectScissor { w, h } => canvas.intersect_scissor(0.0, 0.0, w, h),
            Instr::ResetScissor => canvas.reset_scissor(),

            Instr::Transform([a, b, c, d, e, f]) => canvas.transform(a, b, c, d, e, f),
            Instr::Scale(x, y) => canvas.scale(x, y),
            Instr::Rotate(radians) => canvas.rotate(radians),
            Instr::Translate(x, y) => canvas.translate(x, y),
            Instr::SkewX(radians) => canvas.skew_x(radians),
            Instr::SkewY(radians) => canvas.skew_y(radians),
            Instr::ResetTransform => canvas.reset_transform(),

            Instr::Color(target, color) => self.paint(target, Paint::Solid(color)),
            Instr::Gradient {
                target,
                shape,
                inner,
                outer,
            } => {
                let paint = match shape {
                    Gradient::Linear { sx, sy, ex, ey } => Paint::Linear {
                        start: (sx, sy),
                        end: (ex, ey),
                        inner,
                        outer,
                    },
                    Gradient::Radial {
                        cx,
                        cy,
                        inner: inner_radius,
                        outer: outer_radius,
                    } => Paint::Radial {
                        center: (cx, cy),
                        inner_radius,
                        outer_radius,
                        inner,
                        outer,
                    },
                    Gradient::Box {
                        x,
                        y,
                        w,
                        h,
                        radius,
                        feather,
                    } => Paint::Box {
                        origin: (x, y),
                        size: (w, h),
                        radius,
                        feather,
                        inner,
                        outer,
                    },
                };
                self.paint(target, paint);
            }
            Instr::ImagePaint(target, key) => {
                if let Some(image) = self.image(key) {
                    let paint = Paint::Image {
                        texture: image.texture,
                        origin: (0.0, 0.0),
                        extent: (image.width as f32, image.height as f32),
                        angle: 0.0,
                        alpha: 1.0,
                    };
                    self.paint(target, paint);
                }
            }
            Instr::StrokeWidth(width) => canvas.stroke_width(width),
            Instr::LineCap(cap) => canvas.line_cap(cap),
            Instr::LineJoin(join) => canvas.line_join(join),
            Instr::MiterLimit(limit) => canvas.miter_limit(limit),

            Instr::Font(key) => match self.resources.fonts.handle(key) {
                Some(font) => canvas.font_face(font),
                None => {
                    debug!(key = %ResourceKey::from(key), "font miss");
                    self.notifier.notify(Notice::FontMiss(ResourceKey::from(key)));
                }
            },
            Instr::FontSize(size) => canvas.font_size(size),
            Instr::FontBlur(blur) => canvas.font_blur(blur),
            Instr::TextAlign(align) => canvas.text_align(align),
            Instr::TextBase(baseline) => canvas.text_baseline(baseline),

            Instr::Ignored(op) => debug!(op, "op parameter out of range, ignored"),
        }
    }

    fn finish(&mut self, flags: DrawFlags) {
        if flags.fill() {
            self.canvas.fill();
        }
        if flags.stroke() {
            self.canvas.stroke();
        }
    }

    fn polygon(&mut self, points: &[f32]) {
        self.canvas.begin_path();
        for (i, pair) in points.chunks_exact(2).enumerate() {
            if i == 0 {
                self.canvas.move_to(pair[0], pair[1]);
            } else {
                self.canvas.line_to(pair[0], pair[1]);
            }
        }
        self.canvas.close_path();
    }

    fn pop(&mut self, pushes: &mut usize) {
        if *pushes == 0 {
            self.diagnostic("pop_state without a matching push_state".to_owned());
            return;
        }
        self.canvas.restore();
        *pushes -= 1;
    }

    fn paint(&mut self, target: Target, paint: Paint) {
        match target {
            Target::Fill => self.canvas.fill_paint(paint),
            Target::Stroke => self.canvas.stroke_paint(paint),
        }
    }

    fn image(&mut self, key: &[u8]) -> Option<&'a vgport_registry::Image> {
        let images = self.resources.images;
        let image = images.get(key);
        if image.is_none() {
            debug!(key = %ResourceKey::from(key), "image miss");
            self.notifier.notify(Notice::ImageMiss(ResourceKey::from(key)));
        }
        image
    }

    /// Approximate an arc around the local origin with straight segments.
    ///
    /// The segment count is `trunc(log2(radius) * |angle| * 2)` with the
    /// angle clamped to one full turn. A sector starts and closes at the
    /// origin; an arc is left open.
    fn tessellate(&mut self, radius: f32, angle: f32, sector: bool) {
        if !radius.is_finite() || !angle.is_finite() {
            return;
        }
        let angle = angle.clamp(-TAU, TAU);
        let segments = (radius.log2() * angle.abs() * 2.0) as i32;
        if segments <= 0 {
            return;
        }

        let increment = angle / segments as f32;
        let mut a = 0.0f32;
        if sector {
            self.canvas.move_to(0.0, 0.0);
        }
        for i in 0..=segments {
            let (x, y) = (radius * a.cos(), radius * a.sin());
            if i == 0 && !sector {
                self.canvas.move_to(x, y);
            } else {
                self.canvas.line_to(x, y);
            }
            a += increment;
        }
        if sector {
            self.canvas.close_path();
        }
    }

    fn text(&mut self, raw: &[u8]) {
        let text = String::from_utf8_lossy(raw);
        let rows = self.canvas.break_lines(&text, self.config.wrap_width);
        let line_height = self.canvas.line_height();
        let mut y = 0.0f32;
        for row in rows {
            if let Some(line) = text.get(row.range) {
                self.canvas.text(0.0, y, line);
            }
            y += line_height;
        }
    }

    fn sprites(&mut self, key: &[u8], records: &[u8]) {
        let Some(image) = self.image(key) else {
            return;
        };
        let (iw, ih) = (image.width as f32, image.height as f32);

        for record in records.chunks_exact(SPRITE_RECORD_SIZE) {
            let Ok(([sx, sy, sw, sh, dx, dy, dw, dh], _)) = floats::<8>(record, 0) else {
                continue;
            };
            let ax = dw / sw;
            let ay = dh / sh;

            self.canvas.begin_path();
            self.canvas.rect(dx, dy, dw, dh);
            self.canvas.fill_paint(Paint::Image {
                texture: image.texture,
                origin: (dx - sx * ax, dy - sy * ay),
                extent: (iw * ax, ih * ay),
                angle: 0.0,
                alpha: 1.0,
            });
            self.canvas.fill();
        }
    }

    fn diagnostic(&mut self, message: String) {
        warn!(%message, "render script problem");
        self.notifier.notify(Notice::Diagnostic(message));
    }
}
