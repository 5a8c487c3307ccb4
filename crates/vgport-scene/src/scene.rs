use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use vgport_script::{Color, LineCap, LineJoin, TextAlign, TextBaseline};

/// How a draw op is colored. Geometry is in device space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Brush {
    Solid {
        color: Color,
    },
    Linear {
        start: Point,
        end: Point,
        inner: Color,
        outer: Color,
    },
    Radial {
        center: Point,
        inner_radius: f64,
        outer_radius: f64,
        inner: Color,
        outer: Color,
    },
    Box {
        rect: Rect,
        radius: f64,
        feather: f64,
        inner: Color,
        outer: Color,
    },
    Image {
        texture: u32,
        origin: Point,
        extent: Vec2,
        angle: f64,
        alpha: f64,
    },
}

/// One recorded draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Fill {
        path: BezPath,
        brush: Brush,
        scissor: Option<Rect>,
    },
    Stroke {
        path: BezPath,
        brush: Brush,
        width: f64,
        cap: LineCap,
        join: LineJoin,
        miter_limit: f64,
        scissor: Option<Rect>,
    },
    Text {
        origin: Point,
        text: String,
        font: Option<u32>,
        size: f64,
        blur: f64,
        align: TextAlign,
        baseline: TextBaseline,
        brush: Brush,
        scissor: Option<Rect>,
    },
}

/// Everything drawn between one `begin_frame` and `end_frame`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
    pub clear: Color,
    pub ops: Vec<DrawOp>,
}

impl Scene {
    pub fn fills(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Fill { .. }))
    }

    pub fn strokes(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Stroke { .. }))
    }

    pub fn texts(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { .. }))
    }
}
