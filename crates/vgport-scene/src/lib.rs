//! A headless [`VectorCanvas`](vgport_script::VectorCanvas) built on `kurbo`.
//!
//! [`SceneCanvas`] keeps the full immediate-mode state (transform, paints,
//! stroke parameters, scissor, font) and turns every fill, stroke and text
//! call into a [`DrawOp`] in device space. The last finished frame is kept as
//! a serializable [`Scene`], which is what the driver dumps when asked.

pub mod canvas;
pub mod layout;
pub mod scene;

pub use canvas::SceneCanvas;
pub use layout::{break_rows, TextMetrics};
pub use scene::{Brush, DrawOp, Scene};
