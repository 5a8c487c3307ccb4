//! Render-script bytecode for the vgport driver.
//!
//! A script is a flat buffer of instructions, each a big-endian
//! `[u16 op][u16 param]` header followed by op-specific operands. The
//! interpreter walks the buffer with an explicit cursor and turns every
//! instruction into calls on a [`VectorCanvas`]. Scripts can run other
//! scripts by key, up to a configured depth.

pub mod builder;
pub mod canvas;
pub mod decode;
pub mod error;
pub mod interp;
pub mod op;
pub mod recording;

pub use builder::ScriptBuilder;
pub use canvas::{
    Color, LineCap, LineJoin, Paint, TextAlign, TextBaseline, TextRow, VectorCanvas,
};
pub use error::{Result, ScriptError};
pub use interp::{Interpreter, InterpreterConfig, Notice, Notifier, Resources, RunSummary};
pub use op::Instr;
pub use recording::{CanvasCall, RecordingCanvas};
