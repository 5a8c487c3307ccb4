//! The driver session: everything between the host stream and the canvas.
//!
//! A [`Session`] owns the frame reader, the resource registries and the
//! interpreter. Each tick it dispatches whatever frames arrive within one
//! frame interval, forwards window input the host asked for, and redraws the
//! root script when anything changed.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod input;
pub mod session;
pub mod window;

#[cfg(test)]
mod test_support;

pub use config::SessionConfig;
pub use dispatcher::Dispatcher;
pub use error::{Result, SessionError};
pub use input::{InputEvent, InputFilter};
pub use session::{Session, Tick};
pub use window::{HeadlessWindow, Window, WindowState};
