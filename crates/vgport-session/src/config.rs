use vgport_frame::FrameConfig;
use vgport_script::InterpreterConfig;

/// Configuration for a [`crate::Session`].
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Frame size limit and per-tick poll budget.
    pub frame: FrameConfig,
    /// Text wrap width and script nesting limit.
    pub interpreter: InterpreterConfig,
}
