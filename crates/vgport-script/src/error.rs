/// Errors that stop a script.
///
/// None of these are fatal to the driver: the interpreter reports them as a
/// diagnostic and moves on to the next frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    /// An operand ran past the end of the buffer.
    #[error("script truncated at offset {offset}: needed {needed} bytes, {available} left")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The op is not in the instruction table; its operand size is unknown.
    #[error("unknown script op {op:#06x} at offset {offset}")]
    UnknownOp { op: u16, offset: usize },

    /// Sub-script calls nested deeper than allowed.
    #[error("script nesting exceeds {max_depth} levels")]
    DepthExceeded { max_depth: usize },
}

pub type Result<T> = std::result::Result<T, ScriptError>;
