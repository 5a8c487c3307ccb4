use vgport_frame::FrameError;
use vgport_registry::{RegistryError, ResourceKey};

/// Errors raised while handling host frames.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Frame-level error. Fatal when the host stream is gone.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// A registry refused a resource.
    #[error("{0}")]
    Registry(#[from] RegistryError),

    /// The frame ended before the handler had read its fixed fields.
    #[error("{opcode}: truncated payload")]
    Truncated { opcode: &'static str },

    /// A font file named by the host could not be read.
    #[error("font {key}: cannot read {path}: {source}")]
    FontFile {
        key: ResourceKey,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The opcode is not part of the protocol.
    #[error("unknown opcode {0:#04X}")]
    UnknownOpcode(u32),

    /// The host sent the test-only crash opcode.
    #[error("crash requested by host")]
    CrashRequested,
}

impl SessionError {
    /// True when the session cannot continue.
    pub fn is_fatal(&self) -> bool {
        match self {
            SessionError::Frame(err) => err.is_fatal(),
            SessionError::CrashRequested => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_opcode_names_value_in_hex() {
        assert_eq!(
            SessionError::UnknownOpcode(0xEE).to_string(),
            "unknown opcode 0xEE"
        );
    }

    #[test]
    fn only_stream_loss_and_crash_are_fatal() {
        assert!(SessionError::Frame(FrameError::ConnectionClosed).is_fatal());
        assert!(SessionError::CrashRequested.is_fatal());
        assert!(!SessionError::Frame(FrameError::AllocationFailed { size: 8 }).is_fatal());
        assert!(!SessionError::Truncated { opcode: "RENDER" }.is_fatal());
        assert!(!SessionError::FontFile {
            key: ResourceKey::from("sans"),
            path: "/missing.ttf".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }
        .is_fatal());
    }
}
