use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vgport_frame::FrameConfig;
use vgport_script::InterpreterConfig;
use vgport_session::SessionConfig;

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID};
use crate::logging::LogSettings;

/// Driver tuning read from an optional JSON file. Missing fields keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    /// Largest inbound payload handled; bigger frames are drained.
    pub max_payload_size: usize,
    /// Longest wait for input in one tick.
    pub poll_timeout_ms: u64,
    /// Row width used when breaking text into rows.
    pub wrap_width: f32,
    /// Deepest script nesting, counting the root.
    pub max_script_depth: usize,
    /// Framebuffer pixels per window unit.
    pub pixel_scale: u32,
    /// Stderr log format and level.
    pub log: LogSettings,
}

impl Default for DriverConfig {
    fn default() -> Self {
        let frame = FrameConfig::default();
        let interpreter = InterpreterConfig::default();
        Self {
            max_payload_size: frame.max_payload_size,
            poll_timeout_ms: frame.poll_timeout.as_millis() as u64,
            wrap_width: interpreter.wrap_width,
            max_script_depth: interpreter.max_depth,
            pixel_scale: 1,
            log: LogSettings::default(),
        }
    }
}

impl DriverConfig {
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .map_err(|err| io_error(&format!("reading config {}", path.display()), err))?;
        Self::parse(&text).map_err(|err| {
            CliError::new(
                err.code,
                format!("config {}: {}", path.display(), err.message),
            )
        })
    }

    pub fn parse(text: &str) -> CliResult<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|err| CliError::new(DATA_INVALID, format!("invalid JSON: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.max_payload_size == 0 {
            return Err(CliError::new(DATA_INVALID, "max_payload_size must be > 0"));
        }
        if self.max_script_depth == 0 {
            return Err(CliError::new(DATA_INVALID, "max_script_depth must be > 0"));
        }
        if self.pixel_scale == 0 {
            return Err(CliError::new(DATA_INVALID, "pixel_scale must be > 0"));
        }
        if !(self.wrap_width.is_finite() && self.wrap_width > 0.0) {
            return Err(CliError::new(DATA_INVALID, "wrap_width must be positive"));
        }
        Ok(())
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            frame: FrameConfig {
                max_payload_size: self.max_payload_size,
                poll_timeout: Duration::from_millis(self.poll_timeout_ms),
            },
            interpreter: InterpreterConfig {
                wrap_width: self.wrap_width,
                max_depth: self.max_script_depth,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_library_defaults() {
        let session = DriverConfig::default().session();
        assert_eq!(
            session.frame.max_payload_size,
            FrameConfig::default().max_payload_size
        );
        assert_eq!(session.frame.poll_timeout, FrameConfig::default().poll_timeout);
        assert_eq!(session.interpreter.max_depth, InterpreterConfig::default().max_depth);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = DriverConfig::parse(r#"{ "poll_timeout_ms": 5, "pixel_scale": 2 }"#).unwrap();
        assert_eq!(config.poll_timeout_ms, 5);
        assert_eq!(config.pixel_scale, 2);
        assert_eq!(config.max_payload_size, DriverConfig::default().max_payload_size);
        assert_eq!(config.session().frame.poll_timeout, Duration::from_millis(5));
    }

    #[test]
    fn log_section_is_read() {
        let config = DriverConfig::parse(r#"{ "log": { "level": "warn" } }"#).unwrap();
        assert_eq!(config.log.level, crate::logging::LogLevel::Warn);
        assert_eq!(config.log.format, crate::logging::LogFormat::Text);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = DriverConfig::parse(r#"{ "poll_timeout": 5 }"#).unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn zero_limits_are_rejected() {
        assert!(DriverConfig::parse(r#"{ "max_payload_size": 0 }"#).is_err());
        assert!(DriverConfig::parse(r#"{ "max_script_depth": 0 }"#).is_err());
        assert!(DriverConfig::parse(r#"{ "pixel_scale": 0 }"#).is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = DriverConfig::load(Some(Path::new("/nonexistent/vgport.json"))).unwrap_err();
        assert!(err.message.contains("reading config"));
    }
}
