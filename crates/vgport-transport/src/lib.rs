//! Host byte-stream transport for the vgport driver.
//!
//! The driver talks to its host over a pair of pipes: frames arrive on stdin
//! and replies leave on stdout. This is the lowest layer of vgport. It knows
//! nothing about framing; it only offers:
//! - a bounded wait for input readiness ([`PollRead::wait_readable`])
//! - hang-up detection for the host side of the pipe ([`PollRead::hung_up`])
//! - unbuffered access to the process stdio handles ([`HostInput`], [`HostOutput`])

pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod stdio;

pub use error::{Result, TransportError};
pub use traits::{HostOutput, PollRead};

#[cfg(unix)]
pub use stdio::HostInput;
