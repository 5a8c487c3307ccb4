//! Display-side GUI driver for a host-controlled rendering pipeline.
//!
//! The host pushes render scripts, fonts and images down stdin as framed
//! binary messages; the driver keeps them in keyed registries, runs the root
//! script against a vector canvas every frame, and sends input events and
//! resource misses back up stdout.
//!
//! # Crate Structure
//!
//! - [`transport`]: host stdin/stdout with a bounded wait
//! - [`frame`]: length-prefixed framing and the opcode tables
//! - [`registry`]: script, font and image registries
//! - [`script`]: the render-script interpreter and the canvas capability
//! - [`session`]: protocol dispatcher and the per-tick loop
//! - [`scene`]: headless canvas that records frames as display lists

/// Re-export transport types.
pub mod transport {
    pub use vgport_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use vgport_frame::*;
}

/// Re-export registry types.
pub mod registry {
    pub use vgport_registry::*;
}

/// Re-export interpreter types.
pub mod script {
    pub use vgport_script::*;
}

/// Re-export session types.
pub mod session {
    pub use vgport_session::*;
}

/// Re-export the headless canvas.
pub mod scene {
    pub use vgport_scene::*;
}
