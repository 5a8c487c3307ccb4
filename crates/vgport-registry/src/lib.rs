//! Keyed resource caches for the vgport driver.
//!
//! Scripts, fonts and images are each stored in their own registry under an
//! opaque byte-string [`ResourceKey`]. The registries differ only in what a
//! duplicate `put` does:
//! - scripts are replaced
//! - fonts keep the first blob and ignore the resubmission
//! - images update their texture in place when the shape is unchanged and are
//!   rebuilt otherwise
//!
//! Backend objects (font handles, textures) are created and released through
//! the [`FontBackend`] and [`TextureBackend`] traits, so every removal path
//! releases what it allocated.

pub mod backend;
pub mod error;
pub mod font;
pub mod image;
pub mod key;
pub mod pixels;
pub mod registry;
pub mod script;

pub use backend::{FontBackend, FontId, TextureBackend, TextureId};
pub use error::{ImageError, RegistryError, Result};
pub use font::{Font, FontPut, FontRegistry};
pub use crate::image::{Image, ImagePut, ImageRegistry};
pub use key::ResourceKey;
pub use pixels::{to_rgba, PixelFormat};
pub use registry::Registry;
pub use script::{Script, ScriptRegistry};
