use tracing::debug;

use crate::backend::{FontBackend, FontId};
use crate::error::{RegistryError, Result};
use crate::key::ResourceKey;
use crate::registry::Registry;

/// A loaded font face and the blob it was loaded from.
#[derive(Debug)]
pub struct Font {
    pub key: ResourceKey,
    pub blob: Vec<u8>,
    pub handle: FontId,
}

/// Outcome of [`FontRegistry::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontPut {
    Loaded(FontId),
    /// A font with this key was already loaded; the new blob was dropped.
    AlreadyPresent(FontId),
}

/// Fonts by key. The first blob registered under a key wins; fonts are
/// only released by [`FontRegistry::reset`].
#[derive(Debug, Default)]
pub struct FontRegistry {
    fonts: Registry<Font>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<B: FontBackend + ?Sized>(
        &mut self,
        key: ResourceKey,
        blob: Vec<u8>,
        backend: &mut B,
    ) -> Result<FontPut> {
        if let Some(existing) = self.fonts.get(key.as_bytes()) {
            debug!(%key, "font already loaded, ignoring resubmission");
            return Ok(FontPut::AlreadyPresent(existing.handle));
        }

        let handle = backend
            .create_font(&key, &blob)
            .ok_or_else(|| RegistryError::BackendRejected {
                kind: "font",
                key: key.clone(),
            })?;
        self.fonts.insert(key.clone(), Font { key, blob, handle });
        Ok(FontPut::Loaded(handle))
    }

    pub fn get(&self, key: &[u8]) -> Option<&Font> {
        self.fonts.get(key)
    }

    pub fn handle(&self, key: &[u8]) -> Option<FontId> {
        self.fonts.get(key).map(|font| font.handle)
    }

    /// Release every font with the backend and empty the registry.
    pub fn reset<B: FontBackend + ?Sized>(&mut self, backend: &mut B) {
        self.fonts
            .clear_with(|_, font| backend.delete_font(font.handle));
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}
