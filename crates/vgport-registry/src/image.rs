use tracing::debug;

use crate::backend::{TextureBackend, TextureId};
use crate::error::{RegistryError, Result};
use crate::key::ResourceKey;
use crate::pixels::{to_rgba, PixelFormat};
use crate::registry::Registry;

/// An uploaded image and the RGBA pixels backing its texture.
#[derive(Debug)]
pub struct Image {
    pub key: ResourceKey,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
    pub texture: TextureId,
}

impl Image {
    fn same_shape(&self, width: u32, height: u32, format: PixelFormat) -> bool {
        self.width == width && self.height == height && self.format == format
    }
}

/// Outcome of [`ImageRegistry::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePut {
    Created(TextureId),
    /// Same dimensions and format: the existing texture was rewritten.
    Updated(TextureId),
    /// Dimensions or format changed: the old texture was destroyed.
    Replaced { old: TextureId, new: TextureId },
}

/// Images by key.
#[derive(Debug, Default)]
pub struct ImageRegistry {
    images: Registry<Image>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert `blob` and store it under `key`.
    ///
    /// The pixels are converted before anything is touched, so a bad blob
    /// leaves any existing image as it was.
    pub fn put<B: TextureBackend + ?Sized>(
        &mut self,
        key: ResourceKey,
        width: u32,
        height: u32,
        format: u32,
        blob: Vec<u8>,
        backend: &mut B,
    ) -> Result<ImagePut> {
        let converted = PixelFormat::try_from(format)
            .and_then(|format| Ok((format, to_rgba(format, width, height, blob)?)));
        let (format, pixels) = converted.map_err(|source| RegistryError::Image {
            key: key.clone(),
            source,
        })?;

        if let Some(existing) = self.images.get_mut(key.as_bytes()) {
            if existing.same_shape(width, height, format) {
                backend.update_texture(existing.texture, &pixels);
                // The backend is done reading the old buffer.
                existing.pixels = pixels;
                return Ok(ImagePut::Updated(existing.texture));
            }
        }

        let texture = backend
            .create_texture(width, height, &pixels)
            .ok_or_else(|| RegistryError::BackendRejected {
                kind: "image",
                key: key.clone(),
            })?;

        let previous = self.images.insert(
            key.clone(),
            Image {
                key,
                width,
                height,
                format,
                pixels,
                texture,
            },
        );

        match previous {
            Some(old) => {
                debug!(key = %old.key, "image shape changed, texture rebuilt");
                backend.delete_texture(old.texture);
                Ok(ImagePut::Replaced {
                    old: old.texture,
                    new: texture,
                })
            }
            None => Ok(ImagePut::Created(texture)),
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&Image> {
        self.images.get(key)
    }

    /// Remove an image and release its texture. No-op if absent.
    pub fn delete<B: TextureBackend + ?Sized>(&mut self, key: &[u8], backend: &mut B) -> bool {
        match self.images.remove(key) {
            Some(image) => {
                backend.delete_texture(image.texture);
                true
            }
            None => false,
        }
    }

    /// Release every texture and empty the registry.
    pub fn reset<B: TextureBackend + ?Sized>(&mut self, backend: &mut B) {
        self.images
            .clear_with(|_, image| backend.delete_texture(image.texture));
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
