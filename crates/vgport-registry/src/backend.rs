use crate::key::ResourceKey;

/// Backend handle of an uploaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Backend handle of a loaded font face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

/// Texture storage of a rendering backend.
///
/// Pixels are always tightly packed RGBA8, `width * height * 4` bytes.
/// Textures repeat in both directions when sampled outside their bounds.
pub trait TextureBackend {
    /// Upload a new texture. Returns `None` if the backend refuses it.
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Option<TextureId>;

    /// Replace every pixel of an existing texture with the same dimensions.
    fn update_texture(&mut self, texture: TextureId, rgba: &[u8]);

    fn delete_texture(&mut self, texture: TextureId);

    /// Dimensions of a live texture.
    fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)>;
}

/// Font storage of a rendering backend.
pub trait FontBackend {
    /// Load a font face from an in-memory blob. Returns `None` if the blob is
    /// not a usable font.
    fn create_font(&mut self, key: &ResourceKey, blob: &[u8]) -> Option<FontId>;

    fn delete_font(&mut self, font: FontId);
}
