use crate::key::ResourceKey;

/// Errors converting submitted pixels to RGBA.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// The format word is not one of the known pixel formats.
    #[error("unknown pixel format {0}")]
    UnknownFormat(u32),

    /// A raw pixel blob does not match `width * height * channels`.
    #[error("pixel data is {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    /// An encoded image decoded to different dimensions than declared.
    #[error("decoded image is {actual_width}x{actual_height}, expected {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// Raw pixels were grouped into a channel count with no RGBA expansion.
    #[error("cannot expand {0}-channel pixels to RGBA")]
    ChannelCount(usize),

    /// The encoded image could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(#[from] ::image::ImageError),

    /// The RGBA buffer could not be allocated.
    #[error("unable to allocate {size} bytes of pixels")]
    AllocationFailed { size: usize },
}

/// Errors from registry mutations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("image {key}: {source}")]
    Image {
        key: ResourceKey,
        #[source]
        source: ImageError,
    },

    /// The backend refused to create a resource.
    #[error("backend rejected {kind} {key}")]
    BackendRejected { kind: &'static str, key: ResourceKey },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
