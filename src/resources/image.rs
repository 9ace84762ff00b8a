use std::ops::Deref;
use std::sync::Arc;

use crate::format::pixel_format::{PixelFormat, compute_image_size_bytes};
use crate::resources::resource::{Resource, ResourceCore, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImageDimensions {
    D1,
    #[default]
    D2,
    D3,
    Cube,
}

/// Creation parameters of an [`Image`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageConfig {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    /// Array layers. Cube images count each face as a layer.
    pub array_size: u32,
    pub mip_levels: u32,
    pub sample_count: u32,
    pub dimensions: ImageDimensions,
    pub format: PixelFormat,
    pub label: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            depth: 1,
            array_size: 1,
            mip_levels: 1,
            sample_count: 1,
            dimensions: ImageDimensions::D2,
            format: PixelFormat::RGBA8UNorm,
            label: String::new(),
        }
    }
}

impl ImageConfig {
    #[must_use]
    pub fn new_2d(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_mip_levels(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Extent of mip `level`, each axis clamped to at least one texel.
    #[must_use]
    pub fn mip_extent(&self, level: u32) -> (u32, u32, u32) {
        let shrink = |v: u32| v.checked_shr(level).unwrap_or(0).max(1);
        (shrink(self.width), shrink(self.height), shrink(self.depth))
    }

    #[inline]
    #[must_use]
    pub fn layer_count(&self) -> u32 {
        self.array_size.max(1)
    }

    /// Byte size of mip `level` across all layers.
    #[must_use]
    pub fn level_byte_size(&self, level: u32) -> usize {
        let (w, h, d) = self.mip_extent(level);
        compute_image_size_bytes(self.format, w, h, d) * self.layer_count() as usize
    }
}

/// Texel box within one mip level of an image, spanning a range of layers.
///
/// Extent fields and `layer_count` may be [`ImageRegion::REMAINING`] to
/// extend to the end of the mip level or layer array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageRegion {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mip_level: u32,
    pub base_layer: u32,
    pub layer_count: u32,
}

impl Default for ImageRegion {
    fn default() -> Self {
        Self::whole(0)
    }
}

impl ImageRegion {
    pub const REMAINING: u32 = u32::MAX;

    /// All of mip `level`, every layer.
    #[must_use]
    pub const fn whole(mip_level: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            z: 0,
            width: Self::REMAINING,
            height: Self::REMAINING,
            depth: Self::REMAINING,
            mip_level,
            base_layer: 0,
            layer_count: Self::REMAINING,
        }
    }

    /// A rectangle of layer 0, mip 0.
    #[must_use]
    pub const fn rect(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            z: 0,
            width,
            height,
            depth: 1,
            mip_level: 0,
            base_layer: 0,
            layer_count: 1,
        }
    }

    #[must_use]
    pub const fn with_mip_level(mut self, mip_level: u32) -> Self {
        self.mip_level = mip_level;
        self
    }

    #[must_use]
    pub const fn with_layers(mut self, base_layer: u32, layer_count: u32) -> Self {
        self.base_layer = base_layer;
        self.layer_count = layer_count;
        self
    }

    /// Replaces sentinels with concrete extents for `config`.
    #[must_use]
    pub fn resolve(&self, config: &ImageConfig) -> Self {
        let (w, h, d) = config.mip_extent(self.mip_level);
        let fill = |size: u32, origin: u32, extent: u32| {
            if size == Self::REMAINING {
                extent.saturating_sub(origin)
            } else {
                size
            }
        };
        Self {
            width: fill(self.width, self.x, w),
            height: fill(self.height, self.y, h),
            depth: fill(self.depth, self.z, d),
            layer_count: fill(self.layer_count, self.base_layer, config.layer_count()),
            ..*self
        }
    }

    /// True when the resolved region is non-empty and inside the image.
    #[must_use]
    pub fn is_valid(&self, config: &ImageConfig) -> bool {
        if self.mip_level >= config.mip_levels.max(1) {
            return false;
        }
        let r = self.resolve(config);
        let (w, h, d) = config.mip_extent(r.mip_level);
        let fits = |origin: u32, size: u32, extent: u32| {
            size > 0 && origin.checked_add(size).is_some_and(|end| end <= extent)
        };
        fits(r.x, r.width, w)
            && fits(r.y, r.height, h)
            && fits(r.z, r.depth, d)
            && fits(r.base_layer, r.layer_count, config.layer_count())
    }

    /// Bytes needed to hold the resolved region tightly packed.
    #[must_use]
    pub fn byte_size(&self, config: &ImageConfig) -> usize {
        let r = self.resolve(config);
        compute_image_size_bytes(config.format, r.width, r.height, r.depth) * r.layer_count as usize
    }
}

#[derive(Debug)]
pub struct ImageInner {
    core: ResourceCore,
    config: ImageConfig,
}

impl ImageInner {
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.config.format
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.config.label
    }
}

/// Handle to a pixel store. Cloning shares identity.
#[derive(Debug, Clone)]
pub struct Image(Arc<ImageInner>);

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.0.core.id() == other.0.core.id()
    }
}
impl Eq for Image {}
impl std::hash::Hash for Image {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.core.id().hash(state);
    }
}

impl Deref for Image {
    type Target = ImageInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Image {
    #[must_use]
    pub fn create(config: ImageConfig) -> Self {
        log::debug!(
            "Creating image '{}' {}x{}x{} {} ({} mips, {} layers)",
            config.label,
            config.width,
            config.height,
            config.depth,
            config.format,
            config.mip_levels,
            config.layer_count()
        );
        Self(Arc::new(ImageInner {
            core: ResourceCore::new(ResourceKind::Image),
            config,
        }))
    }
}

impl Resource for Image {
    fn core(&self) -> &ResourceCore {
        &self.0.core
    }
}
