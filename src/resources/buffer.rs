use std::ops::Deref;
use std::sync::Arc;

use crate::format::resource_format::ResourceFormat;
use crate::resources::resource::{Resource, ResourceCore, ResourceKind};

/// Creation parameters of a [`Buffer`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferConfig {
    pub byte_size: usize,
    /// Record layout of the contents. Empty for untyped buffers.
    pub format: ResourceFormat,
    pub label: String,
}

impl BufferConfig {
    #[must_use]
    pub fn new(byte_size: usize) -> Self {
        Self {
            byte_size,
            ..Default::default()
        }
    }

    /// Sized to hold `element_count` records of `format`.
    #[must_use]
    pub fn with_format(format: ResourceFormat, element_count: usize) -> Self {
        Self {
            byte_size: format.size() * element_count,
            format,
            label: String::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Byte interval of a buffer.
///
/// A `byte_size` of [`BufferRange::REMAINING`] extends to the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferRange {
    pub byte_offset: usize,
    pub byte_size: usize,
}

impl Default for BufferRange {
    fn default() -> Self {
        Self::WHOLE
    }
}

impl BufferRange {
    pub const REMAINING: usize = usize::MAX;

    pub const WHOLE: Self = Self {
        byte_offset: 0,
        byte_size: Self::REMAINING,
    };

    #[must_use]
    pub const fn new(byte_offset: usize, byte_size: usize) -> Self {
        Self { byte_offset, byte_size }
    }

    /// Everything from `byte_offset` to the end of the buffer.
    #[must_use]
    pub const fn from_offset(byte_offset: usize) -> Self {
        Self::new(byte_offset, Self::REMAINING)
    }

    /// Replaces the sentinel with the concrete size for `config`.
    #[must_use]
    pub fn resolve(&self, config: &BufferConfig) -> Self {
        let byte_size = if self.byte_size == Self::REMAINING {
            config.byte_size.saturating_sub(self.byte_offset)
        } else {
            self.byte_size
        };
        Self::new(self.byte_offset, byte_size)
    }

    /// True when the resolved range lies inside the buffer.
    #[must_use]
    pub fn is_valid(&self, config: &BufferConfig) -> bool {
        let resolved = self.resolve(config);
        resolved
            .byte_offset
            .checked_add(resolved.byte_size)
            .is_some_and(|end| end <= config.byte_size)
    }

    #[must_use]
    pub fn end(&self) -> usize {
        self.byte_offset.saturating_add(self.byte_size)
    }
}

#[derive(Debug)]
pub struct BufferInner {
    core: ResourceCore,
    config: BufferConfig,
}

impl BufferInner {
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.config.byte_size
    }

    #[inline]
    #[must_use]
    pub fn format(&self) -> &ResourceFormat {
        &self.config.format
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.config.label
    }
}

/// Handle to a linear byte store. Cloning shares identity.
#[derive(Debug, Clone)]
pub struct Buffer(Arc<BufferInner>);

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.0.core.id() == other.0.core.id()
    }
}

impl Eq for Buffer {}

impl std::hash::Hash for Buffer {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.core.id().hash(state);
    }
}

impl Deref for Buffer {
    type Target = BufferInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Buffer {
    #[must_use]
    pub fn create(config: BufferConfig) -> Self {
        log::debug!("Creating buffer '{}' ({} bytes)", config.label, config.byte_size);
        Self(Arc::new(BufferInner {
            core: ResourceCore::new(ResourceKind::Buffer),
            config,
        }))
    }

    /// Number of whole records of the buffer's format. Zero when untyped.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.config.byte_size.checked_div(self.config.format.size()).unwrap_or(0)
    }
}

impl Resource for Buffer {
    fn core(&self) -> &ResourceCore {
        &self.0.core
    }
}
