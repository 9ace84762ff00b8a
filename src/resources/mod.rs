//! Device-agnostic resources.
//!
//! - Buffer: linear byte store, optionally described by a `ResourceFormat`
//! - Image: multi-dimensional pixel store with mips and layers
//! - Bitmap: owned 2D pixel array used for image transfers
//!
//! Resources hold configuration and identity only. Storage lives on the
//! devices that own them.

pub mod bitmap;
pub mod buffer;
pub mod image;
pub mod resource;

pub use bitmap::Bitmap;
pub use buffer::{Buffer, BufferConfig, BufferInner, BufferRange};
pub use image::{Image, ImageConfig, ImageDimensions, ImageInner, ImageRegion};
pub use resource::{DeviceId, OwnerSet, Resource, ResourceCore, ResourceId, ResourceKind};
