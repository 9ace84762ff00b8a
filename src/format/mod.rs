//! Byte Layout Descriptions
//!
//! Pure, stateless descriptions of how typed data is laid out in memory:
//! - [`TypeConstant`]: scalar kinds and their byte widths
//! - [`AttributeFormat`]: one typed field at a byte offset
//! - [`ResourceFormat`]: the ordered fields of one record and its stride
//! - [`PixelFormat`]: packed pixel layouts, block sizes and image sizing

pub mod attribute;
pub mod pixel_format;
pub mod resource_format;
pub mod type_constant;

pub use attribute::AttributeFormat;
pub use pixel_format::{InternalType, PixelFormat, compute_image_size_bytes, pixel_format};
pub use resource_format::{ResourceFormat, align_up};
pub use type_constant::{Number, Scalar, TypeConstant};
