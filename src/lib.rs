#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod accessor;
pub mod device;
pub mod errors;
pub mod format;
pub mod resources;
pub mod utils;

pub use accessor::{AccessorRegistry, AttributeAccessor, ResourceAccessor, StructuredAccessor};
pub use device::{Device, DeviceId, LocalDevice};
pub use errors::{ResourceError, Result};
pub use format::{AttributeFormat, PixelFormat, ResourceFormat, TypeConstant, compute_image_size_bytes};
pub use resources::{Bitmap, Buffer, BufferConfig, BufferRange, Image, ImageConfig, ImageRegion, Resource, ResourceId};
pub use utils::interner;
pub use utils::StringId;
