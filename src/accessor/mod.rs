//! Typed Accessors
//!
//! Type-erased numeric access into raw byte stores described by
//! [`AttributeFormat`](crate::format::AttributeFormat) and
//! [`ResourceFormat`](crate::format::ResourceFormat).
//!
//! # Strategies
//!
//! | Attribute                        | Read                                   |
//! |----------------------------------|----------------------------------------|
//! | not normalized                   | plain cast                             |
//! | normalized unsigned integer      | `[0, 1]`, rescaled to requested range  |
//! | normalized signed integer        | `[-1, 1]`, rescaled to requested range |
//! | internal type / registered kind  | [`CustomAttributeAccessor`]            |
//!
//! ```rust,ignore
//! let registry = AccessorRegistry::with_builtin();
//! let mut acc = ResourceAccessor::create(&mut bytes[..], &format, &registry);
//! acc.write_values_by_name(0, "color", &[1.0f32, 0.5, 0.0, 1.0])?;
//! let red: u8 = acc.read_value_by_name(0, "color")?; // 255
//! ```

pub mod attribute;
pub mod convert;
pub mod registry;
pub mod resource;
pub mod structured;

pub use attribute::{AccessorKind, AttributeAccessor, AttributeCodec};
pub use convert::Normalization;
pub use registry::{AccessorFactory, AccessorRegistry, CustomAttributeAccessor, HalfAccessor, Rgb565Accessor};
pub use resource::ResourceAccessor;
pub use structured::StructuredAccessor;
