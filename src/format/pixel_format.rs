//! Packed Pixel Formats
//!
//! A [`PixelFormat`] is a 16-bit value packing everything needed to size an
//! image:
//!
//! ```text
//!  15            8   7      6       5..4         3..0
//! [ internal type ][sRGB][normalized][channels-1][base type]
//! ```
//!
//! The base type is a [`TypeConstant`] discriminant. The internal type
//! distinguishes plain channel layouts from swizzled, packed, depth/stencil
//! and block-compressed ones. All size computations are pure functions over
//! the packed value.
//!
//! # Size contract
//!
//! [`compute_image_size_bytes`] is the allocation size every image store uses:
//! the number of blocks covering `w x h x d` (rounded up per axis) times the
//! block size in bytes.

use std::fmt;

use crate::format::attribute::AttributeFormat;
use crate::format::resource_format::ResourceFormat;
use crate::format::type_constant::TypeConstant;

/// Layout family of a pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InternalType {
    /// One scalar per channel in RGBA order.
    Standard = 0,
    /// One scalar per channel in BGRA order.
    Bgra = 1,
    /// 16-bit packed R5 G6 B5.
    Rgb565 = 2,
    /// 16-bit packed R5 G5 B5 A1.
    Rgb5A1 = 3,
    /// 32-bit packed unsigned float R11 G11 B10.
    R11G11B10 = 4,
    /// 32-bit packed R10 G10 B10 A2.
    Rgb10A2 = 5,
    DepthStencil = 6,
    Bc1 = 7,
    Bc2 = 8,
    Bc3 = 9,
    Bc4 = 10,
    Bc5 = 11,
    Bc6H = 12,
    Bc7 = 13,
    /// ETC2 RGB8 / RGBA8.
    Etc2 = 14,
    /// ETC2 RGB8 with punch-through alpha.
    Etc2A = 15,
    /// EAC R11 / RG11.
    Eac = 16,
}

impl InternalType {
    const ALL: [InternalType; 17] = [
        Self::Standard,
        Self::Bgra,
        Self::Rgb565,
        Self::Rgb5A1,
        Self::R11G11B10,
        Self::Rgb10A2,
        Self::DepthStencil,
        Self::Bc1,
        Self::Bc2,
        Self::Bc3,
        Self::Bc4,
        Self::Bc5,
        Self::Bc6H,
        Self::Bc7,
        Self::Etc2,
        Self::Etc2A,
        Self::Eac,
    ];

    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        if (id as usize) < Self::ALL.len() {
            Some(Self::ALL[id as usize])
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Block-compressed families (4x4 pixel blocks).
    #[inline]
    #[must_use]
    pub const fn is_compressed(self) -> bool {
        (self as u8) >= (Self::Bc1 as u8)
    }
}

/// Packed 16-bit pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PixelFormat(u16);

/// Packs the format fields. `channels` must be in `1..=4`.
#[must_use]
pub const fn pixel_format(
    base_type: TypeConstant,
    channels: u8,
    normalized: bool,
    srgb: bool,
    internal_type: InternalType,
) -> PixelFormat {
    PixelFormat::pack(base_type, channels, normalized, srgb, internal_type.id())
}

macro_rules! pixel_formats {
    ($($name:ident = ($base:ident, $channels:expr, $norm:expr, $srgb:expr, $internal:ident);)*) => {
        #[allow(non_upper_case_globals)]
        impl PixelFormat {
            $(
                pub const $name: PixelFormat =
                    pixel_format(TypeConstant::$base, $channels, $norm, $srgb, InternalType::$internal);
            )*

            /// Every named format except [`PixelFormat::Unknown`].
            pub const ALL: &'static [PixelFormat] = &[$(Self::$name),*];

            /// Name of a predefined format.
            #[must_use]
            pub fn name(self) -> Option<&'static str> {
                $(
                    if self == Self::$name {
                        return Some(stringify!($name));
                    }
                )*
                None
            }
        }
    };
}

pixel_formats! {
    // --- 8 bit ---
    R8UNorm = (UInt8, 1, true, false, Standard);
    R8SNorm = (Int8, 1, true, false, Standard);
    R8UInt = (UInt8, 1, false, false, Standard);
    R8SInt = (Int8, 1, false, false, Standard);
    RG8UNorm = (UInt8, 2, true, false, Standard);
    RG8SNorm = (Int8, 2, true, false, Standard);
    RG8UInt = (UInt8, 2, false, false, Standard);
    RG8SInt = (Int8, 2, false, false, Standard);
    RGB8UNorm = (UInt8, 3, true, false, Standard);
    RGB8UNormSRGB = (UInt8, 3, true, true, Standard);
    RGBA8UNorm = (UInt8, 4, true, false, Standard);
    RGBA8UNormSRGB = (UInt8, 4, true, true, Standard);
    RGBA8SNorm = (Int8, 4, true, false, Standard);
    RGBA8UInt = (UInt8, 4, false, false, Standard);
    RGBA8SInt = (Int8, 4, false, false, Standard);
    BGR8UNorm = (UInt8, 3, true, false, Bgra);
    BGR8UNormSRGB = (UInt8, 3, true, true, Bgra);
    BGRA8UNorm = (UInt8, 4, true, false, Bgra);
    BGRA8UNormSRGB = (UInt8, 4, true, true, Bgra);
    // --- 16 bit ---
    R16UNorm = (UInt16, 1, true, false, Standard);
    R16SNorm = (Int16, 1, true, false, Standard);
    R16UInt = (UInt16, 1, false, false, Standard);
    R16SInt = (Int16, 1, false, false, Standard);
    R16SFloat = (Half, 1, false, false, Standard);
    RG16UNorm = (UInt16, 2, true, false, Standard);
    RG16SFloat = (Half, 2, false, false, Standard);
    RGBA16UNorm = (UInt16, 4, true, false, Standard);
    RGBA16SNorm = (Int16, 4, true, false, Standard);
    RGBA16UInt = (UInt16, 4, false, false, Standard);
    RGBA16SFloat = (Half, 4, false, false, Standard);
    // --- 32 bit ---
    R32UInt = (UInt32, 1, false, false, Standard);
    R32SInt = (Int32, 1, false, false, Standard);
    R32SFloat = (Float, 1, false, false, Standard);
    RG32UInt = (UInt32, 2, false, false, Standard);
    RG32SFloat = (Float, 2, false, false, Standard);
    RGB32SFloat = (Float, 3, false, false, Standard);
    RGBA32UInt = (UInt32, 4, false, false, Standard);
    RGBA32SInt = (Int32, 4, false, false, Standard);
    RGBA32SFloat = (Float, 4, false, false, Standard);
    // --- 64 bit ---
    R64SFloat = (Double, 1, false, false, Standard);
    RGBA64SFloat = (Double, 4, false, false, Standard);
    // --- packed ---
    R5G6B5UNorm = (UInt16, 3, true, false, Rgb565);
    RGB5A1UNorm = (UInt16, 4, true, false, Rgb5A1);
    R11G11B10UFloat = (Float, 3, false, false, R11G11B10);
    RGB10A2UNorm = (UInt32, 4, true, false, Rgb10A2);
    RGB10A2UInt = (UInt32, 4, false, false, Rgb10A2);
    // --- depth / stencil ---
    D16UNorm = (UInt16, 1, true, false, DepthStencil);
    D24UNorm = (UInt32, 1, true, false, DepthStencil);
    D32SFloat = (Float, 1, false, false, DepthStencil);
    D24UNormS8UInt = (UInt32, 2, true, false, DepthStencil);
    D32SFloatS8UInt = (Float, 2, false, false, DepthStencil);
    // --- BC ---
    BC1RGBUNorm = (UInt8, 3, true, false, Bc1);
    BC1RGBUNormSRGB = (UInt8, 3, true, true, Bc1);
    BC1RGBAUNorm = (UInt8, 4, true, false, Bc1);
    BC1RGBAUNormSRGB = (UInt8, 4, true, true, Bc1);
    BC2UNorm = (UInt8, 4, true, false, Bc2);
    BC2UNormSRGB = (UInt8, 4, true, true, Bc2);
    BC3UNorm = (UInt8, 4, true, false, Bc3);
    BC3UNormSRGB = (UInt8, 4, true, true, Bc3);
    BC4UNorm = (UInt8, 1, true, false, Bc4);
    BC4SNorm = (Int8, 1, true, false, Bc4);
    BC5UNorm = (UInt8, 2, true, false, Bc5);
    BC5SNorm = (Int8, 2, true, false, Bc5);
    BC6HUFloat = (UInt16, 3, false, false, Bc6H);
    BC6HSFloat = (Int16, 3, false, false, Bc6H);
    BC7UNorm = (UInt8, 4, true, false, Bc7);
    BC7UNormSRGB = (UInt8, 4, true, true, Bc7);
    // --- ETC2 / EAC ---
    ETC2RGB8UNorm = (UInt8, 3, true, false, Etc2);
    ETC2RGB8UNormSRGB = (UInt8, 3, true, true, Etc2);
    ETC2RGBA8UNorm = (UInt8, 4, true, false, Etc2);
    ETC2RGBA8UNormSRGB = (UInt8, 4, true, true, Etc2);
    ETC2RGB8A1UNorm = (UInt8, 4, true, false, Etc2A);
    ETC2RGB8A1UNormSRGB = (UInt8, 4, true, true, Etc2A);
    EACR11UNorm = (UInt16, 1, true, false, Eac);
    EACR11SNorm = (Int16, 1, true, false, Eac);
    EACRG11UNorm = (UInt16, 2, true, false, Eac);
    EACRG11SNorm = (Int16, 2, true, false, Eac);
}

impl PixelFormat {
    /// Sentinel for "no format / not matched".
    #[allow(non_upper_case_globals)]
    pub const Unknown: PixelFormat = PixelFormat(0xFFFF);

    const fn pack(base_type: TypeConstant, channels: u8, normalized: bool, srgb: bool, internal_id: u8) -> Self {
        let channel_bits = (channels.saturating_sub(1) & 0x3) as u16;
        Self(
            ((internal_id as u16) << 8)
                | ((srgb as u16) << 7)
                | ((normalized as u16) << 6)
                | (channel_bits << 4)
                | (base_type as u16 & 0xF),
        )
    }

    /// Packs the format fields from a raw internal type id.
    ///
    /// Returns [`PixelFormat::Unknown`] for a channel count outside `1..=4`.
    #[must_use]
    pub const fn from_parts(
        base_type: TypeConstant,
        channels: u8,
        normalized: bool,
        srgb: bool,
        internal_type_id: u8,
    ) -> Self {
        if channels == 0 || channels > 4 {
            return Self::Unknown;
        }
        Self::pack(base_type, channels, normalized, srgb, internal_type_id)
    }

    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        self.0 == Self::Unknown.0
    }

    // === Field extraction ===

    #[inline]
    #[must_use]
    pub const fn internal_type_id(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    #[must_use]
    pub const fn internal_type(self) -> Option<InternalType> {
        InternalType::from_id(self.internal_type_id())
    }

    #[inline]
    #[must_use]
    pub const fn is_srgb(self) -> bool {
        (self.0 >> 7) & 1 != 0
    }

    #[inline]
    #[must_use]
    pub const fn is_normalized(self) -> bool {
        (self.0 >> 6) & 1 != 0
    }

    #[inline]
    #[must_use]
    pub const fn channel_count(self) -> u8 {
        ((self.0 >> 4) & 0x3) as u8 + 1
    }

    /// Base scalar type. Formats carrying an out-of-table base type decode as `None`.
    #[inline]
    #[must_use]
    pub const fn base_type(self) -> Option<TypeConstant> {
        TypeConstant::from_u8((self.0 & 0xF) as u8)
    }

    #[inline]
    #[must_use]
    pub fn is_compressed(self) -> bool {
        !self.is_unknown() && self.internal_type().is_some_and(InternalType::is_compressed)
    }

    #[inline]
    #[must_use]
    pub fn is_depth_stencil(self) -> bool {
        self.internal_type() == Some(InternalType::DepthStencil)
    }

    /// Byte width of one channel for plain and swizzled formats, `0` otherwise.
    #[must_use]
    pub fn bytes_per_channel(self) -> usize {
        match (self.internal_type(), self.base_type()) {
            (Some(InternalType::Standard | InternalType::Bgra), Some(base)) if !self.is_unknown() => {
                base.num_bytes()
            }
            _ => 0,
        }
    }

    // === Block layout ===

    /// Byte size of one block (one pixel for uncompressed formats).
    /// `0` for [`PixelFormat::Unknown`] and undecodable values.
    #[must_use]
    pub fn block_size_bytes(self) -> usize {
        if self.is_unknown() {
            return 0;
        }
        let Some(internal) = self.internal_type() else {
            return 0;
        };
        let channels = self.channel_count() as usize;
        match internal {
            InternalType::Standard | InternalType::Bgra => {
                self.base_type().map_or(0, |base| channels * base.num_bytes())
            }
            InternalType::Rgb565 | InternalType::Rgb5A1 => 2,
            InternalType::R11G11B10 | InternalType::Rgb10A2 => 4,
            InternalType::DepthStencil => {
                if self == Self::D32SFloatS8UInt {
                    5
                } else if self == Self::D16UNorm {
                    2
                } else {
                    4
                }
            }
            InternalType::Bc1 | InternalType::Bc4 | InternalType::Etc2A => 8,
            InternalType::Bc2
            | InternalType::Bc3
            | InternalType::Bc5
            | InternalType::Bc6H
            | InternalType::Bc7 => 16,
            InternalType::Etc2 => {
                if channels == 4 {
                    16
                } else {
                    8
                }
            }
            InternalType::Eac => 8 * channels,
        }
    }

    /// Pixel extent `(width, height, depth)` of one block.
    #[must_use]
    pub fn block_dimensions(self) -> (u32, u32, u32) {
        if self.is_compressed() {
            (4, 4, 1)
        } else {
            (1, 1, 1)
        }
    }

    // === Attribute layout ===

    /// Describes one pixel (or block) as a single-attribute resource format
    /// named `"color"`, carrying the internal type id as the attribute's
    /// internal type tag.
    ///
    /// Returns `None` for [`PixelFormat::Unknown`].
    #[must_use]
    pub fn to_resource_format(self) -> Option<ResourceFormat> {
        let base = self.base_type().filter(|_| !self.is_unknown())?;
        let internal = u32::from(self.internal_type_id());
        let attr = AttributeFormat::new(
            "color".into(),
            base,
            u32::from(self.channel_count()),
            self.is_normalized(),
            internal,
        )
        .with_data_size(self.block_size_bytes());
        let mut format = ResourceFormat::new();
        format.append(attr);
        Some(format)
    }

    /// Inverse of [`PixelFormat::to_resource_format`].
    ///
    /// Any single-attribute format whose attribute matches a pixel layout is
    /// accepted; the attribute name is ignored. sRGB cannot be expressed by an
    /// attribute and is always cleared.
    #[must_use]
    pub fn from_resource_format(format: &ResourceFormat) -> Self {
        let [attr] = format.attributes() else {
            return Self::Unknown;
        };
        let Ok(internal_id) = u8::try_from(attr.internal_type()) else {
            return Self::Unknown;
        };
        let Ok(channels) = u8::try_from(attr.num_values()) else {
            return Self::Unknown;
        };
        let candidate = Self::from_parts(attr.data_type(), channels, attr.is_normalized(), false, internal_id);
        if candidate.is_unknown() || candidate.block_size_bytes() != attr.data_size() {
            return Self::Unknown;
        }
        candidate
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            return f.write_str("Unknown");
        }
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "PixelFormat({:#06x})", self.0),
        }
    }
}

/// Total byte size of a `width x height x depth` image in `format`.
///
/// Each axis is rounded up to whole blocks.
#[must_use]
pub fn compute_image_size_bytes(format: PixelFormat, width: u32, height: u32, depth: u32) -> usize {
    let (bw, bh, bd) = format.block_dimensions();
    let blocks = width.div_ceil(bw) as usize * height.div_ceil(bh) as usize * depth.div_ceil(bd) as usize;
    blocks * format.block_size_bytes()
}
