//! Host-memory device.
//!
//! Buffers are plain byte vectors. Images keep one [`Bitmap`] per mip
//! level; all depth slices and array layers of a level are stacked
//! vertically in that bitmap, layer-major:
//!
//! ```text
//! level bitmap rows
//! +---------------------+
//! | layer 0, slice 0    |  padded_height rows
//! | layer 0, slice 1    |
//! | ...                 |
//! | layer 1, slice 0    |
//! +---------------------+
//! ```
//!
//! Mip 0 is allocated with the image; other levels on first upload.

use std::sync::LazyLock;

use parking_lot::Mutex;

use crate::device::{Device, DeviceId, InternalResource, ResourceTable};
use crate::format::pixel_format::PixelFormat;
use crate::resources::bitmap::Bitmap;
use crate::resources::buffer::{Buffer, BufferRange};
use crate::resources::image::{Image, ImageConfig, ImageRegion};
use crate::resources::resource::{Resource, ResourceId};

static GLOBAL_DEVICE: LazyLock<Mutex<LocalDevice>> = LazyLock::new(|| Mutex::new(LocalDevice::new()));

#[derive(Debug)]
pub struct InternalBufferResource {
    data: Vec<u8>,
}

impl InternalBufferResource {
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

#[derive(Debug)]
pub struct InternalImageResource {
    config: ImageConfig,
    levels: Vec<Option<Bitmap>>,
}

impl InternalImageResource {
    fn new(config: &ImageConfig) -> Self {
        let mut levels: Vec<Option<Bitmap>> = (0..config.mip_levels.max(1)).map(|_| None).collect();
        levels[0] = Some(allocate_level(config, 0));
        Self {
            config: config.clone(),
            levels,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// Storage of mip `level`, if allocated.
    #[must_use]
    pub fn level(&self, level: u32) -> Option<&Bitmap> {
        self.levels.get(level as usize)?.as_ref()
    }

    fn level_or_allocate(&mut self, level: u32) -> Option<&mut Bitmap> {
        let config = &self.config;
        let slot = self.levels.get_mut(level as usize)?;
        Some(slot.get_or_insert_with(|| {
            log::trace!("Allocating mip {level} of image '{}'", config.label);
            allocate_level(config, level)
        }))
    }
}

/// Bitmap extent holding every slice and layer of mip `level`.
///
/// Slice heights are padded to whole blocks so that each slice starts on a
/// block row.
#[must_use]
pub fn compute_bitmap_dimensions(config: &ImageConfig, level: u32) -> (u32, u32) {
    let (w, h, d) = config.mip_extent(level);
    let (_, bh, _) = config.format.block_dimensions();
    let padded_height = h.div_ceil(bh) * bh;
    (w, padded_height * d * config.layer_count())
}

fn allocate_level(config: &ImageConfig, level: u32) -> Bitmap {
    let (w, h) = compute_bitmap_dimensions(config, level);
    Bitmap::new(w, h, config.format)
}

#[derive(Debug)]
pub enum LocalResource {
    Buffer(InternalBufferResource),
    Image(InternalImageResource),
}

impl InternalResource for LocalResource {
    fn byte_size(&self) -> usize {
        match self {
            Self::Buffer(b) => b.data.len(),
            Self::Image(i) => i.levels.iter().flatten().map(Bitmap::data_size).sum(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RowCopy {
    image_offset: usize,
    bitmap_offset: usize,
    len: usize,
}

/// Row-by-row mapping between a resolved region and a tightly packed
/// bitmap, in units of format blocks.
#[derive(Debug)]
struct RowPlan {
    level_pitch: usize,
    level_rows_per_slice: usize,
    level_depth: usize,
    bitmap_pitch: usize,
    region_rows: usize,
    row_len: usize,
    x_offset: usize,
    y_block: usize,
    z: usize,
    depth: usize,
    base_layer: usize,
    layer_count: usize,
}

impl RowPlan {
    fn new(config: &ImageConfig, region: &ImageRegion, bitmap_width: u32) -> Self {
        let block_size = config.format.block_size_bytes();
        let (bw, bh, _) = config.format.block_dimensions();
        let (mw, mh, md) = config.mip_extent(region.mip_level);
        Self {
            level_pitch: mw.div_ceil(bw) as usize * block_size,
            level_rows_per_slice: mh.div_ceil(bh) as usize,
            level_depth: md as usize,
            bitmap_pitch: bitmap_width.div_ceil(bw) as usize * block_size,
            region_rows: region.height.div_ceil(bh) as usize,
            row_len: region.width.div_ceil(bw) as usize * block_size,
            x_offset: (region.x / bw) as usize * block_size,
            y_block: (region.y / bh) as usize,
            z: region.z as usize,
            depth: region.depth as usize,
            base_layer: region.base_layer as usize,
            layer_count: region.layer_count as usize,
        }
    }

    fn bitmap_bytes_needed(&self) -> usize {
        let rows = self.layer_count * self.depth * self.region_rows;
        if rows == 0 {
            return 0;
        }
        (rows - 1) * self.bitmap_pitch + self.row_len
    }

    fn rows(&self) -> impl Iterator<Item = RowCopy> + '_ {
        (0..self.layer_count)
            .flat_map(move |layer| (0..self.depth).map(move |z| (layer, z)))
            .flat_map(move |(layer, z)| {
                let slice = (self.base_layer + layer) * self.level_depth + self.z + z;
                let source_slice = layer * self.depth + z;
                (0..self.region_rows).map(move |row| RowCopy {
                    image_offset: (slice * self.level_rows_per_slice + self.y_block + row) * self.level_pitch
                        + self.x_offset,
                    bitmap_offset: (source_slice * self.region_rows + row) * self.bitmap_pitch,
                    len: self.row_len,
                })
            })
    }
}

/// Checks a region/bitmap pair against `config`; returns the resolved region.
fn validate_transfer(config: &ImageConfig, region: &ImageRegion, bitmap: &Bitmap) -> Option<(ImageRegion, RowPlan)> {
    if config.sample_count > 1 {
        log::warn!("Image '{}': multisampled images cannot be transferred", config.label);
        return None;
    }
    if !region.is_valid(config) {
        log::warn!("Image '{}': region {:?} is out of bounds", config.label, region);
        return None;
    }
    let region = region.resolve(config);
    if bitmap.pixel_format() != config.format {
        log::warn!(
            "Image '{}': bitmap format {} does not match {}",
            config.label,
            bitmap.pixel_format(),
            config.format
        );
        return None;
    }
    let (bw, bh, _) = config.format.block_dimensions();
    if region.x % bw != 0 || region.y % bh != 0 {
        log::warn!(
            "Image '{}': region origin ({}, {}) is not aligned to {}x{} blocks",
            config.label,
            region.x,
            region.y,
            bw,
            bh
        );
        return None;
    }
    let expected = region.byte_size(config);
    if bitmap.data_size() != expected {
        log::warn!(
            "Image '{}': bitmap holds {} bytes, region needs {}",
            config.label,
            bitmap.data_size(),
            expected
        );
        return None;
    }
    if bitmap.width() < region.width {
        log::warn!(
            "Image '{}': bitmap width {} is narrower than region width {}",
            config.label,
            bitmap.width(),
            region.width
        );
        return None;
    }
    let plan = RowPlan::new(config, &region, bitmap.width());
    if plan.bitmap_bytes_needed() > bitmap.data_size() {
        log::warn!("Image '{}': bitmap rows overrun its storage", config.label);
        return None;
    }
    Some((region, plan))
}

/// Device backed by host memory.
#[derive(Debug)]
pub struct LocalDevice {
    id: DeviceId,
    resources: ResourceTable<LocalResource>,
}

impl Default for LocalDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalDevice {
    pub const TYPE_NAME: &'static str = "LocalDevice";

    #[must_use]
    pub fn new() -> Self {
        let id = DeviceId::next(Self::TYPE_NAME);
        log::debug!("Created local device {id}");
        Self {
            id,
            resources: ResourceTable::new(id),
        }
    }

    /// Process-wide shared instance.
    pub fn global() -> &'static Mutex<LocalDevice> {
        &GLOBAL_DEVICE
    }

    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Host bytes held across all owned resources.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.resources.total_byte_size()
    }

    fn buffer_resource(&self, id: ResourceId) -> Option<&InternalBufferResource> {
        match self.resources.get(id)? {
            LocalResource::Buffer(b) => Some(b),
            LocalResource::Image(_) => None,
        }
    }

    fn buffer_resource_mut(&mut self, id: ResourceId) -> Option<&mut InternalBufferResource> {
        match self.resources.get_mut(id)? {
            LocalResource::Buffer(b) => Some(b),
            LocalResource::Image(_) => None,
        }
    }

    fn image_resource(&self, id: ResourceId) -> Option<&InternalImageResource> {
        match self.resources.get(id)? {
            LocalResource::Image(i) => Some(i),
            LocalResource::Buffer(_) => None,
        }
    }

    fn image_resource_mut(&mut self, id: ResourceId) -> Option<&mut InternalImageResource> {
        match self.resources.get_mut(id)? {
            LocalResource::Image(i) => Some(i),
            LocalResource::Buffer(_) => None,
        }
    }

    // === Buffers ===

    /// Allocates zeroed storage for `buffer` unless already owned, then
    /// copies `initial` into its start.
    ///
    /// On an owned buffer only the upload happens; with no data this is a
    /// no-op that succeeds.
    pub fn allocate_buffer(&mut self, buffer: &Buffer, initial: Option<&[u8]>) -> bool {
        let size = buffer.byte_size();
        if let Some(initial) = initial {
            if initial.len() > size {
                log::warn!(
                    "Buffer '{}': initial data of {} bytes exceeds size {}",
                    buffer.label(),
                    initial.len(),
                    size
                );
                return false;
            }
        }
        if self.owns_resource(buffer) {
            return match initial {
                Some(initial) => self.upload_buffer(buffer, BufferRange::new(0, initial.len()), initial),
                None => true,
            };
        }
        let mut data = vec![0u8; size];
        if let Some(initial) = initial {
            data[..initial.len()].copy_from_slice(initial);
        }
        self.take_ownership(buffer, LocalResource::Buffer(InternalBufferResource { data }))
    }

    /// Copies `data` into `range`. Allocates the buffer if not yet owned.
    pub fn upload_buffer(&mut self, buffer: &Buffer, range: BufferRange, data: &[u8]) -> bool {
        if !range.is_valid(buffer.config()) {
            log::warn!(
                "Buffer '{}': upload range {:?} exceeds size {}",
                buffer.label(),
                range,
                buffer.byte_size()
            );
            return false;
        }
        let range = range.resolve(buffer.config());
        if data.len() < range.byte_size {
            log::warn!(
                "Buffer '{}': upload of {} bytes given only {}",
                buffer.label(),
                range.byte_size,
                data.len()
            );
            return false;
        }
        if !self.owns_resource(buffer) && !self.allocate_buffer(buffer, None) {
            return false;
        }
        let Some(internal) = self.buffer_resource_mut(buffer.id()) else {
            log::warn!("Buffer '{}': resource id refers to a non-buffer", buffer.label());
            return false;
        };
        internal.data[range.byte_offset..range.end()].copy_from_slice(&data[..range.byte_size]);
        true
    }

    /// Copies `range` into the start of `out`.
    pub fn download_buffer(&self, buffer: &Buffer, range: BufferRange, out: &mut [u8]) -> bool {
        let Some(internal) = self.buffer_resource(buffer.id()) else {
            log::warn!("Buffer '{}' is not owned by device {}", buffer.label(), self.id);
            return false;
        };
        if !range.is_valid(buffer.config()) {
            log::warn!("Buffer '{}': download range {:?} is out of bounds", buffer.label(), range);
            return false;
        }
        let range = range.resolve(buffer.config());
        if out.len() < range.byte_size {
            log::warn!(
                "Buffer '{}': download of {} bytes into {}",
                buffer.label(),
                range.byte_size,
                out.len()
            );
            return false;
        }
        out[..range.byte_size].copy_from_slice(&internal.data[range.byte_offset..range.end()]);
        true
    }

    /// Live storage of an owned buffer.
    #[must_use]
    pub fn buffer_data(&self, buffer: &Buffer) -> Option<&[u8]> {
        self.buffer_resource(buffer.id()).map(InternalBufferResource::data)
    }

    pub fn buffer_data_mut(&mut self, buffer: &Buffer) -> Option<&mut [u8]> {
        self.buffer_resource_mut(buffer.id()).map(InternalBufferResource::data_mut)
    }

    // === Images ===

    /// Allocates mip 0 of `image`. Multisampled images are rejected; an
    /// image this device already owns is left as is.
    pub fn allocate_image(&mut self, image: &Image) -> bool {
        let config = image.config();
        if config.sample_count > 1 {
            log::warn!(
                "Image '{}': {} samples per texel not supported by local device",
                config.label,
                config.sample_count
            );
            return false;
        }
        if config.format.is_unknown() {
            log::warn!("Image '{}': unknown pixel format", config.label);
            return false;
        }
        if self.owns_resource(image) {
            return true;
        }
        self.take_ownership(image, LocalResource::Image(InternalImageResource::new(config)))
    }

    /// Copies `bitmap` into `region`. Allocates the image and the target mip
    /// level on demand.
    pub fn upload_image(&mut self, image: &Image, region: ImageRegion, bitmap: &Bitmap) -> bool {
        let config = image.config();
        let Some((region, plan)) = validate_transfer(config, &region, bitmap) else {
            return false;
        };
        if !self.owns_resource(image) && !self.allocate_image(image) {
            return false;
        }
        let Some(level) = self
            .image_resource_mut(image.id())
            .and_then(|i| i.level_or_allocate(region.mip_level))
        else {
            log::warn!("Image '{}': mip {} unavailable", config.label, region.mip_level);
            return false;
        };
        let src = bitmap.data();
        let dst = level.data_mut();
        for row in plan.rows() {
            dst[row.image_offset..row.image_offset + row.len]
                .copy_from_slice(&src[row.bitmap_offset..row.bitmap_offset + row.len]);
        }
        true
    }

    /// Copies `region` into `bitmap`. Fails if the mip level was never
    /// uploaded.
    pub fn download_image(&self, image: &Image, region: ImageRegion, bitmap: &mut Bitmap) -> bool {
        let config = image.config();
        let Some(internal) = self.image_resource(image.id()) else {
            log::warn!("Image '{}' is not owned by device {}", config.label, self.id);
            return false;
        };
        let Some((region, plan)) = validate_transfer(config, &region, bitmap) else {
            return false;
        };
        let Some(level) = internal.level(region.mip_level) else {
            log::warn!("Image '{}': mip {} was never allocated", config.label, region.mip_level);
            return false;
        };
        let src = level.data();
        let dst = bitmap.data_mut();
        for row in plan.rows() {
            dst[row.bitmap_offset..row.bitmap_offset + row.len]
                .copy_from_slice(&src[row.image_offset..row.image_offset + row.len]);
        }
        true
    }

    /// Storage of mip `level` of an owned image.
    #[must_use]
    pub fn image_level(&self, image: &Image, level: u32) -> Option<&Bitmap> {
        self.image_resource(image.id())?.level(level)
    }

    /// Pixel format of an owned image as stored on this device.
    #[must_use]
    pub fn image_format(&self, image: &Image) -> Option<PixelFormat> {
        self.image_resource(image.id()).map(|i| i.config.format)
    }
}

impl Device for LocalDevice {
    type Internal = LocalResource;

    fn id(&self) -> DeviceId {
        self.id
    }

    fn resources(&self) -> &ResourceTable<LocalResource> {
        &self.resources
    }

    fn resources_mut(&mut self) -> &mut ResourceTable<LocalResource> {
        &mut self.resources
    }
}
