//! Devices realize resources.
//!
//! Each device keeps a [`ResourceTable`] from [`ResourceId`] to its own
//! internal representation. Taking ownership adds the device to the
//! resource's owner set; releasing removes it. Both sides share the owner
//! set, so ownership stays symmetric without either holding a pointer to the
//! other.

pub mod local;

use rustc_hash::FxHashMap;

pub use crate::resources::resource::DeviceId;
use crate::resources::resource::{OwnerSet, Resource, ResourceId};
pub use local::{InternalBufferResource, InternalImageResource, LocalDevice, LocalResource};

/// Device-side representation of one resource.
pub trait InternalResource: std::fmt::Debug {
    /// Bytes of device storage currently held.
    fn byte_size(&self) -> usize;
}

#[derive(Debug)]
struct ResourceEntry<R> {
    owners: OwnerSet,
    internal: R,
}

/// Per-device map from resource id to internal representation.
#[derive(Debug)]
pub struct ResourceTable<R> {
    device_id: DeviceId,
    entries: FxHashMap<ResourceId, ResourceEntry<R>>,
}

impl<R: InternalResource> ResourceTable<R> {
    #[must_use]
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            device_id,
            entries: FxHashMap::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    #[must_use]
    pub fn contains(&self, id: ResourceId) -> bool {
        self.entries.contains_key(&id)
    }

    #[must_use]
    pub fn get(&self, id: ResourceId) -> Option<&R> {
        self.entries.get(&id).map(|e| &e.internal)
    }

    pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut R> {
        self.entries.get_mut(&id).map(|e| &mut e.internal)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.entries.keys().copied()
    }

    /// Total device storage across all entries.
    #[must_use]
    pub fn total_byte_size(&self) -> usize {
        self.entries.values().map(|e| e.internal.byte_size()).sum()
    }

    /// Registers `internal` for `resource` and records this device as an owner.
    ///
    /// Returns `false` and keeps the existing entry if already owned.
    pub fn insert(&mut self, resource: &dyn Resource, internal: R) -> bool {
        let id = resource.id();
        if self.entries.contains_key(&id) {
            return false;
        }
        let owners = resource.owner_set().clone();
        owners.insert(self.device_id);
        self.entries.insert(id, ResourceEntry { owners, internal });
        true
    }

    /// Drops the entry for `id` and removes this device from its owner set.
    pub fn remove(&mut self, id: ResourceId) -> Option<R> {
        let entry = self.entries.remove(&id)?;
        entry.owners.remove(self.device_id);
        Some(entry.internal)
    }

    pub fn clear(&mut self) {
        for (_, entry) in self.entries.drain() {
            entry.owners.remove(self.device_id);
        }
    }
}

impl<R> Drop for ResourceTable<R> {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            log::warn!(
                "Device {} dropped with {} live resource(s); releasing",
                self.device_id,
                self.entries.len()
            );
        }
        for entry in self.entries.values() {
            entry.owners.remove(self.device_id);
        }
    }
}

/// A place resources can live.
///
/// Implementors provide the resource table and, optionally, a real
/// [`Device::wait_idle`]. Ownership bookkeeping is shared.
pub trait Device {
    type Internal: InternalResource;

    fn id(&self) -> DeviceId;

    fn resources(&self) -> &ResourceTable<Self::Internal>;

    fn resources_mut(&mut self) -> &mut ResourceTable<Self::Internal>;

    /// Blocks until all outstanding device work has completed.
    fn wait_idle(&mut self) {}

    fn owns_resource(&self, resource: &dyn Resource) -> bool {
        self.resources().contains(resource.id())
    }

    fn take_ownership(&mut self, resource: &dyn Resource, internal: Self::Internal) -> bool {
        let inserted = self.resources_mut().insert(resource, internal);
        if inserted {
            log::debug!("Device {} took ownership of {}", self.id(), resource.id());
        } else {
            log::warn!("Device {} already owns {}", self.id(), resource.id());
        }
        inserted
    }

    fn release_resource(&mut self, resource: &dyn Resource) -> bool {
        self.release_by_id(resource.id())
    }

    /// Releases by id, for resources whose handle has already been dropped.
    fn release_by_id(&mut self, id: ResourceId) -> bool {
        let released = self.resources_mut().remove(id).is_some();
        if released {
            log::debug!("Device {} released {}", self.id(), id);
        }
        released
    }

    fn release_all_resources(&mut self) {
        let count = self.resources().len();
        self.resources_mut().clear();
        log::debug!("Device {} released {} resource(s)", self.id(), count);
    }

    fn shutdown(&mut self) {
        self.wait_idle();
        self.release_all_resources();
    }
}
