//! Resource identity and device ownership tracking.
//!
//! A resource is a device-agnostic handle to "some data". It never holds
//! device memory itself: each [`Device`](crate::device::Device) that realizes
//! the resource keeps its own internal representation, keyed by
//! [`ResourceId`]. The resource only records *which* devices do so, as plain
//! [`DeviceId`]s in its [`OwnerSet`].
//!
//! The owner set is shared between the resource and each owning device's
//! table entry, so neither side points at the other.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHasher;
use smallvec::SmallVec;

/// Global counter shared by resource and device ids.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// 16-bit tag derived from a type name, placed in the top bits of ids.
fn type_tag(type_name: &str) -> u64 {
    let mut hasher = FxHasher::default();
    type_name.hash(&mut hasher);
    hasher.finish() & 0xFFFF
}

fn next_tagged_id(type_name: &str) -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed) ^ (type_tag(type_name) << 48)
}

/// Process-unique resource id. Not stable across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    #[must_use]
    pub fn next(kind: ResourceKind) -> Self {
        Self(next_tagged_id(kind.name()))
    }

    #[inline]
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Process-unique device id, tagged with the device's type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(u64);

impl DeviceId {
    #[must_use]
    pub fn next(type_name: &str) -> Self {
        Self(next_tagged_id(type_name))
    }

    #[inline]
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Buffer,
    Image,
}

impl ResourceKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Buffer => "Buffer",
            Self::Image => "Image",
        }
    }
}

/// Devices currently holding an internal representation of a resource.
#[derive(Debug, Clone, Default)]
pub struct OwnerSet(Arc<RwLock<SmallVec<[DeviceId; 2]>>>);

impl OwnerSet {
    /// Returns `false` if `device` was already an owner.
    pub(crate) fn insert(&self, device: DeviceId) -> bool {
        let mut owners = self.0.write();
        if owners.contains(&device) {
            return false;
        }
        owners.push(device);
        true
    }

    /// Returns `false` if `device` was not an owner.
    pub(crate) fn remove(&self, device: DeviceId) -> bool {
        let mut owners = self.0.write();
        match owners.iter().position(|d| *d == device) {
            Some(i) => {
                owners.swap_remove(i);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, device: DeviceId) -> bool {
        self.0.read().contains(&device)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<DeviceId> {
        self.0.read().to_vec()
    }
}

/// Identity and ownership state shared by all resource types.
#[derive(Debug)]
pub struct ResourceCore {
    id: ResourceId,
    kind: ResourceKind,
    owners: OwnerSet,
}

impl ResourceCore {
    #[must_use]
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            id: ResourceId::next(kind),
            kind,
            owners: OwnerSet::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ResourceId {
        self.id
    }
}

impl Drop for ResourceCore {
    fn drop(&mut self) {
        let owners = self.owners.len();
        if owners > 0 {
            log::warn!(
                "{} {} dropped while still owned by {} device(s)",
                self.kind.name(),
                self.id,
                owners
            );
        }
    }
}

/// Common interface of [`Buffer`](super::Buffer) and [`Image`](super::Image).
pub trait Resource {
    fn core(&self) -> &ResourceCore;

    #[inline]
    fn id(&self) -> ResourceId {
        self.core().id
    }

    #[inline]
    fn kind(&self) -> ResourceKind {
        self.core().kind
    }

    #[inline]
    fn owner_set(&self) -> &OwnerSet {
        &self.core().owners
    }

    /// Devices currently owning an internal representation.
    fn owners(&self) -> Vec<DeviceId> {
        self.owner_set().to_vec()
    }

    fn is_owned_by(&self, device: DeviceId) -> bool {
        self.owner_set().contains(device)
    }

    fn has_owners(&self) -> bool {
        !self.owner_set().is_empty()
    }
}
