//! Recyclable objects and their identity.
//!
//! A recyclable object embeds an [`ObjectHeader`] and implements [`Recyclable`].
//! The header is stamped once by the [`ObjectManager`] when the object is first
//! fabricated and keeps that identity through every destroy/recycle round trip.
//!
//! # Lifecycle
//!
//! ```text
//! fabricated ──► live ──destroy──► queued ──recycle──► live ──► ...
//! ```
//!
//! While queued the object is owned by the manager and unreachable, so nothing can
//! read state that `destroy` has already cleared.

pub mod manager;

pub use manager::{ObjectManager, PoolStats};

use core::fmt;
use serde::{Deserialize, Serialize};


/// Dense per-manager tag identifying one concrete Rust type.
///
/// Tags are handed out in registration order by the manager's type-index table,
/// starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(u16);

impl TypeTag {
    /// Tag carried by headers that were never stamped by a manager.
    pub const UNASSIGNED: Self = Self(u16::MAX);

    /// Wraps a raw tag value.
    #[inline]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw tag value.
    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-type instance number. Reused when the instance is recycled.
pub type InstanceId = u32;

/// Identity of a recyclable object: its type tag and instance id.
///
/// Equality and hashing consider nothing else, so an object fetched before and
/// after a recycle round trip compares equal to itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId {
    type_tag: TypeTag,
    instance: InstanceId,
}

impl ObjectId {
    /// Identity of an object that no manager has stamped yet.
    pub const UNASSIGNED: Self = Self {
        type_tag: TypeTag::UNASSIGNED,
        instance: InstanceId::MAX,
    };

    /// Builds an identity from its parts.
    #[inline]
    pub const fn new(type_tag: TypeTag, instance: InstanceId) -> Self {
        Self { type_tag, instance }
    }

    /// Tag of the object's type.
    #[inline]
    pub const fn type_tag(self) -> TypeTag {
        self.type_tag
    }

    /// Instance number within the type's sub-pool.
    #[inline]
    pub const fn instance(self) -> InstanceId {
        self.instance
    }

    /// Packs the identity into one integer, type tag in bits 32..48.
    #[inline]
    pub const fn packed(self) -> u64 {
        ((self.type_tag.0 as u64) << 32) | self.instance as u64
    }

    /// Inverse of [`ObjectId::packed`]. Bits above 48 are ignored.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_packed(packed: u64) -> Self {
        Self {
            type_tag: TypeTag((packed >> 32) as u16),
            instance: packed as u32,
        }
    }

    /// Whether a manager has stamped this identity.
    #[inline]
    pub const fn is_assigned(self) -> bool {
        self.type_tag.0 != TypeTag::UNASSIGNED.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object(type {}, instance {})", self.type_tag, self.instance)
    }
}

/// Identity and lifecycle flag shared by every recyclable object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHeader {
    id: ObjectId,
    destroyed: bool,
}

impl ObjectHeader {
    /// Creates an unstamped header in the live state.
    pub const fn new() -> Self {
        Self {
            id: ObjectId::UNASSIGNED,
            destroyed: false,
        }
    }

    /// Identity of the object.
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Whether the object has been destroyed and not yet recycled.
    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub(crate) fn init(&mut self, id: ObjectId) {
        self.id = id;
        self.destroyed = false;
    }

    pub(crate) fn mark_destroyed(&mut self) {
        self.destroyed = true;
    }

    pub(crate) fn revive(&mut self) {
        self.destroyed = false;
    }
}

impl Default for ObjectHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// An object whose instances are pooled by an [`ObjectManager`].
///
/// Implementors own an [`ObjectHeader`] and reset their own state in the two
/// hooks. The manager handles the header.
pub trait Recyclable: Send + 'static {
    /// Shared access to the embedded header.
    fn header(&self) -> &ObjectHeader;

    /// Exclusive access to the embedded header.
    fn header_mut(&mut self) -> &mut ObjectHeader;

    /// Resets payload and adjacency before the instance is reissued.
    ///
    /// Must leave the object indistinguishable from a freshly fabricated one,
    /// apart from its identity.
    fn recycle(&mut self) {}

    /// Drops references held by the instance before it is queued for reuse.
    fn on_destroy(&mut self) {}

    /// Identity of the instance.
    #[inline]
    fn id(&self) -> ObjectId {
        self.header().id()
    }
}
