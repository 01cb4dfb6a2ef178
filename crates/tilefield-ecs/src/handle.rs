//! Generational handles.
//!
//! A [`Handle<T>`] is a 64-bit value that packs a *generation* counter in the
//! high 32 bits and a slot *index* in the low 32 bits. The generation is
//! bumped every time a slot is recycled, so a handle captured before a
//! `remove` can never be mistaken for the entity that later reuses its slot.
//! This is the arena-based replacement for the shared-ownership object graph
//! described in the design notes: the [`crate::arena::Arena`] is the sole
//! owner of the values it stores, every other site holds a `Handle` plus its
//! baked-in generation.

use std::fmt;
use std::marker::PhantomData;

/// A generational handle into an [`crate::arena::Arena<T>`].
///
/// Layout: `[generation: u32 | index: u32]`. Handles are `Copy`, comparable,
/// and hashable regardless of whether `T` implements those traits -- the
/// `PhantomData<fn() -> T>` marker only ties a handle to the arena type it
/// was issued from, at zero runtime cost.
pub struct Handle<T> {
    raw: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    #[inline]
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self {
            raw: (generation as u64) << 32 | index as u64,
            _marker: PhantomData,
        }
    }

    /// The slot index portion (low 32 bits).
    #[inline]
    pub fn index(self) -> u32 {
        self.raw as u32
    }

    /// The generation portion (high 32 bits).
    #[inline]
    pub fn generation(self) -> u32 {
        (self.raw >> 32) as u32
    }

    /// Raw `u64` representation, stable across a process but not meaningful
    /// across two different arenas.
    #[inline]
    pub fn to_raw(self) -> u64 {
        self.raw
    }

    /// Reconstruct a handle from a raw `u64` previously produced by
    /// [`Handle::to_raw`]. Used when restoring a serialized snapshot.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Handle<T> {}
impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}
impl<T> Eq for Handle<T> {}
impl<T> std::hash::Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}
impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index(), self.generation())
    }
}
impl<T> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

impl<T> serde::Serialize for Handle<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}
impl<'de, T> serde::Deserialize<'de> for Handle<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_raw(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn handle_roundtrip() {
        let h: Handle<Marker> = Handle::new(42, 7);
        assert_eq!(h.index(), 42);
        assert_eq!(h.generation(), 7);
        assert_eq!(Handle::<Marker>::from_raw(h.to_raw()), h);
    }

    #[test]
    fn handle_serde_roundtrip() {
        let h: Handle<Marker> = Handle::new(3, 1);
        let json = serde_json::to_string(&h).unwrap();
        let back: Handle<Marker> = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
