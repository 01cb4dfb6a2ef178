//! Tilefield ECS -- generational handle arena for owned grid objects.
//!
//! This crate provides the storage primitive the simulation kernel builds on:
//! a [`Handle<T>`](handle::Handle) that can never silently resolve to a
//! reused slot, backed by an [`Arena<T>`](arena::Arena) that owns the values
//! it hands out handles for. This replaces the shared-ownership (reference
//! counted) object graph pattern with a single owner plus stable handles, so
//! use-after-remove is a detectable error rather than a dangling reference.
//!
//! # Quick Start
//!
//! ```
//! use tilefield_ecs::prelude::*;
//!
//! let mut arena: Arena<&'static str> = Arena::new();
//! let h = arena.insert("harvester");
//! assert_eq!(arena.get(h), Some(&"harvester"));
//! arena.remove(h).unwrap();
//! assert_eq!(arena.get(h), None);
//! ```

#![deny(unsafe_code)]

pub mod arena;
pub mod handle;

/// Errors produced by arena operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EcsError {
    /// The handle does not resolve to a live value (stale generation, or the
    /// slot was already removed).
    #[error("handle {index}v{generation} does not resolve to a live value")]
    StaleHandle {
        /// Slot index encoded in the handle.
        index: u32,
        /// Generation encoded in the handle.
        generation: u32,
    },
}

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::arena::Arena;
    pub use crate::handle::Handle;
    pub use crate::EcsError;
}
