//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Identities are assigned by the store, so an entity that has not been
/// persisted yet reports `None`.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier, if the entity has been persisted.
    fn id(&self) -> Option<Self::Id>;

    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }
}
