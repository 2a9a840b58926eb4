//!
//! # Shared-Pointer Types
//!

// Std-lib
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LockResult, RwLock, RwLockReadGuard, RwLockWriteGuard};

// Crates.io
use by_address::ByAddress;

///
/// # Ptr
///
/// Thread-safe, reference-counted, lockable shared pointer.
/// Used for data shared *between* otherwise-independent owners,
/// e.g. a layer table referred to by several libraries.
///
/// Access goes through `read()` and `write()`, which forward to the inner [RwLock]:
///
/// ```text
/// let layers = lib.layers.read()?;
/// let met1 = layers.get("met1");
/// ```
///
/// Comparisons and hashes are *by address*, via [ByAddress].
/// Two [Ptr]s are equal if and only if they point to the same allocation,
/// regardless of whether their contents compare equal.
///
#[derive(Debug, Default)]
pub struct Ptr<T: ?Sized>(ByAddress<Arc<RwLock<T>>>);

impl<T> Ptr<T> {
    /// Pointer Constructor
    pub fn new(t: T) -> Self {
        Self(ByAddress(Arc::new(RwLock::new(t))))
    }
    /// Acquire shared read access
    pub fn read(&self) -> LockResult<RwLockReadGuard<'_, T>> {
        self.0.read()
    }
    /// Acquire exclusive write access
    pub fn write(&self) -> LockResult<RwLockWriteGuard<'_, T>> {
        self.0.write()
    }
    /// Boolean indication of whether `self` and `other` share an allocation
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0 .0, &other.0 .0)
    }
    /// Number of live [Ptr]s to our shared allocation
    pub fn count(&self) -> usize {
        Arc::strong_count(&self.0 .0)
    }
}
impl<T: Clone> Ptr<T> {
    /// Create a deep copy, in a new and unshared allocation
    pub fn deep_clone(&self) -> LockResult<Self> {
        match self.read() {
            Ok(guard) => Ok(Self::new(guard.clone())),
            Err(e) => Err(std::sync::PoisonError::new(Self::new(e.into_inner().clone()))),
        }
    }
}
impl<T> From<T> for Ptr<T> {
    fn from(t: T) -> Self {
        Self::new(t)
    }
}
// Cloning a [Ptr] shares its target; derived [Clone] would require `T: Clone`.
impl<T> Clone for Ptr<T> {
    fn clone(&self) -> Self {
        Self(ByAddress::clone(&self.0))
    }
}
impl<T> PartialEq for Ptr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}
impl<T> Eq for Ptr<T> {}
impl<T> Hash for Ptr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}
