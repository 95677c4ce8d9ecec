use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque handle identifying whoever owns a tree instance.
///
/// The engine never looks inside; leaves that need host bindings (transforms, animators, ...)
/// downcast it in their awake hook.
#[derive(Clone)]
pub struct OwnerContext {
    inner: Arc<dyn Any + Send + Sync>,
}

impl OwnerContext {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    pub fn from_arc(inner: Arc<dyn Any + Send + Sync>) -> Self {
        Self { inner }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// `true` when both handles point at the same owner.
    pub fn same_owner(&self, other: &OwnerContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for OwnerContext {
    fn default() -> Self {
        Self::new(())
    }
}

impl fmt::Debug for OwnerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerContext").finish_non_exhaustive()
    }
}
