use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::key::TypeTag;

#[derive(Clone)]
/// A type erased value which can be bound to a [`Key`] in a [`Context`].
///
/// The value is stored in an [`Arc`] together with the [`TypeTag`] of
/// its concrete type, so cloning an [`AnyValue`] never clones the value itself.
///
/// [`Key`]: crate::key::Key
/// [`Context`]: super::Context
pub struct AnyValue {
    value_type: TypeTag,
    value: Arc<dyn Any + Send + Sync>,
}

impl AnyValue {
    /// Erase the type of `value`.
    ///
    /// If the value you are wrapping is an `Arc<T>`, prefer [`Self::from_arc`]
    /// to prevent the double indirection of storing an `Arc<Arc<T>>`.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Erase the type of an already shared `value`.
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            value_type: TypeTag::of::<T>(),
            value,
        }
    }

    /// [`TypeTag`] of the concrete type that was erased.
    #[must_use]
    pub fn value_type(&self) -> TypeTag {
        self.value_type
    }

    /// Returns true if the erased value is of type `T`.
    #[must_use]
    pub fn is<T: Send + Sync + 'static>(&self) -> bool {
        self.value_type.is::<T>()
    }

    /// Get a reference to the value if it is of type `T`.
    #[must_use]
    pub fn downcast_ref<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.value.as_ref().downcast_ref()
    }

    /// Get a shared handle to the value if it is of type `T`.
    #[must_use]
    pub fn downcast_arc<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value.clone().downcast().ok()
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyValue<{:?}>", self.value_type)
    }
}
