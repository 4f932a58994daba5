//! Immutable, request-scoped context passed down a call chain.
//!
//! A [`Context`] is a persistent linked list of frames. Every frame binds
//! exactly one [`Key`] to one [`AnyValue`] and points to its parent frame.
//! Binding a value never touches an existing frame: [`Context::with_value`]
//! returns a new [`Context`] layered on top of the one it was called on,
//! which itself stays valid and unchanged.
//!
//! Lookups walk from the most recently attached frame towards the root and
//! return the first binding with an equal key, so the nearest binding wins.
//!
//! Cloning a [`Context`] is cheap (a single [`Arc`] increment) and a [`Context`]
//! can be shared freely between threads and tasks.
//!
//! Most users want the typed accessors such as [`Context::store`] and
//! [`Context::load`] instead of the raw [`Context::with_value`] and [`Context::value`].
//!
//! # Example
//!
//! ```
//! use context_value::context::{AnyValue, Context};
//! use context_value::key::Key;
//!
//! let root = Context::new();
//! let child = root.with_value(Key::unnamed::<u16>(), AnyValue::new(8080u16));
//!
//! assert!(root.value(&Key::unnamed::<u16>()).is_none());
//! assert_eq!(
//!     child
//!         .value(&Key::unnamed::<u16>())
//!         .and_then(|value| value.downcast_ref::<u16>()),
//!     Some(&8080),
//! );
//! ```

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use crate::key::Key;

mod any_value;
#[doc(inline)]
pub use any_value::AnyValue;

#[derive(Clone, Default)]
/// Immutable overlay of [`Key`] to [`AnyValue`] bindings.
///
/// See [the module docs](self) for more information.
pub struct Context {
    head: Option<Arc<Frame>>,
}

struct Frame {
    key: Key,
    value: AnyValue,
    parent: Context,
}

impl Context {
    /// Create an empty root [`Context`].
    #[inline(always)]
    #[must_use]
    pub const fn new() -> Self {
        Self { head: None }
    }

    /// Create a child [`Context`] in which `key` is bound to `value`.
    ///
    /// `self` is left untouched.
    #[must_use]
    pub fn with_value(&self, key: Key, value: AnyValue) -> Self {
        Self {
            head: Some(Arc::new(Frame {
                key,
                value,
                parent: self.clone(),
            })),
        }
    }

    /// Get the value bound to `key` in the nearest frame that binds it.
    #[must_use]
    pub fn value(&self, key: &Key) -> Option<&AnyValue> {
        self.frames()
            .find(|(bound, _)| *bound == key)
            .map(|(_, value)| value)
    }

    /// Iterate over all bindings of this [`Context`], most recent first.
    ///
    /// Shadowed bindings are yielded as well.
    pub fn frames(&self) -> Frames<'_> {
        Frames {
            next: self.head.as_deref(),
        }
    }

    /// Number of frames between this [`Context`] and the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames().count()
    }

    /// Returns true if no value was ever bound on this chain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns true if both contexts point to the very same frame.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        // unlink uniquely owned frames one by one,
        // the default recursive drop overflows the stack on deep chains
        let mut next = self.head.take();
        while let Some(frame) = next {
            match Arc::try_unwrap(frame) {
                Ok(mut frame) => next = frame.parent.head.take(),
                Err(_) => break,
            }
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("frames", &DebugFrames(self))
            .finish()
    }
}

struct DebugFrames<'a>(&'a Context);

impl fmt::Debug for DebugFrames<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.frames()).finish()
    }
}

#[derive(Debug, Clone)]
/// Iterator over the bindings of a [`Context`], created by [`Context::frames`].
pub struct Frames<'a> {
    next: Option<&'a Frame>,
}

impl<'a> Iterator for Frames<'a> {
    type Item = (&'a Key, &'a AnyValue);

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.next?;
        self.next = frame.parent.head.as_deref();
        Some((&frame.key, &frame.value))
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

/// Access to the [`Context`] carried by a request, connection or any other value.
pub trait ContextRef {
    /// Get reference to the underlying [`Context`].
    fn context(&self) -> &Context;
}

impl ContextRef for Context {
    fn context(&self) -> &Context {
        self
    }
}

impl<T> ContextRef for &T
where
    T: ContextRef,
{
    #[inline(always)]
    fn context(&self) -> &Context {
        (**self).context()
    }
}

impl<T> ContextRef for &mut T
where
    T: ContextRef,
{
    #[inline(always)]
    fn context(&self) -> &Context {
        (**self).context()
    }
}

impl<T> ContextRef for Box<T>
where
    T: ContextRef,
{
    fn context(&self) -> &Context {
        (**self).context()
    }
}

impl<T> ContextRef for Pin<Box<T>>
where
    T: ContextRef,
{
    fn context(&self) -> &Context {
        (**self).context()
    }
}

impl<T> ContextRef for Arc<T>
where
    T: ContextRef,
{
    fn context(&self) -> &Context {
        (**self).context()
    }
}
