//! Key synthesis for typed context values.
//!
//! A [`Key`] is derived from the static type `T` of the value stored behind it,
//! and optionally from a caller supplied name. No key object has to be minted,
//! exported or shared between the code that stores a value and the code that
//! loads it: both sides only need to agree on the type (and name, if any).
//!
//! # Identity
//!
//! - [`Key::unnamed::<T>()`] is equal to every other unnamed key for `T`, and to nothing else.
//! - [`Key::named::<T, N>(name)`] is equal to a named key for the same `T` whose name
//!   is of the same type `N` and compares equal to `name`.
//!
//! Names of different types never compare equal, even if they share a representation
//! (`1u8` and `1u16` are different names), and a named key never equals an unnamed one.
//!
//! # Example
//!
//! ```
//! use context_value::key::Key;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Color {
//!     Red,
//!     Blue,
//! }
//!
//! assert_eq!(Key::unnamed::<i32>(), Key::unnamed::<i32>());
//! assert_ne!(Key::unnamed::<i32>(), Key::unnamed::<i64>());
//!
//! assert_eq!(Key::named::<i32, _>(Color::Red), Key::named::<i32, _>(Color::Red));
//! assert_ne!(Key::named::<i32, _>(Color::Red), Key::named::<i32, _>(Color::Blue));
//! assert_ne!(Key::named::<i32, _>(Color::Red), Key::unnamed::<i32>());
//! ```

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Clone, Copy)]
/// Identity of a static type, derived at generic instantiation time.
///
/// Only the [`TypeId`] takes part in equality and hashing,
/// the type name is kept around for diagnostics.
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Create the [`TypeTag`] for type `T`.
    #[inline(always)]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The [`TypeId`] of the tagged type.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Best effort name of the tagged type, only meant for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.name
    }

    /// Returns true if this tag was created for type `T`.
    #[inline(always)]
    #[must_use]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A value that can be used to name a [`Key`].
///
/// Blanket implemented for every comparable, hashable and thread-safe type.
pub trait Name: Any + Eq + Hash + fmt::Debug + Send + Sync {}

impl<N> Name for N where N: Any + Eq + Hash + fmt::Debug + Send + Sync {}

/// Object safe view on a [`Name`].
trait ErasedName: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn name_type(&self) -> TypeTag;
    fn eq_name(&self, other: &dyn ErasedName) -> bool;
    fn hash_name(&self, state: &mut dyn Hasher);
    fn fmt_name(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<N: Name> ErasedName for N {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name_type(&self) -> TypeTag {
        TypeTag::of::<N>()
    }

    fn eq_name(&self, other: &dyn ErasedName) -> bool {
        other
            .as_any()
            .downcast_ref::<N>()
            .is_some_and(|other| self == other)
    }

    fn hash_name(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<N>().hash(&mut state);
        self.hash(&mut state);
    }

    fn fmt_name(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Clone)]
enum KeyKind {
    Unnamed {
        value_type: TypeTag,
    },
    Named {
        value_type: TypeTag,
        name: Arc<dyn ErasedName>,
    },
}

#[derive(Clone)]
/// Lookup identity of a value bound in a [`Context`].
///
/// See the [module docs](self) for the equality rules.
///
/// [`Context`]: crate::context::Context
pub struct Key(KeyKind);

impl Key {
    /// Synthesize the key for "the slot of type `T`, without a name".
    #[must_use]
    pub fn unnamed<T: ?Sized + 'static>() -> Self {
        Self(KeyKind::Unnamed {
            value_type: TypeTag::of::<T>(),
        })
    }

    /// Synthesize the key for "the slot of type `T` named `name`".
    #[must_use]
    pub fn named<T: ?Sized + 'static, N: Name>(name: N) -> Self {
        Self(KeyKind::Named {
            value_type: TypeTag::of::<T>(),
            name: Arc::new(name),
        })
    }

    /// [`TypeTag`] of the value type this key is bound to.
    #[must_use]
    pub fn value_type(&self) -> TypeTag {
        match &self.0 {
            KeyKind::Unnamed { value_type } | KeyKind::Named { value_type, .. } => *value_type,
        }
    }

    /// [`TypeTag`] of the name type, `None` for unnamed keys.
    #[must_use]
    pub fn name_type(&self) -> Option<TypeTag> {
        match &self.0 {
            KeyKind::Unnamed { .. } => None,
            KeyKind::Named { name, .. } => Some(name.name_type()),
        }
    }

    /// Returns true if this key was synthesized with a name.
    #[must_use]
    pub fn is_named(&self) -> bool {
        matches!(self.0, KeyKind::Named { .. })
    }

    /// Returns a reference to the name if it is of type `N`.
    #[must_use]
    pub fn name<N: Name>(&self) -> Option<&N> {
        match &self.0 {
            KeyKind::Unnamed { .. } => None,
            KeyKind::Named { name, .. } => name.as_ref().as_any().downcast_ref(),
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (KeyKind::Unnamed { value_type: a }, KeyKind::Unnamed { value_type: b }) => a == b,
            (
                KeyKind::Named {
                    value_type: a,
                    name: name_a,
                },
                KeyKind::Named {
                    value_type: b,
                    name: name_b,
                },
            ) => a == b && name_a.eq_name(name_b.as_ref()),
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            KeyKind::Unnamed { value_type } => {
                state.write_u8(0);
                value_type.hash(state);
            }
            KeyKind::Named { value_type, name } => {
                state.write_u8(1);
                value_type.hash(state);
                name.hash_name(state);
            }
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            KeyKind::Unnamed { value_type } => write!(f, "Key<{value_type:?}>"),
            KeyKind::Named { value_type, name } => {
                write!(f, "Key<{value_type:?}>(")?;
                name.fmt_name(f)?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            KeyKind::Unnamed { value_type } => write!(f, "`{value_type:?}`"),
            KeyKind::Named { value_type, name } => {
                write!(f, "`{value_type:?}` named ")?;
                name.fmt_name(f)
            }
        }
    }
}
