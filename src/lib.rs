//! Typed, request-scoped values carried through an immutable [`Context`].
//!
//! Values are attached to a [`Context`] by their static type, and optionally by a name,
//! and retrieved the same way. There are no keys to mint or export: two independent
//! pieces of code that both store an `u64` without a name will see each others value,
//! while an `u64` named `"retries"` and an `u64` named `"timeout"` never collide.
//!
//! ```
//! use context_value::Context;
//!
//! let ctx = Context::new().store(42u64).store_named("retries", 3u64);
//!
//! assert_eq!(ctx.load::<u64>(), (42, true));
//! assert_eq!(ctx.load_named::<u64, _>(&"retries"), (3, true));
//! assert_eq!(ctx.load_named::<u64, _>(&"timeout"), (0, false));
//!
//! let ctx = ctx.hide::<u64>();
//! assert_eq!(ctx.load::<u64>(), (0, false));
//! assert_eq!(ctx.load_named::<u64, _>(&"retries"), (3, true));
//! ```
//!
//! # Scope
//!
//! A [`Context`] is meant for data scoped to a single request or call tree,
//! crossing API boundaries within one process. It is not a dependency injection container,
//! not a registry and not a thread local. Do not use it to pass optional function arguments.
//!
//! # Modules
//!
//! - [`key`]: synthesis of collision free [`Key`]s from a type and optional name;
//! - [`context`]: the immutable [`Context`] overlay itself;
//! - [`value`]: typed store, load and hide operations on top of a [`Context`];
//! - [`error`]: the [`MissingValue`] error for callers that want to propagate absence.
//!
//! [`Key`]: key::Key
//! [`MissingValue`]: error::MissingValue

pub mod context;
pub mod error;
pub mod key;
pub mod value;

#[doc(inline)]
pub use context::{Context, ContextRef};
