//! Capability traits linking a sum supertype to its concrete variants.
//!
//! # Role
//!
//! A sum is an open trait-object type (`dyn Pet`) closed over by a
//! [`crate::Declaration`]. The traits here are the capability set every value
//! of the sum must satisfy, expressed so the compiler checks it once, at the
//! registration call site:
//!
//! - [`Member`]: object-safe view of any value (exact dynamic type, generic
//!   encoding, diagnostic type name).
//! - [`Sum`]: implemented by the supertype itself, upcasts to [`Member`].
//! - [`Variant`]: implemented by each concrete type, upcasts into the sum and
//!   provides a decoder.
//!
//! The [`sum_type!`](crate::sum_type) and [`variant!`](crate::variant) macros
//! write the trivial upcasting impls.

use std::any::{Any, TypeId};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Object-safe capabilities shared by every value that can live in a sum.
///
/// Blanket-implemented for all `'static` serializable types. Sum traits list
/// it as a supertrait:
///
/// ```
/// trait Pet: tagsum_core::Member {
/// 	fn sound(&self) -> &'static str;
/// }
/// ```
pub trait Member: Any + erased_serde::Serialize {
	/// Fully qualified Rust type name of the dynamic type.
	fn type_name(&self) -> &'static str;
}

impl<T: Any + Serialize> Member for T {
	fn type_name(&self) -> &'static str {
		std::any::type_name::<T>()
	}
}

/// The abstract supertype of a sum, usually `dyn Trait` where `Trait: Member`.
pub trait Sum: 'static {
	/// Upcasts a value of the sum to its member capabilities.
	fn as_member(&self) -> &dyn Member;
}

/// A concrete type that belongs to the sum `S`.
///
/// The bound `V: Variant<S>` is the capability check performed at
/// registration: it only holds when `V` implements the sum's trait.
pub trait Variant<S: ?Sized + Sum>: Member + DeserializeOwned {
	/// Moves a boxed variant into the sum.
	fn into_sum(self: Box<Self>) -> Box<S>;
}

/// Returns the `TypeId` of the value's dynamic type.
pub fn dynamic_type_id<S: ?Sized + Sum>(value: &S) -> TypeId {
	let any: &dyn Any = value.as_member();
	any.type_id()
}

/// Narrows a value of the sum to the concrete variant `V`.
pub fn downcast<S: ?Sized + Sum, V: Variant<S>>(value: &S) -> Option<&V> {
	let any: &dyn Any = value.as_member();
	any.downcast_ref::<V>()
}

/// Unqualified type name used as the default wire name of a variant.
///
/// `pets::Cat` becomes `Cat`, `pets::Wrapper<u8>` becomes `Wrapper`.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
	let base = full.split('<').next().unwrap_or(full);
	base.rsplit("::").next().unwrap_or(base)
}

/// Implements [`Sum`] for one or more trait-object types.
///
/// The trait must have [`Member`] as a supertrait.
#[macro_export]
macro_rules! sum_type {
	($($sum:ty),+ $(,)?) => {
		$(
			impl $crate::Sum for $sum {
				fn as_member(&self) -> &dyn $crate::Member {
					self
				}
			}
		)+
	};
}

/// Implements [`Variant`] of a sum for each listed concrete type.
///
/// ```ignore
/// variant!(dyn Pet => Dog, Cat);
/// ```
#[macro_export]
macro_rules! variant {
	($sum:ty => $($variant:ty),+ $(,)?) => {
		$(
			impl $crate::Variant<$sum> for $variant {
				fn into_sum(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<$sum> {
					self
				}
			}
		)+
	};
}
