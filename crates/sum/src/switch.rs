//! Exhaustive dispatch over the variants of a sum.
//!
//! Every switch takes one handler per declared variant, in declaration
//! order, followed by exactly one fallback. Exactly one of them runs.
//!
//! Two forms exist:
//!
//! - [`Declared::switch`]: handlers are a tuple of closures typed against the
//!   declared variant tuple. A missing, extra, or misordered handler does not
//!   compile. Each call also checks the tuple against the live declaration,
//!   so a sum that grew through [`crate::add_variant`] after the handle was
//!   created fails with [`ConfigError::Arity`] instead of sending a declared
//!   variant to the fallback.
//! - [`Switch`]: a builder for declarations assembled with
//!   [`crate::add_variant`]. The case list is validated against the
//!   declaration when [`Switch::build`] is called.
//!
//! ```compile_fail
//! # use serde::{Deserialize, Serialize};
//! # use tagsum_core::{Member, Opt, declare, sum_type, variant};
//! trait Pet: Member {}
//! sum_type!(dyn Pet);
//!
//! #[derive(Serialize, Deserialize)]
//! struct Dog;
//! #[derive(Serialize, Deserialize)]
//! struct Cat;
//! impl Pet for Dog {}
//! impl Pet for Cat {}
//! variant!(dyn Pet => Dog, Cat);
//!
//! let pets = declare::<dyn Pet, (Dog, Cat)>([Opt::sealed()]).unwrap();
//! // Only one variant handler for two variants.
//! pets.switch(None, (|_: &Dog| 1,), |_| 0);
//! ```

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use crate::decl::Declaration;
use crate::error::ConfigError;
use crate::member::{Sum, Variant, downcast, dynamic_type_id};
use crate::registry::{Declared, Registry, VariantList};

/// What the fallback handler receives.
pub enum Unmatched<'a, S: ?Sized> {
	/// No value, and the sum accepts empty values.
	Empty,
	/// No value, although the sum was declared with `NoZero`.
	ForbiddenEmpty,
	/// A value of a type outside the variant set of an open sum.
	Undeclared(&'a S),
	/// A value of a type outside the variant set of a sealed sum.
	SealedViolation(&'a S),
	/// A declared variant with no case, registered after a [`Dispatcher`] was
	/// built.
	Unhandled(&'a S),
}

impl<'a, S: ?Sized + Sum> Unmatched<'a, S> {
	fn classify(decl: &Declaration<S>, value: Option<&'a S>) -> Self {
		match value {
			None if decl.rejects_empty() => Self::ForbiddenEmpty,
			None => Self::Empty,
			Some(value) if decl.variant_of(value).is_some() => Self::Unhandled(value),
			Some(value) if decl.is_sealed() => Self::SealedViolation(value),
			Some(value) => Self::Undeclared(value),
		}
	}

	/// The unmatched value, if there is one.
	pub fn value(&self) -> Option<&'a S> {
		match self {
			Self::Empty | Self::ForbiddenEmpty => None,
			Self::Undeclared(value) | Self::SealedViolation(value) | Self::Unhandled(value) => Some(*value),
		}
	}

	/// Whether the sum's configuration forbids reaching the fallback this way.
	pub fn is_violation(&self) -> bool {
		matches!(self, Self::ForbiddenEmpty | Self::SealedViolation(_))
	}
}

impl<S: ?Sized + Sum> fmt::Debug for Unmatched<'_, S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Empty => f.write_str("Empty"),
			Self::ForbiddenEmpty => f.write_str("ForbiddenEmpty"),
			Self::Undeclared(value) => f.debug_tuple("Undeclared").field(&value.as_member().type_name()).finish(),
			Self::SealedViolation(value) => f.debug_tuple("SealedViolation").field(&value.as_member().type_name()).finish(),
			Self::Unhandled(value) => f.debug_tuple("Unhandled").field(&value.as_member().type_name()).finish(),
		}
	}
}

/// A tuple of handlers matching the variant tuple `L`, one closure per
/// variant taking a reference to that variant.
pub trait Handlers<S: ?Sized + Sum, L, R> {
	/// Runs the handler of the first variant matching `value` exactly.
	fn dispatch(self, value: &S) -> Option<R>;
}

impl<S: ?Sized + Sum, L: VariantList<S>> Declared<'_, S, L> {
	/// Runs the handler matching the dynamic type of `value`, or `fallback`.
	///
	/// Fails without running anything when the current declaration no longer
	/// has exactly the variants of `L`, in order.
	pub fn switch<'v, H, F, R>(&self, value: Option<&'v S>, handlers: H, fallback: F) -> Result<R, ConfigError>
	where
		H: Handlers<S, L, R>,
		F: FnOnce(Unmatched<'v, S>) -> R,
	{
		let decl = self.declaration();
		L::check(&decl)?;
		if let Some(value) = value
			&& let Some(result) = handlers.dispatch(value)
		{
			return Ok(result);
		}
		Ok(fallback(Unmatched::classify(&decl, value)))
	}
}

/// Checks one case per variant of `decl`, in declaration order.
fn check_cases<S: ?Sized + Sum>(decl: &Declaration<S>, cases: &[(TypeId, &'static str)]) -> Result<(), ConfigError> {
	let sum = decl.sum_name();
	if cases.len() != decl.len() {
		return Err(ConfigError::Arity {
			sum,
			expected: decl.len() + 1,
			found: cases.len() + 1,
		});
	}
	for (position, (&(type_id, found), entry)) in cases.iter().zip(decl.variants()).enumerate() {
		if type_id != entry.type_id() {
			return Err(ConfigError::CaseOrder {
				sum,
				position,
				expected: entry.type_name(),
				found,
			});
		}
	}
	Ok(())
}

macro_rules! impl_variant_tuples {
	($( ($($variant:ident $handler:ident $arg:ident),+) )+) => {
		$(
			impl<S: ?Sized + Sum, $($variant: Variant<S>),+> VariantList<S> for ($($variant,)+) {
				fn register(decl: &mut Declaration<S>) -> Result<(), ConfigError> {
					$(decl.insert::<$variant>()?;)+
					Ok(())
				}

				fn check(decl: &Declaration<S>) -> Result<(), ConfigError> {
					check_cases(decl, &[$((TypeId::of::<$variant>(), type_name::<$variant>())),+])
				}
			}

			impl<S: ?Sized + Sum, R, $($variant: Variant<S>, $handler: FnOnce(&$variant) -> R),+>
				Handlers<S, ($($variant,)+), R> for ($($handler,)+)
			{
				fn dispatch(self, value: &S) -> Option<R> {
					let any: &dyn Any = value.as_member();
					let ($($arg,)+) = self;
					$(
						if let Some(variant) = any.downcast_ref::<$variant>() {
							return Some($arg(variant));
						}
					)+
					None
				}
			}
		)+
	};
}

impl_variant_tuples! {
	(A FA a)
	(A FA a, B FB b)
	(A FA a, B FB b, C FC c)
	(A FA a, B FB b, C FC c, D FD d)
	(A FA a, B FB b, C FC c, D FD d, E FE e)
	(A FA a, B FB b, C FC c, D FD d, E FE e, F FF f)
	(A FA a, B FB b, C FC c, D FD d, E FE e, F FF f, G FG g)
	(A FA a, B FB b, C FC c, D FD d, E FE e, F FF f, G FG g, H FH h)
	(A FA a, B FB b, C FC c, D FD d, E FE e, F FF f, G FG g, H FH h, I FI i)
	(A FA a, B FB b, C FC c, D FD d, E FE e, F FF f, G FG g, H FH h, I FI i, J FJ j)
	(A FA a, B FB b, C FC c, D FD d, E FE e, F FF f, G FG g, H FH h, I FI i, J FJ j, K FK k)
	(A FA a, B FB b, C FC c, D FD d, E FE e, F FF f, G FG g, H FH h, I FI i, J FJ j, K FK k, L FL l)
}

struct Case<'f, S: ?Sized, R> {
	type_id: TypeId,
	type_name: &'static str,
	handler: Box<dyn FnMut(&S) -> Option<R> + 'f>,
}

/// Builder for a switch validated against the declaration at build time.
pub struct Switch<'f, S: ?Sized, R> {
	registry: &'f Registry,
	decl: Arc<Declaration<S>>,
	cases: Vec<Case<'f, S, R>>,
}

impl<'f, S: ?Sized + Sum, R> Switch<'f, S, R> {
	/// Starts a switch over the current declaration of `S` in `registry`.
	pub fn new(registry: &'f Registry) -> Result<Self, ConfigError> {
		let decl = registry.lookup::<S>().ok_or(ConfigError::Undeclared { sum: type_name::<S>() })?;
		Ok(Self {
			registry,
			decl,
			cases: Vec::with_capacity(8),
		})
	}

	/// Starts a switch over `S` in the global registry.
	pub fn global() -> Result<Self, ConfigError> {
		Self::new(Registry::global())
	}

	/// Appends the handler for the next variant.
	pub fn case<V: Variant<S>>(mut self, mut handler: impl FnMut(&V) -> R + 'f) -> Self {
		self.cases.push(Case {
			type_id: TypeId::of::<V>(),
			type_name: type_name::<V>(),
			handler: Box::new(move |value: &S| downcast::<S, V>(value).map(&mut handler)),
		});
		self
	}

	/// Closes the switch with its fallback and checks the case list.
	pub fn build(self, fallback: impl for<'v> FnMut(Unmatched<'v, S>) -> R + 'f) -> Result<Dispatcher<'f, S, R>, ConfigError> {
		let cases: Vec<_> = self.cases.iter().map(|case| (case.type_id, case.type_name)).collect();
		check_cases(&self.decl, &cases)?;

		Ok(Dispatcher {
			registry: self.registry,
			decl: self.decl,
			cases: self.cases,
			fallback: Box::new(fallback),
		})
	}
}

/// A validated switch, reusable across values.
///
/// Variants registered after [`Switch::build`] reach the fallback as
/// [`Unmatched::Unhandled`].
pub struct Dispatcher<'f, S: ?Sized, R> {
	registry: &'f Registry,
	decl: Arc<Declaration<S>>,
	cases: Vec<Case<'f, S, R>>,
	fallback: Box<dyn for<'v> FnMut(Unmatched<'v, S>) -> R + 'f>,
}

impl<S: ?Sized + Sum, R> Dispatcher<'_, S, R> {
	/// Runs exactly one handler for `value`.
	pub fn dispatch(&mut self, value: Option<&S>) -> R {
		if let Some(value) = value {
			let type_id = dynamic_type_id(value);
			if let Some(case) = self.cases.iter_mut().find(|case| case.type_id == type_id)
				&& let Some(result) = (case.handler)(value)
			{
				return result;
			}
		}
		let decl = self.registry.lookup::<S>().unwrap_or_else(|| self.decl.clone());
		(self.fallback)(Unmatched::classify(&decl, value))
	}
}

#[cfg(test)]
mod tests;
